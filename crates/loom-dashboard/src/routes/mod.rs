//! Route modules, one per resource group in spec.md §6's endpoint list.

pub mod activity;
pub mod batch;
pub mod comments;
pub mod issues;
pub mod metrics;
pub mod releases;
pub mod search;
pub mod work;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/issues", get(issues::list))
        .route("/api/issue/:id", get(issues::get).patch(issues::patch))
        .route("/api/issue/:id/comments", post(comments::create))
        .route("/api/ready", get(work::ready))
        .route("/api/blocked", get(work::blocked))
        .route("/api/critical-path", get(work::critical_path))
        .route("/api/metrics", get(metrics::get))
        .route("/api/activity", get(activity::list))
        .route("/api/releases", get(releases::list))
        .route("/api/release/:id/tree", get(releases::tree))
        .route("/api/batch/close", post(batch::close))
        .route("/api/batch/update", post(batch::update))
        .route("/api/search", post(search::search))
        .with_state(state)
}
