//! `GET /api/releases[?include_released=1]`, `GET /api/release/{id}/tree`.
//!
//! A "release" is a top-level epic: an issue of type `epic` with no parent.
//! `include_released` controls whether done-category epics are included.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use loom_core::enums::Category;
use loom_query::{release_tree, ReleaseNode};
use loom_storage::IssueFilter;

use crate::error::ApiError;
use crate::state::AppState;

const RELEASE_TYPE: &str = "epic";

#[derive(Debug, Deserialize)]
pub struct ReleasesQuery {
    #[serde(default)]
    include_released: bool,
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ReleasesQuery>) -> Result<Json<Value>, ApiError> {
    let epics = state
        .store
        .list_issues(&IssueFilter {
            issue_type: Some(RELEASE_TYPE.to_string()),
            ..Default::default()
        })
        .map_err(loom_engine::EngineError::from)?;

    let releases: Vec<_> = epics
        .into_iter()
        .filter(|i| i.parent_id.is_none())
        .filter(|i| {
            q.include_released
                || !state
                    .registry
                    .get_category(&i.issue_type, &i.status)
                    .is_some_and(|c| c == Category::Done)
        })
        .collect();

    Ok(Json(json!({ "releases": releases })))
}

pub async fn tree(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ReleaseNode>, ApiError> {
    let node = release_tree(state.store.as_ref(), &state.registry, &id)?;
    Ok(Json(node))
}
