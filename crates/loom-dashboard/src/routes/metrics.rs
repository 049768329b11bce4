//! `GET /api/metrics?days=N`.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use loom_query::{flow_metrics, FlowMetrics};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    days: Option<i64>,
}

pub async fn get(State(state): State<AppState>, Query(q): Query<MetricsQuery>) -> Result<Json<FlowMetrics>, ApiError> {
    let days = q.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let metrics = flow_metrics(state.store.as_ref(), &state.registry, days)?;
    Ok(Json(metrics))
}
