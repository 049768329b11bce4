//! `GET /api/ready`, `GET /api/blocked`, `GET /api/critical-path`.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use loom_storage::WorkFilter;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WorkQuery {
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub limit: Option<i64>,
}

impl From<WorkQuery> for WorkFilter {
    fn from(q: WorkQuery) -> Self {
        WorkFilter {
            issue_type: q.issue_type,
            assignee: q.assignee,
            limit: q.limit,
        }
    }
}

pub async fn ready(State(state): State<AppState>, Query(q): Query<WorkQuery>) -> Result<Json<Value>, ApiError> {
    let issues = state.engine.get_ready(&q.into())?;
    Ok(Json(json!({ "issues": issues })))
}

pub async fn blocked(State(state): State<AppState>, Query(q): Query<WorkQuery>) -> Result<Json<Value>, ApiError> {
    let issues = state.engine.get_blocked(&q.into())?;
    Ok(Json(json!({ "issues": issues })))
}

pub async fn critical_path(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let issues = state.engine.get_critical_path()?;
    Ok(Json(json!({ "issues": issues })))
}
