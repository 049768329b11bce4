//! `POST /api/search?q=...`.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use loom_storage::IssueFilter;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(rename = "type")]
    issue_type: Option<String>,
    limit: Option<i64>,
}

pub async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Value>, ApiError> {
    let filter = IssueFilter {
        issue_type: q.issue_type,
        limit: q.limit,
        ..Default::default()
    };
    let issues = state
        .store
        .search_issues(&q.q, &filter)
        .map_err(loom_engine::EngineError::from)?;
    Ok(Json(json!({ "issues": issues })))
}
