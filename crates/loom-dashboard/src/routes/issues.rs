//! `GET /api/issues`, `GET /api/issue/{id}`, `PATCH /api/issue/{id}`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use loom_engine::UpdateRequest;
use loom_storage::IssueFilter;
use loom_templates::registry::TransitionOption;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub parent_id: Option<String>,
    pub limit: Option<i64>,
}

fn categories_for(state: &AppState, category: Option<&str>) -> Vec<String> {
    match category {
        Some("open") => state.registry.open_states(),
        Some("wip") => state.registry.wip_states(),
        Some("done") => state.registry.done_states(),
        _ => Vec::new(),
    }
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<Value>, ApiError> {
    let filter = IssueFilter {
        issue_type: q.issue_type,
        status: q.status,
        categories: categories_for(&state, q.category.as_deref()),
        assignee: q.assignee,
        label: q.label,
        parent_id: q.parent_id,
        limit: q.limit,
    };
    let issues = state.store.list_issues(&filter).map_err(loom_engine::EngineError::from)?;
    Ok(Json(json!({ "issues": issues })))
}

#[derive(Debug, Default, Deserialize)]
pub struct GetQuery {
    #[serde(default)]
    pub include_transitions: bool,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    #[serde(flatten)]
    pub issue: loom_core::issue::Issue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_transitions: Option<Vec<TransitionOption>>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<GetQuery>,
) -> Result<Json<IssueResponse>, ApiError> {
    let issue = state.store.get_issue(&id).map_err(loom_engine::EngineError::from)?;
    let valid_transitions = if q.include_transitions {
        let fields_json = serde_json::to_value(&issue.fields)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        Some(
            state
                .registry
                .get_valid_transitions(&issue.issue_type, &issue.status, &fields_json),
        )
    } else {
        None
    };
    Ok(Json(IssueResponse { issue, valid_transitions }))
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<loom_engine::MutationOutcome>, ApiError> {
    let outcome = state.engine.update_issue(&id, &req, "dashboard")?;
    Ok(Json(outcome))
}
