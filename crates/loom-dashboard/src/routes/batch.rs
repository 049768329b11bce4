//! `POST /api/batch/close`, `POST /api/batch/update`.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use loom_engine::{BatchResult, UpdateRequest};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchCloseRequest {
    pub ids: Vec<String>,
    pub reason: Option<String>,
}

pub async fn close(
    State(state): State<AppState>,
    Json(req): Json<BatchCloseRequest>,
) -> Result<Json<BatchResult>, ApiError> {
    let result = state.engine.batch_close(&req.ids, req.reason.as_deref(), "dashboard");
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateRequest {
    pub ids: Vec<String>,
    #[serde(flatten)]
    pub update: UpdateRequest,
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<BatchUpdateRequest>,
) -> Result<Json<BatchResult>, ApiError> {
    let result = state.engine.batch_update(&req.ids, &req.update, "dashboard");
    Ok(Json(result))
}
