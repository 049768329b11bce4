//! `POST /api/issue/{id}/comments`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use loom_core::comment::Comment;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    author: String,
    text: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateComment>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .store
        .add_comment(&id, &req.author, &req.text)
        .map_err(loom_engine::EngineError::from)?;
    Ok(Json(comment))
}
