//! Maps `EngineError`/`QueryError` onto the HTTP error envelope and status
//! codes from spec.md §6/§7: `{error, code, details?}`, status in
//! `{400, 404, 409, 500}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use loom_engine::EngineError;
use loom_query::QueryError;

pub struct ApiError(EngineErrorLike);

enum EngineErrorLike {
    Engine(EngineError),
    Query(QueryError),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(EngineErrorLike::Engine(e))
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self(EngineErrorLike::Query(e))
    }
}

fn code_and_status(kind: loom_engine::ErrorKind) -> (&'static str, StatusCode) {
    use loom_engine::ErrorKind;
    match kind {
        ErrorKind::NotFound => ("NOT_FOUND", StatusCode::NOT_FOUND),
        ErrorKind::Validation => ("VALIDATION", StatusCode::BAD_REQUEST),
        ErrorKind::TransitionNotAllowed => ("TRANSITION_NOT_ALLOWED", StatusCode::BAD_REQUEST),
        ErrorKind::HardEnforcement => ("HARD_ENFORCEMENT", StatusCode::BAD_REQUEST),
        ErrorKind::CycleDetected => ("CYCLE_DETECTED", StatusCode::BAD_REQUEST),
        ErrorKind::Conflict => ("CONFLICT", StatusCode::CONFLICT),
        ErrorKind::MigrationFailed => ("MIGRATION_FAILED", StatusCode::INTERNAL_SERVER_ERROR),
        ErrorKind::TemplateParse => ("TEMPLATE_PARSE", StatusCode::INTERNAL_SERVER_ERROR),
        ErrorKind::IoError => ("IO_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
        ErrorKind::Internal => ("INTERNAL", StatusCode::INTERNAL_SERVER_ERROR),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, kind, details) = match &self.0 {
            EngineErrorLike::Engine(e) => {
                let details = match e {
                    EngineError::HardEnforcement {
                        missing,
                        valid_transitions,
                        ..
                    } => Some(json!({
                        "missing_fields": missing,
                        "valid_transitions": valid_transitions,
                        "hint": "supply the missing fields, or transition to one of valid_transitions",
                    })),
                    _ => None,
                };
                (e.to_string(), e.kind(), details)
            }
            EngineErrorLike::Query(e) => {
                let kind = match e {
                    QueryError::Engine(inner) => inner.kind(),
                    QueryError::Storage(inner) => match inner.kind() {
                        loom_storage::ErrorKind::NotFound => loom_engine::ErrorKind::NotFound,
                        loom_storage::ErrorKind::Validation => loom_engine::ErrorKind::Validation,
                        loom_storage::ErrorKind::CycleDetected => loom_engine::ErrorKind::CycleDetected,
                        loom_storage::ErrorKind::Conflict => loom_engine::ErrorKind::Conflict,
                        loom_storage::ErrorKind::MigrationFailed => loom_engine::ErrorKind::MigrationFailed,
                        loom_storage::ErrorKind::IoError => loom_engine::ErrorKind::IoError,
                        loom_storage::ErrorKind::Internal => loom_engine::ErrorKind::Internal,
                    },
                    _ => loom_engine::ErrorKind::Internal,
                };
                (e.to_string(), kind, None)
            }
        };

        let (code, status) = code_and_status(kind);
        let mut body = json!({ "error": message, "code": code });
        if let Some(details) = details {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}
