//! Errors raised while computing metrics, activity feeds, or summaries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Storage(#[from] loom_storage::StorageError),

    #[error(transparent)]
    Engine(#[from] loom_engine::EngineError),

    #[error("issue {0} not found while walking release tree")]
    MissingNode(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, QueryError>;
