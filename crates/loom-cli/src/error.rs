//! CLI error taxonomy: wraps every lower-layer error and maps it onto the
//! three-way exit code (spec.md §6, §7): 0 success, 1 user error
//! (validation/not-found/conflict), 2 internal error.

use loom_config::ConfigError;
use loom_core::pack::PackError;
use loom_engine::{EngineError, ErrorKind as EngineErrorKind};
use loom_lifecycle::LifecycleError;
use loom_query::QueryError;
use loom_storage::{ErrorKind as StorageErrorKind, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("failed to parse pack file: {0}")]
    PackParse(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 0 is never returned here -- it's the process's own default on `Ok`.
    /// 1 covers user-correctable errors; 2 covers everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(e) => engine_exit(e.kind()),
            Self::Storage(e) => storage_exit(e.kind()),
            Self::Query(e) => match e {
                QueryError::Storage(inner) => storage_exit(inner.kind()),
                QueryError::Engine(inner) => engine_exit(inner.kind()),
                QueryError::MissingNode(_) => 1,
                QueryError::Write { .. } => 2,
            },
            Self::Config(e) => match e {
                ConfigError::ProjectNotFound => 1,
                _ => 2,
            },
            Self::Lifecycle(_) => 2,
            Self::Pack(_) | Self::PackParse(_) | Self::InvalidInput(_) => 1,
            Self::Io(_) => 2,
        }
    }
}

fn engine_exit(kind: EngineErrorKind) -> i32 {
    use EngineErrorKind::*;
    match kind {
        NotFound | Validation | TransitionNotAllowed | HardEnforcement | CycleDetected | Conflict => 1,
        MigrationFailed | TemplateParse | IoError | Internal => 2,
    }
}

fn storage_exit(kind: StorageErrorKind) -> i32 {
    use StorageErrorKind::*;
    match kind {
        NotFound | Validation | CycleDetected | Conflict => 1,
        MigrationFailed | IoError | Internal => 2,
    }
}
