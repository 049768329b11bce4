//! Engine error types -- the taxonomy raised by `IssueEngine` (spec.md §4.4, §7).

use loom_core::validation::ValidationError;
use loom_storage::StorageError;

/// Stable error-kind identifiers shared with the API surface and CLI exit
/// taxonomy (spec.md §7). A superset of `loom_storage::ErrorKind`: the
/// engine raises kinds storage has no way to know about (hard enforcement,
/// undefined transitions, template parse failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    TransitionNotAllowed,
    HardEnforcement,
    CycleDetected,
    Conflict,
    MigrationFailed,
    TemplateParse,
    IoError,
    Internal,
}

/// Errors raised by `IssueEngine` operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("validation error: {0}")]
    InvalidInput(String),

    /// A transition the engine explicitly demands strict checking for
    /// (e.g. `CloseIssue` with an explicit non-done state) is undefined for
    /// this type.
    #[error("transition {from} -> {to} is not defined for type {issue_type}")]
    TransitionNotAllowed {
        issue_type: String,
        from: String,
        to: String,
    },

    /// A hard-enforced transition is missing required fields. Carries
    /// enough context for a client to self-correct without a second
    /// request (spec.md §4.8).
    #[error("cannot transition {issue_type} from {from} to {to}: missing {missing:?}")]
    HardEnforcement {
        issue_type: String,
        from: String,
        to: String,
        missing: Vec<String>,
        valid_transitions: Vec<String>,
    },

    #[error("adding this dependency would create a cycle")]
    CycleDetected,

    #[error("optimistic lock failed: {reason}")]
    Conflict { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::TransitionNotAllowed { .. } => ErrorKind::TransitionNotAllowed,
            Self::HardEnforcement { .. } => ErrorKind::HardEnforcement,
            Self::CycleDetected => ErrorKind::CycleDetected,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(e) => match e.kind() {
                loom_storage::ErrorKind::NotFound => ErrorKind::NotFound,
                loom_storage::ErrorKind::Validation => ErrorKind::Validation,
                loom_storage::ErrorKind::CycleDetected => ErrorKind::CycleDetected,
                loom_storage::ErrorKind::Conflict => ErrorKind::Conflict,
                loom_storage::ErrorKind::MigrationFailed => ErrorKind::MigrationFailed,
                loom_storage::ErrorKind::IoError => ErrorKind::IoError,
                loom_storage::ErrorKind::Internal => ErrorKind::Internal,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
