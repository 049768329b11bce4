//! Errors surfaced while loading packs and templates.
//!
//! Per spec, a malformed pack or override file is logged and skipped --
//! it never fails `Load`. These errors exist for the handful of callers
//! (notably `loom doctor`) that want to report what was skipped and why.

/// One file that failed to load, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct LoadIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplatesError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    InvalidPack {
        path: String,
        #[source]
        source: loom_core::pack::PackError,
    },

    #[error("{path}: {source}")]
    InvalidTemplate {
        path: String,
        #[source]
        source: loom_core::template::TemplateError,
    },
}

impl TemplatesError {
    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::InvalidPack { path, .. }
            | Self::InvalidTemplate { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplatesError>;
