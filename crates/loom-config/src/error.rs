//! Errors raised while discovering or loading project/server configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    SerializeToml {
        path: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error("no loom project found (run 'loom init' first)")]
    ProjectNotFound,

    #[error("could not determine the user config directory for this platform")]
    NoUserConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
