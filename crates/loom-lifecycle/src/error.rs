//! Lifecycle errors -- starting, stopping, and health-checking the dashboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another session is starting the dashboard for this project")]
    LockHeld,

    #[error("no port available: tried {base}..={last} and the OS-assigned fallback")]
    NoPortAvailable { base: u16, last: u16 },

    #[error("dashboard process exited immediately; stderr:\n{stderr}")]
    EarlyExit { stderr: String },

    #[error("failed to spawn dashboard process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] loom_config::ConfigError),

    #[error("server daemon is not running")]
    ServerNotRunning,

    #[error("server daemon is already running (pid {0})")]
    ServerAlreadyRunning(u32),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
