//! Project discovery and configuration loading.
//!
//! `loom-config` owns the filesystem side of `config.json` (per-project) and
//! `server.toml` (the global server-mode project registry) -- parsing and
//! writing them, and locating them. It has no opinion on *when* to write
//! them; that's `loom-cli`/`loom-lifecycle`'s job.

pub mod error;
pub mod project_config;
pub mod project_dir;
pub mod server_config;

pub use error::{ConfigError, Result};
