//! Dashboard-process lifecycle: ethereal (per-project, session-scoped) and
//! server (persistent multi-project daemon) modes.
//!
//! This crate only manages *process* lifecycle -- spawning, locking,
//! liveness, port selection. It has no knowledge of what the dashboard
//! process actually serves; that's `loom-dashboard`.

pub mod error;
pub mod ethereal;
pub mod lock;
pub mod liveness;
pub mod port;
pub mod server;

pub use error::{LifecycleError, Result};
pub use ethereal::{check_ethereal_health, ensure_dashboard, DashboardInfo, EtherealHealth};
pub use server::{check_server_health, ServerHealth, ServerStatus};
