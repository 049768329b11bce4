//! The ethereal-mode startup protocol (spec.md §4.5, steps 1-7):
//! per-project, session-scoped dashboard process with a deterministic port.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{LifecycleError, Result};
use crate::lock::ExclusiveLock;
use crate::liveness::{is_process_alive, port_accepts_connections};
use crate::port::select_port;

const PID_FILE: &str = "ephemeral.pid";
const PORT_FILE: &str = "ephemeral.port";
const LOCK_FILE: &str = "ephemeral.lock";
const LOG_FILE: &str = "ephemeral.log";

const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// A running (or already-running) ethereal dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardInfo {
    pub port: u16,
    pub pid: u32,
    pub url: String,
}

fn pid_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PID_FILE)
}
fn port_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PORT_FILE)
}
fn lock_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCK_FILE)
}
fn log_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOG_FILE)
}

fn io_err(path: &Path, source: std::io::Error) -> LifecycleError {
    LifecycleError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))
}

fn read_existing_instance(project_dir: &Path) -> Option<DashboardInfo> {
    let pid: u32 = std::fs::read_to_string(pid_path(project_dir)).ok()?.trim().parse().ok()?;
    let port: u16 = std::fs::read_to_string(port_path(project_dir)).ok()?.trim().parse().ok()?;
    Some(DashboardInfo {
        port,
        pid,
        url: format!("http://127.0.0.1:{port}"),
    })
}

fn reap_stale_pid(project_dir: &Path) {
    if let Some(existing) = read_existing_instance(project_dir) {
        if !is_process_alive(existing.pid) {
            let _ = std::fs::remove_file(pid_path(project_dir));
        }
    }
}

/// Ensures an ethereal dashboard is running for `project_dir`, starting one
/// if needed. `spawn` builds the `Command` to launch given the chosen port
/// (the caller knows its own binary path and subcommand shape).
pub fn ensure_dashboard(
    project_dir: &Path,
    spawn: impl FnOnce(u16) -> Command,
) -> Result<DashboardInfo> {
    // Step 2: acquire the advisory lock first; everything else happens
    // under it so a concurrent starter can't race us.
    let lock = ExclusiveLock::try_acquire(&lock_path(project_dir))?;

    // Step 3: an already-running, reachable instance wins outright.
    if let Some(existing) = read_existing_instance(project_dir) {
        if is_process_alive(existing.pid) && port_accepts_connections(existing.port) {
            info!(pid = existing.pid, port = existing.port, "reusing running ethereal dashboard");
            return Ok(existing);
        }
    }

    // Step 4: reap a stale PID file before spawning a replacement.
    reap_stale_pid(project_dir);

    // Step 5 (re-check under lock): another process may have started one
    // between our first read and acquiring the lock -- re-read once more.
    if let Some(existing) = read_existing_instance(project_dir) {
        if is_process_alive(existing.pid) && port_accepts_connections(existing.port) {
            return Ok(existing);
        }
    }

    let port = select_port(project_dir);
    let log_file = std::fs::File::create(log_path(project_dir)).map_err(|e| io_err(&log_path(project_dir), e))?;
    let stderr_file = log_file.try_clone().map_err(|e| io_err(&log_path(project_dir), e))?;

    let mut command = spawn(port);
    command.stderr(stderr_file).stdout(std::process::Stdio::null());
    let mut child = command.spawn().map_err(LifecycleError::Spawn)?;

    std::thread::sleep(STARTUP_GRACE);

    if let Ok(Some(_status)) = child.try_wait() {
        let mut stderr = String::new();
        let _ = std::fs::File::open(log_path(project_dir))
            .and_then(|mut f| f.read_to_string(&mut stderr));
        warn!(project_dir = %project_dir.display(), "dashboard exited during startup");
        return Err(LifecycleError::EarlyExit { stderr });
    }

    let pid = child.id();

    // Step 6: atomic write-then-rename, same pattern as SummaryGen.
    write_atomically(&pid_path(project_dir), &pid.to_string())?;
    write_atomically(&port_path(project_dir), &port.to_string())?;

    info!(pid, port, "started ethereal dashboard");

    // Step 7: the lock is released by `ExclusiveLock`'s `Drop` here.
    drop(lock);

    Ok(DashboardInfo {
        port,
        pid,
        url: format!("http://127.0.0.1:{port}"),
    })
}

/// Ethereal-mode health check (spec.md §4.5 doctor): PID existence and
/// aliveness, port reachability, and a tail of the log on failure.
#[derive(Debug, Clone)]
pub struct EtherealHealth {
    pub pid_file_exists: bool,
    pub process_alive: bool,
    pub port_reachable: bool,
    pub log_tail: Option<String>,
}

pub fn check_ethereal_health(project_dir: &Path) -> EtherealHealth {
    let existing = read_existing_instance(project_dir);
    let pid_file_exists = pid_path(project_dir).is_file();
    let process_alive = existing.as_ref().is_some_and(|e| is_process_alive(e.pid));
    let port_reachable = existing.as_ref().is_some_and(|e| port_accepts_connections(e.port));

    let log_tail = if !process_alive || !port_reachable {
        std::fs::read_to_string(log_path(project_dir)).ok()
    } else {
        None
    };

    EtherealHealth {
        pid_file_exists,
        process_alive,
        port_reachable,
        log_tail,
    }
}
