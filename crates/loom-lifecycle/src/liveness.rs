//! PID liveness probing -- a harmless "signal 0"-equivalent check
//! (spec.md §4.5).

use std::net::TcpStream;
use std::time::Duration;

use sysinfo::{Pid, ProcessesToUpdate, System};

/// `true` if a process with `pid` currently exists.
pub fn is_process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    system.process(Pid::from_u32(pid)).is_some()
}

/// `true` if something is accepting TCP connections on `127.0.0.1:port`.
pub fn port_accepts_connections(port: u16) -> bool {
    TcpStream::connect_timeout(
        &format!("127.0.0.1:{port}").parse().unwrap(),
        Duration::from_millis(200),
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_alive() {
        assert!(is_process_alive(std::process::id()));
    }

    #[test]
    fn implausible_pid_is_not_alive() {
        assert!(!is_process_alive(u32::MAX - 1));
    }

    #[test]
    fn unbound_port_does_not_accept_connections() {
        assert!(!port_accepts_connections(1));
    }
}
