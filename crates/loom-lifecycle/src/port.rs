//! Deterministic per-project port selection (spec.md §4.5 step 1).

use std::net::TcpListener;
use std::path::Path;

use sha2::{Digest, Sha256};

const BASE_PORT: u16 = 8400;
const PORT_SPACE: u32 = 1000;
const MAX_SEQUENTIAL_FALLBACKS: u16 = 4;

/// The deterministic candidate port for `project_dir`, before any
/// availability probing: `8400 + (SHA256(resolved_dir) mod 1000)`.
pub fn candidate_port(project_dir: &Path) -> u16 {
    let resolved = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(resolved.to_string_lossy().as_bytes());
    let digest = hasher.finalize();

    // First 4 bytes as a u32, big-endian, reduced mod the port space.
    let n = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    BASE_PORT + (n % PORT_SPACE) as u16
}

/// `true` if binding to `port` on localhost succeeds (and is immediately
/// released). Used only to probe availability before the real dashboard
/// process binds it.
fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Picks a listening port for `project_dir`: the deterministic candidate,
/// then up to [`MAX_SEQUENTIAL_FALLBACKS`] sequential ports, then an
/// OS-assigned ephemeral port.
pub fn select_port(project_dir: &Path) -> u16 {
    let base = candidate_port(project_dir);
    for offset in 0..=MAX_SEQUENTIAL_FALLBACKS {
        let port = base + offset;
        if port_is_free(port) {
            return port;
        }
    }
    TcpListener::bind(("127.0.0.1", 0))
        .and_then(|l| l.local_addr())
        .map(|addr| addr.port())
        .expect("OS always has at least one ephemeral port available")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_dir_yields_same_port() {
        let tmp = tempfile::tempdir().unwrap();
        let p1 = candidate_port(tmp.path());
        let p2 = candidate_port(tmp.path());
        assert_eq!(p1, p2);
    }

    #[test]
    fn different_dirs_usually_differ() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        assert_ne!(candidate_port(a.path()), candidate_port(b.path()));
    }

    #[test]
    fn candidate_port_is_in_expected_range() {
        let tmp = tempfile::tempdir().unwrap();
        let port = candidate_port(tmp.path());
        assert!((BASE_PORT..BASE_PORT + PORT_SPACE as u16).contains(&port));
    }

    #[test]
    fn select_port_falls_back_when_candidate_taken() {
        let tmp = tempfile::tempdir().unwrap();
        let base = candidate_port(tmp.path());
        let _holder = TcpListener::bind(("127.0.0.1", base)).unwrap();

        let selected = select_port(tmp.path());
        assert_ne!(selected, base);
    }
}
