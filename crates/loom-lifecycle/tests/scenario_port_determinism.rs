//! End-to-end scenario: ethereal port determinism (spec.md §8 scenario 6).
//!
//! For a fixed project directory `D`, the deterministic candidate port is
//! `P0 = 8400 + (SHA256(D) mod 1000)`. Restarting the dashboard when `P0` is
//! occupied falls back to `P0 + 1`; occupying the whole sequential fallback
//! range (`P0..=P0+4`) forces an OS-assigned port distinct from all five.

use std::net::TcpListener;

use loom_lifecycle::port::{candidate_port, select_port};

#[test]
fn scenario6_ethereal_port_determinism() {
    let project_dir = tempfile::tempdir().unwrap();

    let p0 = candidate_port(project_dir.path());
    assert_eq!(
        p0,
        candidate_port(project_dir.path()),
        "the candidate port must be a pure function of the project directory"
    );
    assert_eq!(select_port(project_dir.path()), p0, "P0 is free, so it is selected outright");

    // Occupy P0: the next start should land on the first sequential fallback.
    let hold_p0 = TcpListener::bind(("127.0.0.1", p0)).unwrap();
    assert_eq!(select_port(project_dir.path()), p0 + 1);
    drop(hold_p0);

    // Occupy P0..=P0+4 (every sequential fallback slot): selection must fall
    // through to an OS-assigned port distinct from all five occupied ones.
    let held: Vec<TcpListener> = (0..=4).map(|offset| TcpListener::bind(("127.0.0.1", p0 + offset)).unwrap()).collect();

    let fallback = select_port(project_dir.path());
    assert!(fallback >= 1024, "OS-assigned port must be >= 1024");
    for offset in 0..=4 {
        assert_ne!(fallback, p0 + offset, "fallback port must differ from every occupied sequential slot");
    }

    drop(held);
}
