//! End-to-end CLI integration tests for the `loom` binary.
//!
//! Each test creates its own temporary directory, initializes a loom
//! project, and exercises the `loom` binary as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a `Command` targeting the cargo-built `loom` binary.
fn loom() -> Command {
    Command::cargo_bin("loom").unwrap()
}

/// Initialize a fresh loom project in a temp directory and return the handle.
fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    loom()
        .args(["init", "--prefix", "t"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp
}

/// Create an issue and return its id (parsed from `--json` output).
fn create_issue(tmp: &TempDir, title: &str, extra_args: &[&str]) -> String {
    let mut args = vec!["create", title, "--json"];
    args.extend_from_slice(extra_args);
    let output = loom().args(&args).current_dir(tmp.path()).output().unwrap();
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

fn show_json(tmp: &TempDir, id: &str) -> serde_json::Value {
    let output = loom()
        .args(["show", id, "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// Flow 1: full lifecycle
// ---------------------------------------------------------------------------

#[test]
fn flow1_full_lifecycle() {
    let tmp = init_project();

    let id1 = create_issue(
        &tmp,
        "Bug: login broken",
        &["-t", "bug", "-p", "0", "-d", "Users can't login"],
    );
    let id2 = create_issue(&tmp, "Feature idea", &["-t", "task", "-p", "2"]);
    let id3 = create_issue(&tmp, "Update docs", &["-t", "task", "-p", "3"]);

    assert!(id1.starts_with("t-"), "id1 should start with t-: {id1}");
    assert!(id2.starts_with("t-"), "id2 should start with t-: {id2}");
    assert!(id3.starts_with("t-"), "id3 should start with t-: {id3}");

    let output = loom()
        .args(["list", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let arr = list.as_array().expect("list --json should return an array");
    assert_eq!(arr.len(), 3, "should have 3 open issues");

    let bug = show_json(&tmp, &id1);
    assert_eq!(bug["id"].as_str().unwrap(), id1);
    assert_eq!(bug["issue_type"].as_str().unwrap(), "bug");
    assert_eq!(bug["status"].as_str().unwrap(), "triage");

    // update moves the bug toward its fixing state
    loom()
        .args(["update", &id1, "--status", "fixing"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let bug = show_json(&tmp, &id1);
    assert_eq!(bug["status"].as_str().unwrap(), "fixing");

    // close resolves to the type's own done state
    loom()
        .args(["close", &id1, "-r", "fixed"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let bug = show_json(&tmp, &id1);
    assert_eq!(bug["status"].as_str().unwrap(), "closed");

    // list now only shows the two remaining open issues
    let output = loom()
        .args(["list", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 2);

    // reopen sends it back to an open-category state
    loom()
        .args(["reopen", &id1])
        .current_dir(tmp.path())
        .assert()
        .success();
    let bug = show_json(&tmp, &id1);
    assert_eq!(bug["status"].as_str().unwrap(), "triage");
}

// ---------------------------------------------------------------------------
// Flow 2: dependencies and ready/blocked queries
// ---------------------------------------------------------------------------

#[test]
fn flow2_dependencies_and_ready() {
    let tmp = init_project();

    let parent = create_issue(&tmp, "Parent task", &["-t", "task", "-p", "1"]);
    let child = create_issue(&tmp, "Child task", &["-t", "task", "-p", "2"]);
    let unrelated = create_issue(&tmp, "Unrelated task", &["-t", "task", "-p", "3"]);

    // child depends on (is blocked by) parent
    loom()
        .args(["deps", "add", &parent, &child])
        .current_dir(tmp.path())
        .assert()
        .success();

    let output = loom()
        .args(["ready", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let ready: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ready_ids: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ready_ids.contains(&parent.as_str()), "parent should be ready");
    assert!(ready_ids.contains(&unrelated.as_str()), "unrelated should be ready");
    assert!(!ready_ids.contains(&child.as_str()), "child should be blocked, not ready");

    let output = loom()
        .args(["blocked", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let blocked: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let blocked_ids: Vec<&str> = blocked
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["issue"]["id"].as_str().unwrap())
        .collect();
    assert!(blocked_ids.contains(&child.as_str()));

    // closing the parent frees the child
    loom()
        .args(["close", &parent])
        .current_dir(tmp.path())
        .assert()
        .success();

    let output = loom()
        .args(["ready", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let ready: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ready_ids: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ready_ids.contains(&child.as_str()), "child should now be ready");

    // removing the dependency is idempotent with deps rm
    loom()
        .args(["deps", "rm", &parent, &child])
        .current_dir(tmp.path())
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Flow 3: claim / claim-next / release
// ---------------------------------------------------------------------------

#[test]
fn flow3_claim_cycle() {
    let tmp = init_project();

    let id = create_issue(&tmp, "Needs an owner", &["-t", "task", "-p", "1"]);

    loom()
        .args(["claim", &id, "--assignee", "agent-a"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let issue = show_json(&tmp, &id);
    assert_eq!(issue["assignee"].as_str().unwrap(), "agent-a");
    assert_eq!(issue["status"].as_str().unwrap(), "in_progress");

    loom()
        .args(["release", &id])
        .current_dir(tmp.path())
        .assert()
        .success();
    let issue = show_json(&tmp, &id);
    assert_eq!(issue["status"].as_str().unwrap(), "open");

    let output = loom()
        .args(["claim-next", "--assignee", "agent-b", "--type", "task", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let claimed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(claimed["id"].as_str().unwrap(), id);

    // no more ready tasks left to claim
    let output = loom()
        .args(["claim-next", "--type", "task", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let claimed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(claimed["claimed"].as_bool(), Some(false));
}

// ---------------------------------------------------------------------------
// Flow 4: search and filtered listing
// ---------------------------------------------------------------------------

#[test]
fn flow4_search_and_filter() {
    let tmp = init_project();

    create_issue(&tmp, "Fix the login page", &["-t", "bug"]);
    create_issue(&tmp, "Write onboarding docs", &["-t", "doc"]);
    create_issue(&tmp, "Unrelated chore", &["-t", "chore"]);

    let output = loom()
        .args(["search", "login", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let arr = results.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert!(arr[0]["title"].as_str().unwrap().contains("login"));

    let output = loom()
        .args(["list", "--type", "doc", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Flow 5: packs and templates
// ---------------------------------------------------------------------------

#[test]
fn flow5_packs_and_templates_list_builtins() {
    let tmp = init_project();

    loom()
        .args(["templates", "list"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("task"))
        .stdout(predicate::str::contains("bug"));

    loom()
        .args(["packs", "list"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("core"))
        .stdout(predicate::str::contains("planning"));
}

// ---------------------------------------------------------------------------
// Flow 6: diagnostics and error handling
// ---------------------------------------------------------------------------

#[test]
fn doctor_reports_ok_in_a_fresh_project() {
    let tmp = init_project();

    loom()
        .args(["doctor", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"statistics\""));
}

#[test]
fn show_missing_issue_fails_with_nonzero_exit() {
    let tmp = init_project();

    loom()
        .args(["show", "t-9999"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn close_rejects_explicit_status_with_multiple_ids() {
    let tmp = init_project();

    let id1 = create_issue(&tmp, "First", &["-t", "task"]);
    let id2 = create_issue(&tmp, "Second", &["-t", "task"]);

    loom()
        .args(["close", &id1, &id2, "--status", "closed"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn commands_outside_a_project_fail() {
    let tmp = TempDir::new().unwrap();

    loom()
        .args(["list"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}
