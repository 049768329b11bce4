//! End-to-end scenarios exercised against a real `SqliteStore` + the
//! built-in `core` pack's `bug` template, matching the literal inputs and
//! expected outputs the templates' own hard-enforcement rule was designed
//! against.

use std::collections::BTreeMap;
use std::sync::Arc;

use loom_core::enums::EventType;
use loom_core::field_value::FieldValue;
use loom_engine::{EngineError, IssueEngine, UpdateRequest};
use loom_storage::{SqliteStore, Storage, WorkFilter};
use loom_templates::TemplateRegistry;

fn test_engine() -> (IssueEngine, tempfile::TempDir) {
    let store: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(TemplateRegistry::new(dir.path()));
    (IssueEngine::new(store, registry, "t"), dir)
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, FieldValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldValue::Text(v.to_string())))
        .collect()
}

fn set_status(engine: &IssueEngine, id: &str, status: &str) {
    engine
        .update_issue(
            id,
            &UpdateRequest {
                status: Some(status.to_string()),
                ..Default::default()
            },
            "tester",
        )
        .unwrap();
}

// ---------------------------------------------------------------------------
// Scenario 1: bug hard-enforcement blocks close
// ---------------------------------------------------------------------------

#[test]
fn scenario1_bug_hard_enforcement_blocks_close() {
    let (engine, _dir) = test_engine();

    let i1 = engine
        .create_issue("login broken", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    assert_eq!(i1.status, "triage");

    set_status(&engine, &i1.id, "confirmed");
    set_status(&engine, &i1.id, "fixing");

    engine
        .update_issue(
            &i1.id,
            &UpdateRequest {
                status: Some("verifying".to_string()),
                fields: Some(fields(&[("fix_verification", "initial")])),
                ..Default::default()
            },
            "tester",
        )
        .unwrap();

    // Blank out the populated field before attempting to close.
    engine
        .update_issue(
            &i1.id,
            &UpdateRequest {
                fields: Some(fields(&[("fix_verification", "")])),
                ..Default::default()
            },
            "tester",
        )
        .unwrap();

    let before = engine.get_ready(&WorkFilter::default()).unwrap();
    let _ = before;

    let result = engine.update_issue(
        &i1.id,
        &UpdateRequest {
            status: Some("closed".to_string()),
            ..Default::default()
        },
        "tester",
    );

    match result {
        Err(EngineError::HardEnforcement { missing, from, to, .. }) => {
            assert_eq!(missing, vec!["fix_verification".to_string()]);
            assert_eq!(from, "verifying");
            assert_eq!(to, "closed");
        }
        other => panic!("expected HardEnforcement, got {other:?}"),
    }

    // The rejected attempt left the issue untouched.
    let current = engine.list_issues(None, Some("bug")).unwrap();
    let current = current.into_iter().find(|i| i.id == i1.id).unwrap();
    assert_eq!(current.status, "verifying");
    assert_eq!(current.fields.get("fix_verification"), Some(&FieldValue::Text(String::new())));
}

// ---------------------------------------------------------------------------
// Scenario 2: atomic transition-with-fields succeeds
// ---------------------------------------------------------------------------

#[test]
fn scenario2_atomic_transition_with_fields_succeeds() {
    let (engine, _dir) = test_engine();

    let i2 = engine
        .create_issue("crash on startup", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    set_status(&engine, &i2.id, "confirmed");
    set_status(&engine, &i2.id, "fixing");

    let outcome = engine
        .update_issue(
            &i2.id,
            &UpdateRequest {
                status: Some("verifying".to_string()),
                fields: Some(fields(&[("fix_verification", "tests pass")])),
                ..Default::default()
            },
            "tester",
        )
        .unwrap();

    assert_eq!(outcome.issue.status, "verifying");
    assert_eq!(
        outcome.issue.fields.get("fix_verification"),
        Some(&FieldValue::Text("tests pass".to_string()))
    );
}

// ---------------------------------------------------------------------------
// Scenario 3: claim races
// ---------------------------------------------------------------------------

#[test]
fn scenario3_claim_races_exactly_one_winner() {
    let store: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(TemplateRegistry::new(dir.path()));
    let engine = Arc::new(IssueEngine::new(Arc::clone(&store), registry, "t"));

    let t1 = engine
        .create_issue("shared task", "task", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    assert_eq!(t1.status, "open");

    let engine_a = Arc::clone(&engine);
    let id_a = t1.id.clone();
    let handle_a = std::thread::spawn(move || engine_a.claim_issue(&id_a, "agent-a", "agent-a"));

    let engine_b = Arc::clone(&engine);
    let id_b = t1.id.clone();
    let handle_b = std::thread::spawn(move || engine_b.claim_issue(&id_b, "agent-b", "agent-b"));

    let result_a = handle_a.join().unwrap();
    let result_b = handle_b.join().unwrap();

    let successes = [&result_a, &result_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one claim should succeed");

    let winner = result_a.or(result_b).unwrap();
    assert_eq!(winner.status, "in_progress");
    assert!(winner.assignee == "agent-a" || winner.assignee == "agent-b");

    let events = store.get_events(&t1.id, 100).unwrap();
    let claimed_events = events.iter().filter(|e| e.event_type == EventType::Claimed).count();
    assert_eq!(claimed_events, 1, "exactly one claimed event should be recorded");
}

// ---------------------------------------------------------------------------
// Scenario 4: category-aware ready with multi-done
// ---------------------------------------------------------------------------

#[test]
fn scenario4_category_aware_ready_with_multi_done() {
    let (engine, _dir) = test_engine();

    let b1 = engine
        .create_issue("won't fix this one", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    let b2 = engine
        .create_issue("depends on b1", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();

    engine.close_issue(&b1.id, Some("wont_fix"), None, "tester").unwrap();
    engine.add_dependency(&b1.id, &b2.id, "tester").unwrap();

    let ready = engine.get_ready(&WorkFilter::default()).unwrap();
    let ready_ids: Vec<&str> = ready.iter().map(|i| i.id.as_str()).collect();
    assert!(ready_ids.contains(&b2.id.as_str()), "b2 should be ready: b1 is done-category");
}

// ---------------------------------------------------------------------------
// Scenario 5: critical path excludes done
// ---------------------------------------------------------------------------

#[test]
fn scenario5_critical_path_excludes_done() {
    let (engine, _dir) = test_engine();

    let a = engine
        .create_issue("a", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    let b = engine
        .create_issue("b", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();
    let c = engine
        .create_issue("c", "bug", 2, None, None, None, &[], &[], "tester")
        .unwrap();

    engine.add_dependency(&a.id, &b.id, "tester").unwrap();
    engine.add_dependency(&b.id, &c.id, "tester").unwrap();

    engine.close_issue(&a.id, Some("wont_fix"), None, "tester").unwrap();

    let path = engine.get_critical_path().unwrap();
    let path_ids: Vec<&str> = path.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(path_ids, vec![b.id.as_str(), c.id.as_str()]);
}
