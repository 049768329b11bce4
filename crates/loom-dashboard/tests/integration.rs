//! Exercises route handlers directly against a real in-memory store, engine,
//! and template registry -- no network socket involved.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use loom_dashboard::routes::{batch, issues, work};
use loom_dashboard::state::AppState;
use loom_engine::IssueEngine;
use loom_storage::SqliteStore;
use loom_templates::TemplateRegistry;

fn test_state() -> AppState {
    let store: Arc<dyn loom_storage::Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(TemplateRegistry::new(dir.path()));
    registry.load();
    let engine = Arc::new(IssueEngine::new(store.clone(), registry.clone(), "lm"));
    AppState::new(store, registry, engine)
}

#[tokio::test]
async fn list_issues_returns_created_issue() {
    let state = test_state();
    state
        .engine
        .create_issue("fix the thing", "task", 2, None, None, None, &[], &[], "agent")
        .unwrap();

    let Json(body) = issues::list(State(state), Query(issues::ListQuery::default()))
        .await
        .unwrap();

    assert_eq!(body["issues"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_issue_includes_transitions_when_requested() {
    let state = test_state();
    let issue = state
        .engine
        .create_issue("investigate crash", "bug", 1, None, None, None, &[], &[], "agent")
        .unwrap();

    let response = issues::get(
        State(state),
        Path(issue.id.clone()),
        Query(issues::GetQuery { include_transitions: true }),
    )
    .await
    .unwrap();

    assert_eq!(response.0.issue.id, issue.id);
}

#[tokio::test]
async fn ready_work_excludes_blocked_issues() {
    let state = test_state();
    let blocker = state
        .engine
        .create_issue("blocker", "task", 2, None, None, None, &[], &[], "agent")
        .unwrap();
    let blocked = state
        .engine
        .create_issue("blocked", "task", 2, None, None, None, &[], &[], "agent")
        .unwrap();
    state.engine.add_dependency(&blocked.id, &blocker.id, "agent").unwrap();

    let Json(ready) = work::ready(
        State(state.clone()),
        Query(work::WorkQuery { issue_type: None, assignee: None, limit: None }),
    )
    .await
    .unwrap();
    let ids: Vec<&str> = ready["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();

    assert!(ids.contains(&blocker.id.as_str()));
    assert!(!ids.contains(&blocked.id.as_str()));
}

#[tokio::test]
async fn batch_close_reports_per_item_outcome() {
    let state = test_state();
    let a = state
        .engine
        .create_issue("a", "task", 2, None, None, None, &[], &[], "agent")
        .unwrap();

    let Json(result) = batch::close(
        State(state),
        Json(batch::BatchCloseRequest {
            ids: vec![a.id.clone(), "lm-missing".into()],
            reason: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(result.succeeded, vec![a.id]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].id, "lm-missing");
}
