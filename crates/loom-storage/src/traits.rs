//! Storage and Transaction traits -- the public API for issue persistence.
//!
//! Consumers depend on these traits rather than concrete implementations so
//! alternative backends (mocks, proxies) can be substituted in tests.

use std::collections::BTreeMap;

use loom_core::comment::{Comment, Event};
use loom_core::dependency::Dependency;
use loom_core::field_value::FieldValue;
use loom_core::issue::Issue;
use serde::Serialize;

use crate::error::Result;

// ---------------------------------------------------------------------------
// View / helper types
// ---------------------------------------------------------------------------

/// Typed partial-update struct for issues. Only `Some` fields are applied;
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdates {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// A simultaneous status+fields update is validated and applied
    /// atomically by the engine (spec §4.4 Update); storage merely persists
    /// whatever the engine already validated.
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub issue_type: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub assignee: Option<String>,
    /// `Some(None)` clears `closed_at`; `Some(Some(ts))` sets it. Computed
    /// by the engine from the target state's category, not by storage.
    pub closed_at: Option<Option<chrono::DateTime<chrono::Utc>>>,
    /// Field values to merge into (or remove from, via `FieldValue` absence
    /// upstream) the issue's `fields` map.
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

/// Filter applied to `list`/`search` queries.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub issue_type: Option<String>,
    pub status: Option<String>,
    /// Concrete status values to match via `IN (...)`, already expanded by
    /// the caller from a category name (e.g. `"open"` -> every open-category
    /// status string across loaded types). Storage has no template access,
    /// so it only ever sees literal status strings here.
    pub categories: Vec<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub parent_id: Option<String>,
    pub limit: Option<i64>,
}

/// Filter applied to ready/blocked work queries.
#[derive(Debug, Clone, Default)]
pub struct WorkFilter {
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub limit: Option<i64>,
}

/// An issue that is blocked, along with the ids of its still-open blockers.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedIssue {
    pub issue: Issue,
    pub blocked_by: Vec<String>,
}

/// Aggregate statistics about the issue database.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_issues: i64,
    pub by_category: Vec<(String, i64)>,
    pub by_type: Vec<(String, i64)>,
    pub by_priority: Vec<(i32, i64)>,
    pub by_assignee: Vec<(String, i64)>,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Primary storage interface for issue persistence (spec §4.1 Store).
///
/// `status_category` is not a storage concern -- callers (the engine) pass
/// in the categories they care about, computed from the template registry.
pub trait Storage: Send + Sync {
    // -- Issue CRUD ----------------------------------------------------------

    fn create_issue(&self, issue: &Issue, actor: &str) -> Result<()>;
    fn get_issue(&self, id: &str) -> Result<Issue>;
    fn get_issues_by_ids(&self, ids: &[String]) -> Result<Vec<Issue>>;
    fn update_issue(&self, id: &str, updates: &IssueUpdates, actor: &str) -> Result<()>;
    fn close_issue(&self, id: &str, status: &str, actor: &str) -> Result<()>;
    fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;
    fn search_issues(&self, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Optimistic-locking claim: succeeds only if the issue is currently
    /// unassigned and in `from_status`. Returns `Err(AlreadyClaimed)` if the
    /// row was claimed first by a concurrent caller.
    fn claim_issue(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()>;

    /// Optimistic-locking release: succeeds only if `assignee` currently
    /// holds the claim.
    fn release_claim(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()>;

    // -- Dependencies ----------------------------------------------------------

    fn add_dependency(&self, dep: &Dependency, actor: &str) -> Result<()>;
    fn remove_dependency(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()>;
    fn get_dependency_records(&self, issue_id: &str) -> Result<Vec<Dependency>>;
    fn get_dependent_records(&self, issue_id: &str) -> Result<Vec<Dependency>>;
    /// All blocking edges in the store, for cycle detection and critical path.
    fn get_all_blocking_edges(&self) -> Result<Vec<(String, String)>>;

    // -- Labels ------------------------------------------------------------

    fn add_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()>;
    fn remove_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()>;
    fn get_labels(&self, issue_id: &str) -> Result<Vec<String>>;
    fn get_issues_by_label(&self, label: &str) -> Result<Vec<Issue>>;

    // -- Work queries --------------------------------------------------------

    fn get_ready_work(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<Issue>>;
    fn get_blocked_issues(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<BlockedIssue>>;

    // -- Comments and events -------------------------------------------------

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment>;
    fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>>;
    fn get_events(&self, issue_id: &str, limit: i64) -> Result<Vec<Event>>;
    fn get_all_events_since(&self, since_id: i64) -> Result<Vec<Event>>;
    fn record_event(
        &self,
        issue_id: &str,
        event_type: loom_core::enums::EventType,
        actor: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Event>;

    // -- Statistics -----------------------------------------------------------

    fn get_statistics(&self) -> Result<Statistics>;
    fn all_issue_ids(&self) -> Result<std::collections::HashSet<String>>;

    // -- Configuration -------------------------------------------------------

    fn set_metadata(&self, key: &str, value: &str) -> Result<()>;
    fn get_metadata(&self, key: &str) -> Result<Option<String>>;

    // -- Transactions --------------------------------------------------------

    /// Executes a closure within a database transaction. Committed on `Ok`,
    /// rolled back on `Err` or panic.
    fn run_in_transaction(&self, f: &dyn Fn(&dyn Storage) -> Result<()>) -> Result<()>;
}
