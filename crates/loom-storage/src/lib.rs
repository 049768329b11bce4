//! Storage backend for the issue tracker.
//!
//! Provides the [`Storage`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::{ErrorKind, StorageError};
pub use sqlite::SqliteStore;
pub use traits::{BlockedIssue, IssueFilter, IssueUpdates, Statistics, Storage, WorkFilter};

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use loom_core::comment::{Comment, Event};
use loom_core::dependency::Dependency;
use loom_core::enums::EventType;
use loom_core::issue::Issue;

use crate::error::Result;

impl Storage for SqliteStore {
    fn create_issue(&self, issue: &Issue, actor: &str) -> Result<()> {
        self.create_issue_impl(issue, actor)
    }

    fn get_issue(&self, id: &str) -> Result<Issue> {
        self.get_issue_impl(id)
    }

    fn get_issues_by_ids(&self, ids: &[String]) -> Result<Vec<Issue>> {
        self.get_issues_by_ids_impl(ids)
    }

    fn update_issue(&self, id: &str, updates: &IssueUpdates, actor: &str) -> Result<()> {
        self.update_issue_impl(id, updates, actor)
    }

    fn close_issue(&self, id: &str, status: &str, actor: &str) -> Result<()> {
        self.close_issue_impl(id, status, actor)
    }

    fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.list_issues_impl(filter)
    }

    fn search_issues(&self, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.search_issues_impl(query, filter)
    }

    fn claim_issue(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        self.claim_issue_impl(id, from_status, to_status, assignee, actor)
    }

    fn release_claim(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        self.release_claim_impl(id, from_status, to_status, assignee, actor)
    }

    fn add_dependency(&self, dep: &Dependency, actor: &str) -> Result<()> {
        self.add_dependency_impl(dep, actor)
    }

    fn remove_dependency(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()> {
        self.remove_dependency_impl(from_id, to_id, actor)
    }

    fn get_dependency_records(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        self.get_dependency_records_impl(issue_id)
    }

    fn get_dependent_records(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        self.get_dependent_records_impl(issue_id)
    }

    fn get_all_blocking_edges(&self) -> Result<Vec<(String, String)>> {
        self.get_all_blocking_edges_impl()
    }

    fn add_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        self.add_label_impl(issue_id, label, actor)
    }

    fn remove_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        self.remove_label_impl(issue_id, label, actor)
    }

    fn get_labels(&self, issue_id: &str) -> Result<Vec<String>> {
        self.get_labels_impl(issue_id)
    }

    fn get_issues_by_label(&self, label: &str) -> Result<Vec<Issue>> {
        self.get_issues_by_label_impl(label)
    }

    fn get_ready_work(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<Issue>> {
        self.get_ready_work_impl(open_statuses, done_statuses, filter)
    }

    fn get_blocked_issues(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<BlockedIssue>> {
        self.get_blocked_issues_impl(open_statuses, done_statuses, filter)
    }

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment> {
        self.add_comment_impl(issue_id, author, text)
    }

    fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        self.get_comments_impl(issue_id)
    }

    fn get_events(&self, issue_id: &str, limit: i64) -> Result<Vec<Event>> {
        self.get_events_impl(issue_id, limit)
    }

    fn get_all_events_since(&self, since_id: i64) -> Result<Vec<Event>> {
        self.get_all_events_since_impl(since_id)
    }

    fn record_event(
        &self,
        issue_id: &str,
        event_type: EventType,
        actor: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Event> {
        self.record_event_impl(issue_id, event_type, actor, old_value, new_value, comment)
    }

    fn get_statistics(&self) -> Result<Statistics> {
        self.get_statistics_impl()
    }

    fn all_issue_ids(&self) -> Result<HashSet<String>> {
        self.all_issue_ids_impl()
    }

    fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.set_metadata_impl(key, value)
    }

    fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        self.get_metadata_impl(key)
    }

    fn run_in_transaction(&self, f: &dyn Fn(&dyn Storage) -> Result<()>) -> Result<()> {
        self.run_in_transaction_impl(f)
    }
}
