//! Transaction wrapper for [`SqliteStore`].

use std::collections::HashSet;

use rusqlite::Connection;

use loom_core::comment::{Comment, Event};
use loom_core::dependency::Dependency;
use loom_core::enums::EventType;
use loom_core::issue::Issue;

use crate::error::{Result, StorageError};
use crate::sqlite::comments;
use crate::sqlite::config;
use crate::sqlite::dependencies;
use crate::sqlite::issues;
use crate::sqlite::labels;
use crate::sqlite::queries;
use crate::sqlite::store::SqliteStore;
use crate::traits::{BlockedIssue, IssueFilter, IssueUpdates, Statistics, Storage, WorkFilter};

/// A thin wrapper around a SQLite connection already inside a transaction.
///
/// Implements [`Storage`] by delegating to the same connection-level helpers
/// [`SqliteStore`] uses outside a transaction, so callers can pass either to
/// code generic over `&dyn Storage`.
pub(crate) struct SqliteTx<'a> {
    pub(crate) conn: &'a Connection,
}

impl Storage for SqliteTx<'_> {
    fn create_issue(&self, issue: &Issue, actor: &str) -> Result<()> {
        issues::insert_issue(self.conn, issue, actor)
    }

    fn get_issue(&self, id: &str) -> Result<Issue> {
        issues::get_issue_on_conn(self.conn, id)
    }

    fn get_issues_by_ids(&self, ids: &[String]) -> Result<Vec<Issue>> {
        ids.iter().map(|id| self.get_issue(id)).collect()
    }

    fn update_issue(&self, id: &str, updates: &IssueUpdates, actor: &str) -> Result<()> {
        issues::update_issue_on_conn(self.conn, id, updates, actor)
    }

    fn close_issue(&self, id: &str, status: &str, actor: &str) -> Result<()> {
        issues::close_issue_on_conn(self.conn, id, status, actor)
    }

    fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        issues::list_issues_on_conn(self.conn, filter)
    }

    fn search_issues(&self, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        issues::search_issues_on_conn(self.conn, query, filter)
    }

    fn claim_issue(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        issues::claim_issue_on_conn(self.conn, id, from_status, to_status, assignee, actor)
    }

    fn release_claim(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        issues::release_claim_on_conn(self.conn, id, from_status, to_status, assignee, actor)
    }

    fn add_dependency(&self, dep: &Dependency, actor: &str) -> Result<()> {
        dependencies::add_dependency_on_conn(self.conn, dep, actor)
    }

    fn remove_dependency(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()> {
        dependencies::remove_dependency_on_conn(self.conn, from_id, to_id, actor)
    }

    fn get_dependency_records(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        dependencies::get_dependency_records_on_conn(self.conn, issue_id)
    }

    fn get_dependent_records(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        dependencies::get_dependent_records_on_conn(self.conn, issue_id)
    }

    fn get_all_blocking_edges(&self) -> Result<Vec<(String, String)>> {
        dependencies::get_all_blocking_edges_on_conn(self.conn)
    }

    fn add_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        labels::add_label_on_conn(self.conn, issue_id, label, actor)
    }

    fn remove_label(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        labels::remove_label_on_conn(self.conn, issue_id, label, actor)
    }

    fn get_labels(&self, issue_id: &str) -> Result<Vec<String>> {
        labels::get_labels_on_conn(self.conn, issue_id)
    }

    fn get_issues_by_label(&self, label: &str) -> Result<Vec<Issue>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM issues
             INNER JOIN labels ON issues.id = labels.issue_id
             WHERE labels.label = ?1
             ORDER BY issues.created_at DESC",
            crate::sqlite::issues::ISSUE_COLUMNS_PREFIXED
        ))?;
        let rows = stmt.query_map(rusqlite::params![label], crate::sqlite::issues::scan_issue)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_ready_work(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<Issue>> {
        queries::get_ready_work_on_conn(self.conn, open_statuses, done_statuses, filter)
    }

    fn get_blocked_issues(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<BlockedIssue>> {
        queries::get_blocked_issues_on_conn(self.conn, open_statuses, done_statuses, filter)
    }

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment> {
        comments::add_comment_on_conn(self.conn, issue_id, author, text)
    }

    fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        comments::get_comments_on_conn(self.conn, issue_id)
    }

    fn get_events(&self, issue_id: &str, limit: i64) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, event_type, actor, old_value, new_value, comment, created_at
             FROM events WHERE issue_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![issue_id, limit], |row| {
            let created_at_str: String = row.get(7)?;
            let event_type_str: String = row.get(2)?;
            Ok(Event {
                id: row.get(0)?,
                issue_id: row.get(1)?,
                event_type: EventType::from(event_type_str),
                actor: row.get(3)?,
                old_value: row.get(4)?,
                new_value: row.get(5)?,
                comment: row.get(6)?,
                created_at: crate::sqlite::issues::parse_datetime(&created_at_str),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get_all_events_since(&self, since_id: i64) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, event_type, actor, old_value, new_value, comment, created_at
             FROM events WHERE id > ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(rusqlite::params![since_id], |row| {
            let created_at_str: String = row.get(7)?;
            let event_type_str: String = row.get(2)?;
            Ok(Event {
                id: row.get(0)?,
                issue_id: row.get(1)?,
                event_type: EventType::from(event_type_str),
                actor: row.get(3)?,
                old_value: row.get(4)?,
                new_value: row.get(5)?,
                comment: row.get(6)?,
                created_at: crate::sqlite::issues::parse_datetime(&created_at_str),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
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
        comments::record_event_on_conn(self.conn, issue_id, event_type, actor, old_value, new_value, comment)
    }

    fn get_statistics(&self) -> Result<Statistics> {
        queries::get_statistics_on_conn(self.conn)
    }

    fn all_issue_ids(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM issues")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        config::set_metadata_on_conn(self.conn, key, value)
    }

    fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        config::get_metadata_on_conn(self.conn, key)
    }

    fn run_in_transaction(&self, f: &dyn Fn(&dyn Storage) -> Result<()>) -> Result<()> {
        // Already inside a transaction; SQLite has no true nested
        // transactions here, so we just run the closure against ourselves.
        f(self)
    }
}

// ---------------------------------------------------------------------------
// SqliteStore::run_in_transaction
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Runs a closure inside a database transaction.
    pub fn run_in_transaction_impl(&self, f: &dyn Fn(&dyn Storage) -> Result<()>) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StorageError::Transaction(format!("failed to begin: {e}")))?;

        let sqlite_tx = SqliteTx { conn: &tx };
        match f(&sqlite_tx) {
            Ok(()) => {
                tx.commit()
                    .map_err(|e| StorageError::Transaction(format!("failed to commit: {e}")))?;
                Ok(())
            }
            Err(e) => {
                // Transaction is rolled back on drop.
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::dependency::Dependency;
    use loom_core::issue::IssueBuilder;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn transaction_commit() {
        let store = test_store();

        store
            .run_in_transaction_impl(&|tx| {
                let issue = IssueBuilder::new("In transaction").id("lm-tx1").build();
                tx.create_issue(&issue, "alice")?;
                tx.add_label("lm-tx1", "transacted", "alice")?;
                Ok(())
            })
            .unwrap();

        let issue = store.get_issue_impl("lm-tx1").unwrap();
        assert_eq!(issue.title, "In transaction");
        let labels = store.get_labels_impl("lm-tx1").unwrap();
        assert_eq!(labels, vec!["transacted"]);
    }

    #[test]
    fn transaction_rollback_on_error() {
        let store = test_store();

        let result = store.run_in_transaction_impl(&|tx| {
            let issue = IssueBuilder::new("Should rollback").id("lm-tx2").build();
            tx.create_issue(&issue, "alice")?;
            Err(StorageError::Internal("test rollback".into()))
        });

        assert!(result.is_err());

        let err = store.get_issue_impl("lm-tx2").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn transaction_with_dependencies() {
        let store = test_store();

        store
            .run_in_transaction_impl(&|tx| {
                let parent = IssueBuilder::new("Parent").id("lm-txp1").build();
                let child = IssueBuilder::new("Child").id("lm-txc1").build();
                tx.create_issue(&parent, "alice")?;
                tx.create_issue(&child, "alice")?;
                tx.add_dependency(&Dependency::blocks("lm-txc1", "lm-txp1"), "alice")?;
                Ok(())
            })
            .unwrap();

        let deps = store.get_dependency_records_impl("lm-txc1").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].to_id, "lm-txp1");
    }
}
