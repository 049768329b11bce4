//! Label CRUD operations for [`SqliteStore`].

use rusqlite::{params, Connection};

use loom_core::enums::EventType;
use loom_core::issue::Issue;

use crate::error::{Result, StorageError};
use crate::sqlite::issues::{emit_event, format_datetime, scan_issue, ISSUE_COLUMNS_PREFIXED};
use crate::sqlite::store::SqliteStore;

// ---------------------------------------------------------------------------
// Connection-level helpers (shared with transactions)
// ---------------------------------------------------------------------------

pub(crate) fn add_label_on_conn(conn: &Connection, issue_id: &str, label: &str, actor: &str) -> Result<()> {
    let now_str = format_datetime(&chrono::Utc::now());

    conn.execute(
        "INSERT OR IGNORE INTO labels (issue_id, label) VALUES (?1, ?2)",
        params![issue_id, label],
    )?;

    emit_event(conn, issue_id, EventType::LabelAdded, actor, None, Some(label), None, &now_str)?;
    Ok(())
}

pub(crate) fn remove_label_on_conn(conn: &Connection, issue_id: &str, label: &str, actor: &str) -> Result<()> {
    let now_str = format_datetime(&chrono::Utc::now());

    let affected = conn.execute(
        "DELETE FROM labels WHERE issue_id = ?1 AND label = ?2",
        params![issue_id, label],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("label", format!("{issue_id}:{label}")));
    }

    emit_event(conn, issue_id, EventType::LabelRemoved, actor, Some(label), None, None, &now_str)?;
    Ok(())
}

pub(crate) fn get_labels_on_conn(conn: &Connection, issue_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT label FROM labels WHERE issue_id = ?1 ORDER BY label")?;
    let rows = stmt.query_map(params![issue_id], |row| row.get::<_, String>(0))?;
    let mut labels = Vec::new();
    for row in rows {
        labels.push(row?);
    }
    Ok(labels)
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub fn add_label_impl(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        add_label_on_conn(&conn, issue_id, label, actor)
    }

    pub fn remove_label_impl(&self, issue_id: &str, label: &str, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        remove_label_on_conn(&conn, issue_id, label, actor)
    }

    pub fn get_labels_impl(&self, issue_id: &str) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        get_labels_on_conn(&conn, issue_id)
    }

    pub fn get_issues_by_label_impl(&self, label: &str) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {ISSUE_COLUMNS_PREFIXED} FROM issues
             INNER JOIN labels ON issues.id = labels.issue_id
             WHERE labels.label = ?1
             ORDER BY issues.created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![label], scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        Ok(issues)
    }
}
