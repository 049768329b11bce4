//! Issue CRUD operations for [`SqliteStore`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use loom_core::enums::EventType;
use loom_core::field_value::FieldValue;
use loom_core::issue::Issue;

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;
use crate::traits::{IssueFilter, IssueUpdates};

// ---------------------------------------------------------------------------
// Column list (shared between INSERT and SELECT)
// ---------------------------------------------------------------------------

pub(crate) const ISSUE_COLUMNS: &str = r#"
    id, title, description, notes, status, priority, issue_type,
    parent_id, assignee, created_at, updated_at, closed_at, fields
"#;

pub(crate) const ISSUE_COLUMNS_PREFIXED: &str = r#"
    issues.id, issues.title, issues.description, issues.notes, issues.status, issues.priority,
    issues.issue_type, issues.parent_id, issues.assignee, issues.created_at, issues.updated_at,
    issues.closed_at, issues.fields
"#;

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

pub(crate) fn scan_issue(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let id: String = row.get("id")?;
    let title: String = row.get("title")?;
    let description: String = row.get("description")?;
    let notes: String = row.get("notes")?;
    let status: String = row.get("status")?;
    let priority: i32 = row.get("priority")?;
    let issue_type: String = row.get("issue_type")?;
    let parent_id: Option<String> = row.get("parent_id")?;
    let assignee: String = row.get("assignee")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;
    let closed_at_str: Option<String> = row.get("closed_at")?;
    let fields_str: String = row.get("fields")?;

    let fields: BTreeMap<String, FieldValue> = serde_json::from_str(&fields_str).unwrap_or_default();

    Ok(Issue {
        id,
        title,
        description,
        notes,
        status,
        priority,
        issue_type,
        parent_id,
        assignee,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
        closed_at: closed_at_str.as_deref().map(parse_datetime),
        fields,
        labels: Vec::new(),
        blocks: Vec::new(),
        blocked_by: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Timestamp helpers
// ---------------------------------------------------------------------------

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>().unwrap_or_else(|_| {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ"))
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(|ndt| ndt.and_utc())
            .unwrap_or_else(|_| Utc::now())
    })
}

// ---------------------------------------------------------------------------
// Shared connection-level helpers
// ---------------------------------------------------------------------------

pub(crate) fn insert_issue(conn: &Connection, issue: &Issue, actor: &str) -> Result<()> {
    let now_str = format_datetime(&Utc::now());
    let fields_str = serde_json::to_string(&issue.fields).unwrap_or_else(|_| "{}".to_string());
    let created_at_str = format_datetime(&issue.created_at);
    let updated_at_str = format_datetime(&issue.updated_at);
    let closed_at_str = issue.closed_at.as_ref().map(format_datetime);

    conn.execute(
        &format!(
            "INSERT INTO issues ({ISSUE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            issue.id,
            issue.title,
            issue.description,
            issue.notes,
            issue.status,
            issue.priority,
            issue.issue_type,
            issue.parent_id,
            issue.assignee,
            created_at_str,
            updated_at_str,
            closed_at_str,
            fields_str,
        ],
    )?;

    emit_event(conn, &issue.id, EventType::Created, actor, None, None, None, &now_str)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn emit_event(
    conn: &Connection,
    issue_id: &str,
    event_type: EventType,
    actor: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    comment: Option<&str>,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO events (issue_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![issue_id, event_type.as_str(), actor, old_value, new_value, comment, created_at],
    )?;
    Ok(())
}

pub(crate) fn get_issue_on_conn(conn: &Connection, id: &str) -> Result<Issue> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    conn.query_row(&sql, params![id], scan_issue).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StorageError::not_found("issue", id),
        other => StorageError::Query(other),
    })
}

pub(crate) fn update_issue_on_conn(
    conn: &Connection,
    id: &str,
    updates: &IssueUpdates,
    actor: &str,
) -> Result<()> {
    let now_str = format_datetime(&Utc::now());

    let mut set_clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    macro_rules! add_field {
        ($field:ident, $col:expr) => {
            if let Some(ref val) = updates.$field {
                set_clauses.push(format!("{} = ?", $col));
                param_values.push(Box::new(val.clone()));
            }
        };
    }

    add_field!(title, "title");
    add_field!(description, "description");
    add_field!(notes, "notes");
    add_field!(status, "status");
    add_field!(issue_type, "issue_type");
    add_field!(assignee, "assignee");

    if let Some(priority) = updates.priority {
        set_clauses.push("priority = ?".to_string());
        param_values.push(Box::new(priority));
    }
    if let Some(ref parent_id) = updates.parent_id {
        set_clauses.push("parent_id = ?".to_string());
        param_values.push(Box::new(parent_id.clone()));
    }
    if let Some(ref fields) = updates.fields {
        set_clauses.push("fields = ?".to_string());
        let fields_str = serde_json::to_string(fields).unwrap_or_else(|_| "{}".to_string());
        param_values.push(Box::new(fields_str));
    }
    if let Some(ref closed_at) = updates.closed_at {
        set_clauses.push("closed_at = ?".to_string());
        param_values.push(Box::new(closed_at.as_ref().map(format_datetime)));
    }

    if set_clauses.is_empty() {
        return Ok(());
    }

    set_clauses.push("updated_at = ?".to_string());
    param_values.push(Box::new(now_str.clone()));

    let sql = format!("UPDATE issues SET {} WHERE id = ?", set_clauses.join(", "));
    param_values.push(Box::new(id.to_string()));

    let param_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let affected = conn.execute(&sql, param_refs.as_slice())?;
    if affected == 0 {
        return Err(StorageError::not_found("issue", id));
    }

    emit_event(conn, id, EventType::Updated, actor, None, None, None, &now_str)?;
    Ok(())
}

pub(crate) fn close_issue_on_conn(conn: &Connection, id: &str, status: &str, actor: &str) -> Result<()> {
    let now_str = format_datetime(&Utc::now());
    let affected = conn.execute(
        "UPDATE issues SET status = ?1, closed_at = ?2, updated_at = ?2 WHERE id = ?3",
        params![status, now_str, id],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("issue", id));
    }
    emit_event(conn, id, EventType::Closed, actor, None, Some(status), None, &now_str)?;
    Ok(())
}

/// Optimistic-locking claim: succeeds only if the issue is currently
/// unassigned and in `from_status`.
pub(crate) fn claim_issue_on_conn(
    conn: &Connection,
    id: &str,
    from_status: &str,
    to_status: &str,
    assignee: &str,
    actor: &str,
) -> Result<()> {
    let now_str = format_datetime(&Utc::now());
    let affected = conn.execute(
        "UPDATE issues SET status = ?1, assignee = ?2, updated_at = ?3
         WHERE id = ?4 AND status = ?5 AND (assignee = '' OR assignee IS NULL)",
        params![to_status, assignee, now_str, id, from_status],
    )?;
    if affected == 0 {
        let current = get_issue_on_conn(conn, id)?;
        if current.assignee.is_empty() {
            return Err(StorageError::validation(format!(
                "issue {id} is not in status {from_status:?} (currently {:?})",
                current.status
            )));
        }
        return Err(StorageError::AlreadyClaimed { assignee: current.assignee });
    }
    emit_event(conn, id, EventType::Claimed, actor, Some(from_status), Some(to_status), None, &now_str)?;
    Ok(())
}

/// Optimistic-locking release: succeeds only if `assignee` currently holds
/// the claim.
pub(crate) fn release_claim_on_conn(
    conn: &Connection,
    id: &str,
    from_status: &str,
    to_status: &str,
    assignee: &str,
    actor: &str,
) -> Result<()> {
    let now_str = format_datetime(&Utc::now());
    let affected = conn.execute(
        "UPDATE issues SET status = ?1, assignee = '', updated_at = ?2
         WHERE id = ?3 AND status = ?4 AND assignee = ?5",
        params![to_status, now_str, id, from_status, assignee],
    )?;
    if affected == 0 {
        return Err(StorageError::validation(format!(
            "issue {id} is not claimed by {assignee:?} in status {from_status:?}"
        )));
    }
    emit_event(conn, id, EventType::Released, actor, Some(from_status), Some(to_status), None, &now_str)?;
    Ok(())
}

pub(crate) fn list_issues_on_conn(conn: &Connection, filter: &IssueFilter) -> Result<Vec<Issue>> {
    search_issues_on_conn(conn, "", filter)
}

pub(crate) fn search_issues_on_conn(conn: &Connection, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
    let mut where_clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if !query.is_empty() {
        where_clauses.push(
            "id IN (SELECT id FROM issues_fts WHERE issues_fts MATCH ?1)".to_string(),
        );
        param_values.push(Box::new(fts_query(query)));
        param_idx += 1;
    }

    if let Some(ref issue_type) = filter.issue_type {
        where_clauses.push(format!("issue_type = ?{param_idx}"));
        param_values.push(Box::new(issue_type.clone()));
        param_idx += 1;
    }
    if let Some(ref status) = filter.status {
        where_clauses.push(format!("status = ?{param_idx}"));
        param_values.push(Box::new(status.clone()));
        param_idx += 1;
    }
    if !filter.categories.is_empty() {
        let placeholders: Vec<String> = (0..filter.categories.len())
            .map(|i| format!("?{}", param_idx + i))
            .collect();
        where_clauses.push(format!("status IN ({})", placeholders.join(",")));
        for status in &filter.categories {
            param_values.push(Box::new(status.clone()));
        }
        param_idx += filter.categories.len();
    }
    if let Some(ref assignee) = filter.assignee {
        where_clauses.push(format!("assignee = ?{param_idx}"));
        param_values.push(Box::new(assignee.clone()));
        param_idx += 1;
    }
    if let Some(ref parent_id) = filter.parent_id {
        where_clauses.push(format!("parent_id = ?{param_idx}"));
        param_values.push(Box::new(parent_id.clone()));
        param_idx += 1;
    }
    if let Some(ref label) = filter.label {
        where_clauses.push(format!(
            "EXISTS (SELECT 1 FROM labels WHERE labels.issue_id = issues.id AND labels.label = ?{param_idx})"
        ));
        param_values.push(Box::new(label.clone()));
        param_idx += 1;
    }

    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };
    let limit_sql = filter.limit.map(|l| format!(" LIMIT {l}")).unwrap_or_default();

    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues {where_sql} ORDER BY created_at DESC{limit_sql}");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), scan_issue)?;

    let mut issues = Vec::new();
    for row in rows {
        issues.push(row?);
    }
    let _ = param_idx;
    Ok(issues)
}

/// Converts a free-text query into an FTS5 MATCH expression: quotes the
/// whole phrase, then ORs each whitespace-separated token as a prefix
/// match so partial words still hit.
fn fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|tok| format!("{}*", tok.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub fn create_issue_impl(&self, issue: &Issue, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        insert_issue(&conn, issue, actor)
    }

    pub fn get_issue_impl(&self, id: &str) -> Result<Issue> {
        let conn = self.lock_conn()?;
        get_issue_on_conn(&conn, id)
    }

    pub fn get_issues_by_ids_impl(&self, ids: &[String]) -> Result<Vec<Issue>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock_conn()?;
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        let params = rusqlite::params_from_iter(ids.iter());
        let rows = stmt.query_map(params, scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        Ok(issues)
    }

    pub fn update_issue_impl(&self, id: &str, updates: &IssueUpdates, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        update_issue_on_conn(&conn, id, updates, actor)
    }

    pub fn close_issue_impl(&self, id: &str, status: &str, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        close_issue_on_conn(&conn, id, status, actor)
    }

    pub fn claim_issue_impl(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        claim_issue_on_conn(&conn, id, from_status, to_status, assignee, actor)
    }

    pub fn release_claim_impl(
        &self,
        id: &str,
        from_status: &str,
        to_status: &str,
        assignee: &str,
        actor: &str,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        release_claim_on_conn(&conn, id, from_status, to_status, assignee, actor)
    }

    pub fn list_issues_impl(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        list_issues_on_conn(&conn, filter)
    }

    pub fn search_issues_impl(&self, query: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        search_issues_on_conn(&conn, query, filter)
    }

    pub fn all_issue_ids_impl(&self) -> Result<std::collections::HashSet<String>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM issues")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = std::collections::HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }
}
