//! Aggregate queries: ready work, blocked issues, statistics.

use rusqlite::Connection;

use loom_core::issue::Issue;

use crate::error::Result;
use crate::sqlite::issues::{scan_issue, ISSUE_COLUMNS};
use crate::sqlite::store::SqliteStore;
use crate::traits::{BlockedIssue, Statistics, WorkFilter};

fn status_placeholders(start: usize, count: usize) -> String {
    (start..start + count).map(|i| format!("?{i}")).collect::<Vec<_>>().join(",")
}

/// Issues in an open-category status with no unresolved `blocks` dependency.
///
/// `open_statuses` and `done_statuses` are resolved by the engine from the
/// active template registry; storage only knows raw status strings.
pub(crate) fn get_ready_work_on_conn(
    conn: &Connection,
    open_statuses: &[String],
    done_statuses: &[String],
    filter: &WorkFilter,
) -> Result<Vec<Issue>> {
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    for s in open_statuses {
        param_values.push(Box::new(s.clone()));
    }
    let mut param_idx = open_statuses.len() + 1;
    let open_placeholders = status_placeholders(1, open_statuses.len());

    for s in done_statuses {
        param_values.push(Box::new(s.clone()));
    }
    let done_placeholders = status_placeholders(param_idx, done_statuses.len());
    param_idx += done_statuses.len();

    let mut where_clauses = vec![
        format!("issues.status IN ({open_placeholders})"),
        format!(
            "NOT EXISTS (
                SELECT 1 FROM dependencies d
                INNER JOIN issues blocker ON blocker.id = d.to_id
                WHERE d.from_id = issues.id
                  AND d.kind = 'blocks'
                  AND blocker.status NOT IN ({done_placeholders})
            )"
        ),
    ];

    if let Some(ref issue_type) = filter.issue_type {
        where_clauses.push(format!("issues.issue_type = ?{param_idx}"));
        param_values.push(Box::new(issue_type.clone()));
        param_idx += 1;
    }
    if let Some(ref assignee) = filter.assignee {
        where_clauses.push(format!("issues.assignee = ?{param_idx}"));
        param_values.push(Box::new(assignee.clone()));
        param_idx += 1;
    }

    let where_sql = where_clauses.join(" AND ");
    let limit_sql = filter.limit.map(|l| format!(" LIMIT {l}")).unwrap_or_default();

    let sql = format!(
        "SELECT {ISSUE_COLUMNS} FROM issues
         WHERE {where_sql}
         ORDER BY priority ASC, created_at ASC{limit_sql}"
    );

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

/// Issues whose own status is in the open category and which have at least
/// one unresolved `blocks` dependency, along with the ids of the blockers
/// still outstanding.
pub(crate) fn get_blocked_issues_on_conn(
    conn: &Connection,
    open_statuses: &[String],
    done_statuses: &[String],
    filter: &WorkFilter,
) -> Result<Vec<BlockedIssue>> {
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    for s in open_statuses {
        param_values.push(Box::new(s.clone()));
    }
    let open_placeholders = status_placeholders(1, open_statuses.len());
    let mut param_idx = open_statuses.len() + 1;

    for s in done_statuses {
        param_values.push(Box::new(s.clone()));
    }
    let done_placeholders = status_placeholders(param_idx, done_statuses.len());
    param_idx += done_statuses.len();

    let mut where_clauses = vec![
        format!("issues.status IN ({open_placeholders})"),
        format!(
            "EXISTS (
                SELECT 1 FROM dependencies d
                INNER JOIN issues blocker ON blocker.id = d.to_id
                WHERE d.from_id = issues.id
                  AND d.kind = 'blocks'
                  AND blocker.status NOT IN ({done_placeholders})
            )"
        ),
    ];

    if let Some(ref issue_type) = filter.issue_type {
        where_clauses.push(format!("issues.issue_type = ?{param_idx}"));
        param_values.push(Box::new(issue_type.clone()));
        param_idx += 1;
    }
    if let Some(ref assignee) = filter.assignee {
        where_clauses.push(format!("issues.assignee = ?{param_idx}"));
        param_values.push(Box::new(assignee.clone()));
        param_idx += 1;
    }

    let where_sql = where_clauses.join(" AND ");
    let limit_sql = filter.limit.map(|l| format!(" LIMIT {l}")).unwrap_or_default();

    let sql = format!(
        "SELECT {ISSUE_COLUMNS} FROM issues
         WHERE {where_sql}
         ORDER BY priority ASC, created_at ASC{limit_sql}"
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), scan_issue)?;
    let mut issues = Vec::new();
    for row in rows {
        issues.push(row?);
    }
    let _ = param_idx;

    let mut result = Vec::with_capacity(issues.len());
    for issue in issues {
        let mut stmt = conn.prepare(&format!(
            "SELECT d.to_id FROM dependencies d
             INNER JOIN issues blocker ON blocker.id = d.to_id
             WHERE d.from_id = ?1 AND d.kind = 'blocks' AND blocker.status NOT IN ({done_placeholders})"
        ))?;
        let mut blocker_params: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(issue.id.clone())];
        for s in done_statuses {
            blocker_params.push(Box::new(s.clone()));
        }
        let blocker_refs: Vec<&dyn rusqlite::types::ToSql> = blocker_params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(blocker_refs.as_slice(), |row| row.get::<_, String>(0))?;
        let mut blocked_by = Vec::new();
        for row in rows {
            blocked_by.push(row?);
        }
        result.push(BlockedIssue { issue, blocked_by });
    }

    Ok(result)
}

/// Aggregate statistics over the whole issue set.
///
/// `by_category` is left empty here: mapping a status to a category
/// requires the active template registry, which the engine owns.
pub(crate) fn get_statistics_on_conn(conn: &Connection) -> Result<Statistics> {
    let mut stats = Statistics::default();

    stats.total_issues = conn.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;

    {
        let mut stmt =
            conn.prepare("SELECT issue_type, COUNT(*) FROM issues GROUP BY issue_type ORDER BY COUNT(*) DESC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            stats.by_type.push(row?);
        }
    }

    {
        let mut stmt =
            conn.prepare("SELECT priority, COUNT(*) FROM issues GROUP BY priority ORDER BY priority ASC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            stats.by_priority.push(row?);
        }
    }

    {
        let mut stmt = conn.prepare(
            "SELECT COALESCE(NULLIF(assignee, ''), '(unassigned)'), COUNT(*)
             FROM issues
             GROUP BY assignee
             ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            stats.by_assignee.push(row?);
        }
    }

    Ok(stats)
}

impl SqliteStore {
    pub fn get_ready_work_impl(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        get_ready_work_on_conn(&conn, open_statuses, done_statuses, filter)
    }

    pub fn get_blocked_issues_impl(
        &self,
        open_statuses: &[String],
        done_statuses: &[String],
        filter: &WorkFilter,
    ) -> Result<Vec<BlockedIssue>> {
        let conn = self.lock_conn()?;
        get_blocked_issues_on_conn(&conn, open_statuses, done_statuses, filter)
    }

    pub fn get_statistics_impl(&self) -> Result<Statistics> {
        let conn = self.lock_conn()?;
        get_statistics_on_conn(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use loom_core::dependency::Dependency;
    use loom_core::issue::IssueBuilder;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn open() -> Vec<String> {
        vec!["open".to_string(), "in_progress".to_string()]
    }

    fn done() -> Vec<String> {
        vec!["closed".to_string()]
    }

    #[test]
    fn get_ready_work_excludes_blocked() {
        let store = test_store();
        let blocker = IssueBuilder::new("Blocker").id("lm-blk1").status("open").build();
        let blocked = IssueBuilder::new("Blocked").id("lm-blk2").status("open").build();
        let ready = IssueBuilder::new("Ready").id("lm-rdy1").status("open").build();

        store.create_issue_impl(&blocker, "alice").unwrap();
        store.create_issue_impl(&blocked, "alice").unwrap();
        store.create_issue_impl(&ready, "alice").unwrap();

        store.add_dependency_impl(&Dependency::blocks("lm-blk2", "lm-blk1"), "alice").unwrap();

        let work = store
            .get_ready_work_impl(&open(), &done(), &WorkFilter::default())
            .unwrap();
        let ids: Vec<&str> = work.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"lm-blk1"));
        assert!(ids.contains(&"lm-rdy1"));
        assert!(!ids.contains(&"lm-blk2"));
    }

    #[test]
    fn get_ready_work_releases_when_blocker_done() {
        let store = test_store();
        let blocker = IssueBuilder::new("Blocker").id("lm-blk3").status("closed").build();
        let blocked = IssueBuilder::new("Blocked").id("lm-blk4").status("open").build();
        store.create_issue_impl(&blocker, "alice").unwrap();
        store.create_issue_impl(&blocked, "alice").unwrap();
        store.add_dependency_impl(&Dependency::blocks("lm-blk4", "lm-blk3"), "alice").unwrap();

        let work = store
            .get_ready_work_impl(&open(), &done(), &WorkFilter::default())
            .unwrap();
        let ids: Vec<&str> = work.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"lm-blk4"));
    }

    #[test]
    fn get_blocked_issues_reports_blocker_ids() {
        let store = test_store();
        let blocker = IssueBuilder::new("Blocker").id("lm-bi1").status("open").build();
        let blocked = IssueBuilder::new("Blocked").id("lm-bi2").status("open").build();
        store.create_issue_impl(&blocker, "alice").unwrap();
        store.create_issue_impl(&blocked, "alice").unwrap();
        store.add_dependency_impl(&Dependency::blocks("lm-bi2", "lm-bi1"), "alice").unwrap();

        let blocked_issues = store
            .get_blocked_issues_impl(&open(), &done(), &WorkFilter::default())
            .unwrap();
        assert_eq!(blocked_issues.len(), 1);
        assert_eq!(blocked_issues[0].issue.id, "lm-bi2");
        assert_eq!(blocked_issues[0].blocked_by, vec!["lm-bi1".to_string()]);
    }

    #[test]
    fn get_blocked_issues_excludes_closed_blocked_issue() {
        let store = test_store();
        let blocker = IssueBuilder::new("Blocker").id("lm-bi3").status("open").build();
        let blocked = IssueBuilder::new("Blocked but closed")
            .id("lm-bi4")
            .status("closed")
            .closed_at(Utc::now())
            .build();
        store.create_issue_impl(&blocker, "alice").unwrap();
        store.create_issue_impl(&blocked, "alice").unwrap();
        store.add_dependency_impl(&Dependency::blocks("lm-bi4", "lm-bi3"), "alice").unwrap();

        let blocked_issues = store
            .get_blocked_issues_impl(&open(), &done(), &WorkFilter::default())
            .unwrap();
        assert!(
            blocked_issues.iter().all(|bi| bi.issue.id != "lm-bi4"),
            "a done-category issue must never be reported as blocked even with an open blocker"
        );
    }

    #[test]
    fn get_statistics() {
        let store = test_store();
        let issue1 = IssueBuilder::new("Open").id("lm-st1").status("open").build();
        let issue2 = IssueBuilder::new("Closed")
            .id("lm-st2")
            .status("closed")
            .closed_at(Utc::now())
            .build();
        store.create_issue_impl(&issue1, "alice").unwrap();
        store.create_issue_impl(&issue2, "alice").unwrap();

        let stats = store.get_statistics_impl().unwrap();
        assert_eq!(stats.total_issues, 2);
        assert!(stats.by_priority.iter().any(|(p, c)| *p == 2 && *c == 2));
    }
}
