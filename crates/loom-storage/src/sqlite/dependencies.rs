//! Dependency CRUD operations and cycle detection for [`SqliteStore`].

use std::collections::{HashSet, VecDeque};

use rusqlite::{params, Connection};

use loom_core::dependency::Dependency;
use loom_core::enums::EventType;

use crate::error::{Result, StorageError};
use crate::sqlite::issues::{emit_event, format_datetime, parse_datetime};
use crate::sqlite::store::SqliteStore;

// ---------------------------------------------------------------------------
// Connection-level helpers (shared with transactions)
// ---------------------------------------------------------------------------

/// Inserts a dependency, cycle-checking `kind == "blocks"` edges.
///
/// `from_id` depends on `to_id` (`to_id` must resolve first); a cycle exists
/// if `to_id` already transitively depends on `from_id`.
pub(crate) fn add_dependency_on_conn(conn: &Connection, dep: &Dependency, actor: &str) -> Result<()> {
    if dep.is_blocking() {
        detect_cycle(conn, &dep.from_id, &dep.to_id)?;
    }

    let now_str = format_datetime(&chrono::Utc::now());
    let created_at_str = format_datetime(&dep.created_at);

    conn.execute(
        "INSERT OR REPLACE INTO dependencies (from_id, to_id, kind, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![dep.from_id, dep.to_id, dep.kind, created_at_str],
    )?;

    emit_event(
        conn,
        &dep.from_id,
        EventType::DependencyAdded,
        actor,
        None,
        Some(&dep.to_id),
        Some(dep.kind.as_str()),
        &now_str,
    )?;

    Ok(())
}

pub(crate) fn remove_dependency_on_conn(
    conn: &Connection,
    from_id: &str,
    to_id: &str,
    actor: &str,
) -> Result<()> {
    let now_str = format_datetime(&chrono::Utc::now());

    let affected = conn.execute(
        "DELETE FROM dependencies WHERE from_id = ?1 AND to_id = ?2",
        params![from_id, to_id],
    )?;
    if affected == 0 {
        return Err(StorageError::not_found("dependency", format!("{from_id} -> {to_id}")));
    }

    emit_event(
        conn,
        from_id,
        EventType::DependencyRemoved,
        actor,
        Some(to_id),
        None,
        None,
        &now_str,
    )?;

    Ok(())
}

pub(crate) fn get_dependency_records_on_conn(conn: &Connection, issue_id: &str) -> Result<Vec<Dependency>> {
    let mut stmt = conn.prepare(
        "SELECT from_id, to_id, kind, created_at FROM dependencies WHERE from_id = ?1",
    )?;
    let rows = stmt.query_map(params![issue_id], scan_dependency)?;
    let mut deps = Vec::new();
    for row in rows {
        deps.push(row?);
    }
    Ok(deps)
}

pub(crate) fn get_dependent_records_on_conn(conn: &Connection, issue_id: &str) -> Result<Vec<Dependency>> {
    let mut stmt = conn.prepare(
        "SELECT from_id, to_id, kind, created_at FROM dependencies WHERE to_id = ?1",
    )?;
    let rows = stmt.query_map(params![issue_id], scan_dependency)?;
    let mut deps = Vec::new();
    for row in rows {
        deps.push(row?);
    }
    Ok(deps)
}

pub(crate) fn get_all_blocking_edges_on_conn(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT from_id, to_id FROM dependencies WHERE kind = 'blocks'")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut edges = Vec::new();
    for row in rows {
        edges.push(row?);
    }
    Ok(edges)
}

fn scan_dependency(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dependency> {
    let created_at_str: String = row.get("created_at")?;
    Ok(Dependency {
        from_id: row.get("from_id")?,
        to_id: row.get("to_id")?,
        kind: row.get("kind")?,
        created_at: parse_datetime(&created_at_str),
    })
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// BFS from `to_id` along outgoing `blocks` edges; a cycle exists if
/// `from_id` is reachable (meaning `to_id` already transitively depends on
/// `from_id`).
fn detect_cycle(conn: &Connection, from_id: &str, to_id: &str) -> Result<()> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(to_id.to_string());

    while let Some(current) = queue.pop_front() {
        if current == from_id {
            return Err(StorageError::CycleDetected);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        let mut stmt = conn
            .prepare_cached("SELECT to_id FROM dependencies WHERE from_id = ?1 AND kind = 'blocks'")?;
        let rows = stmt.query_map(params![current], |row| row.get::<_, String>(0))?;
        for row in rows {
            let next = row?;
            if !visited.contains(&next) {
                queue.push_back(next);
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub fn add_dependency_impl(&self, dep: &Dependency, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        add_dependency_on_conn(&conn, dep, actor)
    }

    pub fn remove_dependency_impl(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        remove_dependency_on_conn(&conn, from_id, to_id, actor)
    }

    pub fn get_dependency_records_impl(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        let conn = self.lock_conn()?;
        get_dependency_records_on_conn(&conn, issue_id)
    }

    pub fn get_dependent_records_impl(&self, issue_id: &str) -> Result<Vec<Dependency>> {
        let conn = self.lock_conn()?;
        get_dependent_records_on_conn(&conn, issue_id)
    }

    pub fn get_all_blocking_edges_impl(&self) -> Result<Vec<(String, String)>> {
        let conn = self.lock_conn()?;
        get_all_blocking_edges_on_conn(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::issue::IssueBuilder;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn add_and_get_dependency() {
        let store = test_store();
        let parent = IssueBuilder::new("Parent").id("lm-p1").build();
        let child = IssueBuilder::new("Child").id("lm-c1").build();
        store.create_issue_impl(&parent, "alice").unwrap();
        store.create_issue_impl(&child, "alice").unwrap();

        let dep = Dependency::blocks("lm-c1", "lm-p1");
        store.add_dependency_impl(&dep, "alice").unwrap();

        let deps = store.get_dependency_records_impl("lm-c1").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].to_id, "lm-p1");

        let dependents = store.get_dependent_records_impl("lm-p1").unwrap();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].from_id, "lm-c1");
    }

    #[test]
    fn remove_dependency() {
        let store = test_store();
        let a = IssueBuilder::new("A").id("lm-a1").build();
        let b = IssueBuilder::new("B").id("lm-b1").build();
        store.create_issue_impl(&a, "alice").unwrap();
        store.create_issue_impl(&b, "alice").unwrap();

        let dep = Dependency::blocks("lm-b1", "lm-a1");
        store.add_dependency_impl(&dep, "alice").unwrap();
        store.remove_dependency_impl("lm-b1", "lm-a1", "alice").unwrap();

        let deps = store.get_dependency_records_impl("lm-b1").unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn cycle_detection() {
        let store = test_store();
        let a = IssueBuilder::new("A").id("lm-cy1").build();
        let b = IssueBuilder::new("B").id("lm-cy2").build();
        let c = IssueBuilder::new("C").id("lm-cy3").build();
        store.create_issue_impl(&a, "alice").unwrap();
        store.create_issue_impl(&b, "alice").unwrap();
        store.create_issue_impl(&c, "alice").unwrap();

        // A depends on B, B depends on C.
        store.add_dependency_impl(&Dependency::blocks("lm-cy1", "lm-cy2"), "alice").unwrap();
        store.add_dependency_impl(&Dependency::blocks("lm-cy2", "lm-cy3"), "alice").unwrap();

        // C depends on A would close the cycle.
        let err = store
            .add_dependency_impl(&Dependency::blocks("lm-cy3", "lm-cy1"), "alice")
            .unwrap_err();
        assert!(matches!(err, StorageError::CycleDetected));
    }

    #[test]
    fn get_all_blocking_edges_excludes_other_kinds() {
        let store = test_store();
        let a = IssueBuilder::new("A").id("lm-e1").build();
        let b = IssueBuilder::new("B").id("lm-e2").build();
        store.create_issue_impl(&a, "alice").unwrap();
        store.create_issue_impl(&b, "alice").unwrap();

        store.add_dependency_impl(&Dependency::blocks("lm-e1", "lm-e2"), "alice").unwrap();
        store
            .add_dependency_impl(
                &Dependency {
                    from_id: "lm-e2".into(),
                    to_id: "lm-e1".into(),
                    kind: "related".into(),
                    created_at: chrono::Utc::now(),
                },
                "alice",
            )
            .unwrap();

        let edges = store.get_all_blocking_edges_impl().unwrap();
        assert_eq!(edges, vec![("lm-e1".to_string(), "lm-e2".to_string())]);
    }
}
