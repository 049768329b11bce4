//! DDL statements and versioned migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format (SQLite has no native
//! datetime type). `fields` is stored as a JSON TEXT blob (a map of
//! `FieldValue`s); the engine, not storage, interprets it.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StorageError};

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 4;

/// Version 1: baseline tables.
const V1_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        notes       TEXT NOT NULL DEFAULT '',
        status      TEXT NOT NULL DEFAULT '',
        priority    INTEGER NOT NULL DEFAULT 2,
        issue_type  TEXT NOT NULL DEFAULT '',
        parent_id   TEXT,
        assignee    TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        closed_at   TEXT,
        fields      TEXT NOT NULL DEFAULT '{}',
        FOREIGN KEY (parent_id) REFERENCES issues(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status)",
    "CREATE INDEX IF NOT EXISTS idx_issues_assignee ON issues(assignee)",
    "CREATE INDEX IF NOT EXISTS idx_issues_parent ON issues(parent_id)",
    r#"
    CREATE TABLE IF NOT EXISTS dependencies (
        from_id    TEXT NOT NULL,
        to_id      TEXT NOT NULL,
        kind       TEXT NOT NULL DEFAULT 'blocks',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        PRIMARY KEY (from_id, to_id),
        FOREIGN KEY (from_id) REFERENCES issues(id) ON DELETE CASCADE,
        FOREIGN KEY (to_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_dependencies_to ON dependencies(to_id)",
    r#"
    CREATE TABLE IF NOT EXISTS labels (
        issue_id TEXT NOT NULL,
        label    TEXT NOT NULL,
        PRIMARY KEY (issue_id, label),
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_labels_label ON labels(label)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id   TEXT NOT NULL,
        author     TEXT NOT NULL,
        text       TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id)",
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id   TEXT NOT NULL,
        event_type TEXT NOT NULL,
        actor      TEXT NOT NULL,
        old_value  TEXT,
        new_value  TEXT,
        comment    TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_issue ON events(issue_id)",
    r#"
    CREATE TABLE IF NOT EXISTS config (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

/// Default configuration values inserted on first init.
pub const DEFAULT_CONFIG: &[(&str, &str)] = &[("schema_version", "0")];

fn mark_applied(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, 'applied')",
        rusqlite::params![format!("migration:{name}")],
    )
    .map_err(|e| StorageError::Migration {
        name: name.to_string(),
        reason: format!("failed to mark migration applied: {e}"),
    })?;
    Ok(())
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![version.to_string()],
    )
    .map_err(|e| StorageError::Migration {
        name: format!("v{version}"),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Applies version 1 (baseline tables), unconditionally -- every statement
/// is `IF NOT EXISTS`, so this is safe to run against an existing database.
fn apply_v1(conn: &Connection) -> Result<()> {
    for stmt in V1_STATEMENTS {
        conn.execute_batch(stmt).map_err(|e| StorageError::Migration {
            name: "v1_baseline".into(),
            reason: format!("{e}\nstatement: {}", truncate(stmt, 160)),
        })?;
    }
    for &(key, value) in DEFAULT_CONFIG {
        conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )
        .map_err(|e| StorageError::Migration {
            name: "v1_default_config".into(),
            reason: e.to_string(),
        })?;
    }
    mark_applied(conn, "v1_baseline")?;
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Version 2: full-text search over (title, description).
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS issues_fts USING fts5(
            id UNINDEXED, title, description, content=''
        );
        CREATE TRIGGER IF NOT EXISTS issues_fts_insert AFTER INSERT ON issues BEGIN
            INSERT INTO issues_fts(id, title, description) VALUES (new.id, new.title, new.description);
        END;
        CREATE TRIGGER IF NOT EXISTS issues_fts_update AFTER UPDATE ON issues BEGIN
            DELETE FROM issues_fts WHERE id = old.id;
            INSERT INTO issues_fts(id, title, description) VALUES (new.id, new.title, new.description);
        END;
        CREATE TRIGGER IF NOT EXISTS issues_fts_delete AFTER DELETE ON issues BEGIN
            DELETE FROM issues_fts WHERE id = old.id;
        END;
        "#,
    )
    .map_err(|e| StorageError::Migration {
        name: "v2_fts".into(),
        reason: e.to_string(),
    })?;

    // Backfill any rows that predate the triggers.
    conn.execute_batch(
        "INSERT INTO issues_fts(id, title, description) SELECT id, title, description FROM issues
         WHERE id NOT IN (SELECT id FROM issues_fts);",
    )
    .map_err(|e| StorageError::Migration {
        name: "v2_fts_backfill".into(),
        reason: e.to_string(),
    })?;

    mark_applied(conn, "v2_fts")?;
    set_schema_version(conn, 2)?;
    Ok(())
}

/// Version 3: custom workflow state list in config (legacy fallback, spec §3
/// `ProjectConfig.workflow_states`). Stored as a JSON array under the
/// `workflow_states` config key, empty by default.
fn apply_v3(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO config (key, value) VALUES ('workflow_states', '[]')",
        [],
    )
    .map_err(|e| StorageError::Migration {
        name: "v3_workflow_states".into(),
        reason: e.to_string(),
    })?;
    mark_applied(conn, "v3_workflow_states")?;
    set_schema_version(conn, 3)?;
    Ok(())
}

/// Version 4: composite indexes for the hot query paths.
fn apply_v4(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_issues_status_priority_created
            ON issues(status, priority, created_at);
         CREATE INDEX IF NOT EXISTS idx_dependencies_from_to
            ON dependencies(from_id, to_id);
         CREATE INDEX IF NOT EXISTS idx_events_issue_created_desc
            ON events(issue_id, created_at DESC);
         CREATE INDEX IF NOT EXISTS idx_comments_issue_created
            ON comments(issue_id, created_at);",
    )
    .map_err(|e| StorageError::Migration {
        name: "v4_composite_indexes".into(),
        reason: e.to_string(),
    })?;
    mark_applied(conn, "v4_composite_indexes")?;
    set_schema_version(conn, 4)?;
    Ok(())
}

/// Reads the schema version recorded in `config`, or 0 if the database is
/// brand new.
fn current_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT value FROM config WHERE key = 'schema_version'", [], |row| {
        let v: String = row.get(0)?;
        Ok(v.parse::<i32>().unwrap_or(0))
    })
    .unwrap_or(0)
}

/// Applies any pending migrations in monotonically increasing version
/// order. Idempotent: calling this against an up-to-date database is a
/// cheap no-op.
pub fn migrate(conn: &Connection) -> Result<()> {
    // Version 0 -> 1 needs the config/metadata tables to exist before we can
    // even read a version, so v1 always runs its IF-NOT-EXISTS DDL first.
    apply_v1(conn)?;

    let version = current_version(conn);
    if version >= CURRENT_SCHEMA_VERSION {
        debug!(version, "schema already at current version");
        return Ok(());
    }

    if version < 2 {
        apply_v2(conn)?;
    }
    if version < 3 {
        apply_v3(conn)?;
    }
    if version < 4 {
        apply_v4(conn)?;
    }

    info!(
        from = version,
        to = CURRENT_SCHEMA_VERSION,
        "schema migrated"
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...", &s[..max])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(current_version(&conn), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(current_version(&conn), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn fts_table_created() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'issues_fts'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
