//! Output formatting helpers for the `loom` CLI.
//!
//! Provides JSON output, table formatting, and human-readable issue display
//! in both compact (one-liner) and detailed (multi-line) formats. Colored
//! rendering is delegated to `loom-ui::styles`, which is category-aware but
//! has no storage/registry access of its own -- callers resolve `Category`
//! and `blocked` first and pass them in.

use std::io::{self, Write};

use loom_core::enums::Category;
use loom_core::issue::Issue;
use serde::Serialize;
use serde_json::{json, Value};

use loom_ui::styles;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => eprintln!("Error: failed to serialize JSON: {}", e),
    }
}

/// Print a simple table with headers and rows, column widths computed from
/// the data.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{:<width$}", header, width = widths[i]);
    }
    let _ = writeln!(handle);

    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{}", "-".repeat(*width));
    }
    let _ = writeln!(handle);

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                let _ = write!(handle, "  ");
            }
            if i < widths.len() {
                let _ = write!(handle, "{:<width$}", cell, width = widths[i]);
            } else {
                let _ = write!(handle, "{}", cell);
            }
        }
        let _ = writeln!(handle);
    }
}

/// Builds the JSON view of an issue: the struct's own serialization plus
/// the relational data it skips (`labels`, `blocked_by`) and the
/// registry-derived `category`/`blocked` the engine computed for it.
pub fn issue_to_json(issue: &Issue, category: Category, blocked: bool) -> Value {
    let mut value = serde_json::to_value(issue).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("category".into(), json!(category.to_string()));
        obj.insert("blocked".into(), json!(blocked));
        obj.insert("labels".into(), json!(issue.labels));
        obj.insert("blocked_by".into(), json!(issue.blocked_by));
    }
    value
}

/// Renders a compact one-line issue summary with colors (delegates to
/// `loom-ui`).
pub fn format_issue_compact(issue: &Issue, category: Category, blocked: bool) -> String {
    styles::render_issue_compact(issue, category, blocked)
}

/// Formats an issue as a row for [`output_table`].
pub fn format_issue_row(issue: &Issue, category: Category, blocked: bool) -> Vec<String> {
    vec![
        issue.id.clone(),
        styles::render_priority_for_category(issue.priority, category),
        styles::render_type_for_category(&issue.issue_type, category),
        styles::render_status(&issue.status, category, blocked),
        issue.title.clone(),
        issue.assignee.clone(),
    ]
}

/// Formats an issue in detailed multi-line view.
pub fn format_issue_detail(issue: &Issue, category: Category, blocked: bool) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} [{}] [{}] {}",
        issue.id,
        styles::render_priority(issue.priority),
        styles::render_type(&issue.issue_type),
        issue.title,
    ));

    lines.push(format!("Status: {}", styles::render_status(&issue.status, category, blocked)));
    if blocked {
        lines.push(format!("Blocked by: {}", issue.blocked_by.join(", ")));
    }
    if !issue.assignee.is_empty() {
        lines.push(format!("Assignee: {}", issue.assignee));
    }
    if let Some(ref parent_id) = issue.parent_id {
        lines.push(format!("Parent: {}", parent_id));
    }

    lines.push(format!("Created: {}", issue.created_at.format("%Y-%m-%d %H:%M")));
    lines.push(format!("Updated: {}", issue.updated_at.format("%Y-%m-%d %H:%M")));
    if let Some(ref closed_at) = issue.closed_at {
        lines.push(format!("Closed: {}", closed_at.format("%Y-%m-%d %H:%M")));
    }

    if !issue.description.is_empty() {
        lines.push(String::new());
        lines.push(styles::render_header("description"));
        lines.push(issue.description.clone());
    }
    if !issue.notes.is_empty() {
        lines.push(String::new());
        lines.push(styles::render_header("notes"));
        lines.push(issue.notes.clone());
    }

    if !issue.fields.is_empty() {
        lines.push(String::new());
        lines.push(styles::render_header("fields"));
        for (name, value) in &issue.fields {
            lines.push(format!("{name}: {value:?}"));
        }
    }

    if !issue.labels.is_empty() {
        lines.push(String::new());
        lines.push(format!("Labels: {}", issue.labels.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::issue::IssueBuilder;

    #[test]
    fn compact_format_contains_fields() {
        let issue = IssueBuilder::new("Fix the bug")
            .id("lm-abc123")
            .priority(1)
            .issue_type("bug")
            .status("open")
            .build();
        let formatted = format_issue_compact(&issue, Category::Open, false);
        assert!(formatted.contains("lm-abc123"));
        assert!(formatted.contains("Fix the bug"));
    }

    #[test]
    fn detail_format_includes_sections() {
        let issue = IssueBuilder::new("Fix the bug")
            .id("lm-abc123")
            .description("A detailed description")
            .priority(1)
            .assignee("alice")
            .status("open")
            .build();
        let formatted = format_issue_detail(&issue, Category::Open, false);
        assert!(formatted.contains("description"));
        assert!(formatted.contains("A detailed description"));
        assert!(formatted.contains("Assignee: alice"));
    }

    #[test]
    fn row_format_columns() {
        let issue = IssueBuilder::new("Test")
            .id("lm-xyz")
            .priority(2)
            .assignee("bob")
            .status("open")
            .build();
        let row = format_issue_row(&issue, Category::Open, false);
        assert_eq!(row[0], "lm-xyz");
        assert_eq!(row[5], "bob");
    }

    #[test]
    fn json_view_includes_relational_data() {
        let mut issue = IssueBuilder::new("Test").id("lm-1").build();
        issue.labels = vec!["urgent".into()];
        issue.blocked_by = vec!["lm-2".into()];
        let value = issue_to_json(&issue, Category::Open, true);
        assert_eq!(value["labels"][0], "urgent");
        assert_eq!(value["blocked_by"][0], "lm-2");
        assert_eq!(value["blocked"], true);
    }

    #[test]
    fn table_output_smoke() {
        let headers = &["ID", "Priority", "Title"];
        let rows = vec![
            vec!["lm-1".into(), "P0".into(), "Critical bug".into()],
            vec!["lm-2".into(), "P2".into(), "Nice to have".into()],
        ];
        output_table(headers, &rows);
    }
}
