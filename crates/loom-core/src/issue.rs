//! Issue struct -- the central domain model for the loom tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field_value::FieldValue;

/// Helper for `skip_serializing_if` on `i32` fields (priority: 0 is valid, never skip).
fn is_zero_priority(_p: &i32) -> bool {
    false
}

fn is_empty_map(m: &BTreeMap<String, FieldValue>) -> bool {
    m.is_empty()
}

/// A trackable work item.
///
/// `status` and `type` are free-form strings validated against a loaded
/// [`crate::template::TypeTemplate`] rather than fixed enums -- the set of
/// valid values is per-project and per-type. `status_category` is derived
/// from the template at read time and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default)]
    pub status: String,

    /// 0 (highest) through 4 (lowest).
    #[serde(default, skip_serializing_if = "is_zero_priority")]
    pub priority: i32,

    #[serde(rename = "type", default)]
    pub issue_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assignee: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Per-type custom field values, keyed by field name.
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub fields: BTreeMap<String, FieldValue>,

    // ===== Relational data, populated on read, never stored on this struct =====
    #[serde(skip)]
    pub labels: Vec<String>,

    #[serde(skip)]
    pub blocks: Vec<String>,

    #[serde(skip)]
    pub blocked_by: Vec<String>,
}

impl Default for Issue {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            notes: String::new(),
            status: String::new(),
            priority: 2,
            issue_type: String::new(),
            parent_id: None,
            assignee: String::new(),
            created_at: now,
            updated_at: now,
            closed_at: None,
            fields: BTreeMap::new(),
            labels: Vec::new(),
            blocks: Vec::new(),
            blocked_by: Vec::new(),
        }
    }
}

impl Issue {
    /// An issue is ready iff it has no unresolved blocking dependency
    /// (evaluated by the engine, which populates `blocked_by` from still-open
    /// blockers only) and its status category is `open`.
    pub fn is_ready(&self, category: crate::enums::Category) -> bool {
        matches!(category, crate::enums::Category::Open) && self.blocked_by.is_empty()
    }
}

/// Builder for constructing an [`Issue`] with a fluent API.
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        let mut issue = Issue::default();
        issue.title = title.into();
        Self { issue }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.issue.id = id.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.issue.description = description.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.issue.notes = notes.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.issue.status = status.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.issue.priority = priority;
        self
    }

    pub fn issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue.issue_type = issue_type.into();
        self
    }

    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.issue.parent_id = Some(parent_id.into());
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.issue.assignee = assignee.into();
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.created_at = t;
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.updated_at = t;
        self
    }

    pub fn closed_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.closed_at = Some(t);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.issue.fields.insert(name.into(), value);
        self
    }

    /// Consumes the builder and returns the constructed [`Issue`].
    pub fn build(self) -> Issue {
        self.issue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_issue() {
        let issue = Issue::default();
        assert_eq!(issue.priority, 2);
        assert!(issue.status.is_empty());
    }

    #[test]
    fn builder_basic() {
        let issue = IssueBuilder::new("Fix the bug")
            .priority(1)
            .status("in_progress")
            .issue_type("bug")
            .assignee("alice")
            .build();

        assert_eq!(issue.title, "Fix the bug");
        assert_eq!(issue.priority, 1);
        assert_eq!(issue.status, "in_progress");
        assert_eq!(issue.issue_type, "bug");
        assert_eq!(issue.assignee, "alice");
    }

    #[test]
    fn issue_serde_roundtrip() {
        let issue = IssueBuilder::new("Test issue")
            .id("lm-abc123")
            .priority(1)
            .description("A test description")
            .field("severity", FieldValue::Enum("high".into()))
            .build();

        let json = serde_json::to_string(&issue).unwrap();
        let back: Issue = serde_json::from_str(&json).unwrap();

        assert_eq!(back.title, "Test issue");
        assert_eq!(back.id, "lm-abc123");
        assert_eq!(back.priority, 1);
        assert_eq!(back.description, "A test description");
        assert_eq!(
            back.fields.get("severity"),
            Some(&FieldValue::Enum("high".into()))
        );
    }

    #[test]
    fn is_ready_requires_open_category_and_no_blockers() {
        use crate::enums::Category;

        let mut issue = Issue::default();
        assert!(issue.is_ready(Category::Open));
        assert!(!issue.is_ready(Category::Wip));

        issue.blocked_by.push("lm-1".into());
        assert!(!issue.is_ready(Category::Open));
    }
}
