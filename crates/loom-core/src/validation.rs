//! Structural validation for issues and type names.
//!
//! These are the checks that hold regardless of which template is loaded --
//! template-aware checks (is `status` valid for `type`, are `requires_fields`
//! populated) live in `loom-engine`, since they need the registry.

use crate::issue::Issue;

/// Errors a caller can inspect without needing the engine's broader
/// `ErrorKind` taxonomy -- all of these map to `VALIDATION` at the API
/// boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be 500 characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("priority must be between 0 and 4 (got {0})")]
    InvalidPriority(i32),

    #[error("invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("closed issues must have a closed_at timestamp")]
    ClosedWithoutTimestamp,

    #[error("non-closed issues cannot have a closed_at timestamp")]
    NotClosedWithTimestamp,

    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// `^[a-z][a-z0-9_]{0,63}$`, used for both issue `type` and template `type`.
pub fn is_valid_type_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 64 {
        return false;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Structural checks independent of any loaded template: title, priority,
/// type-name shape, and the `closed_at` / done-category invariant.
///
/// `is_done` is supplied by the caller (derived from the registry's category
/// lookup) rather than computed here, since this module has no registry
/// access.
pub fn validate_structure(issue: &Issue, is_done: bool) -> Result<(), ValidationError> {
    if issue.title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if issue.title.len() > 500 {
        return Err(ValidationError::TitleTooLong(issue.title.len()));
    }
    if !(0..=4).contains(&issue.priority) {
        return Err(ValidationError::InvalidPriority(issue.priority));
    }
    if !is_valid_type_name(&issue.issue_type) {
        return Err(ValidationError::InvalidTypeName(issue.issue_type.clone()));
    }
    if is_done && issue.closed_at.is_none() {
        return Err(ValidationError::ClosedWithoutTimestamp);
    }
    if !is_done && issue.closed_at.is_some() {
        return Err(ValidationError::NotClosedWithTimestamp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueBuilder;

    fn valid_issue() -> Issue {
        IssueBuilder::new("Valid issue")
            .priority(2)
            .issue_type("task")
            .build()
    }

    #[test]
    fn valid_issue_passes() {
        assert!(validate_structure(&valid_issue(), false).is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let issue = IssueBuilder::new("").issue_type("task").build();
        assert_eq!(
            validate_structure(&issue, false),
            Err(ValidationError::TitleRequired)
        );
    }

    #[test]
    fn long_title_fails() {
        let title = "x".repeat(501);
        let issue = IssueBuilder::new(title).issue_type("task").build();
        assert_eq!(
            validate_structure(&issue, false),
            Err(ValidationError::TitleTooLong(501))
        );
    }

    #[test]
    fn invalid_priority_fails() {
        let issue = IssueBuilder::new("Test").issue_type("task").priority(5).build();
        assert_eq!(
            validate_structure(&issue, false),
            Err(ValidationError::InvalidPriority(5))
        );
    }

    #[test]
    fn negative_priority_fails() {
        let issue = IssueBuilder::new("Test").issue_type("task").priority(-1).build();
        assert_eq!(
            validate_structure(&issue, false),
            Err(ValidationError::InvalidPriority(-1))
        );
    }

    #[test]
    fn type_name_rules() {
        assert!(is_valid_type_name("bug"));
        assert!(is_valid_type_name("custom_type_2"));
        assert!(!is_valid_type_name(""));
        assert!(!is_valid_type_name("Bug"));
        assert!(!is_valid_type_name("2bug"));
        assert!(!is_valid_type_name("bug-fix"));
        assert!(!is_valid_type_name(&"a".repeat(65)));
    }

    #[test]
    fn closed_without_timestamp_fails() {
        let issue = valid_issue();
        assert_eq!(
            validate_structure(&issue, true),
            Err(ValidationError::ClosedWithoutTimestamp)
        );
    }

    #[test]
    fn closed_with_timestamp_passes() {
        let issue = IssueBuilder::new("Test")
            .issue_type("task")
            .closed_at(chrono::Utc::now())
            .build();
        assert!(validate_structure(&issue, true).is_ok());
    }

    #[test]
    fn not_closed_with_timestamp_fails() {
        let issue = IssueBuilder::new("Test")
            .issue_type("task")
            .closed_at(chrono::Utc::now())
            .build();
        assert_eq!(
            validate_structure(&issue, false),
            Err(ValidationError::NotClosedWithTimestamp)
        );
    }
}
