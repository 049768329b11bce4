//! Ayu color theme and styling functions for loom CLI output.
//!
//! Uses the Ayu Dark color palette for consistent terminal styling.
//! Color source: <https://github.com/ayu-theme/ayu-colors>
//!
//! Design principles:
//! - Only actionable states get color (open/done use standard text, wip
//!   states are highlighted since they're where attention is needed)
//! - P0/P1 get color (they need attention); P2 gets muted gold; P3/P4 are neutral
//! - The `bug` and `epic` builtin types get color; other types use standard text
//! - Small Unicode symbols for icons, NOT emoji blobs
//!
//! Status is a free-form string validated against a loaded template, not a
//! closed enum -- callers pass the issue's [`Category`] (computed by
//! `TemplateRegistry::get_category`) alongside the raw status string so
//! this crate never needs registry access of its own.

use loom_core::enums::Category;
use loom_core::issue::Issue;
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

// ---------------------------------------------------------------------------
// Ayu Dark color palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue

// Category colors
const CATEGORY_WIP: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - yellow
const CATEGORY_DONE: (u8, u8, u8) = (0x80, 0x90, 0xa0); // #8090a0 - dimmed
const CATEGORY_BLOCKED: (u8, u8, u8) = (0xf2, 0x6d, 0x78); // #f26d78 - red

// Priority colors
const PRIORITY_P0: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const PRIORITY_P1: (u8, u8, u8) = (0xff, 0x8f, 0x40); // #ff8f40 - orange
const PRIORITY_P2: (u8, u8, u8) = (0xe6, 0xb4, 0x50); // #e6b450 - muted gold

// Builtin type colors
const TYPE_BUG: (u8, u8, u8) = (0xf2, 0x6d, 0x78); // #f26d78 - red
const TYPE_EPIC: (u8, u8, u8) = (0xd2, 0xa6, 0xff); // #d2a6ff - purple

// ---------------------------------------------------------------------------
// Status icons -- consistent semantic indicators
// ---------------------------------------------------------------------------

/// Open-category status icon (hollow circle -- available to work).
pub const STATUS_ICON_OPEN: &str = "\u{25CB}";
/// Wip-category status icon (half-filled circle -- active work).
pub const STATUS_ICON_WIP: &str = "\u{25D0}";
/// Blocked status icon (filled circle -- needs attention). Blocked is a
/// dependency-graph property, not a category, so callers decide when it
/// applies (typically by checking `QueryService`'s blocked-issues list).
pub const STATUS_ICON_BLOCKED: &str = "\u{25CF}";
/// Done-category status icon (checkmark -- completed).
pub const STATUS_ICON_DONE: &str = "\u{2713}";

/// Priority icon -- small filled circle, colored by priority level.
pub const PRIORITY_ICON: &str = "\u{25CF}";

// General icons
pub const ICON_PASS: &str = "\u{2713}";
pub const ICON_WARN: &str = "\u{26A0}";
pub const ICON_FAIL: &str = "\u{2716}";
pub const ICON_SKIP: &str = "-";
pub const ICON_INFO: &str = "\u{2139}";

// Tree characters for hierarchical display
pub const TREE_CHILD: &str = "\u{23BF} ";
pub const TREE_LAST: &str = "\u{2514}\u{2500} ";
pub const TREE_INDENT: &str = "  ";

// Separators
pub const SEPARATOR_LIGHT: &str = "\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}";
pub const SEPARATOR_HEAVY: &str = "\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}";

// ---------------------------------------------------------------------------
// Helper: apply truecolor only when color is supported
// ---------------------------------------------------------------------------

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Core semantic render helpers
// ---------------------------------------------------------------------------

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders a category header in uppercase with accent color and bold.
pub fn render_header(s: &str) -> String {
    let upper = s.to_uppercase();
    color_bold_str(&upper, ACCENT)
}

pub fn render_separator() -> String {
    render_muted(SEPARATOR_LIGHT)
}

// ---------------------------------------------------------------------------
// Icon renderers
// ---------------------------------------------------------------------------

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_warn_icon() -> String {
    color_str(ICON_WARN, WARN)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

pub fn render_skip_icon() -> String {
    color_str(ICON_SKIP, MUTED)
}

pub fn render_info_icon() -> String {
    color_str(ICON_INFO, ACCENT)
}

// ---------------------------------------------------------------------------
// Status rendering
// ---------------------------------------------------------------------------

/// Returns the icon for a status of the given category, or the blocked icon
/// when `blocked` is set (a dependency-graph property that overrides the
/// category's own icon).
pub fn render_status_icon(category: Category, blocked: bool) -> &'static str {
    if blocked {
        return STATUS_ICON_BLOCKED;
    }
    match category {
        Category::Open => STATUS_ICON_OPEN,
        Category::Wip => STATUS_ICON_WIP,
        Category::Done => STATUS_ICON_DONE,
    }
}

/// Returns the colored status icon string.
pub fn render_status_icon_colored(category: Category, blocked: bool) -> String {
    if blocked {
        return color_str(STATUS_ICON_BLOCKED, CATEGORY_BLOCKED);
    }
    let icon = render_status_icon(category, false);
    match category {
        Category::Open => icon.to_string(),
        Category::Wip => color_str(icon, CATEGORY_WIP),
        Category::Done => color_str(icon, CATEGORY_DONE),
    }
}

/// Renders a status string with semantic coloring. Open-category statuses
/// use standard text; wip gets yellow, done gets dimmed, blocked (a
/// dependency-graph property, passed in separately) overrides both.
pub fn render_status(status: &str, category: Category, blocked: bool) -> String {
    if blocked {
        return color_str(status, CATEGORY_BLOCKED);
    }
    match category {
        Category::Wip => color_str(status, CATEGORY_WIP),
        Category::Done => color_str(status, CATEGORY_DONE),
        Category::Open => status.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Priority rendering
// ---------------------------------------------------------------------------

/// Renders a priority level with semantic styling.
/// Format: `● P{n}` (icon + label).
/// P0 is bold red, P1 is orange, P2 is muted gold, P3/P4 are neutral.
pub fn render_priority(priority: i32) -> String {
    let label = format!("{} P{}", PRIORITY_ICON, priority);
    match priority {
        0 => color_bold_str(&label, PRIORITY_P0),
        1 => color_str(&label, PRIORITY_P1),
        2 => color_str(&label, PRIORITY_P2),
        _ => label,
    }
}

/// Renders just the priority label without icon (e.g. `P2`).
pub fn render_priority_compact(priority: i32) -> String {
    let label = format!("P{}", priority);
    match priority {
        0 => color_bold_str(&label, PRIORITY_P0),
        1 => color_str(&label, PRIORITY_P1),
        2 => color_str(&label, PRIORITY_P2),
        _ => label,
    }
}

// ---------------------------------------------------------------------------
// Type rendering
// ---------------------------------------------------------------------------

/// Renders an issue type with semantic styling. The `bug` and `epic`
/// builtin type names get color; any other type (including custom pack
/// types) uses standard text.
pub fn render_type(issue_type: &str) -> String {
    match issue_type {
        "bug" => color_str(issue_type, TYPE_BUG),
        "epic" => color_str(issue_type, TYPE_EPIC),
        _ => issue_type.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Compact issue rendering
// ---------------------------------------------------------------------------

/// Renders a compact one-line issue summary with colors.
/// Format: `ID [Priority] [Type] Status - Title`
///
/// When the issue's category is `Done`, the entire line is dimmed.
pub fn render_issue_compact(issue: &Issue, category: Category, blocked: bool) -> String {
    if category == Category::Done {
        let line = format!(
            "{} [P{}] [{}] {} - {}",
            issue.id, issue.priority, issue.issue_type, issue.status, issue.title,
        );
        color_str(&line, CATEGORY_DONE)
    } else {
        format!(
            "{} [{}] [{}] {} - {}",
            &issue.id,
            render_priority(issue.priority),
            render_type(&issue.issue_type),
            render_status(&issue.status, category, blocked),
            issue.title,
        )
    }
}

/// Renders an entire line in the done/dimmed style.
pub fn render_done_line(line: &str) -> String {
    color_str(line, CATEGORY_DONE)
}

/// Renders priority with color only if the issue's category isn't `Done`.
pub fn render_priority_for_category(priority: i32, category: Category) -> String {
    if category == Category::Done {
        format!("P{}", priority)
    } else {
        render_priority(priority)
    }
}

/// Renders type with color only if the issue's category isn't `Done`.
pub fn render_type_for_category(issue_type: &str, category: Category) -> String {
    if category == Category::Done {
        issue_type.to_string()
    } else {
        render_type(issue_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::issue::IssueBuilder;

    #[test]
    fn status_icon_returns_correct_icons() {
        assert_eq!(render_status_icon(Category::Open, false), STATUS_ICON_OPEN);
        assert_eq!(render_status_icon(Category::Wip, false), STATUS_ICON_WIP);
        assert_eq!(render_status_icon(Category::Done, false), STATUS_ICON_DONE);
        assert_eq!(render_status_icon(Category::Open, true), STATUS_ICON_BLOCKED);
    }

    #[test]
    fn render_priority_formats_correctly() {
        // NO_COLOR may or may not be set in the test environment; just
        // verify the string contains the label.
        let p0 = render_priority(0);
        assert!(p0.contains("P0"));
        let p3 = render_priority(3);
        assert!(p3.contains("P3"));
    }

    #[test]
    fn render_type_contains_type_name() {
        let bug = render_type("bug");
        assert!(bug.contains("bug"));
        let task = render_type("task");
        assert!(task.contains("task"));
    }

    #[test]
    fn render_issue_compact_contains_fields() {
        let issue = IssueBuilder::new("Fix login crash")
            .id("lm-abc123")
            .priority(1)
            .issue_type("bug")
            .status("fixing")
            .build();

        let rendered = render_issue_compact(&issue, Category::Wip, false);
        assert!(rendered.contains("lm-abc123"));
        assert!(rendered.contains("Fix login crash"));
    }

    #[test]
    fn render_issue_compact_done_dims_line() {
        let issue = IssueBuilder::new("Old task")
            .id("lm-xyz")
            .status("closed")
            .build();

        let rendered = render_issue_compact(&issue, Category::Done, false);
        assert!(rendered.contains("Old task"));
        assert!(rendered.contains("lm-xyz"));
    }
}
