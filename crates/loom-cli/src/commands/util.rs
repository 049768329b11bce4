//! Shared helper for command handlers: populates the relational fields
//! (`labels`, `blocked_by`) that every raw storage read leaves empty, and
//! resolves the category each issue is currently in.

use std::collections::HashMap;

use loom_core::enums::Category;
use loom_core::issue::Issue;
use loom_storage::WorkFilter;

use crate::context::RuntimeContext;
use crate::error::CliResult;

/// Enriches a batch of issues for display: labels, blocked-by ids, and
/// category. Computes the blocked map once for the whole batch rather than
/// calling `get_blocked` per issue.
pub fn enrich(ctx: &RuntimeContext, issues: Vec<Issue>) -> CliResult<Vec<(Issue, Category, bool)>> {
    let blocked: HashMap<String, Vec<String>> = ctx
        .engine
        .get_blocked(&WorkFilter::default())?
        .into_iter()
        .map(|b| (b.issue.id, b.blocked_by))
        .collect();

    let mut out = Vec::with_capacity(issues.len());
    for mut issue in issues {
        issue.labels = ctx.store.get_labels(&issue.id)?;
        let category = ctx
            .registry
            .get_category(&issue.issue_type, &issue.status)
            .unwrap_or(Category::Open);
        let blocked_by = blocked.get(&issue.id).cloned().unwrap_or_default();
        let is_blocked = !blocked_by.is_empty();
        issue.blocked_by = blocked_by;
        out.push((issue, category, is_blocked));
    }
    Ok(out)
}

/// Single-issue convenience wrapper around [`enrich`].
pub fn enrich_one(ctx: &RuntimeContext, issue: Issue) -> CliResult<(Issue, Category, bool)> {
    Ok(enrich(ctx, vec![issue])?.into_iter().next().expect("enrich preserves length"))
}
