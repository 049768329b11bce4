//! `loom search` -- full-text search across issues.

use loom_storage::IssueFilter;

use crate::cli::SearchArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_row, issue_to_json, output_json, output_table};
use crate::util::enrich;

pub fn run(ctx: &RuntimeContext, args: SearchArgs) -> CliResult<()> {
    let mut filter = IssueFilter {
        issue_type: args.issue_type,
        ..Default::default()
    };
    match args.status.as_deref() {
        Some("open") => filter.categories = ctx.registry.open_states(),
        Some("wip") => filter.categories = ctx.registry.wip_states(),
        Some("done") => filter.categories = ctx.registry.done_states(),
        Some(status) => filter.status = Some(status.to_string()),
        None => {}
    }

    let issues = ctx.store.search_issues(&args.query, &filter)?;
    let enriched = enrich(ctx, issues)?;

    if ctx.json {
        let values: Vec<_> = enriched
            .iter()
            .map(|(issue, category, blocked)| issue_to_json(issue, *category, *blocked))
            .collect();
        output_json(&values);
        return Ok(());
    }

    let headers = ["ID", "Pri", "Type", "Status", "Title", "Assignee"];
    let rows: Vec<_> = enriched
        .iter()
        .map(|(issue, category, blocked)| format_issue_row(issue, *category, *blocked))
        .collect();
    output_table(&headers, &rows);
    Ok(())
}
