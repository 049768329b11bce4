//! `loom ready` -- show ready work items (open, no active blockers).

use loom_storage::WorkFilter;

use crate::cli::ReadyArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_row, issue_to_json, output_json, output_table};
use crate::util::enrich;

pub fn run(ctx: &RuntimeContext, args: ReadyArgs) -> CliResult<()> {
    let filter = WorkFilter {
        issue_type: args.issue_type,
        assignee: args.assignee,
        limit: args.limit,
    };
    let issues = ctx.engine.get_ready(&filter)?;
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
