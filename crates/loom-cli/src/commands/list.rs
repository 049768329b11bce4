//! `loom list` -- list issues with filtering and formatting.

use crate::cli::ListArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_detail, format_issue_row, issue_to_json, output_json, output_table};
use crate::util::enrich;

pub fn run(ctx: &RuntimeContext, args: ListArgs) -> CliResult<()> {
    let issues = ctx.engine.list_issues(args.status.as_deref(), args.issue_type.as_deref())?;
    let enriched = enrich(ctx, issues)?;

    if ctx.json {
        let values: Vec<_> = enriched
            .iter()
            .map(|(issue, category, blocked)| issue_to_json(issue, *category, *blocked))
            .collect();
        output_json(&values);
        return Ok(());
    }

    if ctx.quiet {
        for (issue, _, _) in &enriched {
            println!("{}", issue.id);
        }
        return Ok(());
    }

    if args.long {
        for (i, (issue, category, blocked)) in enriched.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", format_issue_detail(issue, *category, *blocked));
        }
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
