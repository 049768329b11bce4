//! `loom blocked` -- show blocked issues and what blocks them.

use loom_storage::WorkFilter;

use crate::cli::BlockedArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_table;

pub fn run(ctx: &RuntimeContext, args: BlockedArgs) -> CliResult<()> {
    let filter = WorkFilter {
        issue_type: args.issue_type,
        assignee: args.assignee,
        limit: None,
    };
    let blocked = ctx.engine.get_blocked(&filter)?;

    if ctx.json {
        crate::output::output_json(&blocked);
        return Ok(());
    }

    let headers = ["ID", "Title", "Blocked by"];
    let rows: Vec<_> = blocked
        .iter()
        .map(|b| vec![b.issue.id.clone(), b.issue.title.clone(), b.blocked_by.join(", ")])
        .collect();
    output_table(&headers, &rows);
    Ok(())
}
