//! `loom show` -- display issue details.

use crate::cli::ShowArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: ShowArgs) -> CliResult<()> {
    let issue = ctx.store.get_issue(&args.id)?;
    let (issue, category, blocked) = enrich_one(ctx, issue)?;

    if ctx.json {
        output_json(&issue_to_json(&issue, category, blocked));
    } else {
        println!("{}", format_issue_detail(&issue, category, blocked));
    }
    Ok(())
}
