//! `loom release` -- release a claimed issue back to its initial open state.

use crate::cli::ReleaseArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: ReleaseArgs) -> CliResult<()> {
    let issue = ctx.engine.release_claim(&args.id, &ctx.actor)?;
    ctx.refresh_snapshot();

    let (issue, category, blocked) = enrich_one(ctx, issue)?;
    if ctx.json {
        output_json(&issue_to_json(&issue, category, blocked));
    } else if !ctx.quiet {
        println!("{}", format_issue_detail(&issue, category, blocked));
    }
    Ok(())
}
