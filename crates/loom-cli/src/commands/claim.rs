//! `loom claim` -- claim an issue for an assignee.

use crate::cli::ClaimArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: ClaimArgs) -> CliResult<()> {
    let assignee = args.assignee.unwrap_or_else(|| ctx.actor.clone());
    let issue = ctx.engine.claim_issue(&args.id, &assignee, &ctx.actor)?;
    ctx.refresh_snapshot();

    let (issue, category, blocked) = enrich_one(ctx, issue)?;
    if ctx.json {
        output_json(&issue_to_json(&issue, category, blocked));
    } else if !ctx.quiet {
        println!("{}", format_issue_detail(&issue, category, blocked));
    }
    Ok(())
}
