//! `loom claim-next` -- claim the next ready issue matching a filter.

use loom_engine::ClaimNextFilter;

use crate::cli::ClaimNextArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: ClaimNextArgs) -> CliResult<()> {
    let assignee = args.assignee.unwrap_or_else(|| ctx.actor.clone());
    let filter = ClaimNextFilter {
        issue_type: args.r#type,
        priority_min: args.priority_min,
        priority_max: args.priority_max,
    };

    let claimed = ctx.engine.claim_next(&assignee, &filter, &ctx.actor)?;

    match claimed {
        Some(issue) => {
            ctx.refresh_snapshot();
            let (issue, category, blocked) = enrich_one(ctx, issue)?;
            if ctx.json {
                output_json(&issue_to_json(&issue, category, blocked));
            } else if !ctx.quiet {
                println!("{}", format_issue_detail(&issue, category, blocked));
            }
        }
        None => {
            if ctx.json {
                output_json(&serde_json::json!({ "claimed": false }));
            } else if !ctx.quiet {
                println!("no ready issue matched");
            }
        }
    }
    Ok(())
}
