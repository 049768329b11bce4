//! `loom close` -- close one or more issues.

use crate::cli::CloseArgs;
use crate::context::RuntimeContext;
use crate::error::{CliError, CliResult};
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: CloseArgs) -> CliResult<()> {
    if args.ids.len() == 1 {
        let outcome = ctx.engine.close_issue(&args.ids[0], args.status.as_deref(), args.reason.as_deref(), &ctx.actor)?;
        ctx.refresh_snapshot();

        if !ctx.quiet {
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
        }

        let (issue, category, blocked) = enrich_one(ctx, outcome.issue)?;
        if ctx.json {
            output_json(&issue_to_json(&issue, category, blocked));
        } else if !ctx.quiet {
            println!("{}", format_issue_detail(&issue, category, blocked));
        }
        return Ok(());
    }

    if args.status.is_some() {
        return Err(CliError::invalid_input(
            "--status can only be used when closing a single issue",
        ));
    }

    let result = ctx.engine.batch_close(&args.ids, args.reason.as_deref(), &ctx.actor);
    ctx.refresh_snapshot();

    if ctx.json {
        output_json(&serde_json::json!({
            "succeeded": result.succeeded,
            "failed": result.failed.iter().map(|f| serde_json::json!({
                "id": f.id,
                "error": f.error,
                "valid_transitions": f.valid_transitions,
            })).collect::<Vec<_>>(),
            "warnings": result.warnings.iter().map(|w| serde_json::json!({
                "id": w.id,
                "warnings": w.warnings,
            })).collect::<Vec<_>>(),
        }));
    } else if !ctx.quiet {
        for id in &result.succeeded {
            println!("closed {id}");
        }
        for warning in &result.warnings {
            for message in &warning.warnings {
                eprintln!("warning: {}: {message}", warning.id);
            }
        }
        for failure in &result.failed {
            eprintln!("failed to close {}: {}", failure.id, failure.error);
        }
    }

    if !result.failed.is_empty() {
        return Err(CliError::invalid_input(format!(
            "{} of {} issue(s) failed to close",
            result.failed.len(),
            args.ids.len()
        )));
    }
    Ok(())
}
