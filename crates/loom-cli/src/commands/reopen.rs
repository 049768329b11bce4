//! `loom reopen` -- reopen a closed issue.
//!
//! Mirrors the target-state resolution `IssueEngine::close_issue` uses
//! internally, but in the opposite direction: first open-category state
//! declared for the issue's type, falling back to its initial state.

use loom_core::enums::Category;
use loom_engine::UpdateRequest;

use crate::cli::ReopenArgs;
use crate::context::RuntimeContext;
use crate::error::{CliError, CliResult};
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: ReopenArgs) -> CliResult<()> {
    let current = ctx.store.get_issue(&args.id)?;
    let category = ctx
        .registry
        .get_category(&current.issue_type, &current.status)
        .unwrap_or(Category::Open);

    if category != Category::Done {
        return Err(CliError::invalid_input(format!(
            "{} is not closed (status {:?} is not a done-category state)",
            args.id, current.status
        )));
    }

    let target = ctx
        .registry
        .get_first_state_of_category(&current.issue_type, Category::Open)
        .unwrap_or_else(|| ctx.registry.get_initial_state(&current.issue_type));

    let request = UpdateRequest {
        status: Some(target),
        ..Default::default()
    };
    let outcome = ctx.engine.update_issue(&args.id, &request, &ctx.actor)?;
    ctx.refresh_snapshot();

    let (issue, category, blocked) = enrich_one(ctx, outcome.issue)?;
    if ctx.json {
        output_json(&issue_to_json(&issue, category, blocked));
    } else if !ctx.quiet {
        println!("{}", format_issue_detail(&issue, category, blocked));
    }
    Ok(())
}
