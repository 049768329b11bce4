//! `loom update` -- update issue fields.

use loom_engine::UpdateRequest;

use crate::cli::UpdateArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::fields;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: UpdateArgs) -> CliResult<()> {
    let current = ctx.store.get_issue(&args.id)?;
    let template = ctx.registry.get_type(&current.issue_type);
    let field_values = fields::parse_fields(&args.fields, template.as_ref())?;

    let request = UpdateRequest {
        status: args.status,
        priority: args.priority,
        title: args.title,
        assignee: args.assignee,
        description: args.description,
        notes: args.notes,
        parent_id: args.parent.map(|p| if p.is_empty() { None } else { Some(p) }),
        fields: if field_values.is_empty() { None } else { Some(field_values) },
    };

    let outcome = ctx.engine.update_issue(&args.id, &request, &ctx.actor)?;
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
    Ok(())
}
