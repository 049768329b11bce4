//! `loom create` -- create a new issue.

use crate::cli::CreateArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::fields;
use crate::output::{format_issue_detail, issue_to_json, output_json};
use crate::util::enrich_one;

pub fn run(ctx: &RuntimeContext, args: CreateArgs) -> CliResult<()> {
    let template = ctx.registry.get_type(&args.r#type);
    let field_values = fields::parse_fields(&args.fields, template.as_ref())?;

    let issue = ctx.engine.create_issue(
        &args.title,
        &args.r#type,
        args.priority,
        args.parent.as_deref(),
        args.description.as_deref(),
        if field_values.is_empty() { None } else { Some(field_values) },
        &args.labels,
        &args.deps,
        &ctx.actor,
    )?;

    ctx.refresh_snapshot();

    let (issue, category, blocked) = enrich_one(ctx, issue)?;
    if ctx.json {
        output_json(&issue_to_json(&issue, category, blocked));
    } else if !ctx.quiet {
        println!("{}", format_issue_detail(&issue, category, blocked));
    }
    Ok(())
}
