//! `loom templates` -- manage the type template registry.

use crate::cli::{TemplatesArgs, TemplatesCommands};
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: TemplatesArgs) -> CliResult<()> {
    match args.command {
        TemplatesCommands::List => list(ctx),
        TemplatesCommands::Reload => reload(ctx),
    }
}

fn list(ctx: &RuntimeContext) -> CliResult<()> {
    let types = ctx.registry.list_types();
    if ctx.json {
        output_json(&types);
    } else {
        for t in &types {
            println!("{} ({}) -- {}", t.type_name, t.pack, t.display_name);
        }
    }
    report_load_issues(ctx);
    Ok(())
}

fn reload(ctx: &RuntimeContext) -> CliResult<()> {
    ctx.registry.reload();
    if !ctx.quiet {
        println!("reloaded template registry");
    }
    report_load_issues(ctx);
    Ok(())
}

fn report_load_issues(ctx: &RuntimeContext) {
    let issues = ctx.registry.load_issues();
    if issues.is_empty() {
        return;
    }
    for issue in &issues {
        eprintln!("warning: {issue:?}");
    }
}
