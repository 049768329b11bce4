//! `loom deps` -- manage dependencies between issues.

use crate::cli::{DepsArgs, DepsCommands};
use crate::context::RuntimeContext;
use crate::error::CliResult;

pub fn run(ctx: &RuntimeContext, args: DepsArgs) -> CliResult<()> {
    match args.command {
        DepsCommands::Add(add) => {
            ctx.engine.add_dependency(&add.from, &add.to, &ctx.actor)?;
            ctx.refresh_snapshot();
            if !ctx.quiet {
                println!("{} now blocks {}", add.from, add.to);
            }
        }
        DepsCommands::Rm(rm) => {
            ctx.engine.remove_dependency(&rm.from, &rm.to, &ctx.actor)?;
            ctx.refresh_snapshot();
            if !ctx.quiet {
                println!("removed dependency {} -> {}", rm.from, rm.to);
            }
        }
    }
    Ok(())
}
