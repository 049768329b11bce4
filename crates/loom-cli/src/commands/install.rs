//! `loom install` -- idempotent post-init scaffolding: ensure packs/templates
//! directories and the database exist, then reload the template registry.

use crate::commands::init::ensure_scaffold;
use crate::context::RuntimeContext;
use crate::error::CliResult;

pub fn run(ctx: &RuntimeContext) -> CliResult<()> {
    ensure_scaffold(&ctx.project_dir)?;
    ctx.registry.reload();
    if !ctx.quiet {
        println!("scaffold ensured in {}", ctx.project_dir.display());
    }
    Ok(())
}
