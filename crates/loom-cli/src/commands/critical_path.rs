//! `loom critical-path` -- show the longest chain of non-done issues
//! through the dependency graph.

use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> CliResult<()> {
    let chain = ctx.engine.get_critical_path()?;

    if ctx.json {
        output_json(&chain);
        return Ok(());
    }

    for (i, issue) in chain.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, issue.id, issue.title);
    }
    Ok(())
}
