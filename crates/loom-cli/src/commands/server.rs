//! `loom server` -- manage the persistent multi-project server daemon
//! (spec.md §4.5).

use std::process::Command;

use crate::cli::{ServerArgs, ServerCommands};
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: ServerArgs) -> CliResult<()> {
    match args.command {
        ServerCommands::Start => start(ctx),
        ServerCommands::Stop => stop(ctx),
        ServerCommands::Status => status(ctx),
        ServerCommands::Register => register(ctx),
        ServerCommands::Unregister => unregister(ctx),
    }
}

fn start(ctx: &RuntimeContext) -> CliResult<()> {
    let exe = std::env::current_exe()?;
    let project_dir = ctx.project_dir.clone();

    let pid = loom_lifecycle::server::start(move |port| {
        let mut command = Command::new(&exe);
        command
            .arg("__serve")
            .arg("--project")
            .arg(&project_dir)
            .arg("--port")
            .arg(port.to_string());
        command
    })?;

    if !ctx.quiet {
        println!("server started (pid {pid})");
    }
    Ok(())
}

fn stop(ctx: &RuntimeContext) -> CliResult<()> {
    loom_lifecycle::server::stop()?;
    if !ctx.quiet {
        println!("server stopped");
    }
    Ok(())
}

fn status(ctx: &RuntimeContext) -> CliResult<()> {
    let status = loom_lifecycle::server::status()?;

    if ctx.json {
        output_json(&serde_json::json!({
            "running": status.running,
            "pid": status.pid,
            "projects": status.projects,
        }));
        return Ok(());
    }

    println!("running: {}", status.running);
    if let Some(pid) = status.pid {
        println!("pid: {pid}");
    }
    for project in &status.projects {
        println!("  {project}");
    }
    Ok(())
}

fn register(ctx: &RuntimeContext) -> CliResult<()> {
    loom_lifecycle::server::register(&ctx.project_dir, &ctx.config.prefix)?;
    if !ctx.quiet {
        println!("registered {} with the server daemon", ctx.project_dir.display());
    }
    Ok(())
}

fn unregister(ctx: &RuntimeContext) -> CliResult<()> {
    let removed = loom_lifecycle::server::unregister(&ctx.project_dir)?;
    if !ctx.quiet {
        println!("{}", if removed { "unregistered" } else { "was not registered" });
    }
    Ok(())
}
