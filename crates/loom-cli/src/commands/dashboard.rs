//! `loom dashboard` -- start (or reuse) the ethereal per-project dashboard
//! and print its URL (spec.md §4.5).

use std::process::Command;

use crate::cli::DashboardArgs;
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: DashboardArgs) -> CliResult<()> {
    let exe = std::env::current_exe()?;
    let project_dir = ctx.project_dir.clone();
    let spawn_dir = project_dir.clone();

    let info = loom_lifecycle::ensure_dashboard(&project_dir, move |port| spawn_serve(&exe, &spawn_dir, port))?;

    if ctx.json {
        output_json(&serde_json::json!({ "url": info.url, "pid": info.pid, "port": info.port }));
    } else if !ctx.quiet {
        println!("dashboard running at {}", info.url);
    }

    if !args.no_open {
        let _ = open_browser(&info.url);
    }
    Ok(())
}

fn spawn_serve(exe: &std::path::Path, project_dir: &std::path::Path, port: u16) -> Command {
    let mut command = Command::new(exe);
    command
        .arg("__serve")
        .arg("--project")
        .arg(project_dir)
        .arg("--port")
        .arg(port.to_string());
    command
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).status()?;
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).status()?;
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd").args(["/C", "start", "", url]).status()?;
    }
    Ok(())
}
