//! `loom doctor` -- health checks against the project, its store, and its
//! dashboard process (spec.md §4.5, §4.7).
//!
//! Reports problems rather than failing the command: a bad health report is
//! useful output, not a reason for a non-zero exit that would obscure it.

use loom_core::project_config::Mode;

use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> CliResult<()> {
    let stats = ctx.store.get_statistics()?;
    let load_issues = ctx.registry.load_issues();

    let dashboard_report = match ctx.config.mode() {
        Mode::Ethereal => {
            let health = loom_lifecycle::check_ethereal_health(&ctx.project_dir);
            let ok = health.pid_file_exists && health.process_alive && health.port_reachable;
            (
                ok,
                serde_json::json!({
                    "mode": "ethereal",
                    "pid_file_exists": health.pid_file_exists,
                    "process_alive": health.process_alive,
                    "port_reachable": health.port_reachable,
                    "log_tail": health.log_tail,
                }),
            )
        }
        Mode::Server => {
            let health = loom_lifecycle::check_server_health()?;
            let ok = health.daemon_alive && health.missing_projects.is_empty();
            (
                ok,
                serde_json::json!({
                    "mode": "server",
                    "daemon_alive": health.daemon_alive,
                    "missing_projects": health.missing_projects,
                }),
            )
        }
    };

    let ok = dashboard_report.0 && load_issues.is_empty();

    if ctx.json {
        output_json(&serde_json::json!({
            "ok": ok,
            "dashboard": dashboard_report.1,
            "statistics": stats,
            "template_load_issues": load_issues.iter().map(|i| serde_json::json!({
                "path": i.path,
                "message": i.message,
            })).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!("project: {}", ctx.project_dir.display());
    println!("issues: {}", stats.total_issues);
    println!();

    println!("dashboard: {}", if dashboard_report.0 { "ok" } else { "problem" });
    match ctx.config.mode() {
        Mode::Ethereal => {
            let health = loom_lifecycle::check_ethereal_health(&ctx.project_dir);
            println!("  pid file exists: {}", health.pid_file_exists);
            println!("  process alive:   {}", health.process_alive);
            println!("  port reachable:  {}", health.port_reachable);
            if let Some(tail) = health.log_tail {
                println!("  log tail:\n{tail}");
            }
        }
        Mode::Server => {
            let health = loom_lifecycle::check_server_health()?;
            println!("  daemon alive: {}", health.daemon_alive);
            if !health.missing_projects.is_empty() {
                println!("  missing projects: {}", health.missing_projects.join(", "));
            }
        }
    }

    if load_issues.is_empty() {
        println!("templates: ok");
    } else {
        println!("templates: {} issue(s)", load_issues.len());
        for issue in &load_issues {
            println!("  {}: {}", issue.path, issue.message);
        }
    }

    if !ok {
        println!();
        println!("doctor found problems -- see above");
    }
    Ok(())
}
