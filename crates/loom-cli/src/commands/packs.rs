//! `loom packs` -- manage installed workflow packs.

use loom_core::pack::WorkflowPack;

use crate::cli::{PacksArgs, PacksCommands};
use crate::context::RuntimeContext;
use crate::error::CliResult;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: PacksArgs) -> CliResult<()> {
    match args.command {
        PacksCommands::List => list(ctx),
        PacksCommands::Install(install) => install_pack(ctx, &install.path),
        PacksCommands::Enable(enable) => set_enabled(ctx, &enable.name, true),
        PacksCommands::Disable(disable) => set_enabled(ctx, &disable.name, false),
    }
}

fn list(ctx: &RuntimeContext) -> CliResult<()> {
    let packs = ctx.registry.list_packs();
    if ctx.json {
        output_json(&packs);
        return Ok(());
    }
    for pack in &packs {
        let enabled = if ctx.config.enabled_packs.iter().any(|p| p == &pack.name) {
            "enabled"
        } else {
            "disabled"
        };
        println!("{} ({enabled}) -- {}", pack.name, pack.display_name);
    }
    Ok(())
}

fn install_pack(ctx: &RuntimeContext, path: &str) -> CliResult<()> {
    let contents = std::fs::read_to_string(path)?;
    let pack: WorkflowPack = serde_json::from_str(&contents)?;
    pack.validate()?;

    let packs_dir = ctx.project_dir.join("packs");
    std::fs::create_dir_all(&packs_dir)?;
    std::fs::write(packs_dir.join(format!("{}.json", pack.name)), &contents)?;

    let mut config = ctx.config.clone();
    if !config.enabled_packs.iter().any(|p| p == &pack.name) {
        config.enabled_packs.push(pack.name.clone());
    }
    loom_config::project_config::save(&ctx.project_dir, &config)?;
    ctx.registry.reload();

    if !ctx.quiet {
        println!("installed pack {}", pack.name);
    }
    Ok(())
}

fn set_enabled(ctx: &RuntimeContext, name: &str, enabled: bool) -> CliResult<()> {
    let mut config = ctx.config.clone();
    if enabled {
        if !config.enabled_packs.iter().any(|p| p == name) {
            config.enabled_packs.push(name.to_string());
        }
    } else {
        config.enabled_packs.retain(|p| p != name);
    }
    loom_config::project_config::save(&ctx.project_dir, &config)?;
    ctx.registry.reload();

    if !ctx.quiet {
        println!("{} {name}", if enabled { "enabled" } else { "disabled" });
    }
    Ok(())
}
