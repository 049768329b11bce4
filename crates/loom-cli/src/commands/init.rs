//! `loom init` -- initialize a loom project in the current directory.

use std::path::Path;

use loom_config::project_dir::find_project_dir;
use loom_config::project_config;
use loom_core::project_config::ProjectConfig;
use loom_storage::SqliteStore;

use crate::cli::{GlobalArgs, InitArgs, InitMode};
use crate::error::{CliError, CliResult};

pub fn run(global: &GlobalArgs, args: InitArgs) -> CliResult<()> {
    let project_dir = std::env::current_dir()?;

    if find_project_dir(&project_dir).is_some() {
        return Err(CliError::invalid_input(
            "a loom project already exists here (or in a parent directory)",
        ));
    }

    let prefix = args.prefix.unwrap_or_else(|| default_prefix(&project_dir));
    let mut config = ProjectConfig::new(prefix);
    config.mode = match args.mode {
        InitMode::Ethereal => "ethereal".to_string(),
        InitMode::Server => "server".to_string(),
    };

    project_config::save(&project_dir, &config)?;
    ensure_scaffold(&project_dir)?;

    if !global.quiet {
        println!(
            "initialized loom project with prefix {:?} in {}",
            config.prefix,
            project_dir.display()
        );
    }
    Ok(())
}

fn default_prefix(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|name| {
            name.to_string_lossy()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .take(3)
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "lm".to_string())
}

/// Idempotent scaffolding shared by `init` and `install`: pack/template
/// override directories and the SQLite store.
pub fn ensure_scaffold(project_dir: &Path) -> CliResult<()> {
    std::fs::create_dir_all(project_dir.join("packs"))?;
    std::fs::create_dir_all(project_dir.join("templates"))?;
    SqliteStore::open(project_dir.join("loom.db"))?;
    Ok(())
}
