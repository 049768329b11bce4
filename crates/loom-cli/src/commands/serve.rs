//! Hidden `loom __serve` subcommand: runs the dashboard HTTP API in the
//! foreground. Spawned by `dashboard` and `server start`; never invoked
//! directly by a user.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use loom_config::project_config;
use loom_engine::IssueEngine;
use loom_storage::SqliteStore;
use loom_templates::TemplateRegistry;

use crate::cli::ServeArgs;
use crate::error::CliResult;

pub fn run(args: ServeArgs) -> CliResult<()> {
    let project_dir = PathBuf::from(&args.project);
    let config = project_config::load(&project_dir)?;

    let store: Arc<SqliteStore> = Arc::new(SqliteStore::open(project_dir.join("loom.db"))?);
    let registry = Arc::new(TemplateRegistry::new(&project_dir));
    let engine = Arc::new(IssueEngine::new(store.clone(), registry.clone(), config.prefix.clone()));
    let state = loom_dashboard::AppState::new(store, registry, engine);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(crate::error::CliError::Io)?;
    runtime
        .block_on(loom_dashboard::serve_until_signal(state, addr))
        .map_err(crate::error::CliError::Io)?;
    Ok(())
}
