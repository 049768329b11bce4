//! Runtime context: project discovery, store/registry/engine construction,
//! and actor resolution.

use std::path::PathBuf;
use std::sync::Arc;

use loom_config::{project_config, project_dir::find_project_dir, ConfigError};
use loom_core::project_config::ProjectConfig;
use loom_engine::IssueEngine;
use loom_storage::{SqliteStore, Storage};
use loom_templates::TemplateRegistry;

use crate::cli::GlobalArgs;
use crate::error::CliResult;

const DB_FILE_NAME: &str = "loom.db";

/// Runtime context passed to every command handler. Constructed once in
/// `main` after CLI parsing, before command dispatch -- except for `init`
/// and `completion`, which don't need a project to already exist.
pub struct RuntimeContext {
    pub project_dir: PathBuf,
    pub config: ProjectConfig,
    pub store: Arc<dyn Storage>,
    pub registry: Arc<TemplateRegistry>,
    pub engine: IssueEngine,
    pub actor: String,
    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    /// Discovers the project rooted at the current directory (or
    /// `--project`), opens its store and template registry, and builds the
    /// engine.
    pub fn discover(global: &GlobalArgs) -> CliResult<Self> {
        let start = match &global.project {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir()?,
        };
        let project_dir = find_project_dir(&start).ok_or(ConfigError::ProjectNotFound)?;
        let config = project_config::load(&project_dir)?;

        let db_path = project_dir.join(DB_FILE_NAME);
        let store: Arc<dyn Storage> = Arc::new(SqliteStore::open(&db_path)?);
        let registry = Arc::new(TemplateRegistry::new(&project_dir));
        let engine = IssueEngine::new(Arc::clone(&store), Arc::clone(&registry), config.prefix.clone());
        let actor = resolve_actor(global.actor.as_deref());

        Ok(Self {
            project_dir,
            config,
            store,
            registry,
            engine,
            actor,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    /// Refreshes `context.md` after a mutating command (spec.md §4.7).
    /// Failures here are logged, not surfaced -- a stale snapshot is not a
    /// reason to fail the command that just succeeded.
    pub fn refresh_snapshot(&self) {
        match loom_query::summary::build_snapshot(&self.engine, self.store.as_ref(), &self.registry) {
            Ok(snapshot) => {
                if let Err(e) = loom_query::summary::write_snapshot(&self.project_dir, &snapshot) {
                    tracing::warn!(error = %e, "failed to refresh context.md");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to build snapshot for context.md"),
        }
    }
}

/// Resolves the acting username for the audit trail: explicit flag, then
/// `LOOM_ACTOR`, then `git config user.name`, then `$USER`/`$USERNAME`,
/// falling back to `"unknown"`.
pub fn resolve_actor(flag_value: Option<&str>) -> String {
    if let Some(actor) = flag_value {
        if !actor.is_empty() {
            return actor.to_string();
        }
    }

    if let Ok(actor) = std::env::var("LOOM_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(output) = std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
        if !user.is_empty() {
            return user;
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_actor_with_flag() {
        assert_eq!(resolve_actor(Some("alice")), "alice");
    }

    #[test]
    fn resolve_actor_empty_flag_falls_through() {
        let result = resolve_actor(Some(""));
        assert!(!result.is_empty());
    }

    #[test]
    fn resolve_actor_none_falls_through() {
        let result = resolve_actor(None);
        assert!(!result.is_empty());
    }
}
