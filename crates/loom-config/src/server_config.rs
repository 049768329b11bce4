//! Load/save of the global `server.toml` (registered server-mode projects)
//! and the user config directory it and its sibling `server.pid`/`server.log`
//! live in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

const SERVER_TOML: &str = "server.toml";
const SERVER_PID: &str = "server.pid";
const SERVER_LOG: &str = "server.log";

/// One entry under `server.toml`'s `[projects]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredProject {
    pub prefix: String,
}

/// The contents of `server.toml`: the shared dashboard's listening port and
/// the set of projects it serves, keyed by absolute project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default)]
    pub projects: BTreeMap<String, RegisteredProject>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8420,
            projects: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn register(&mut self, project_dir: &Path, prefix: impl Into<String>) {
        self.projects.insert(
            project_dir.display().to_string(),
            RegisteredProject { prefix: prefix.into() },
        );
    }

    pub fn unregister(&mut self, project_dir: &Path) -> bool {
        self.projects.remove(&project_dir.display().to_string()).is_some()
    }
}

/// The directory `server.toml`/`server.pid`/`server.log` live in: the
/// platform user config directory, under a `loom` subdirectory.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("loom"))
        .ok_or(ConfigError::NoUserConfigDir)
}

pub fn server_toml_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(SERVER_TOML))
}

pub fn server_pid_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(SERVER_PID))
}

pub fn server_log_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(SERVER_LOG))
}

/// Loads `server.toml`, returning a fresh default if it doesn't exist yet.
pub fn load() -> Result<ServerConfig> {
    let path = server_toml_path()?;
    if !path.is_file() {
        return Ok(ServerConfig::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
        path: path.display().to_string(),
        source,
    })
}

pub fn save(config: &ServerConfig) -> Result<()> {
    let dir = user_config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Write {
        path: dir.display().to_string(),
        source,
    })?;
    let path = server_toml_path()?;
    let toml_str = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(&path, toml_str).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_empty_projects() {
        let cfg = ServerConfig::default();
        assert!(cfg.projects.is_empty());
        assert_eq!(cfg.port, 8420);
    }

    #[test]
    fn register_and_unregister_roundtrip() {
        let mut cfg = ServerConfig::default();
        cfg.register(Path::new("/tmp/proj"), "pj");
        assert_eq!(cfg.projects.len(), 1);
        assert!(cfg.unregister(Path::new("/tmp/proj")));
        assert!(cfg.projects.is_empty());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = ServerConfig::default();
        cfg.register(Path::new("/tmp/proj"), "pj");
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let back: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, cfg);
    }
}
