//! Discovery of the loom project root: the directory containing `config.json`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Highest-priority override: if set, this directory is used directly
/// without walking the filesystem.
const PROJECT_DIR_ENV: &str = "LOOM_DIR";

const CONFIG_FILE_NAME: &str = "config.json";

/// Walk up the directory tree from `start` looking for a directory
/// containing `config.json`. Checks `LOOM_DIR` first.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(PROJECT_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.join(CONFIG_FILE_NAME).is_file() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }
    None
}

/// Like [`find_project_dir`], but returns [`ConfigError::ProjectNotFound`]
/// instead of `None`.
pub fn find_project_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_project_dir(start).ok_or(ConfigError::ProjectNotFound)
}
