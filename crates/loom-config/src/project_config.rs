//! Load/save of `<projectDir>/config.json`.

use std::path::Path;

use loom_core::project_config::ProjectConfig;

use crate::error::{ConfigError, Result};

const CONFIG_FILE_NAME: &str = "config.json";

pub fn load(project_dir: &Path) -> Result<ProjectConfig> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}

/// Writes `config.json`, creating `project_dir` if needed.
pub fn save(project_dir: &Path, config: &ProjectConfig) -> Result<()> {
    std::fs::create_dir_all(project_dir).map_err(|source| ConfigError::Write {
        path: project_dir.display().to_string(),
        source,
    })?;
    let path = project_dir.join(CONFIG_FILE_NAME);
    let json = serde_json::to_string_pretty(config).expect("ProjectConfig always serializes");
    std::fs::write(&path, json).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = ProjectConfig::new("lm");
        save(tmp.path(), &cfg).unwrap();
        let loaded = load(tmp.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
