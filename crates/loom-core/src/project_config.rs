//! `ProjectConfig` -- the `config.json` at the root of a loom project.

use serde::{Deserialize, Serialize};

fn default_enabled_packs() -> Vec<String> {
    vec!["core".to_string(), "planning".to_string()]
}

fn default_mode() -> String {
    "ethereal".to_string()
}

/// How the dashboard process is supervised. See `loom-lifecycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Spawned on demand, exits when idle; deterministic port per project.
    Ethereal,
    /// Long-lived daemon registered with the lifecycle manager.
    Server,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Ethereal
    }
}

/// Per-project configuration, read from and written to `<projectDir>/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Issue id prefix, e.g. `"lm"` for ids like `lm-ABCDEFGH`.
    pub prefix: String,

    #[serde(default = "schema_version_default")]
    pub version: u32,

    #[serde(default = "default_enabled_packs")]
    pub enabled_packs: Vec<String>,

    #[serde(default = "default_mode")]
    pub mode: String,

    /// Legacy fallback state list, used only when no template is loaded
    /// for an issue's type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workflow_states: Vec<String>,
}

fn schema_version_default() -> u32 {
    5
}

impl ProjectConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: schema_version_default(),
            enabled_packs: default_enabled_packs(),
            mode: default_mode(),
            workflow_states: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.mode == "server" {
            Mode::Server
        } else {
            Mode::Ethereal
        }
    }
}
