//! Dependency types -- directed relationships between issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_kind() -> String {
    "blocks".to_string()
}

fn is_default_kind(k: &str) -> bool {
    k == "blocks"
}

/// A directed edge: `from_id` depends on / is related to `to_id`.
///
/// Only `kind == "blocks"` participates in readiness and cycle-detection;
/// other kinds (e.g. `"related"`) are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from_id: String,

    pub to_id: String,

    #[serde(default = "default_kind", skip_serializing_if = "is_default_kind")]
    pub kind: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Dependency {
    pub fn blocks(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind: default_kind(),
            created_at: Utc::now(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.kind == "blocks"
    }
}
