//! Workflow packs: bundles of related type templates plus documentation.

use serde::{Deserialize, Serialize};

use crate::template::TypeTemplate;

/// Size caps from the data model (§3).
pub mod limits {
    pub const MAX_TYPES_PER_PACK: usize = 20;
    pub const MAX_PACK_FILE_BYTES: usize = 512 * 1024;
}

/// A named relationship between two types within (or across) packs, e.g.
/// "epic has_children feature".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_type: String,
    pub relation: String,
    pub to_type: String,
}

/// A bundle of related type templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPack {
    pub name: String,
    pub version: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub types: Vec<TypeTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_packs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_pack_relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guide: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PackError {
    #[error("pack {0:?} declares {1} types, more than the {} limit", limits::MAX_TYPES_PER_PACK)]
    TooManyTypes(String, usize),

    #[error("pack {pack:?} type {type_name:?}: {source}")]
    InvalidType {
        pack: String,
        type_name: String,
        #[source]
        source: crate::template::TemplateError,
    },
}

impl WorkflowPack {
    pub fn validate(&self) -> Result<(), PackError> {
        if self.types.len() > limits::MAX_TYPES_PER_PACK {
            return Err(PackError::TooManyTypes(self.name.clone(), self.types.len()));
        }
        for t in &self.types {
            t.validate().map_err(|source| PackError::InvalidType {
                pack: self.name.clone(),
                type_name: t.type_name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Category;
    use crate::template::StateDef;

    fn minimal_type(name: &str) -> TypeTemplate {
        TypeTemplate {
            type_name: name.into(),
            display_name: name.into(),
            description: String::new(),
            pack: "core".into(),
            states: vec![StateDef {
                name: "open".into(),
                category: Category::Open,
            }],
            initial_state: "open".into(),
            transitions: vec![],
            fields_schema: vec![],
            suggested_children: vec![],
            suggested_labels: vec![],
        }
    }

    #[test]
    fn valid_pack_passes() {
        let pack = WorkflowPack {
            name: "core".into(),
            version: "1.0.0".into(),
            display_name: "Core".into(),
            description: String::new(),
            types: vec![minimal_type("task")],
            requires_packs: vec![],
            relationships: vec![],
            cross_pack_relationships: vec![],
            guide: String::new(),
        };
        assert!(pack.validate().is_ok());
    }

    #[test]
    fn too_many_types_rejected() {
        let pack = WorkflowPack {
            name: "bloated".into(),
            version: "1.0.0".into(),
            display_name: "Bloated".into(),
            description: String::new(),
            types: (0..21).map(|i| minimal_type(&format!("t{i}"))).collect(),
            requires_packs: vec![],
            relationships: vec![],
            cross_pack_relationships: vec![],
            guide: String::new(),
        };
        assert!(matches!(pack.validate(), Err(PackError::TooManyTypes(_, 21))));
    }
}
