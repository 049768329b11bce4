//! Type templates: per-type state machines loaded by the registry.

use serde::{Deserialize, Serialize};

use crate::enums::{Category, Enforcement};
use crate::validation::is_valid_type_name;

/// Size caps enforced at parse time (spec data model, §3).
pub mod limits {
    pub const MAX_STATES: usize = 50;
    pub const MAX_TRANSITIONS: usize = 200;
    pub const MAX_FIELDS: usize = 50;
}

/// A single state in a type's state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub name: String,
    pub category: Category,
}

/// An allowed (or at least named) state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub from: String,
    pub to: String,
    #[serde(default = "default_enforcement")]
    pub enforcement: Enforcement,
    #[serde(default)]
    pub requires_fields: Vec<String>,
}

fn default_enforcement() -> Enforcement {
    Enforcement::Soft
}

/// The kind of value a custom field holds. Mirrors [`crate::field_value::FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Int,
    Date,
    Bool,
    List,
    Enum,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Int => "int",
            FieldType::Date => "date",
            FieldType::Bool => "bool",
            FieldType::List => "list",
            FieldType::Enum => "enum",
        }
    }
}

/// A custom field declared by a type template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Valid symbols when `field_type == Enum`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// States at which this field becomes `required_at` (soft/hard
    /// enforcement is declared on the transition, not here; this is the
    /// set of states in which the field is expected to exist at all).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_at: Vec<String>,
}

/// Immutable per-type state machine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTemplate {
    #[serde(rename = "type")]
    pub type_name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub pack: String,
    pub states: Vec<StateDef>,
    pub initial_state: String,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    #[serde(default)]
    pub fields_schema: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_children: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_labels: Vec<String>,
}

/// Template parse/consistency errors, surfaced as `TEMPLATE_PARSE` upward.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("too many states: {0} (max {})", limits::MAX_STATES)]
    TooManyStates(usize),

    #[error("too many transitions: {0} (max {})", limits::MAX_TRANSITIONS)]
    TooManyTransitions(usize),

    #[error("too many fields: {0} (max {})", limits::MAX_FIELDS)]
    TooManyFields(usize),

    #[error("initial_state {0:?} is not one of this type's states")]
    InitialStateUnknown(String),

    #[error("transition references unknown state {0:?}")]
    TransitionStateUnknown(String),

    #[error("transition requires_fields entry {0:?} is not declared in fields_schema")]
    RequiresFieldUnknown(String),

    #[error("fields_schema entry {0:?} has required_at state {1:?} that does not exist")]
    RequiredAtStateUnknown(String, String),

    #[error("duplicate state name {0:?}")]
    DuplicateState(String),
}

impl TypeTemplate {
    /// Validates the consistency rules from the data model: `initial_state`
    /// exists, every transition endpoint exists, every `requires_fields`
    /// entry is declared, every `required_at` entry is a real state, and
    /// the size caps hold.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if !is_valid_type_name(&self.type_name) {
            return Err(TemplateError::InvalidTypeName(self.type_name.clone()));
        }
        if self.states.len() > limits::MAX_STATES {
            return Err(TemplateError::TooManyStates(self.states.len()));
        }
        if self.transitions.len() > limits::MAX_TRANSITIONS {
            return Err(TemplateError::TooManyTransitions(self.transitions.len()));
        }
        if self.fields_schema.len() > limits::MAX_FIELDS {
            return Err(TemplateError::TooManyFields(self.fields_schema.len()));
        }

        let mut seen = std::collections::HashSet::new();
        for s in &self.states {
            if !seen.insert(s.name.as_str()) {
                return Err(TemplateError::DuplicateState(s.name.clone()));
            }
        }

        if !seen.contains(self.initial_state.as_str()) {
            return Err(TemplateError::InitialStateUnknown(self.initial_state.clone()));
        }

        for t in &self.transitions {
            if !seen.contains(t.from.as_str()) {
                return Err(TemplateError::TransitionStateUnknown(t.from.clone()));
            }
            if !seen.contains(t.to.as_str()) {
                return Err(TemplateError::TransitionStateUnknown(t.to.clone()));
            }
            for f in &t.requires_fields {
                if !self.fields_schema.iter().any(|fs| &fs.name == f) {
                    return Err(TemplateError::RequiresFieldUnknown(f.clone()));
                }
            }
        }

        for fs in &self.fields_schema {
            for state in &fs.required_at {
                if !seen.contains(state.as_str()) {
                    return Err(TemplateError::RequiredAtStateUnknown(
                        fs.name.clone(),
                        state.clone(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn category_of(&self, state: &str) -> Option<Category> {
        self.states.iter().find(|s| s.name == state).map(|s| s.category)
    }

    pub fn transition(&self, from: &str, to: &str) -> Option<&TransitionDef> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
    }
}
