//! Type template and workflow pack registry.
//!
//! Loads the built-in packs baked into the binary, installed packs from
//! `<projectDir>/packs/*.json`, and project-local overrides from
//! `<projectDir>/templates/*.json`, and answers the category and
//! transition-validation queries the engine needs. See [`TemplateRegistry`].

pub mod error;
pub mod registry;

pub use error::{LoadIssue, TemplatesError};
pub use registry::{TemplateRegistry, TransitionOption, TransitionResult};
