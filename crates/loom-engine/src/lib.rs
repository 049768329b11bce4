//! Issue lifecycle engine.
//!
//! `loom-engine` sits between the template registry and the storage layer:
//! it is the only place that combines "what state is this issue in" with
//! "what does the loaded workflow pack say is allowed from there." Storage
//! knows nothing about categories or enforcement; the registry knows
//! nothing about persistence. This crate owns the policy that joins them.

pub mod engine;
pub mod error;

pub use engine::{
    BatchFailure, BatchResult, BatchWarning, ClaimNextFilter, IssueEngine, MutationOutcome,
    UpdateRequest,
};
pub use error::{EngineError, ErrorKind, Result};
