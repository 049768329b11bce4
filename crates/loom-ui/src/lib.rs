//! Terminal UI components for the loom CLI.
//!
//! Provides Ayu-themed color styling, terminal detection, and pager support
//! for CLI output.

pub mod pager;
pub mod styles;
pub mod terminal;
