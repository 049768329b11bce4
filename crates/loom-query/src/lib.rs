//! `QueryService` + `SummaryGen`: read-only reporting over the issue store --
//! flow metrics, activity feed, release progress trees, and the
//! deterministic `context.md` snapshot (spec.md §4.6, §4.7).
//!
//! This crate has no mutation path of its own; it composes `loom-storage`
//! reads and `loom-engine` queries (ready/blocked/critical-path) into
//! higher-level views.

pub mod activity;
pub mod error;
pub mod metrics;
pub mod needs_attention;
pub mod release_tree;
pub mod summary;

pub use activity::{activity_feed, ActivityFilter};
pub use error::{QueryError, Result};
pub use metrics::{flow_metrics, FlowMetrics, TypeBreakdown};
pub use needs_attention::{needs_attention, AttentionItem};
pub use release_tree::{release_tree, ReleaseNode};
pub use summary::{build_snapshot, render, write_snapshot, CategoryCounts, Snapshot, TypeVitals};
