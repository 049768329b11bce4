//! Flow metrics: throughput, cycle time, lead time, per-type breakdown
//! (spec.md §4.6).

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use loom_core::comment::Event;
use loom_core::enums::EventType;
use loom_storage::{IssueFilter, Storage};
use loom_templates::TemplateRegistry;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub issue_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FlowMetrics {
    pub window_days: i64,
    pub throughput: i64,
    pub cycle_time_mean_secs: Option<f64>,
    pub cycle_time_median_secs: Option<f64>,
    pub lead_time_mean_secs: Option<f64>,
    pub lead_time_median_secs: Option<f64>,
    pub by_type: Vec<TypeBreakdown>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Timestamp of the first `status_changed` event into a wip-category state,
/// or `None` if the issue's history never recorded one (e.g. closed directly
/// from an open state, or created already in a wip state).
fn first_wip_entry(events: &[Event], registry: &TemplateRegistry, issue_type: &str) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|e| e.event_type == EventType::StatusChanged)
        .find(|e| {
            e.new_value
                .as_deref()
                .and_then(|s| registry.get_category(issue_type, s))
                .is_some_and(|c| c == loom_core::enums::Category::Wip)
        })
        .map(|e| e.created_at)
}

/// Computes flow metrics over the trailing `days`-day window.
pub fn flow_metrics(store: &dyn Storage, registry: &TemplateRegistry, days: i64) -> Result<FlowMetrics> {
    let cutoff = Utc::now() - Duration::days(days);
    let done_states = registry.done_states();

    let closed = store.list_issues(&IssueFilter {
        categories: done_states,
        ..Default::default()
    })?;
    let closed_in_window: Vec<_> = closed
        .into_iter()
        .filter(|i| i.closed_at.is_some_and(|t| t >= cutoff))
        .collect();

    let mut lead_secs = Vec::with_capacity(closed_in_window.len());
    let mut cycle_secs = Vec::new();
    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();

    for issue in &closed_in_window {
        *by_type.entry(issue.issue_type.clone()).or_default() += 1;
        let Some(closed_at) = issue.closed_at else { continue };
        lead_secs.push((closed_at - issue.created_at).num_milliseconds() as f64 / 1000.0);

        let events = store.get_events(&issue.id, i64::MAX)?;
        if let Some(wip_at) = first_wip_entry(&events, registry, &issue.issue_type) {
            cycle_secs.push((closed_at - wip_at).num_milliseconds() as f64 / 1000.0);
        }
    }

    let mut cycle_for_median = cycle_secs.clone();
    let mut lead_for_median = lead_secs.clone();

    Ok(FlowMetrics {
        window_days: days,
        throughput: closed_in_window.len() as i64,
        cycle_time_mean_secs: mean(&cycle_secs),
        cycle_time_median_secs: median(&mut cycle_for_median),
        lead_time_mean_secs: mean(&lead_secs),
        lead_time_median_secs: median(&mut lead_for_median),
        by_type: by_type
            .into_iter()
            .map(|(issue_type, count)| TypeBreakdown { issue_type, count })
            .collect(),
    })
}
