//! "Needs attention" list: in-progress issues missing fields for their most
//! likely next transition (spec.md §4.7).

use loom_storage::{IssueFilter, Storage};
use loom_templates::registry::TransitionOption;
use loom_templates::TemplateRegistry;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct AttentionItem {
    pub issue_id: String,
    pub title: String,
    pub status: String,
    pub likely_next: String,
    pub missing_fields: Vec<String>,
}

fn fields_as_json(issue: &loom_core::issue::Issue) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for (name, value) in &issue.fields {
        if let Ok(json) = serde_json::to_value(value) {
            map.insert(name.clone(), json);
        }
    }
    map
}

/// The "most likely" next transition is the one requiring the fewest
/// additional fields -- ties broken by declaration order in the template.
fn most_likely(options: &[TransitionOption]) -> Option<&TransitionOption> {
    options.iter().min_by_key(|opt| opt.missing.len())
}

/// Returns up to `limit` wip-category issues whose most likely next
/// transition is currently blocked by missing fields.
pub fn needs_attention(store: &dyn Storage, registry: &TemplateRegistry, limit: usize) -> Result<Vec<AttentionItem>> {
    let wip_issues = store.list_issues(&IssueFilter {
        categories: registry.wip_states(),
        ..Default::default()
    })?;

    let mut out = Vec::new();
    for issue in wip_issues {
        if out.len() >= limit {
            break;
        }
        let fields = fields_as_json(&issue);
        let options = registry.get_valid_transitions(&issue.issue_type, &issue.status, &fields);
        let Some(best) = most_likely(&options) else {
            continue;
        };
        if best.missing.is_empty() {
            continue;
        }
        out.push(AttentionItem {
            issue_id: issue.id,
            title: issue.title,
            status: issue.status,
            likely_next: best.to.clone(),
            missing_fields: best.missing.clone(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_engine::{IssueEngine, UpdateRequest};
    use loom_storage::SqliteStore;
    use std::sync::Arc;

    #[test]
    fn flags_issue_missing_required_field_for_next_transition() {
        let store: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(TemplateRegistry::new(dir.path()));
        registry.load();
        let engine = IssueEngine::new(store.clone(), registry.clone(), "lm");

        let issue = engine
            .create_issue("a bug", "bug", 1, None, None, None, &[], &[], "agent")
            .unwrap();
        // Drive the bug through to "verifying" (a wip-category state) without
        // supplying the field the only defined next transition (to "closed")
        // requires.
        for status in ["confirmed", "fixing", "verifying"] {
            engine
                .update_issue(
                    &issue.id,
                    &UpdateRequest {
                        status: Some(status.into()),
                        ..Default::default()
                    },
                    "agent",
                )
                .unwrap();
        }

        let attention = needs_attention(store.as_ref(), &registry, 10).unwrap();
        assert!(attention.iter().any(|a| a.issue_id == issue.id));
    }
}
