//! Release progress tree: recursive parent→children walk with leaf-only
//! progress rollup and a depth guard against pathological parent-id cycles
//! (spec.md §4.6).

use std::collections::HashMap;

use loom_core::enums::Category;
use loom_storage::{IssueFilter, Storage};
use loom_templates::TemplateRegistry;
use serde::Serialize;

use crate::error::Result;

const MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseNode {
    pub issue_id: String,
    pub title: String,
    pub status: String,
    /// Fraction of leaf descendants (including this node, if it is itself a
    /// leaf) that are in a done-category state. `1.0` for an empty subtree.
    pub progress: f64,
    pub leaf_count: usize,
    pub done_leaf_count: usize,
    pub children: Vec<ReleaseNode>,
    /// `true` if the walk stopped here because `MAX_DEPTH` was reached,
    /// rather than because the node has no children.
    pub depth_guard_hit: bool,
}

/// Walks the parent→children tree rooted at `root_id`. Memoizes computed
/// nodes per call so a root shared by multiple callers in the same request
/// (e.g. a release list) is only walked once.
pub fn release_tree(store: &dyn Storage, registry: &TemplateRegistry, root_id: &str) -> Result<ReleaseNode> {
    let mut memo: HashMap<String, ReleaseNode> = HashMap::new();
    build(store, registry, root_id, 0, &mut memo)
}

fn build(
    store: &dyn Storage,
    registry: &TemplateRegistry,
    id: &str,
    depth: usize,
    memo: &mut HashMap<String, ReleaseNode>,
) -> Result<ReleaseNode> {
    if let Some(cached) = memo.get(id) {
        return Ok(cached.clone());
    }

    let issue = store.get_issue(id)?;
    let is_done = registry
        .get_category(&issue.issue_type, &issue.status)
        .is_some_and(|c| c == Category::Done);

    if depth >= MAX_DEPTH {
        let leaf_count = 1;
        let done_leaf_count = usize::from(is_done);
        let node = ReleaseNode {
            issue_id: issue.id.clone(),
            title: issue.title.clone(),
            status: issue.status.clone(),
            progress: done_leaf_count as f64 / leaf_count as f64,
            leaf_count,
            done_leaf_count,
            children: vec![],
            depth_guard_hit: true,
        };
        memo.insert(id.to_string(), node.clone());
        return Ok(node);
    }

    let children_issues = store.list_issues(&IssueFilter {
        parent_id: Some(id.to_string()),
        ..Default::default()
    })?;

    if children_issues.is_empty() {
        let leaf_count = 1;
        let done_leaf_count = usize::from(is_done);
        let node = ReleaseNode {
            issue_id: issue.id.clone(),
            title: issue.title.clone(),
            status: issue.status.clone(),
            progress: done_leaf_count as f64 / leaf_count as f64,
            leaf_count,
            done_leaf_count,
            children: vec![],
            depth_guard_hit: false,
        };
        memo.insert(id.to_string(), node.clone());
        return Ok(node);
    }

    let mut children = Vec::with_capacity(children_issues.len());
    let mut leaf_count = 0;
    let mut done_leaf_count = 0;
    for child in &children_issues {
        let child_node = build(store, registry, &child.id, depth + 1, memo)?;
        leaf_count += child_node.leaf_count;
        done_leaf_count += child_node.done_leaf_count;
        children.push(child_node);
    }

    let node = ReleaseNode {
        issue_id: issue.id.clone(),
        title: issue.title.clone(),
        status: issue.status.clone(),
        progress: if leaf_count == 0 {
            1.0
        } else {
            done_leaf_count as f64 / leaf_count as f64
        },
        leaf_count,
        done_leaf_count,
        children,
        depth_guard_hit: false,
    };
    memo.insert(id.to_string(), node.clone());
    Ok(node)
}
