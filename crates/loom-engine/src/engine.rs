//! `IssueEngine`: validated create/update/close/claim and dependency
//! management, built on top of `Storage` + `TemplateRegistry` (spec.md §4.4).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::{Map as JsonMap, Value as JsonValue};

use loom_core::dependency::Dependency;
use loom_core::enums::{Category, EventType};
use loom_core::field_value::FieldValue;
use loom_core::idgen;
use loom_core::issue::{Issue, IssueBuilder};
use loom_core::validation::validate_structure;
use loom_storage::{IssueFilter, IssueUpdates, Storage, WorkFilter};
use loom_templates::TemplateRegistry;

use crate::error::{EngineError, Result};

/// Maximum attempts `idgen::generate_id` will retry before giving up.
const ID_MAX_ATTEMPTS: u32 = 20;

fn fields_to_json(fields: &BTreeMap<String, FieldValue>) -> JsonMap<String, JsonValue> {
    let mut map = JsonMap::new();
    for (name, value) in fields {
        if let Ok(v) = serde_json::to_value(value) {
            map.insert(name.clone(), v);
        }
    }
    map
}

fn merge_fields(
    current: &BTreeMap<String, FieldValue>,
    incoming: &BTreeMap<String, FieldValue>,
) -> BTreeMap<String, FieldValue> {
    let mut merged = current.clone();
    for (k, v) in incoming {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// A per-field update to apply to an issue. Mirrors spec.md §4.4 `Update`'s
/// argument list; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateRequest {
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

/// The result of a mutation that may have produced soft warnings alongside
/// its success (spec.md §4.3 step 6, §7).
#[derive(Debug, Clone, serde::Serialize)]
pub struct MutationOutcome {
    pub issue: Issue,
    pub warnings: Vec<String>,
}

/// One failure entry in a batch operation (spec.md §4.4 Batch operations).
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchFailure {
    pub id: String,
    pub error: String,
    pub valid_transitions: Vec<String>,
}

/// One warning entry in a batch operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchWarning {
    pub id: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
    pub warnings: Vec<BatchWarning>,
}

/// Constraints accepted by `ClaimNext`.
#[derive(Debug, Clone, Default)]
pub struct ClaimNextFilter {
    pub issue_type: Option<String>,
    pub priority_min: Option<i32>,
    pub priority_max: Option<i32>,
}

/// Validated create/update/close/claim operations and category-aware
/// queries over one project's store and template registry.
pub struct IssueEngine {
    store: Arc<dyn Storage>,
    registry: Arc<TemplateRegistry>,
    prefix: String,
}

impl IssueEngine {
    pub fn new(store: Arc<dyn Storage>, registry: Arc<TemplateRegistry>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            registry,
            prefix: prefix.into(),
        }
    }

    fn category_of(&self, issue_type: &str, status: &str) -> Category {
        self.registry
            .get_category(issue_type, status)
            .unwrap_or_else(|| legacy_category(status))
    }

    fn is_done(&self, issue_type: &str, status: &str) -> bool {
        matches!(self.category_of(issue_type, status), Category::Done)
    }

    // -- Create --------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_issue(
        &self,
        title: &str,
        issue_type: &str,
        priority: i32,
        parent_id: Option<&str>,
        description: Option<&str>,
        fields: Option<BTreeMap<String, FieldValue>>,
        labels: &[String],
        deps: &[String],
        actor: &str,
    ) -> Result<Issue> {
        let initial_state = self.registry.get_initial_state(issue_type);
        let is_done = self.is_done(issue_type, &initial_state);

        let existing = self.store.all_issue_ids()?;
        let mut rng = SmallRng::from_entropy();
        let id = idgen::generate_id(&self.prefix, &existing, &mut rng, ID_MAX_ATTEMPTS);

        let mut builder = IssueBuilder::new(title)
            .id(id.clone())
            .status(initial_state)
            .priority(priority)
            .issue_type(issue_type)
            .created_at(Utc::now())
            .updated_at(Utc::now());
        if let Some(p) = parent_id {
            builder = builder.parent_id(p);
        }
        if let Some(d) = description {
            builder = builder.description(d);
        }
        if let Some(fields) = fields {
            for (name, value) in fields {
                builder = builder.field(name, value);
            }
        }
        if is_done {
            builder = builder.closed_at(Utc::now());
        }
        let issue = builder.build();

        validate_structure(&issue, is_done)?;

        let store = Arc::clone(&self.store);
        let labels = labels.to_vec();
        let deps = deps.to_vec();
        let actor = actor.to_string();
        let issue_for_tx = issue.clone();
        store.run_in_transaction(&move |tx| {
            tx.create_issue(&issue_for_tx, &actor)?;
            for label in &labels {
                tx.add_label(&issue_for_tx.id, label, &actor)?;
            }
            for dep_id in &deps {
                tx.add_dependency(&Dependency::blocks(issue_for_tx.id.clone(), dep_id.clone()), &actor)?;
            }
            Ok(())
        })?;

        Ok(issue)
    }

    // -- Update ----------------------------------------------------------------

    pub fn update_issue(&self, id: &str, req: &UpdateRequest, actor: &str) -> Result<MutationOutcome> {
        let current = self.store.get_issue(id)?;
        let issue_type = current.issue_type.clone();

        let merged_fields = match &req.fields {
            Some(incoming) => merge_fields(&current.fields, incoming),
            None => current.fields.clone(),
        };

        let mut warnings = Vec::new();
        let mut updates = IssueUpdates {
            title: req.title.clone(),
            description: req.description.clone(),
            notes: req.notes.clone(),
            priority: req.priority,
            parent_id: req.parent_id.clone(),
            assignee: req.assignee.clone(),
            fields: req.fields.as_ref().map(|_| field_map_for_storage(&merged_fields)),
            ..Default::default()
        };

        let mut transition_event: Option<(String, String)> = None;

        if let Some(new_status) = &req.status {
            if new_status != &current.status {
                let fields_json = fields_to_json(&merged_fields);
                let result =
                    self.registry
                        .validate_transition(&issue_type, &current.status, new_status, &fields_json);

                if !result.allowed {
                    let valid_transitions: Vec<String> = self
                        .registry
                        .get_valid_transitions(&issue_type, &current.status, &fields_json)
                        .into_iter()
                        .map(|t| t.to)
                        .collect();
                    return Err(EngineError::HardEnforcement {
                        issue_type,
                        from: current.status.clone(),
                        to: new_status.clone(),
                        missing: result.missing,
                        valid_transitions,
                    });
                }

                warnings = result.warnings;
                updates.status = Some(new_status.clone());

                let new_category = self.category_of(&issue_type, new_status);
                updates.closed_at = Some(match new_category {
                    Category::Done => Some(Utc::now()),
                    _ => None,
                });

                transition_event = Some((current.status.clone(), new_status.clone()));
            }
        }

        let store = Arc::clone(&self.store);
        let actor_owned = actor.to_string();
        let id_owned = id.to_string();
        let warnings_for_tx = warnings.clone();
        store.run_in_transaction(&move |tx| {
            tx.update_issue(&id_owned, &updates, &actor_owned)?;
            if let Some((old, new)) = &transition_event {
                tx.record_event(
                    &id_owned,
                    EventType::StatusChanged,
                    &actor_owned,
                    Some(old.as_str()),
                    Some(new.as_str()),
                    None,
                )?;
            }
            for warning in &warnings_for_tx {
                tx.record_event(
                    &id_owned,
                    EventType::TransitionWarning,
                    &actor_owned,
                    None,
                    None,
                    Some(warning.as_str()),
                )?;
            }
            Ok(())
        })?;

        let issue = self.store.get_issue(id)?;
        Ok(MutationOutcome { issue, warnings })
    }

    // -- Close -----------------------------------------------------------------

    pub fn close_issue(&self, id: &str, status: Option<&str>, reason: Option<&str>, actor: &str) -> Result<MutationOutcome> {
        let current = self.store.get_issue(id)?;
        if self.is_done(&current.issue_type, &current.status) {
            return Ok(MutationOutcome { issue: current, warnings: vec![] });
        }

        let target = match status {
            Some(explicit) => {
                if !self.is_done(&current.issue_type, explicit) {
                    return Err(EngineError::invalid_input(format!(
                        "{explicit} is not a done-category status for type {}",
                        current.issue_type
                    )));
                }
                explicit.to_string()
            }
            None => self
                .registry
                .get_first_state_of_category(&current.issue_type, Category::Done)
                .unwrap_or_else(|| "closed".to_string()),
        };

        let mut req = UpdateRequest {
            status: Some(target),
            ..Default::default()
        };
        if let Some(reason) = reason {
            req.notes = Some(reason.to_string());
        }
        self.update_issue(id, &req, actor)
    }

    // -- Claim / release ---------------------------------------------------------

    pub fn claim_issue(&self, id: &str, assignee: &str, actor: &str) -> Result<Issue> {
        let current = self.store.get_issue(id)?;
        let to_status = self
            .registry
            .get_first_state_of_category(&current.issue_type, Category::Wip)
            .unwrap_or_else(|| "in_progress".to_string());
        let open_states = self.states_for_type(&current.issue_type, Category::Open, "open");

        for from_status in &open_states {
            match self.store.claim_issue(id, from_status, &to_status, assignee, actor) {
                Ok(()) => return self.store.get_issue(id).map_err(EngineError::from),
                Err(e) if e.is_not_found() => return Err(EngineError::from(e)),
                Err(_) => continue,
            }
        }

        let current = self.store.get_issue(id)?;
        Err(EngineError::Conflict {
            reason: format!("cannot claim: current state is {}", current.status),
        })
    }

    pub fn release_claim(&self, id: &str, actor: &str) -> Result<Issue> {
        let current = self.store.get_issue(id)?;
        let to_status = self.registry.get_initial_state(&current.issue_type);
        let wip_states = self.states_for_type(&current.issue_type, Category::Wip, "in_progress");

        for from_status in &wip_states {
            match self
                .store
                .release_claim(id, from_status, &to_status, &current.assignee, actor)
            {
                Ok(()) => return self.store.get_issue(id).map_err(EngineError::from),
                Err(e) if e.is_not_found() => return Err(EngineError::from(e)),
                Err(_) => continue,
            }
        }

        Err(EngineError::Conflict {
            reason: format!("cannot release: current state is {}", current.status),
        })
    }

    pub fn claim_next(&self, assignee: &str, filter: &ClaimNextFilter, actor: &str) -> Result<Option<Issue>> {
        let work_filter = WorkFilter {
            issue_type: filter.issue_type.clone(),
            assignee: None,
            limit: None,
        };
        let mut candidates = self.get_ready(&work_filter)?;
        candidates.retain(|i| i.assignee.is_empty());
        if let Some(min) = filter.priority_min {
            candidates.retain(|i| i.priority >= min);
        }
        if let Some(max) = filter.priority_max {
            candidates.retain(|i| i.priority <= max);
        }
        candidates.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.created_at.cmp(&b.created_at)));

        for candidate in &candidates {
            if let Ok(issue) = self.claim_issue(&candidate.id, assignee, actor) {
                return Ok(Some(issue));
            }
        }
        Ok(None)
    }

    /// All state names of `category` for `issue_type`, falling back to a
    /// single legacy state name when no template is loaded.
    fn states_for_type(&self, issue_type: &str, category: Category, legacy_fallback: &str) -> Vec<String> {
        match self.registry.get_valid_states(issue_type) {
            Some(states) => states
                .into_iter()
                .filter(|s| self.category_of(issue_type, s) == category)
                .collect(),
            None => vec![legacy_fallback.to_string()],
        }
    }

    // -- Dependencies ------------------------------------------------------------

    pub fn add_dependency(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()> {
        if from_id == to_id {
            return Err(EngineError::invalid_input("an issue cannot depend on itself"));
        }
        self.store
            .add_dependency(&Dependency::blocks(from_id, to_id), actor)
            .map_err(|e| match e {
                loom_storage::StorageError::CycleDetected => EngineError::CycleDetected,
                other => EngineError::from(other),
            })
    }

    pub fn remove_dependency(&self, from_id: &str, to_id: &str, actor: &str) -> Result<()> {
        Ok(self.store.remove_dependency(from_id, to_id, actor)?)
    }

    // -- Category-aware queries ----------------------------------------------------

    pub fn list_issues(&self, status_filter: Option<&str>, issue_type: Option<&str>) -> Result<Vec<Issue>> {
        let mut filter = IssueFilter {
            issue_type: issue_type.map(|s| s.to_string()),
            ..Default::default()
        };
        match status_filter {
            None => {}
            Some("open") | Some("wip") | Some("done") => {
                let category = status_filter.unwrap();
                let states = match category {
                    "open" => self.registry.open_states(),
                    "wip" => self.registry.wip_states(),
                    _ => self.registry.done_states(),
                };
                if states.is_empty() {
                    return Ok(vec![]);
                }
                filter.categories = states;
            }
            Some(literal) => filter.status = Some(literal.to_string()),
        }
        Ok(self.store.list_issues(&filter)?)
    }

    pub fn get_ready(&self, filter: &WorkFilter) -> Result<Vec<Issue>> {
        let open_states = self.registry.open_states();
        let done_states = self.registry.done_states();
        if open_states.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.store.get_ready_work(&open_states, &done_states, filter)?)
    }

    pub fn get_blocked(&self, filter: &WorkFilter) -> Result<Vec<loom_storage::BlockedIssue>> {
        let open_states = self.registry.open_states();
        let done_states = self.registry.done_states();
        if open_states.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.store.get_blocked_issues(&open_states, &done_states, filter)?)
    }

    /// Longest chain of non-done issues in the dependency DAG, via Kahn's
    /// topological order with per-node distance/predecessor arrays
    /// (spec.md §4.4 `GetCriticalPath`).
    pub fn get_critical_path(&self) -> Result<Vec<Issue>> {
        let done_states: std::collections::HashSet<String> = self.registry.done_states().into_iter().collect();
        let all_edges = self.store.get_all_blocking_edges()?;
        let all_ids: std::collections::HashSet<String> = self
            .store
            .all_issue_ids()?
            .into_iter()
            .collect();

        let mut issues_by_id: std::collections::HashMap<String, Issue> = std::collections::HashMap::new();
        for id in &all_ids {
            if let Ok(issue) = self.store.get_issue(id) {
                if !done_states.contains(&issue.status) {
                    issues_by_id.insert(id.clone(), issue);
                }
            }
        }

        let edges: Vec<(String, String)> = all_edges
            .into_iter()
            .filter(|(from, to)| issues_by_id.contains_key(from) && issues_by_id.contains_key(to))
            .collect();

        let nodes: Vec<String> = issues_by_id.keys().cloned().collect();
        let mut indegree: std::collections::HashMap<String, usize> =
            nodes.iter().map(|n| (n.clone(), 0)).collect();
        let mut forward: std::collections::HashMap<String, Vec<String>> =
            nodes.iter().map(|n| (n.clone(), Vec::new())).collect();
        // `from` depends on `to`, so `to` must resolve first: edge to -> from.
        for (from, to) in &edges {
            forward.get_mut(to).unwrap().push(from.clone());
            *indegree.get_mut(from).unwrap() += 1;
        }

        let mut queue: std::collections::VecDeque<String> =
            nodes.iter().filter(|n| indegree[*n] == 0).cloned().collect();
        let mut order: Vec<String> = Vec::new();
        let mut distance: std::collections::HashMap<String, i64> = nodes.iter().map(|n| (n.clone(), 0)).collect();
        let mut predecessor: std::collections::HashMap<String, Option<String>> =
            nodes.iter().map(|n| (n.clone(), None)).collect();

        while let Some(node) = queue.pop_front() {
            order.push(node.clone());
            for next in forward.get(&node).cloned().unwrap_or_default() {
                if distance[&node] + 1 > distance[&next] {
                    distance.insert(next.clone(), distance[&node] + 1);
                    predecessor.insert(next.clone(), Some(node.clone()));
                }
                let entry = indegree.get_mut(&next).unwrap();
                *entry -= 1;
                if *entry == 0 {
                    queue.push_back(next);
                }
            }
        }

        let tip = order
            .iter()
            .max_by_key(|n| (distance[*n], std::cmp::Reverse(n.as_str())))
            .cloned();
        let Some(mut current) = tip else {
            return Ok(vec![]);
        };

        let mut chain = vec![current.clone()];
        while let Some(Some(prev)) = predecessor.get(&current) {
            chain.push(prev.clone());
            current = prev.clone();
        }
        chain.reverse();

        Ok(chain
            .into_iter()
            .filter_map(|id| issues_by_id.remove(&id))
            .collect())
    }

    // -- Batch operations ----------------------------------------------------------

    pub fn batch_close(&self, ids: &[String], reason: Option<&str>, actor: &str) -> BatchResult {
        let mut result = BatchResult::default();
        for id in ids {
            match self.close_issue(id, None, reason, actor) {
                Ok(outcome) => {
                    result.succeeded.push(id.clone());
                    if !outcome.warnings.is_empty() {
                        result.warnings.push(BatchWarning {
                            id: id.clone(),
                            warnings: outcome.warnings,
                        });
                    }
                }
                Err(e) => result.failed.push(self.batch_failure(id, e)),
            }
        }
        result
    }

    pub fn batch_update(&self, ids: &[String], req: &UpdateRequest, actor: &str) -> BatchResult {
        let mut result = BatchResult::default();
        for id in ids {
            match self.update_issue(id, req, actor) {
                Ok(outcome) => {
                    result.succeeded.push(id.clone());
                    if !outcome.warnings.is_empty() {
                        result.warnings.push(BatchWarning {
                            id: id.clone(),
                            warnings: outcome.warnings,
                        });
                    }
                }
                Err(e) => result.failed.push(self.batch_failure(id, e)),
            }
        }
        result
    }

    fn batch_failure(&self, id: &str, error: EngineError) -> BatchFailure {
        let valid_transitions = match &error {
            EngineError::HardEnforcement { valid_transitions, .. } => valid_transitions.clone(),
            _ => self
                .store
                .get_issue(id)
                .ok()
                .map(|issue| {
                    self.registry
                        .get_valid_transitions(&issue.issue_type, &issue.status, &fields_to_json(&issue.fields))
                        .into_iter()
                        .map(|t| t.to)
                        .collect()
                })
                .unwrap_or_default(),
        };
        BatchFailure {
            id: id.to_string(),
            error: error.to_string(),
            valid_transitions,
        }
    }
}

/// `fields` map converted back to the `BTreeMap<String, FieldValue>` shape
/// `IssueUpdates` expects.
fn field_map_for_storage(fields: &BTreeMap<String, FieldValue>) -> BTreeMap<String, FieldValue> {
    fields.clone()
}

/// Legacy status -> category heuristic used only when no template is
/// loaded for a type (spec.md §8 invariants).
fn legacy_category(status: &str) -> Category {
    match status {
        "open" => Category::Open,
        "in_progress" => Category::Wip,
        "closed" | "done" | "resolved" | "wont_fix" | "cancelled" | "archived" => Category::Done,
        _ => Category::Open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_storage::SqliteStore;
    use std::sync::Arc;

    fn test_engine() -> (IssueEngine, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store: Arc<dyn Storage> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let registry = Arc::new(TemplateRegistry::new(tmp.path()));
        let engine = IssueEngine::new(store, registry, "lm");
        (engine, tmp)
    }

    #[test]
    fn create_issue_sets_initial_state() {
        let (engine, _tmp) = test_engine();
        let issue = engine
            .create_issue("Fix the bug", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        assert_eq!(issue.status, "triage");
        assert!(issue.id.starts_with("lm-"));
    }

    #[test]
    fn hard_enforcement_blocks_close_with_missing_field() {
        let (engine, _tmp) = test_engine();
        let issue = engine
            .create_issue("A bug", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();

        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("confirmed".into()), ..Default::default() }, "alice")
            .unwrap();
        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("fixing".into()), ..Default::default() }, "alice")
            .unwrap();
        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("verifying".into()), ..Default::default() }, "alice")
            .unwrap();

        let err = engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("closed".into()), ..Default::default() }, "alice")
            .unwrap_err();
        assert!(matches!(err, EngineError::HardEnforcement { .. }));

        let reloaded = engine.store.get_issue(&issue.id).unwrap();
        assert_eq!(reloaded.status, "verifying");
    }

    #[test]
    fn atomic_transition_with_fields_succeeds() {
        let (engine, _tmp) = test_engine();
        let issue = engine
            .create_issue("A bug", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("confirmed".into()), ..Default::default() }, "alice")
            .unwrap();
        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("fixing".into()), ..Default::default() }, "alice")
            .unwrap();
        engine
            .update_issue(&issue.id, &UpdateRequest { status: Some("verifying".into()), ..Default::default() }, "alice")
            .unwrap();

        let mut fields = BTreeMap::new();
        fields.insert("fix_verification".to_string(), FieldValue::Text("tests pass".into()));
        let outcome = engine
            .update_issue(
                &issue.id,
                &UpdateRequest {
                    status: Some("closed".into()),
                    fields: Some(fields),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap();
        assert_eq!(outcome.issue.status, "closed");
        assert_eq!(
            outcome.issue.fields.get("fix_verification"),
            Some(&FieldValue::Text("tests pass".into()))
        );
        assert!(outcome.issue.closed_at.is_some());
    }

    #[test]
    fn claim_then_release_returns_to_initial_state() {
        let (engine, _tmp) = test_engine();
        let issue = engine
            .create_issue("A task", "task", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let claimed = engine.claim_issue(&issue.id, "alice", "alice").unwrap();
        assert_eq!(claimed.status, "in_progress");
        assert_eq!(claimed.assignee, "alice");

        let released = engine.release_claim(&issue.id, "alice").unwrap();
        assert_eq!(released.status, "open");
        assert_eq!(released.assignee, "");
    }

    #[test]
    fn claim_race_only_one_succeeds() {
        let (engine, _tmp) = test_engine();
        let issue = engine
            .create_issue("A task", "task", 2, None, None, None, &[], &[], "alice")
            .unwrap();

        let first = engine.claim_issue(&issue.id, "alice", "alice");
        let second = engine.claim_issue(&issue.id, "bob", "bob");
        assert!(first.is_ok());
        assert!(matches!(second.unwrap_err(), EngineError::Conflict { .. }));
    }

    #[test]
    fn ready_includes_issue_blocked_by_wont_fix() {
        let (engine, _tmp) = test_engine();
        let b1 = engine
            .create_issue("Blocker", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let b2 = engine
            .create_issue("Blocked", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        engine.add_dependency(&b2.id, &b1.id, "alice").unwrap();
        engine
            .close_issue(&b1.id, Some("wont_fix"), None, "alice")
            .unwrap();

        let ready = engine.get_ready(&WorkFilter::default()).unwrap();
        assert!(ready.iter().any(|i| i.id == b2.id));
    }

    #[test]
    fn critical_path_excludes_done_issues() {
        let (engine, _tmp) = test_engine();
        let a = engine
            .create_issue("A", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let b = engine
            .create_issue("B", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let c = engine
            .create_issue("C", "bug", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        engine.add_dependency(&b.id, &a.id, "alice").unwrap();
        engine.add_dependency(&c.id, &b.id, "alice").unwrap();
        engine.close_issue(&a.id, Some("wont_fix"), None, "alice").unwrap();

        let path = engine.get_critical_path().unwrap();
        let ids: Vec<&str> = path.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), c.id.as_str()]);
    }

    #[test]
    fn self_dependency_rejected() {
        let (engine, _tmp) = test_engine();
        let a = engine
            .create_issue("A", "task", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let err = engine.add_dependency(&a.id, &a.id, "alice").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn batch_close_collects_per_issue_failures() {
        let (engine, _tmp) = test_engine();
        let a = engine
            .create_issue("A", "task", 2, None, None, None, &[], &[], "alice")
            .unwrap();
        let result = engine.batch_close(&[a.id.clone(), "lm-missing".to_string()], None, "alice");
        assert_eq!(result.succeeded, vec![a.id]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].id, "lm-missing");
    }
}
