//! `TemplateRegistry`: loads, caches, and queries type templates and packs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use loom_core::enums::{Category, Enforcement};
use loom_core::field_value;
use loom_core::pack::WorkflowPack;
use loom_core::project_config::ProjectConfig;
use loom_core::template::TypeTemplate;

use crate::error::{LoadIssue, TemplatesError};

const BUILTIN_CORE: &str = include_str!("builtin/core.json");
const BUILTIN_PLANNING: &str = include_str!("builtin/planning.json");

fn default_enabled_packs() -> Vec<String> {
    vec!["core".to_string(), "planning".to_string()]
}

/// The result of `ValidateTransition` (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub allowed: bool,
    pub enforcement: Enforcement,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
}

/// One entry of `GetValidTransitions`: a reachable target state plus what it
/// would take to reach it cleanly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TransitionOption {
    pub to: String,
    pub enforcement: Enforcement,
    pub missing: Vec<String>,
}

/// An immutable, fully-loaded view of every enabled pack and type. Swapped
/// in wholesale on `Load`/`Reload` so in-flight readers keep a consistent
/// view.
struct Snapshot {
    types: HashMap<String, TypeTemplate>,
    packs: HashMap<String, WorkflowPack>,
    category_map: HashMap<(String, String), Category>,
    load_issues: Vec<LoadIssue>,
    /// Union of state names whose category is open/wip/done across every
    /// currently registered type (spec.md §4.4 `OpenStates(type*)` /
    /// `DoneStates(type*)`). Memoized here and rebuilt on every `Load`.
    open_states: Vec<String>,
    wip_states: Vec<String>,
    done_states: Vec<String>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            types: HashMap::new(),
            packs: HashMap::new(),
            category_map: HashMap::new(),
            load_issues: Vec::new(),
            open_states: Vec::new(),
            wip_states: Vec::new(),
            done_states: Vec::new(),
        }
    }

    fn recompute_state_sets(&mut self) {
        let mut open = std::collections::HashSet::new();
        let mut wip = std::collections::HashSet::new();
        let mut done = std::collections::HashSet::new();
        for ((_type_name, state), category) in &self.category_map {
            match category {
                Category::Open => open.insert(state.clone()),
                Category::Wip => wip.insert(state.clone()),
                Category::Done => done.insert(state.clone()),
            };
        }
        self.open_states = open.into_iter().collect();
        self.wip_states = wip.into_iter().collect();
        self.done_states = done.into_iter().collect();
        self.open_states.sort();
        self.wip_states.sort();
        self.done_states.sort();
    }

    fn insert_pack(&mut self, pack: WorkflowPack) {
        for t in &pack.types {
            for s in &t.states {
                self.category_map
                    .insert((t.type_name.clone(), s.name.clone()), s.category);
            }
            self.types.insert(t.type_name.clone(), t.clone());
        }
        self.packs.insert(pack.name.clone(), pack);
    }

    fn insert_override(&mut self, template: TypeTemplate) {
        for s in &template.states {
            self.category_map
                .insert((template.type_name.clone(), s.name.clone()), s.category);
        }
        self.types.insert(template.type_name.clone(), template);
    }
}

/// Loads, caches, and queries type templates and packs for one project
/// directory. Constructed lazily by the engine; cheap to clone the handle
/// (it's just an `Arc` swap underneath).
pub struct TemplateRegistry {
    project_dir: PathBuf,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl TemplateRegistry {
    /// Builds a registry and performs an initial `Load`. Loading never
    /// fails the process; malformed files are logged and skipped.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let registry = Self {
            project_dir: project_dir.into(),
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
        };
        registry.load();
        registry
    }

    /// Idempotent: reads `config.json` for `enabled_packs`, then loads the
    /// three layers (built-in, installed, project-local overrides), later
    /// layers overriding earlier ones by type name.
    pub fn load(&self) {
        let enabled_packs = self.read_enabled_packs();
        let mut snapshot = Snapshot::empty();

        for (name, contents) in [("core", BUILTIN_CORE), ("planning", BUILTIN_PLANNING)] {
            match serde_json::from_str::<WorkflowPack>(contents) {
                Ok(pack) => {
                    if enabled_packs.iter().any(|p| p == &pack.name) {
                        if let Err(e) = pack.validate() {
                            warn!(pack = name, error = %e, "built-in pack failed validation");
                            snapshot.load_issues.push(LoadIssue {
                                path: format!("builtin:{name}"),
                                message: e.to_string(),
                            });
                        } else {
                            snapshot.insert_pack(pack);
                        }
                    }
                }
                Err(e) => {
                    warn!(pack = name, error = %e, "built-in pack failed to parse");
                    snapshot.load_issues.push(LoadIssue {
                        path: format!("builtin:{name}"),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.load_pack_dir(
            &self.project_dir.join("packs"),
            &enabled_packs,
            &mut snapshot,
        );
        self.load_override_dir(&self.project_dir.join("templates"), &mut snapshot);
        snapshot.recompute_state_sets();

        debug!(
            types = snapshot.types.len(),
            packs = snapshot.packs.len(),
            issues = snapshot.load_issues.len(),
            "template registry loaded"
        );

        *self.snapshot.write().expect("registry lock poisoned") = Arc::new(snapshot);
    }

    /// Discards caches and re-runs `Load`. Used when `config.json` changes
    /// while a long-lived server is running.
    pub fn reload(&self) {
        self.load();
    }

    fn read_enabled_packs(&self) -> Vec<String> {
        let path = self.project_dir.join("config.json");
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return default_enabled_packs(),
        };
        match serde_json::from_str::<ProjectConfig>(&contents) {
            Ok(cfg) => cfg.enabled_packs,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config.json failed to parse, using default enabled packs");
                default_enabled_packs()
            }
        }
    }

    fn load_pack_dir(&self, dir: &Path, enabled_packs: &[String], snapshot: &mut Snapshot) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.parse_pack_file(&path) {
                Ok(pack) => {
                    if enabled_packs.iter().any(|p| p == &pack.name) {
                        snapshot.insert_pack(pack);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "installed pack skipped");
                    snapshot.load_issues.push(LoadIssue {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn parse_pack_file(&self, path: &Path) -> Result<WorkflowPack, TemplatesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TemplatesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let pack: WorkflowPack =
            serde_json::from_str(&contents).map_err(|source| TemplatesError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        pack.validate()
            .map_err(|source| TemplatesError::InvalidPack {
                path: path.display().to_string(),
                source,
            })?;
        Ok(pack)
    }

    fn load_override_dir(&self, dir: &Path, snapshot: &mut Snapshot) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.parse_override_file(&path) {
                Ok(template) => snapshot.insert_override(template),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "project-local override skipped");
                    snapshot.load_issues.push(LoadIssue {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn parse_override_file(&self, path: &Path) -> Result<TypeTemplate, TemplatesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TemplatesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let template: TypeTemplate =
            serde_json::from_str(&contents).map_err(|source| TemplatesError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        template
            .validate()
            .map_err(|source| TemplatesError::InvalidTemplate {
                path: path.display().to_string(),
                source,
            })?;
        Ok(template)
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read().expect("registry lock poisoned"))
    }

    // -- Public queries -------------------------------------------------

    pub fn get_type(&self, type_name: &str) -> Option<TypeTemplate> {
        self.snapshot().types.get(type_name).cloned()
    }

    pub fn list_types(&self) -> Vec<TypeTemplate> {
        let mut types: Vec<_> = self.snapshot().types.values().cloned().collect();
        types.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        types
    }

    pub fn list_packs(&self) -> Vec<WorkflowPack> {
        let mut packs: Vec<_> = self.snapshot().packs.values().cloned().collect();
        packs.sort_by(|a, b| a.name.cmp(&b.name));
        packs
    }

    /// Files that failed to load on the most recent `Load`/`Reload`, for
    /// `loom doctor` to surface.
    pub fn load_issues(&self) -> Vec<LoadIssue> {
        self.snapshot().load_issues.clone()
    }

    /// Returns the template's initial state; falls back to `"open"` with a
    /// warning for unknown types (legacy tolerance).
    pub fn get_initial_state(&self, type_name: &str) -> String {
        match self.get_type(type_name) {
            Some(t) => t.initial_state,
            None => {
                warn!(issue_type = type_name, "no template loaded; defaulting initial state to 'open'");
                "open".to_string()
            }
        }
    }

    /// O(1) via the precomputed `(type, state)` map built at load time.
    pub fn get_category(&self, type_name: &str, state: &str) -> Option<Category> {
        self.snapshot()
            .category_map
            .get(&(type_name.to_string(), state.to_string()))
            .copied()
    }

    /// The first state (by declaration order) matching `category`.
    pub fn get_first_state_of_category(
        &self,
        type_name: &str,
        category: Category,
    ) -> Option<String> {
        let t = self.get_type(type_name)?;
        t.states
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.name.clone())
    }

    pub fn get_valid_states(&self, type_name: &str) -> Option<Vec<String>> {
        let t = self.get_type(type_name)?;
        Some(t.states.iter().map(|s| s.name.clone()).collect())
    }

    /// Union of state names whose category is `open` across every
    /// currently registered type. Memoized at load time.
    pub fn open_states(&self) -> Vec<String> {
        self.snapshot().open_states.clone()
    }

    pub fn wip_states(&self) -> Vec<String> {
        self.snapshot().wip_states.clone()
    }

    pub fn done_states(&self) -> Vec<String> {
        self.snapshot().done_states.clone()
    }

    /// The 7-step transition validation algorithm (spec.md §4.3).
    pub fn validate_transition(
        &self,
        type_name: &str,
        from: &str,
        to: &str,
        fields: &JsonMap<String, JsonValue>,
    ) -> TransitionResult {
        let Some(t) = self.get_type(type_name) else {
            return TransitionResult {
                allowed: true,
                enforcement: Enforcement::None,
                missing: vec![],
                warnings: vec![],
            };
        };

        let Some(transition) = t.transition(from, to) else {
            return TransitionResult {
                allowed: true,
                enforcement: Enforcement::None,
                missing: vec![],
                warnings: vec![
                    "transition not in standard workflow; use GetValidTransitions".to_string()
                ],
            };
        };

        let missing = self.compute_missing(&t, transition.requires_fields.iter(), to, fields);

        match transition.enforcement {
            Enforcement::Hard if !missing.is_empty() => TransitionResult {
                allowed: false,
                enforcement: Enforcement::Hard,
                missing,
                warnings: vec![],
            },
            Enforcement::Soft if !missing.is_empty() => TransitionResult {
                allowed: true,
                enforcement: Enforcement::Soft,
                missing: missing.clone(),
                warnings: vec![format!("missing recommended fields: {}", missing.join(", "))],
            },
            other => TransitionResult {
                allowed: true,
                enforcement: other,
                missing: vec![],
                warnings: vec![],
            },
        }
    }

    /// `missing` = union of the transition's `requires_fields` and any
    /// `fields_schema` entry whose `required_at` includes `to`, deduplicated
    /// while preserving first-seen order.
    fn compute_missing<'a>(
        &self,
        t: &TypeTemplate,
        requires_fields: impl Iterator<Item = &'a String>,
        to: &str,
        fields: &JsonMap<String, JsonValue>,
    ) -> Vec<String> {
        let mut missing = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for name in requires_fields {
            if field_value::is_unpopulated(fields, name) && seen.insert(name.clone()) {
                missing.push(name.clone());
            }
        }
        for fs in &t.fields_schema {
            if fs.required_at.iter().any(|s| s == to)
                && field_value::is_unpopulated(fields, &fs.name)
                && seen.insert(fs.name.clone())
            {
                missing.push(fs.name.clone());
            }
        }
        missing
    }

    pub fn get_valid_transitions(
        &self,
        type_name: &str,
        from: &str,
        fields: &JsonMap<String, JsonValue>,
    ) -> Vec<TransitionOption> {
        let Some(t) = self.get_type(type_name) else {
            return vec![];
        };
        t.transitions
            .iter()
            .filter(|tr| tr.from == from)
            .map(|tr| TransitionOption {
                to: tr.to.clone(),
                enforcement: tr.enforcement,
                missing: self.compute_missing(&t, tr.requires_fields.iter(), &tr.to, fields),
            })
            .collect()
    }

    pub fn validate_fields_for_state(
        &self,
        type_name: &str,
        state: &str,
        fields: &JsonMap<String, JsonValue>,
    ) -> Vec<String> {
        let Some(t) = self.get_type(type_name) else {
            return vec![];
        };
        t.fields_schema
            .iter()
            .filter(|fs| fs.required_at.iter().any(|s| s == state))
            .filter(|fs| field_value::is_unpopulated(fields, &fs.name))
            .map(|fs| fs.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_in(dir: &Path) -> TemplateRegistry {
        TemplateRegistry::new(dir)
    }

    #[test]
    fn loads_builtin_packs_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        assert!(reg.get_type("task").is_some());
        assert!(reg.get_type("bug").is_some());
        assert!(reg.get_type("epic").is_some());
        assert_eq!(reg.list_packs().len(), 2);
        assert_eq!(reg.list_types().len(), 9);
    }

    #[test]
    fn unknown_type_falls_back_to_open() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        assert_eq!(reg.get_initial_state("nonexistent"), "open");
        assert!(reg.get_category("nonexistent", "open").is_none());
    }

    #[test]
    fn bug_initial_state_and_category() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        assert_eq!(reg.get_initial_state("bug"), "triage");
        assert_eq!(reg.get_category("bug", "triage"), Some(Category::Open));
        assert_eq!(reg.get_category("bug", "closed"), Some(Category::Done));
        assert_eq!(
            reg.get_first_state_of_category("bug", Category::Done),
            Some("closed".to_string())
        );
    }

    #[test]
    fn transition_hard_enforcement_blocks_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        let fields = JsonMap::new();
        let result = reg.validate_transition("bug", "verifying", "closed", &fields);
        assert!(!result.allowed);
        assert_eq!(result.enforcement, Enforcement::Hard);
        assert_eq!(result.missing, vec!["fix_verification".to_string()]);
    }

    #[test]
    fn transition_hard_enforcement_allows_when_populated() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        let mut fields = JsonMap::new();
        fields.insert(
            "fix_verification".to_string(),
            json!({"kind": "text", "value": "tested on staging"}),
        );
        let result = reg.validate_transition("bug", "verifying", "closed", &fields);
        assert!(result.allowed);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn undefined_transition_is_soft_warned_not_blocked() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        let fields = JsonMap::new();
        let result = reg.validate_transition("bug", "triage", "wont_fix", &fields);
        assert!(result.allowed);
        assert_eq!(result.enforcement, Enforcement::None);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn legacy_tolerance_for_untemplated_type() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        let fields = JsonMap::new();
        let result = reg.validate_transition("widget", "anything", "else", &fields);
        assert!(result.allowed);
        assert_eq!(result.enforcement, Enforcement::None);
    }

    #[test]
    fn project_local_override_wins_over_builtin() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("templates")).unwrap();
        std::fs::write(
            tmp.path().join("templates").join("task.json"),
            r#"{
                "type": "task",
                "display_name": "Custom Task",
                "pack": "core",
                "states": [{"name": "backlog", "category": "open"}],
                "initial_state": "backlog",
                "transitions": [],
                "fields_schema": []
            }"#,
        )
        .unwrap();
        let reg = registry_in(tmp.path());
        assert_eq!(reg.get_initial_state("task"), "backlog");
    }

    #[test]
    fn enabled_packs_filters_which_packs_load() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.json"),
            r#"{"prefix": "lm", "enabled_packs": ["core"]}"#,
        )
        .unwrap();
        let reg = registry_in(tmp.path());
        assert!(reg.get_type("task").is_some());
        assert!(reg.get_type("epic").is_none());
    }

    #[test]
    fn malformed_installed_pack_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("packs")).unwrap();
        std::fs::write(tmp.path().join("packs").join("broken.json"), "{not json").unwrap();
        let reg = registry_in(tmp.path());
        assert_eq!(reg.load_issues().len(), 1);
        assert!(reg.get_type("task").is_some());
    }

    #[test]
    fn state_sets_cover_all_categories() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        assert!(reg.open_states().contains(&"triage".to_string()));
        assert!(reg.wip_states().contains(&"fixing".to_string()));
        assert!(reg.done_states().contains(&"closed".to_string()));
        assert!(reg.done_states().contains(&"wont_fix".to_string()));
    }

    #[test]
    fn reload_picks_up_new_override() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = registry_in(tmp.path());
        assert_eq!(reg.get_initial_state("task"), "open");

        std::fs::create_dir(tmp.path().join("templates")).unwrap();
        std::fs::write(
            tmp.path().join("templates").join("task.json"),
            r#"{
                "type": "task",
                "display_name": "Custom Task",
                "pack": "core",
                "states": [{"name": "backlog", "category": "open"}],
                "initial_state": "backlog",
                "transitions": [],
                "fields_schema": []
            }"#,
        )
        .unwrap();
        reg.reload();
        assert_eq!(reg.get_initial_state("task"), "backlog");
    }
}
