//! Shared application state handed to every handler.

use std::sync::Arc;

use loom_engine::IssueEngine;
use loom_storage::Storage;
use loom_templates::TemplateRegistry;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub registry: Arc<TemplateRegistry>,
    pub engine: Arc<IssueEngine>,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, registry: Arc<TemplateRegistry>, engine: Arc<IssueEngine>) -> Self {
        Self { store, registry, engine }
    }
}
