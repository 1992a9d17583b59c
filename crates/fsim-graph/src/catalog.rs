//! The DAG provider interface consumed by the simulation engine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::ToolGraph;

/// Request type → DAG lookup.
///
/// The engine resolves every arriving request's type through this trait and
/// materializes tool instances from the returned graph.  Returning `None`
/// is a configuration fault surfaced by the engine.
pub trait DagSource {
    fn dag(&self, request_type: &str) -> Option<&Arc<ToolGraph>>;
}

/// Map-backed [`DagSource`].
#[derive(Default)]
pub struct DagCatalog {
    dags: HashMap<String, Arc<ToolGraph>>,
}

impl DagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `graph` under `request_type`.  The last registration wins.
    pub fn insert(&mut self, request_type: impl Into<String>, graph: ToolGraph) {
        self.dags.insert(request_type.into(), Arc::new(graph));
    }

    /// Registered request types, sorted for deterministic iteration.
    pub fn request_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.dags.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.dags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dags.is_empty()
    }
}

impl DagSource for DagCatalog {
    fn dag(&self, request_type: &str) -> Option<&Arc<ToolGraph>> {
        self.dags.get(request_type)
    }
}
