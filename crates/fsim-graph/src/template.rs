//! Tool templates: the static per-resource work declaration for a kind of
//! tool.

use std::collections::HashMap;

use fsim_core::{ResourceKind, ResourceVec};

use crate::{GraphError, GraphResult};

// ── ToolTemplate ──────────────────────────────────────────────────────────────

/// Static definition of one kind of tool.
///
/// `loads[r]` is the total work (in capacity units × seconds) the tool must
/// perform on resource `r` to complete.  Zero means the tool does not touch
/// that resource.  A template with all-zero loads is legal; an instance of
/// it completes at the instant it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolTemplate {
    name:  String,
    loads: ResourceVec,
}

impl ToolTemplate {
    /// A template with the given name and no load on any resource.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), loads: ResourceVec::ZERO }
    }

    /// Chainable load setter.
    #[must_use]
    pub fn with_load(mut self, kind: ResourceKind, load: f64) -> Self {
        self.loads[kind] = load;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn load(&self, kind: ResourceKind) -> f64 {
        self.loads[kind]
    }

    pub fn loads(&self) -> ResourceVec {
        self.loads
    }

    /// Reject negative or non-finite loads.
    pub fn validate(&self) -> GraphResult<()> {
        for (resource, load) in self.loads.iter() {
            if load < 0.0 || !load.is_finite() {
                return Err(GraphError::InvalidLoad {
                    template: self.name.clone(),
                    resource,
                    load,
                });
            }
        }
        Ok(())
    }
}

// ── TemplateCatalog ───────────────────────────────────────────────────────────

/// Pure name → template lookup.
///
/// Inserting under an existing name replaces the previous template — the
/// last definition wins, matching how layered experiment configs override
/// defaults.
#[derive(Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, ToolTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a template.
    pub fn insert(&mut self, template: ToolTemplate) -> GraphResult<()> {
        template.validate()?;
        self.templates.insert(template.name().to_owned(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolTemplate> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
