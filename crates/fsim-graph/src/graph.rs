//! `ToolGraph` — the validated DAG of tools one request type executes.
//!
//! # Representation
//!
//! Nodes are stored in a `Vec` in insertion order; the public API speaks
//! node *indices* into that Vec plus a name → index map for lookups.
//! Adjacency is index-based (`preds`/`succs` as `Vec<Vec<usize>>`), so the
//! engine's hot paths — "are all predecessors completed", "which successors
//! might now be eligible" — are slice walks with no hashing.
//!
//! A finite acyclic graph guarantees every node reaches a root by walking
//! predecessors, so validation needs only: known endpoints, no duplicates,
//! no cycles, at least one node.

use std::collections::HashMap;

use crate::template::{TemplateCatalog, ToolTemplate};
use crate::{GraphError, GraphResult};

// ── ToolNode ──────────────────────────────────────────────────────────────────

/// One node of a request-type DAG: a name plus its resolved template.
#[derive(Clone, Debug)]
pub struct ToolNode {
    pub name:     String,
    pub template: ToolTemplate,
}

// ── ToolGraph ─────────────────────────────────────────────────────────────────

/// A validated, immutable DAG of templated tools.
///
/// Construct through [`ToolGraph::builder`].
#[derive(Debug)]
pub struct ToolGraph {
    nodes: Vec<ToolNode>,
    index: HashMap<String, usize>,
    preds: Vec<Vec<usize>>,
    succs: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl ToolGraph {
    pub fn builder() -> ToolGraphBuilder {
        ToolGraphBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node by index.
    ///
    /// # Panics
    /// Panics if `ix` is out of range; indices come from this graph's own
    /// accessors, so an out-of-range index is a caller bug.
    pub fn node(&self, ix: usize) -> &ToolNode {
        &self.nodes[ix]
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ToolNode> {
        self.nodes.iter()
    }

    /// Indices of nodes with no predecessors, in insertion order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn predecessors(&self, ix: usize) -> &[usize] {
        &self.preds[ix]
    }

    pub fn successors(&self, ix: usize) -> &[usize] {
        &self.succs[ix]
    }

    /// A topological ordering of node indices (Kahn's algorithm, ties in
    /// insertion order).  Cycles were rejected at build time, so this
    /// always covers every node.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut indegree: Vec<usize> = self.preds.iter().map(Vec::len).collect();
        let mut ready: Vec<usize> = (0..self.nodes.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        // `ready` is kept sorted by taking from the front; pushes append
        // successors in adjacency order, which preserves determinism.
        let mut head = 0;
        while head < ready.len() {
            let ix = ready[head];
            head += 1;
            order.push(ix);
            for &succ in &self.succs[ix] {
                indegree[succ] -= 1;
                if indegree[succ] == 0 {
                    ready.push(succ);
                }
            }
        }
        order
    }
}

// ── ToolGraphBuilder ──────────────────────────────────────────────────────────

/// Accumulates nodes and edges by name, then validates and resolves
/// templates in [`build`][Self::build].
#[derive(Default)]
pub struct ToolGraphBuilder {
    nodes: Vec<(String, String)>,
    edges: Vec<(String, String)>,
}

impl ToolGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node `name` executing template `template_name`.
    #[must_use]
    pub fn node(mut self, name: impl Into<String>, template_name: impl Into<String>) -> Self {
        self.nodes.push((name.into(), template_name.into()));
        self
    }

    /// Add a dependency edge: `from` must complete before `to` may start.
    #[must_use]
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Validate the graph and resolve every node's template against
    /// `templates`.
    pub fn build(self, templates: &TemplateCatalog) -> GraphResult<ToolGraph> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        // ── Resolve nodes and detect duplicates ───────────────────────────
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (name, template_name) in self.nodes {
            let template = templates
                .get(&template_name)
                .ok_or_else(|| GraphError::MissingTemplate(template_name.clone()))?;
            template.validate()?;
            if index.insert(name.clone(), nodes.len()).is_some() {
                return Err(GraphError::DuplicateNode(name));
            }
            nodes.push(ToolNode { name, template: template.clone() });
        }

        // ── Resolve edges ─────────────────────────────────────────────────
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (from, to) in self.edges {
            let f = *index.get(&from).ok_or(GraphError::UnknownNode(from))?;
            let t = *index.get(&to).ok_or(GraphError::UnknownNode(to))?;
            preds[t].push(f);
            succs[f].push(t);
        }
        // Duplicate edges would double-count in-degrees below.
        for adj in preds.iter_mut().chain(succs.iter_mut()) {
            adj.sort_unstable();
            adj.dedup();
        }

        // ── Cycle check (Kahn) ────────────────────────────────────────────
        let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
        let mut ready: Vec<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
        let mut visited = 0;
        let mut head = 0;
        while head < ready.len() {
            let ix = ready[head];
            head += 1;
            visited += 1;
            for &succ in &succs[ix] {
                indegree[succ] -= 1;
                if indegree[succ] == 0 {
                    ready.push(succ);
                }
            }
        }
        if visited != nodes.len() {
            let mut involved: Vec<String> = indegree
                .iter()
                .enumerate()
                .filter(|&(_, &deg)| deg > 0)
                .map(|(ix, _)| nodes[ix].name.clone())
                .collect();
            involved.sort_unstable();
            return Err(GraphError::Cycle { involved });
        }

        let roots = (0..nodes.len()).filter(|&i| preds[i].is_empty()).collect();

        Ok(ToolGraph { nodes, index, preds, succs, roots })
    }
}
