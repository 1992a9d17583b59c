//! Requests — one materialized DAG of tool instances per arrival.
//!
//! The request is the arena that owns its tool instances; tools refer back
//! to it by [`RequestId`] only, resolved through the engine's registry, so
//! there are no ownership cycles.

use std::sync::Arc;

use fsim_core::{RequestId, SimTime, ToolId};
use fsim_graph::ToolGraph;

use crate::tool::{ToolInstance, ToolStatus};

// ── ToolKey ───────────────────────────────────────────────────────────────────

/// Addresses one tool instance: owning request plus node index.
///
/// The derived ordering (request id, then node index) is the iteration
/// order of the active set, which fixes completion-search tie-breaks.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ToolKey {
    pub request: RequestId,
    pub node:    usize,
}

// ── Request ───────────────────────────────────────────────────────────────────

/// A materialized request: the DAG it executes plus one tool instance per
/// node, keyed by node index.
#[derive(Clone, Debug)]
pub struct Request {
    pub id:           RequestId,
    pub request_type: String,
    pub arrived_at:   SimTime,
    /// Set when the last tool completes.
    pub finished_at:  Option<SimTime>,
    graph:            Arc<ToolGraph>,
    tools:            Vec<ToolInstance>,
}

impl Request {
    /// Instantiate every DAG node as a pending tool with remaining work
    /// copied from its template loads.
    pub(crate) fn materialize(
        id:           RequestId,
        request_type: String,
        arrived_at:   SimTime,
        graph:        Arc<ToolGraph>,
        next_tool_id: &mut u64,
    ) -> Self {
        let tools = (0..graph.node_count())
            .map(|node| {
                let tool_id = ToolId(*next_tool_id);
                *next_tool_id += 1;
                ToolInstance::new(tool_id, id, node, graph.node(node).template.loads())
            })
            .collect();

        Self {
            id,
            request_type,
            arrived_at,
            finished_at: None,
            graph,
            tools,
        }
    }

    pub fn graph(&self) -> &Arc<ToolGraph> {
        &self.graph
    }

    pub fn tool(&self, node: usize) -> &ToolInstance {
        &self.tools[node]
    }

    pub(crate) fn tool_mut(&mut self, node: usize) -> &mut ToolInstance {
        &mut self.tools[node]
    }

    pub fn tools(&self) -> &[ToolInstance] {
        &self.tools
    }

    /// `true` once every tool instance has completed.
    pub fn is_completed(&self) -> bool {
        self.tools.iter().all(|t| t.status == ToolStatus::Completed)
    }

    /// `finish − arrival`, or `None` while in flight.
    pub fn latency(&self) -> Option<f64> {
        self.finished_at.map(|finish| finish - self.arrived_at)
    }

    /// `true` if every predecessor of `node` has completed.
    pub fn node_ready(&self, node: usize) -> bool {
        self.graph
            .predecessors(node)
            .iter()
            .all(|&pred| self.tools[pred].status == ToolStatus::Completed)
    }
}
