//! `fsim-graph` — tool templates and request-type DAGs.
//!
//! A *tool template* declares how much work a kind of tool performs on each
//! resource.  A *tool graph* is the DAG of templated tools one request type
//! executes: nodes keyed by name, edges meaning "predecessor must complete
//! first".  Both are static configuration; the engine materializes a fresh
//! set of tool instances from the graph for every arriving request.
//!
//! All configuration faults (negative loads, missing templates, unknown
//! edge endpoints, cycles) surface as [`GraphError`] at build time, before
//! any simulation starts.
//!
//! # Quick-start
//!
//! ```rust
//! use fsim_core::ResourceKind;
//! use fsim_graph::{DagCatalog, TemplateCatalog, ToolGraph, ToolTemplate};
//!
//! let mut templates = TemplateCatalog::new();
//! templates.insert(ToolTemplate::new("fetch").with_load(ResourceKind::Network, 50.0))?;
//! templates.insert(ToolTemplate::new("rank").with_load(ResourceKind::Cpu, 20.0))?;
//!
//! let graph = ToolGraph::builder()
//!     .node("fetch", "fetch")
//!     .node("rank", "rank")
//!     .edge("fetch", "rank")
//!     .build(&templates)?;
//!
//! let mut dags = DagCatalog::new();
//! dags.insert("web-search", graph);
//! # Ok::<(), fsim_graph::GraphError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod graph;
pub mod template;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use catalog::{DagCatalog, DagSource};
pub use error::{GraphError, GraphResult};
pub use graph::{ToolGraph, ToolGraphBuilder, ToolNode};
pub use template::{TemplateCatalog, ToolTemplate};
