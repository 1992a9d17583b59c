//! Engine error type.
//!
//! Two families share the enum: configuration faults (`UnknownRequestType`,
//! `Graph`) surface at construction or first use and abort the run;
//! everything else is an invariant violation — a programming defect in the
//! engine or its driver, reported with the offending entity and timestamp
//! and never recovered from.  A run that drains its queue and active set
//! before the deadline is *not* an error; `run` returns `Ok`.

use fsim_core::{RequestId, ResourceKind, SimTime, ToolId};
use fsim_graph::GraphError;
use thiserror::Error;

use crate::tool::ToolStatus;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no DAG registered for request type '{request_type}'")]
    UnknownRequestType { request_type: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("event at {event} scheduled before current time {now}")]
    EventInPast { event: SimTime, now: SimTime },

    #[error("request {request} is not registered (at {time})")]
    UnknownRequest { request: RequestId, time: SimTime },

    #[error("tool {tool} dispatched for start at {time} while {status:?}")]
    ToolNotPending {
        tool:   ToolId,
        status: ToolStatus,
        time:   SimTime,
    },

    #[error("tool {tool} dispatched for start at {time} with an uncompleted predecessor")]
    PredecessorIncomplete { tool: ToolId, time: SimTime },

    #[error("progress step at {time} would drive {tool} {resource} work {overshoot} below zero")]
    NegativeWork {
        tool:      ToolId,
        resource:  ResourceKind,
        overshoot: f64,
        time:      SimTime,
    },

    #[error("active set is non-empty but no completion is reachable at {time}")]
    StalledActiveSet { time: SimTime },
}

pub type EngineResult<T> = Result<T, EngineError>;
