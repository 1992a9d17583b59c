//! `fsim-engine` — continuous-time discrete-event simulation with dynamic
//! max-min fair-share resource allocation.
//!
//! # Architecture
//!
//! The event queue stores only *start* events (request arrivals and tool
//! starts).  Completions are never scheduled: because the active set — and
//! with it every tool's instantaneous share of every resource — changes at
//! each event, any pre-computed completion time would be stale by the time
//! it fired.  Instead, each loop iteration recomputes the next completion
//! from live state:
//!
//! ```text
//! loop:
//!   ① t_start    — timestamp of the earliest queued start event
//!   ② t_complete — completion search over the active set (closed form:
//!                  between events every rate is constant, so remaining-work
//!                  trajectories are piecewise linear)
//!   ③ advance to min(t_start, t_complete); stop at exhaustion or deadline
//!   ④ debit every active tool by fair share × elapsed interval
//!   ⑤ dispatch: pop the start event, or apply the synthesized completion
//!               (starts win ties)
//! ```
//!
//! # Fair share
//!
//! At any instant, resource `r` with capacity `C_r` is divided equally
//! among the `|A_r|` active tools with positive remaining work on it: each
//! receives rate `C_r / |A_r|`.  No reservations, no priorities, no
//! queueing — a ready tool always starts.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let caps = ResourceCapacities::new([(ResourceKind::Cpu, 100.0)])?;
//! let mut engine = Engine::new(caps, dags);
//! engine.schedule(Event::arrival(SimTime::ZERO, "web-search"))?;
//! engine.run(SimTime(60.0), &mut collector)?;
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod observer;
pub mod request;
pub mod share;
pub mod tool;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use event::{Event, EventKind, EventQueue};
pub use observer::{EngineObserver, NoopObserver, StepSnapshot};
pub use request::{Request, ToolKey};
pub use share::ConsumerCounts;
pub use tool::{ToolInstance, ToolStatus};
