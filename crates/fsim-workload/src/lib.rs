//! `fsim-workload` — arrival-stream generation.
//!
//! Turns workload descriptions ("30 web-search requests per minute for a
//! minute") into the time-sorted request-arrival events the engine
//! consumes.  The engine takes arrivals as pure data, so everything random
//! lives here, driven by an explicitly seeded [`SimRng`][fsim_core::SimRng]:
//! the same seed always reproduces the same arrival sequence, and therefore
//! the same simulated latencies.
//!
//! Two processes are provided:
//!
//! - **Poisson** — exponential inter-arrival times at a given rate, the
//!   standard open-loop model for independent request sources.
//! - **Deterministic** — fixed inter-arrival spacing, for controlled
//!   experiments and validation runs.
//!
//! Several streams can be superposed into one mixed workload; the result is
//! sorted by timestamp so it can be scheduled directly.

pub mod arrivals;
pub mod error;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use arrivals::{ArrivalGenerator, WorkloadSpec, schedule_all};
pub use error::{WorkloadError, WorkloadResult};
