//! `fsim-core` — foundational types for the `fairsim` workload simulator.
//!
//! This crate is a dependency of every other `fsim-*` crate.  It intentionally
//! has no `fsim-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `RequestId`, `ToolId`                                   |
//! | [`time`]      | `SimTime` — continuous simulated seconds                |
//! | [`resource`]  | `ResourceKind`, `ResourceVec`, `ResourceCapacities`     |
//! | [`rng`]       | `SimRng` — deterministic seeded RNG                     |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod resource;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{RequestId, ToolId};
pub use resource::{ResourceCapacities, ResourceKind, ResourceVec, WORK_EPSILON};
pub use rng::SimRng;
pub use time::SimTime;
