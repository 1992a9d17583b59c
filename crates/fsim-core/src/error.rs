//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! into them via `From` impls or wrap it as one variant.  Both patterns are
//! acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

use crate::ResourceKind;

/// The top-level error type for `fsim-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("capacity for {kind} must be positive and finite, got {value}")]
    InvalidCapacity { kind: ResourceKind, value: f64 },
}

/// Shorthand result type for `fsim-core`.
pub type CoreResult<T> = Result<T, CoreError>;
