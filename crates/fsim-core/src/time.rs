//! Simulated time model.
//!
//! # Design
//!
//! Time is a continuous, monotonically non-decreasing quantity measured in
//! simulated seconds and stored as an `f64`.  The engine advances it in
//! closed form to the next event instant, so there is no tick granularity
//! and no accumulation loop; the only rounding involved is ordinary
//! floating-point arithmetic, absorbed by the work tolerance
//! ([`WORK_EPSILON`][crate::WORK_EPSILON]).
//!
//! `SimTime` deliberately does not implement `Ord`: `f64` has no total
//! order in the presence of NaN, and no engine path produces NaN times.
//! Containers that need a total order (the event queue) compare through
//! [`SimTime::total_cmp`].

use std::cmp::Ordering;
use std::fmt;

/// An absolute instant in simulated seconds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Sentinel for "no upcoming instant" — compares greater than any
    /// finite time.
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    /// IEEE-754 total-order comparison; used wherever a total order over
    /// instants is required.
    #[inline]
    pub fn total_cmp(&self, other: &SimTime) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    /// The earlier of two instants.
    #[inline]
    pub fn min(self, other: SimTime) -> SimTime {
        if self.0 <= other.0 { self } else { other }
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
