//! Resource kinds, dense per-resource vectors, and validated capacities.
//!
//! # Model
//!
//! The simulated machine exposes a closed set of divisible resources
//! ([`ResourceKind`]), each with a fixed capacity in work units per
//! simulated second.  Tools declare a load (total work units) per resource;
//! the engine divides each capacity equally among the tools with positive
//! remaining work on it.
//!
//! Per-resource values are stored in [`ResourceVec`], a dense
//! `[f64; ResourceKind::COUNT]` indexed by kind ordinal.  The same type
//! serves loads, remaining work, capacities, and utilization vectors, so
//! all per-resource arithmetic is branch-free array walks.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Absolute tolerance below which remaining work counts as zero.
///
/// Finish detection and "does this tool still consume resource r" checks
/// compare against this, never against exact zero, so floating-point drift
/// from repeated fair-share debits cannot strand a tool at 1e-17 remaining.
pub const WORK_EPSILON: f64 = 1e-9;

/// Capacity assigned to resources the configuration does not mention.
/// High enough that they never become a bottleneck.
const UNCONSTRAINED_CAPACITY: f64 = 1e12;

// ── ResourceKind ──────────────────────────────────────────────────────────────

/// The closed set of shared system resources.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Cpu,
    Npu,
    Memory,
    Network,
    Disk,
}

impl ResourceKind {
    pub const COUNT: usize = 5;

    /// All kinds in ordinal order.  Iteration over resources always uses
    /// this ordering, which makes per-resource tie-breaks deterministic.
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Cpu,
        ResourceKind::Npu,
        ResourceKind::Memory,
        ResourceKind::Network,
        ResourceKind::Disk,
    ];

    /// Stable ordinal, usable as an array index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Cpu     => "cpu",
            ResourceKind::Npu     => "npu",
            ResourceKind::Memory  => "memory",
            ResourceKind::Network => "network",
            ResourceKind::Disk    => "disk",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── ResourceVec ───────────────────────────────────────────────────────────────

/// A dense map from [`ResourceKind`] to `f64`.
///
/// Indexable by kind: `vec[ResourceKind::Cpu]`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceVec([f64; ResourceKind::COUNT]);

impl ResourceVec {
    pub const ZERO: ResourceVec = ResourceVec([0.0; ResourceKind::COUNT]);

    /// Chainable setter, for literal construction:
    ///
    /// ```rust
    /// # use fsim_core::{ResourceKind, ResourceVec};
    /// let loads = ResourceVec::ZERO
    ///     .with(ResourceKind::Cpu, 100.0)
    ///     .with(ResourceKind::Network, 50.0);
    /// assert_eq!(loads[ResourceKind::Cpu], 100.0);
    /// ```
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, value: f64) -> Self {
        self.0[kind.index()] = value;
        self
    }

    /// Iterate `(kind, value)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        ResourceKind::ALL.iter().map(|&k| (k, self.0[k.index()]))
    }

    /// `true` if every entry is ≤ `eps`.
    pub fn all_below(&self, eps: f64) -> bool {
        self.0.iter().all(|&v| v <= eps)
    }
}

impl std::ops::Index<ResourceKind> for ResourceVec {
    type Output = f64;
    #[inline(always)]
    fn index(&self, kind: ResourceKind) -> &f64 {
        &self.0[kind.index()]
    }
}

impl std::ops::IndexMut<ResourceKind> for ResourceVec {
    #[inline(always)]
    fn index_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        &mut self.0[kind.index()]
    }
}

// ── ResourceCapacities ────────────────────────────────────────────────────────

/// Validated per-resource capacities, fixed for the life of a run.
///
/// Kinds not named in the configuration default to an effectively
/// unconstrained capacity, so a scenario that only cares about CPU does not
/// have to invent numbers for disk and network.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCapacities {
    caps: ResourceVec,
}

impl ResourceCapacities {
    /// Build from explicit `(kind, capacity)` pairs.
    ///
    /// Every named capacity must be strictly positive and finite, else
    /// [`CoreError::InvalidCapacity`].
    pub fn new<I>(explicit: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (ResourceKind, f64)>,
    {
        let mut caps = ResourceVec::ZERO;
        for kind in ResourceKind::ALL {
            caps[kind] = UNCONSTRAINED_CAPACITY;
        }
        for (kind, value) in explicit {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CoreError::InvalidCapacity { kind, value });
            }
            caps[kind] = value;
        }
        Ok(Self { caps })
    }

    /// Every kind at the same capacity.
    pub fn uniform(value: f64) -> CoreResult<Self> {
        Self::new(ResourceKind::ALL.map(|k| (k, value)))
    }

    #[inline]
    pub fn capacity(&self, kind: ResourceKind) -> f64 {
        self.caps[kind]
    }

    pub fn as_vec(&self) -> ResourceVec {
        self.caps
    }
}

impl fmt::Display for ResourceCapacities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, cap) in self.caps.iter() {
            if cap >= UNCONSTRAINED_CAPACITY {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{kind}={cap:.0}")?;
            first = false;
        }
        if first {
            f.write_str("(unconstrained)")?;
        }
        Ok(())
    }
}
