//! The fair-share model: consumer counting, the per-tool completion search,
//! and the progress accountant.
//!
//! Between two adjacent events the active set is constant, so each tool's
//! rate vector is constant and its remaining-work trajectory is linear.
//! Everything here exploits that: completion instants are computed in
//! closed form, and progress over an interval is a single multiply-subtract
//! per (tool, resource).
//!
//! The denominators used for an interval must be the ones in force *over*
//! that interval — the engine builds one [`ConsumerCounts`] per step from
//! the active set as it stood at the interval start, and hands the same
//! counts to both the completion search and the progress accountant.

use fsim_core::{ResourceCapacities, ResourceKind, ResourceVec, SimTime, WORK_EPSILON};

use crate::tool::ToolInstance;

// ── ConsumerCounts ────────────────────────────────────────────────────────────

/// `|A_r|` for every resource: how many active tools have positive
/// remaining work on each kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumerCounts([usize; ResourceKind::COUNT]);

impl ConsumerCounts {
    #[inline]
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.0[kind.index()]
    }

    /// 0/1 utilization vector: 1 where any consumer exists.  Fair share
    /// always allocates the full capacity when at least one consumer is
    /// present, so this is exact.
    pub fn utilization(&self) -> ResourceVec {
        let mut util = ResourceVec::ZERO;
        for kind in ResourceKind::ALL {
            if self.0[kind.index()] > 0 {
                util[kind] = 1.0;
            }
        }
        util
    }

    pub(crate) fn tally(&mut self, tool: &ToolInstance) {
        for kind in ResourceKind::ALL {
            if tool.has_work_on(kind) {
                self.0[kind.index()] += 1;
            }
        }
    }
}

// ── Completion search ─────────────────────────────────────────────────────────

/// Earliest instant at which `tool` exhausts some resource under the rates
/// implied by `counts`, together with that bottleneck resource.
///
/// Resources are scanned in ordinal order with a strict comparison, so ties
/// resolve to the lowest ordinal — deterministic for free.
///
/// A tool already within tolerance on every resource completes *now*: this
/// happens when several tools exhaust at the same instant and an earlier
/// completion this step already drained it.  Returns `None` only if the
/// tool has positive work but no live denominator, which the engine treats
/// as a stalled active set.
pub(crate) fn tool_completion(
    now:    SimTime,
    caps:   &ResourceCapacities,
    counts: &ConsumerCounts,
    tool:   &ToolInstance,
) -> Option<(ResourceKind, SimTime)> {
    if tool.is_exhausted() {
        return Some((ResourceKind::ALL[0], now));
    }

    let mut best: Option<(ResourceKind, SimTime)> = None;
    for kind in ResourceKind::ALL {
        if !tool.has_work_on(kind) {
            continue;
        }
        let consumers = counts.count(kind);
        if consumers == 0 {
            continue;
        }
        let rate = caps.capacity(kind) / consumers as f64;
        let at = now + tool.remaining(kind) / rate;
        if best.is_none_or(|(_, b)| at < b) {
            best = Some((kind, at));
        }
    }
    best
}

// ── Progress accountant ───────────────────────────────────────────────────────

/// Debit `delta` seconds of fair-share progress from `tool`, clamping each
/// resource at zero.
///
/// The engine always picks the interval so that no tool can cross zero
/// mid-step; a debit overshooting remaining work by more than the tolerance
/// is therefore a scheduling defect, reported as `Err((resource,
/// overshoot))`.
pub(crate) fn debit_tool(
    delta:  f64,
    caps:   &ResourceCapacities,
    counts: &ConsumerCounts,
    tool:   &mut ToolInstance,
) -> Result<(), (ResourceKind, f64)> {
    for kind in ResourceKind::ALL {
        if !tool.has_work_on(kind) {
            continue;
        }
        let consumers = counts.count(kind);
        if consumers == 0 {
            continue;
        }
        let rate = caps.capacity(kind) / consumers as f64;
        let debit = rate * delta;
        let overshoot = debit - tool.remaining(kind);
        if overshoot > WORK_EPSILON {
            return Err((kind, overshoot));
        }
        tool.debit(kind, debit);
    }
    Ok(())
}
