//! Tool instances — per-request runtime state of one DAG node.

use fsim_core::{RequestId, ResourceKind, ResourceVec, SimTime, ToolId, WORK_EPSILON};

/// Execution status of a tool instance.
///
/// The only transitions are pending → running (on tool-start dispatch) and
/// running → completed (on full exhaustion).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ToolStatus {
    /// Not started; waiting for predecessors.
    Pending,
    /// In the active set, consuming fair shares.
    Running,
    /// All per-resource work exhausted.  Terminal.
    Completed,
}

/// Runtime instance of one DAG node for one specific request.
///
/// While pending, `remaining` equals the template loads.  While running it
/// decreases monotonically under the progress accountant — no other
/// component writes it.  On completion every entry is exactly zero.
#[derive(Clone, Debug)]
pub struct ToolInstance {
    pub id:          ToolId,
    pub request:     RequestId,
    /// Index of this instance's node in the owning request's graph.
    pub node:        usize,
    pub status:      ToolStatus,
    pub started_at:  Option<SimTime>,
    pub finished_at: Option<SimTime>,
    remaining:       ResourceVec,
}

impl ToolInstance {
    pub(crate) fn new(id: ToolId, request: RequestId, node: usize, loads: ResourceVec) -> Self {
        Self {
            id,
            request,
            node,
            status:      ToolStatus::Pending,
            started_at:  None,
            finished_at: None,
            remaining:   loads,
        }
    }

    #[inline]
    pub fn remaining(&self, kind: ResourceKind) -> f64 {
        self.remaining[kind]
    }

    pub fn remaining_vec(&self) -> ResourceVec {
        self.remaining
    }

    /// `true` if this tool still consumes `kind` — i.e. counts toward that
    /// resource's fair-share denominator.
    #[inline]
    pub fn has_work_on(&self, kind: ResourceKind) -> bool {
        self.remaining[kind] > WORK_EPSILON
    }

    /// `true` once every resource's remaining work is within tolerance of
    /// zero.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.all_below(WORK_EPSILON)
    }

    pub(crate) fn reset_remaining(&mut self, loads: ResourceVec) {
        self.remaining = loads;
    }

    /// Debit `amount` from `kind`, clamping at zero.
    pub(crate) fn debit(&mut self, kind: ResourceKind, amount: f64) {
        self.remaining[kind] = (self.remaining[kind] - amount).max(0.0);
    }

    /// Snap `kind` to exactly zero (it is already within tolerance when the
    /// completion handler calls this).
    pub(crate) fn zero_remaining(&mut self, kind: ResourceKind) {
        self.remaining[kind] = 0.0;
    }
}
