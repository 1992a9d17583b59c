//! Per-resource utilization timeline for visualization.
//!
//! Successive engine snapshots describe piecewise-constant allocation
//! state: the consumer count recorded at step *i* holds over the interval
//! up to step *i + 1*.  The timeline coalesces runs of equal consumer
//! counts into intervals and serializes to JSON for external plotting.

use fsim_core::{ResourceKind, SimTime};
use fsim_engine::StepSnapshot;

use crate::MetricsResult;

/// One interval of constant allocation state on one resource.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineInterval {
    pub start:       f64,
    pub end:         f64,
    /// Active tools consuming the resource over this interval.
    pub consumers:   usize,
    /// 1.0 while any consumer exists, else 0.0.
    pub utilization: f64,
}

/// All intervals for one resource kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResourceTimeline {
    pub resource:  String,
    pub intervals: Vec<TimelineInterval>,
}

/// Timelines for every resource kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UtilizationTimeline {
    pub resources: Vec<ResourceTimeline>,
}

impl UtilizationTimeline {
    /// Build from recorded snapshots, closing the final interval at `end`.
    pub(crate) fn from_snapshots(snapshots: &[StepSnapshot], end: SimTime) -> Self {
        let resources = ResourceKind::ALL
            .iter()
            .map(|&kind| ResourceTimeline {
                resource:  kind.name().to_owned(),
                intervals: intervals_for(kind, snapshots, end),
            })
            .collect();
        Self { resources }
    }

    pub fn to_json(&self) -> MetricsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn intervals_for(kind: ResourceKind, snapshots: &[StepSnapshot], end: SimTime) -> Vec<TimelineInterval> {
    let mut intervals: Vec<TimelineInterval> = Vec::new();
    let mut open: Option<(f64, usize)> = None;

    for snapshot in snapshots {
        let consumers = snapshot.consumers.count(kind);
        match open {
            Some((_, current)) if current == consumers => {}
            Some((start, current)) => {
                if snapshot.time.0 > start {
                    intervals.push(interval(start, snapshot.time.0, current));
                }
                open = Some((snapshot.time.0, consumers));
            }
            None => {
                open = Some((snapshot.time.0, consumers));
            }
        }
    }

    if let Some((start, consumers)) = open {
        if end.0 > start {
            intervals.push(interval(start, end.0, consumers));
        }
    }
    intervals
}

fn interval(start: f64, end: f64, consumers: usize) -> TimelineInterval {
    TimelineInterval {
        start,
        end,
        consumers,
        utilization: if consumers > 0 { 1.0 } else { 0.0 },
    }
}
