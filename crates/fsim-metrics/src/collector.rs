//! `MetricsCollector` — the engine observer that records a run.

use std::collections::BTreeMap;
use std::fmt;

use fsim_core::{RequestId, ResourceKind, ResourceVec, SimTime};
use fsim_engine::{EngineObserver, Request, StepSnapshot};

use crate::stats::{LatencyStats, Throughput};
use crate::timeline::UtilizationTimeline;

// ── RequestRecord ─────────────────────────────────────────────────────────────

/// One completed request, as reported by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestRecord {
    pub id:           RequestId,
    pub request_type: String,
    pub arrived_at:   SimTime,
    pub finished_at:  SimTime,
    pub latency_secs: f64,
}

// ── MetricsCollector ──────────────────────────────────────────────────────────

/// Collects per-request latencies and per-step snapshots during a run and
/// computes latency / throughput / utilization statistics afterwards.
///
/// The observation window opens at [`mark_start`][Self::mark_start]
/// (default: time zero) and closes at [`mark_end`][Self::mark_end]; if
/// never closed, the last snapshot time is used.  Throughput is measured
/// against this window.
#[derive(Default)]
pub struct MetricsCollector {
    records:      Vec<RequestRecord>,
    by_type:      BTreeMap<String, Vec<f64>>,
    snapshots:    Vec<StepSnapshot>,
    window_start: SimTime,
    window_end:   Option<SimTime>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_start(&mut self, time: SimTime) {
        self.window_start = time;
    }

    pub fn mark_end(&mut self, time: SimTime) {
        self.window_end = Some(time);
    }

    // ── Raw data access ───────────────────────────────────────────────────

    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    pub fn snapshots(&self) -> &[StepSnapshot] {
        &self.snapshots
    }

    /// Request types seen so far, in sorted order.
    pub fn request_types(&self) -> Vec<&str> {
        self.by_type.keys().map(String::as_str).collect()
    }

    /// End of the observation window: explicit mark, else last snapshot,
    /// else the window start.
    pub fn window_end(&self) -> SimTime {
        self.window_end
            .or_else(|| self.snapshots.last().map(|s| s.time))
            .unwrap_or(self.window_start)
    }

    pub fn window_secs(&self) -> f64 {
        (self.window_end() - self.window_start).max(0.0)
    }

    // ── Derived statistics ────────────────────────────────────────────────

    /// Latency statistics for one request type, or across all types.
    pub fn latency_stats(&self, request_type: Option<&str>) -> LatencyStats {
        match request_type {
            Some(ty) => LatencyStats::from_samples(
                self.by_type.get(ty).map(Vec::as_slice).unwrap_or(&[]),
            ),
            None => {
                let all: Vec<f64> = self.records.iter().map(|r| r.latency_secs).collect();
                LatencyStats::from_samples(&all)
            }
        }
    }

    /// Completed-request throughput for one request type, or overall.
    pub fn throughput(&self, request_type: Option<&str>) -> Throughput {
        let total = match request_type {
            Some(ty) => self.by_type.get(ty).map_or(0, Vec::len),
            None     => self.records.len(),
        };
        Throughput::over_window(total, self.window_secs())
    }

    /// Time-weighted average utilization per resource across the recorded
    /// snapshots.
    pub fn utilization_summary(&self) -> ResourceVec {
        let mut weighted = ResourceVec::ZERO;
        let mut total_time = 0.0;
        for pair in self.snapshots.windows(2) {
            let dt = pair[1].time - pair[0].time;
            total_time += dt;
            for kind in ResourceKind::ALL {
                weighted[kind] += pair[0].utilization[kind] * dt;
            }
        }
        if total_time > 0.0 {
            for kind in ResourceKind::ALL {
                weighted[kind] /= total_time;
            }
        }
        weighted
    }

    /// Per-resource utilization intervals for visualization.
    pub fn timeline(&self) -> UtilizationTimeline {
        UtilizationTimeline::from_snapshots(&self.snapshots, self.window_end())
    }

    /// Aggregate everything into a printable summary.
    pub fn summary(&self) -> Summary {
        let per_type = self
            .by_type
            .keys()
            .map(|ty| (ty.clone(), self.latency_stats(Some(ty))))
            .collect();
        let throughput_per_type = self
            .by_type
            .keys()
            .map(|ty| (ty.clone(), self.throughput(Some(ty))))
            .collect();
        Summary {
            overall:             self.latency_stats(None),
            per_type,
            throughput:          self.throughput(None),
            throughput_per_type,
            avg_utilization:     self.utilization_summary(),
        }
    }
}

impl EngineObserver for MetricsCollector {
    fn on_request_complete(&mut self, request: &Request) {
        let Some(finished_at) = request.finished_at else {
            return;
        };
        let latency_secs = finished_at - request.arrived_at;
        self.by_type
            .entry(request.request_type.clone())
            .or_default()
            .push(latency_secs);
        self.records.push(RequestRecord {
            id:           request.id,
            request_type: request.request_type.clone(),
            arrived_at:   request.arrived_at,
            finished_at,
            latency_secs,
        });
    }

    fn on_step(&mut self, snapshot: &StepSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Aggregate run statistics, with a human-readable `Display`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Summary {
    pub overall:             LatencyStats,
    pub per_type:            BTreeMap<String, LatencyStats>,
    pub throughput:          Throughput,
    pub throughput_per_type: BTreeMap<String, Throughput>,
    /// Time-weighted average utilization per resource, in [0, 1].
    pub avg_utilization:     ResourceVec,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "latency (all types): {}", fmt_stats(&self.overall))?;
        for (ty, stats) in &self.per_type {
            writeln!(f, "latency [{ty}]: {}", fmt_stats(stats))?;
        }
        writeln!(
            f,
            "throughput: {} requests in {:.2}s ({:.2} req/min)",
            self.throughput.total, self.throughput.window_secs, self.throughput.per_min
        )?;
        for (ty, tp) in &self.throughput_per_type {
            writeln!(f, "throughput [{ty}]: {} requests ({:.2} req/min)", tp.total, tp.per_min)?;
        }
        write!(f, "utilization:")?;
        for (kind, util) in self.avg_utilization.iter() {
            write!(f, " {kind}={:.0}%", util * 100.0)?;
        }
        Ok(())
    }
}

fn fmt_stats(stats: &LatencyStats) -> String {
    if stats.count == 0 {
        return "no samples".to_owned();
    }
    format!(
        "n={} mean={:.4}s p50={:.4}s p95={:.4}s p99={:.4}s min={:.4}s max={:.4}s",
        stats.count, stats.mean, stats.p50, stats.p95, stats.p99, stats.min, stats.max
    )
}
