//! `fsim-metrics` — metrics collection and export.
//!
//! [`MetricsCollector`] implements the engine's observer trait and records
//! per-request latency rows and per-step utilization snapshots as the run
//! progresses.  After the run it answers the questions the simulator
//! exists for: the latency distribution per request type (percentiles via
//! [`LatencyStats`]), sustained throughput, and time-weighted resource
//! utilization.
//!
//! Two export paths are provided:
//!
//! | Output                                        | Via                    |
//! |-----------------------------------------------|------------------------|
//! | `request_latencies.csv`, `utilization_snapshots.csv` | [`CsvExporter`] |
//! | Per-resource utilization timeline (JSON)      | [`UtilizationTimeline`] |
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut collector = MetricsCollector::new();
//! engine.run(SimTime(120.0), &mut collector)?;
//! collector.mark_end(engine.now());
//! println!("{}", collector.summary());
//!
//! let mut exporter = CsvExporter::new(Path::new("./output"))?;
//! exporter.export(&collector)?;
//! exporter.finish()?;
//! ```

pub mod collector;
pub mod error;
pub mod export;
pub mod stats;
pub mod timeline;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use collector::{MetricsCollector, RequestRecord, Summary};
pub use error::{MetricsError, MetricsResult};
pub use export::CsvExporter;
pub use stats::{LatencyStats, Throughput};
pub use timeline::{ResourceTimeline, TimelineInterval, UtilizationTimeline};
