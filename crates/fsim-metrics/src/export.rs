//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `request_latencies.csv`
//! - `utilization_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use fsim_core::ResourceKind;

use crate::collector::MetricsCollector;
use crate::MetricsResult;

/// Writes collected metrics to two CSV files.
pub struct CsvExporter {
    latencies: Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvExporter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> MetricsResult<Self> {
        let mut latencies = Writer::from_path(dir.join("request_latencies.csv"))?;
        latencies.write_record([
            "request_id",
            "request_type",
            "arrived_at",
            "finished_at",
            "latency_secs",
        ])?;

        let mut snapshots = Writer::from_path(dir.join("utilization_snapshots.csv"))?;
        let mut header = vec!["time".to_owned(), "active_tools".to_owned()];
        header.extend(ResourceKind::ALL.iter().map(|k| k.name().to_owned()));
        snapshots.write_record(&header)?;

        Ok(Self {
            latencies,
            snapshots,
            finished: false,
        })
    }

    /// Write everything `collector` has recorded so far.
    pub fn export(&mut self, collector: &MetricsCollector) -> MetricsResult<()> {
        for record in collector.records() {
            self.latencies.write_record(&[
                record.id.0.to_string(),
                record.request_type.clone(),
                record.arrived_at.0.to_string(),
                record.finished_at.0.to_string(),
                record.latency_secs.to_string(),
            ])?;
        }
        for snapshot in collector.snapshots() {
            let mut row = vec![
                snapshot.time.0.to_string(),
                snapshot.active_tools.to_string(),
            ];
            row.extend(
                ResourceKind::ALL
                    .iter()
                    .map(|&kind| snapshot.utilization[kind].to_string()),
            );
            self.snapshots.write_record(&row)?;
        }
        Ok(())
    }

    /// Flush both files.  Idempotent — safe to call more than once.
    pub fn finish(&mut self) -> MetricsResult<()> {
        if self.finished {
            return Ok(());
        }
        self.latencies.flush()?;
        self.snapshots.flush()?;
        self.finished = true;
        Ok(())
    }
}
