//! Latency distribution and throughput arithmetic.

/// Summary statistics over a set of latency samples.
///
/// Percentiles use linear interpolation between order statistics (the same
/// convention most numeric toolkits default to), and `std` is the
/// population standard deviation.  All fields are zero for an empty sample
/// set.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub mean:  f64,
    pub std:   f64,
    pub min:   f64,
    pub max:   f64,
    pub p50:   f64,
    pub p95:   f64,
    pub p99:   f64,
}

impl LatencyStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                count: 0,
                mean:  0.0,
                std:   0.0,
                min:   0.0,
                max:   0.0,
                p50:   0.0,
                p95:   0.0,
                p99:   0.0,
            };
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|&s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            count: sorted.len(),
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        }
    }

    /// Alias for the 50th percentile.
    pub fn median(&self) -> f64 {
        self.p50
    }
}

/// Linear-interpolation percentile over an already-sorted slice.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Completed-request throughput over an observation window.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Throughput {
    pub total:       usize,
    pub window_secs: f64,
    pub per_sec:     f64,
    pub per_min:     f64,
}

impl Throughput {
    pub fn over_window(total: usize, window_secs: f64) -> Self {
        let per_sec = if window_secs > 0.0 {
            total as f64 / window_secs
        } else {
            0.0
        };
        Self {
            total,
            window_secs,
            per_sec,
            per_min: per_sec * 60.0,
        }
    }
}
