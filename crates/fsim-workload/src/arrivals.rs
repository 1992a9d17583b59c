//! Poisson and deterministic arrival generation.

use fsim_core::{SimRng, SimTime};
use fsim_engine::{Engine, EngineResult, Event};
use fsim_graph::DagSource;

use crate::{WorkloadError, WorkloadResult};

// ── WorkloadSpec ──────────────────────────────────────────────────────────────

/// One request stream: a type and its average arrival rate.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadSpec {
    pub request_type: String,
    /// Average arrivals per minute (λ of the Poisson process).
    pub rate_per_min: f64,
}

impl WorkloadSpec {
    pub fn new(request_type: impl Into<String>, rate_per_min: f64) -> Self {
        Self { request_type: request_type.into(), rate_per_min }
    }

    fn validate(&self) -> WorkloadResult<()> {
        if !(self.rate_per_min > 0.0) || !self.rate_per_min.is_finite() {
            return Err(WorkloadError::NonPositiveRate {
                request_type: self.request_type.clone(),
                rate:         self.rate_per_min,
            });
        }
        Ok(())
    }
}

// ── ArrivalGenerator ──────────────────────────────────────────────────────────

/// Seeded generator of arrival-event streams.
pub struct ArrivalGenerator {
    rng: SimRng,
}

impl ArrivalGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: SimRng::new(seed) }
    }

    /// Poisson arrival instants in `[start, start + window_secs)`.
    ///
    /// Inter-arrival gaps are sampled by inverse transform:
    /// `-ln(1 − u) / λ` with `u` uniform in `[0, 1)`.
    pub fn poisson_times(
        &mut self,
        rate_per_min: f64,
        window_secs:  f64,
        start:        SimTime,
    ) -> WorkloadResult<Vec<SimTime>> {
        if !(rate_per_min > 0.0) || !rate_per_min.is_finite() {
            return Err(WorkloadError::NonPositiveRate {
                request_type: String::new(),
                rate:         rate_per_min,
            });
        }
        if !(window_secs > 0.0) || !window_secs.is_finite() {
            return Err(WorkloadError::NonPositiveWindow(window_secs));
        }

        let rate_per_sec = rate_per_min / 60.0;
        let end = start + window_secs;
        let mut times = Vec::new();
        let mut current = start;
        loop {
            let u: f64 = self.rng.random();
            current = current + (-(1.0 - u).ln() / rate_per_sec);
            if current >= end {
                break;
            }
            times.push(current);
        }
        Ok(times)
    }

    /// `count` arrivals spaced exactly `inter_arrival_secs` apart from
    /// `start`.  Consumes no randomness.
    pub fn deterministic_times(
        count:              usize,
        inter_arrival_secs: f64,
        start:              SimTime,
    ) -> WorkloadResult<Vec<SimTime>> {
        if !(inter_arrival_secs > 0.0) || !inter_arrival_secs.is_finite() {
            return Err(WorkloadError::NonPositiveInterval(inter_arrival_secs));
        }
        Ok((0..count)
            .map(|i| start + i as f64 * inter_arrival_secs)
            .collect())
    }

    /// Arrival events for one stream over `[start, start + window_secs)`.
    pub fn events(
        &mut self,
        spec:        &WorkloadSpec,
        window_secs: f64,
        start:       SimTime,
    ) -> WorkloadResult<Vec<Event>> {
        spec.validate()?;
        let times = self.poisson_times(spec.rate_per_min, window_secs, start)?;
        Ok(times
            .into_iter()
            .map(|time| Event::arrival(time, spec.request_type.as_str()))
            .collect())
    }

    /// Superpose several streams over the same window, sorted by timestamp.
    ///
    /// The sort is stable, so equal-timestamp events keep per-stream order
    /// and the whole sequence is a deterministic function of the seed.
    pub fn mixed(
        &mut self,
        specs:       &[WorkloadSpec],
        window_secs: f64,
        start:       SimTime,
    ) -> WorkloadResult<Vec<Event>> {
        let mut all = Vec::new();
        for spec in specs {
            all.extend(self.events(spec, window_secs, start)?);
        }
        all.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(all)
    }
}

// ── Scheduling helper ─────────────────────────────────────────────────────────

/// Push a batch of arrival events into `engine` in order.
pub fn schedule_all<D: DagSource>(engine: &mut Engine<D>, events: Vec<Event>) -> EngineResult<()> {
    for event in events {
        engine.schedule(event)?;
    }
    Ok(())
}
