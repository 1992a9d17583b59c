//! Engine observer trait for metrics collection.

use fsim_core::{ResourceVec, SimTime};

use crate::request::Request;
use crate::share::ConsumerCounts;

/// State published to [`EngineObserver::on_step`] after each dispatched
/// event.
#[derive(Clone, Debug)]
pub struct StepSnapshot {
    pub time:         SimTime,
    /// Tools in the running state.
    pub active_tools: usize,
    /// Per-resource consumer counts (`|A_r|`).
    pub consumers:    ConsumerCounts,
    /// Per-resource utilization: 1 where any consumer exists, 0 otherwise.
    pub utilization:  ResourceVec,
}

/// Callbacks invoked by [`Engine::run`][crate::Engine::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — latency printer
///
/// ```rust,ignore
/// struct LatencyPrinter;
///
/// impl EngineObserver for LatencyPrinter {
///     fn on_request_complete(&mut self, request: &Request) {
///         println!("{}: {:?}", request.request_type, request.latency());
///     }
/// }
/// ```
pub trait EngineObserver {
    /// Called when the last tool of a request completes.  `request.latency()`
    /// is guaranteed `Some` here.
    fn on_request_complete(&mut self, _request: &Request) {}

    /// Called once per engine step, after the event at that instant was
    /// dispatched.  Whether and how often to persist these is the
    /// observer's business; the engine merely offers the hook.
    fn on_step(&mut self, _snapshot: &StepSnapshot) {}
}

/// An [`EngineObserver`] that does nothing.  Use when you need to call
/// `run` but don't want callbacks.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
