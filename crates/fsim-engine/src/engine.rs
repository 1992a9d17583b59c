//! The `Engine` struct and its event loop.

use std::collections::{BTreeSet, HashMap};

use fsim_core::{RequestId, ResourceCapacities, ResourceKind, SimTime};
use fsim_graph::DagSource;

use crate::error::{EngineError, EngineResult};
use crate::event::{Event, EventKind, EventQueue};
use crate::observer::{EngineObserver, StepSnapshot};
use crate::request::{Request, ToolKey};
use crate::share::{self, ConsumerCounts};
use crate::tool::ToolStatus;

// ── Engine ────────────────────────────────────────────────────────────────────

/// The discrete-event simulation engine.
///
/// `Engine<D>` owns all run state and drives the loop described in the
/// [crate docs](crate): at each step it advances simulated time to the
/// earlier of the next queued start event and the next synthesized
/// completion, debits fair-share progress over the elapsed interval, then
/// dispatches exactly one event.
///
/// `D` supplies the DAG for each arriving request type.  Arrivals reach the
/// engine as data via [`schedule`][Self::schedule]; the engine itself
/// consumes no randomness and keeps no global state, so independent engines
/// can run side by side.
pub struct Engine<D: DagSource> {
    caps: ResourceCapacities,
    dags: D,

    now:   SimTime,
    queue: EventQueue,

    /// All requests seen this run, keyed by identity.  Requests are the
    /// arenas that own tool instances; everything else addresses tools by
    /// [`ToolKey`].
    requests: HashMap<RequestId, Request>,

    /// Tools currently running.  Ordered iteration fixes completion-search
    /// tie-breaks; membership is the authoritative fair-share denominator.
    active: BTreeSet<ToolKey>,

    next_request_id: u64,
    next_tool_id:    u64,
    steps:           u64,
    completed:       u64,
}

impl<D: DagSource> Engine<D> {
    pub fn new(caps: ResourceCapacities, dags: D) -> Self {
        Self {
            caps,
            dags,
            now:             SimTime::ZERO,
            queue:           EventQueue::new(),
            requests:        HashMap::new(),
            active:          BTreeSet::new(),
            next_request_id: 0,
            next_tool_id:    0,
            steps:           0,
            completed:       0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Push a start event.  Rejects timestamps before the current time.
    pub fn schedule(&mut self, event: Event) -> EngineResult<()> {
        if event.time < self.now {
            return Err(EngineError::EventInPast { event: event.time, now: self.now });
        }
        self.queue.push(event);
        Ok(())
    }

    /// Drive the loop until the queue and active set are both empty
    /// (exhaustion — benign), or the next instant would exceed `until`.
    ///
    /// Calling `run` again with a later deadline resumes from live state:
    /// splitting a run at any instant yields the same trajectory as one
    /// uninterrupted run.
    pub fn run<O: EngineObserver>(&mut self, until: SimTime, observer: &mut O) -> EngineResult<()> {
        loop {
            let t_start = self.queue.peek_time().unwrap_or(SimTime::INFINITY);

            // Denominators for this step: the active set as it stands now,
            // which is constant until the event chosen below.
            let counts = self.consumer_counts()?;
            let completion = self.next_completion(&counts)?;
            let t_complete = completion.as_ref().map_or(SimTime::INFINITY, |c| c.at);

            let t_next = t_start.min(t_complete);
            if !t_next.is_finite() || t_next > until {
                break;
            }

            let delta = t_next - self.now;
            if delta > 0.0 {
                self.apply_progress(delta, &counts)?;
            }
            self.now = t_next;

            // Start wins ties: an arrival at a completion instant must enter
            // the queue before being weighed against departing tools.  With
            // zero elapsed time the transient double-count debits nothing.
            if t_start <= t_complete {
                if let Some(event) = self.queue.pop() {
                    match event.kind {
                        EventKind::RequestArrival { request_type } => {
                            self.handle_arrival(request_type)?;
                        }
                        EventKind::ToolStart { request, node } => {
                            self.handle_tool_start(ToolKey { request, node }, observer)?;
                        }
                    }
                }
            } else if let Some(c) = completion {
                // t_complete < t_start, so the search produced a candidate.
                self.complete_tool(c.key, c.resource, observer)?;
            }

            let counts = self.consumer_counts()?;
            observer.on_step(&StepSnapshot {
                time:         self.now,
                active_tools: self.active.len(),
                utilization:  counts.utilization(),
                consumers:    counts,
            });
            self.steps += 1;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn active_tool_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_event_count(&self) -> usize {
        self.queue.len()
    }

    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.requests.get(&id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.requests.values()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn completed_request_count(&self) -> u64 {
        self.completed
    }

    pub fn capacities(&self) -> &ResourceCapacities {
        &self.caps
    }

    // ── Event dispatch ────────────────────────────────────────────────────

    /// Materialize the arriving request and enqueue a start for every DAG
    /// root at the current instant.
    fn handle_arrival(&mut self, request_type: String) -> EngineResult<()> {
        let graph = self
            .dags
            .dag(&request_type)
            .ok_or_else(|| EngineError::UnknownRequestType {
                request_type: request_type.clone(),
            })?
            .clone();

        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;

        let request = Request::materialize(id, request_type, self.now, graph, &mut self.next_tool_id);
        for &root in request.graph().roots() {
            self.queue.push(Event::tool_start(self.now, id, root));
        }
        self.requests.insert(id, request);
        Ok(())
    }

    /// Transition a pending tool to running and insert it into the active
    /// set.  A zero-load tool never becomes active: it completes at the
    /// instant it starts.
    fn handle_tool_start<O: EngineObserver>(
        &mut self,
        key:      ToolKey,
        observer: &mut O,
    ) -> EngineResult<()> {
        let now = self.now;
        let loads = {
            let request = self.request_ref(key.request)?;
            let tool = request.tool(key.node);
            if tool.status != ToolStatus::Pending {
                return Err(EngineError::ToolNotPending {
                    tool:   tool.id,
                    status: tool.status,
                    time:   now,
                });
            }
            if !request.node_ready(key.node) {
                return Err(EngineError::PredecessorIncomplete { tool: tool.id, time: now });
            }
            request.graph().node(key.node).template.loads()
        };

        let request = self.request_mut(key.request)?;
        let tool = request.tool_mut(key.node);
        tool.status = ToolStatus::Running;
        tool.started_at = Some(now);
        tool.reset_remaining(loads);

        if tool.is_exhausted() {
            self.finalize_tool(key, observer)
        } else {
            self.active.insert(key);
            Ok(())
        }
    }

    /// Apply the synthesized completion of `key` on `resource`: snap that
    /// resource to exactly zero, and finish the tool if nothing remains
    /// anywhere.  Otherwise the tool stays active and simply stops counting
    /// toward that resource's denominator.
    fn complete_tool<O: EngineObserver>(
        &mut self,
        key:      ToolKey,
        resource: ResourceKind,
        observer: &mut O,
    ) -> EngineResult<()> {
        let fully_done = {
            let request = self.request_mut(key.request)?;
            let tool = request.tool_mut(key.node);
            tool.zero_remaining(resource);
            tool.is_exhausted()
        };
        if fully_done {
            self.finalize_tool(key, observer)?;
        }
        Ok(())
    }

    /// Finish a fully exhausted tool: record the transition, leave the
    /// active set, wake eligible successors, and close out the request if
    /// this was its last tool.
    fn finalize_tool<O: EngineObserver>(
        &mut self,
        key:      ToolKey,
        observer: &mut O,
    ) -> EngineResult<()> {
        let now = self.now;
        {
            let request = self.request_mut(key.request)?;
            let tool = request.tool_mut(key.node);
            tool.status = ToolStatus::Completed;
            tool.finished_at = Some(now);
        }
        self.active.remove(&key);

        let ready: Vec<usize> = {
            let request = self.request_ref(key.request)?;
            request
                .graph()
                .successors(key.node)
                .iter()
                .copied()
                .filter(|&succ| {
                    request.tool(succ).status == ToolStatus::Pending && request.node_ready(succ)
                })
                .collect()
        };
        for node in ready {
            self.queue.push(Event::tool_start(now, key.request, node));
        }

        let request = self
            .requests
            .get_mut(&key.request)
            .ok_or(EngineError::UnknownRequest { request: key.request, time: now })?;
        if request.finished_at.is_none() && request.is_completed() {
            request.finished_at = Some(now);
            self.completed += 1;
            observer.on_request_complete(request);
        }
        Ok(())
    }

    // ── Fair-share bookkeeping ────────────────────────────────────────────

    fn consumer_counts(&self) -> EngineResult<ConsumerCounts> {
        let mut counts = ConsumerCounts::default();
        for &key in &self.active {
            counts.tally(self.request_ref(key.request)?.tool(key.node));
        }
        Ok(counts)
    }

    /// The globally earliest upcoming resource-exhaustion instant across
    /// all active tools, or `None` for an empty active set.
    ///
    /// Ties resolve to the smallest [`ToolKey`], then the lowest resource
    /// ordinal — the iteration orders of the active set and of
    /// [`ResourceKind::ALL`].
    fn next_completion(&self, counts: &ConsumerCounts) -> EngineResult<Option<Completion>> {
        if self.active.is_empty() {
            return Ok(None);
        }
        let mut best: Option<Completion> = None;
        for &key in &self.active {
            let tool = self.request_ref(key.request)?.tool(key.node);
            if let Some((resource, at)) = share::tool_completion(self.now, &self.caps, counts, tool)
            {
                if best.as_ref().is_none_or(|b| at < b.at) {
                    best = Some(Completion { key, resource, at });
                }
            }
        }
        best.map(Some)
            .ok_or(EngineError::StalledActiveSet { time: self.now })
    }

    /// Debit `delta` seconds of progress from every active tool under the
    /// denominators in force over the elapsed interval.
    fn apply_progress(&mut self, delta: f64, counts: &ConsumerCounts) -> EngineResult<()> {
        let now = self.now;
        let caps = self.caps.clone();
        let keys: Vec<ToolKey> = self.active.iter().copied().collect();
        for key in keys {
            let request = self
                .requests
                .get_mut(&key.request)
                .ok_or(EngineError::UnknownRequest { request: key.request, time: now })?;
            let tool = request.tool_mut(key.node);
            let tool_id = tool.id;
            share::debit_tool(delta, &caps, counts, tool).map_err(|(resource, overshoot)| {
                EngineError::NegativeWork { tool: tool_id, resource, overshoot, time: now }
            })?;
        }
        Ok(())
    }

    // ── Registry helpers ──────────────────────────────────────────────────

    fn request_ref(&self, id: RequestId) -> EngineResult<&Request> {
        self.requests
            .get(&id)
            .ok_or(EngineError::UnknownRequest { request: id, time: self.now })
    }

    fn request_mut(&mut self, id: RequestId) -> EngineResult<&mut Request> {
        let now = self.now;
        self.requests
            .get_mut(&id)
            .ok_or(EngineError::UnknownRequest { request: id, time: now })
    }
}

// ── Completion candidate ──────────────────────────────────────────────────────

/// Result of the completion search: the tool, its bottleneck resource, and
/// the instant that resource runs dry.
struct Completion {
    key:      ToolKey,
    resource: ResourceKind,
    at:       SimTime,
}
