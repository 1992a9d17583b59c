//! Integration tests for the simulation engine.

use fsim_core::{RequestId, ResourceCapacities, ResourceKind, SimTime};
use fsim_graph::{DagCatalog, TemplateCatalog, ToolGraph, ToolTemplate};

use crate::{Engine, EngineError, EngineObserver, Event, EventQueue, NoopObserver, Request, StepSnapshot};

// ── Helpers ───────────────────────────────────────────────────────────────────

const TOL: f64 = 1e-9;

fn close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn caps(pairs: &[(ResourceKind, f64)]) -> ResourceCapacities {
    ResourceCapacities::new(pairs.iter().copied()).unwrap()
}

/// Catalog with one request type whose DAG is a chain of the given tools.
/// Each entry is `(name, loads)`; edges run first → last.
fn chain_catalog(request_type: &str, tools: &[(&str, &[(ResourceKind, f64)])]) -> DagCatalog {
    let mut templates = TemplateCatalog::new();
    let mut builder = ToolGraph::builder();
    for &(name, loads) in tools {
        let mut template = ToolTemplate::new(name);
        for &(kind, load) in loads {
            template = template.with_load(kind, load);
        }
        templates.insert(template).unwrap();
        builder = builder.node(name, name);
    }
    for pair in tools.windows(2) {
        builder = builder.edge(pair[0].0, pair[1].0);
    }
    let graph = builder.build(&templates).unwrap();

    let mut dags = DagCatalog::new();
    dags.insert(request_type, graph);
    dags
}

/// Records everything the engine reports.
#[derive(Default)]
struct Collector {
    completions: Vec<(String, f64, f64, f64)>,
    snapshots:   Vec<StepSnapshot>,
}

impl EngineObserver for Collector {
    fn on_request_complete(&mut self, request: &Request) {
        self.completions.push((
            request.request_type.clone(),
            request.arrived_at.0,
            request.finished_at.unwrap().0,
            request.latency().unwrap(),
        ));
    }

    fn on_step(&mut self, snapshot: &StepSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

fn run_to_end<D: fsim_graph::DagSource>(engine: &mut Engine<D>) -> Collector {
    let mut collector = Collector::default();
    engine.run(SimTime(1e6), &mut collector).unwrap();
    collector
}

// ── Event queue ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue_tests {
    use super::*;

    #[test]
    fn pops_in_timestamp_order() {
        let mut queue = EventQueue::new();
        queue.push(Event::arrival(SimTime(2.0), "b"));
        queue.push(Event::arrival(SimTime(1.0), "a"));
        queue.push(Event::arrival(SimTime(3.0), "c"));

        assert_eq!(queue.peek_time(), Some(SimTime(1.0)));
        let order: Vec<f64> = std::iter::from_fn(|| queue.pop()).map(|e| e.time.0).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_enqueue_order() {
        let mut queue = EventQueue::new();
        for name in ["first", "second", "third"] {
            queue.push(Event::arrival(SimTime(1.0), name));
        }
        let mut popped = Vec::new();
        while let Some(event) = queue.pop() {
            if let crate::EventKind::RequestArrival { request_type } = event.kind {
                popped.push(request_type);
            }
        }
        assert_eq!(popped, vec!["first", "second", "third"]);
    }

    #[test]
    fn peek_on_empty_is_none() {
        let queue = EventQueue::new();
        assert_eq!(queue.peek_time(), None);
        assert_eq!(queue.len(), 0);
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn solo_tool() {
        // One tool, loads {CPU: 100} on capacity 100: latency 1.0.
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();

        let collector = run_to_end(&mut engine);
        assert_eq!(collector.completions.len(), 1);
        let (_, arrival, finish, latency) = &collector.completions[0];
        close(*arrival, 0.0);
        close(*finish, 1.0);
        close(*latency, 1.0);
    }

    #[test]
    fn sequential_chain() {
        // A{CPU:50} → B{CPU:30} on CPU 100: A done at 0.5, B at 0.8.
        let dags = chain_catalog(
            "seq",
            &[
                ("a", &[(ResourceKind::Cpu, 50.0)]),
                ("b", &[(ResourceKind::Cpu, 30.0)]),
            ],
        );
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "seq")).unwrap();

        let collector = run_to_end(&mut engine);
        close(collector.completions[0].3, 0.8);

        let request = engine.requests().next().unwrap();
        let graph = request.graph().clone();
        let a = request.tool(graph.node_index("a").unwrap());
        let b = request.tool(graph.node_index("b").unwrap());
        close(a.finished_at.unwrap().0, 0.5);
        close(b.started_at.unwrap().0, 0.5);
        close(b.finished_at.unwrap().0, 0.8);
    }

    #[test]
    fn two_parallel_requests_share_cpu() {
        // Two requests, each one tool {CPU: 100}, arriving together on
        // CPU 100: each gets rate 50, both finish at 2.0.
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();

        let collector = run_to_end(&mut engine);
        assert_eq!(collector.completions.len(), 2);
        for (_, _, finish, latency) in &collector.completions {
            close(*finish, 2.0);
            close(*latency, 2.0);
        }
    }

    #[test]
    fn mixed_resource_contention() {
        // A{CPU:100, NET:50}, B{CPU:80} on CPU 100 / NET 100, both at t=0:
        //   t=0.5  A exhausts network (each did 25 CPU)
        //   t=1.6  B exhausts CPU      (A holds 20 CPU remaining)
        //   t=1.8  A exhausts CPU
        let mut templates = TemplateCatalog::new();
        templates
            .insert(
                ToolTemplate::new("a")
                    .with_load(ResourceKind::Cpu, 100.0)
                    .with_load(ResourceKind::Network, 50.0),
            )
            .unwrap();
        templates
            .insert(ToolTemplate::new("b").with_load(ResourceKind::Cpu, 80.0))
            .unwrap();
        let graph = ToolGraph::builder()
            .node("a", "a")
            .node("b", "b")
            .build(&templates)
            .unwrap();
        let mut dags = DagCatalog::new();
        dags.insert("mixed", graph);

        let mut engine = Engine::new(
            caps(&[(ResourceKind::Cpu, 100.0), (ResourceKind::Network, 100.0)]),
            dags,
        );
        engine.schedule(Event::arrival(SimTime::ZERO, "mixed")).unwrap();

        let collector = run_to_end(&mut engine);
        close(collector.completions[0].3, 1.8);

        let request = engine.requests().next().unwrap();
        let graph = request.graph().clone();
        let a = request.tool(graph.node_index("a").unwrap());
        let b = request.tool(graph.node_index("b").unwrap());
        close(b.finished_at.unwrap().0, 1.6);
        close(a.finished_at.unwrap().0, 1.8);
    }

    #[test]
    fn diamond_dag() {
        // R{10} → {L{40}, M{40}} → F{10} on CPU 100:
        // R at 0.1; L and M share 50/50, done at 0.9; F at 1.0.
        let mut templates = TemplateCatalog::new();
        for (name, load) in [("r", 10.0), ("l", 40.0), ("m", 40.0), ("f", 10.0)] {
            templates
                .insert(ToolTemplate::new(name).with_load(ResourceKind::Cpu, load))
                .unwrap();
        }
        let graph = ToolGraph::builder()
            .node("r", "r")
            .node("l", "l")
            .node("m", "m")
            .node("f", "f")
            .edge("r", "l")
            .edge("r", "m")
            .edge("l", "f")
            .edge("m", "f")
            .build(&templates)
            .unwrap();
        let mut dags = DagCatalog::new();
        dags.insert("diamond", graph);

        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "diamond")).unwrap();

        let collector = run_to_end(&mut engine);
        close(collector.completions[0].3, 1.0);

        let request = engine.requests().next().unwrap();
        let graph = request.graph().clone();
        let at = |name: &str| {
            request
                .tool(graph.node_index(name).unwrap())
                .finished_at
                .unwrap()
                .0
        };
        close(at("r"), 0.1);
        close(at("l"), 0.9);
        close(at("m"), 0.9);
        close(at("f"), 1.0);
    }

    #[test]
    fn arrival_during_contention() {
        // X{CPU:100} at t=0, Y{CPU:50} at t=0.5 on CPU 100:
        // X runs alone on [0, 0.5] (50 done), then both share 50 each.
        // Y done at 1.5 (latency 1.0); X also done at 1.5.
        let mut dags = chain_catalog("x", &[("x", &[(ResourceKind::Cpu, 100.0)])]);
        {
            let mut templates = TemplateCatalog::new();
            templates
                .insert(ToolTemplate::new("y").with_load(ResourceKind::Cpu, 50.0))
                .unwrap();
            let graph = ToolGraph::builder().node("y", "y").build(&templates).unwrap();
            dags.insert("y", graph);
        }

        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "x")).unwrap();
        engine.schedule(Event::arrival(SimTime(0.5), "y")).unwrap();

        let collector = run_to_end(&mut engine);
        assert_eq!(collector.completions.len(), 2);
        let latency_of = |ty: &str| {
            collector
                .completions
                .iter()
                .find(|(t, ..)| t == ty)
                .map(|(_, _, _, l)| *l)
                .unwrap()
        };
        close(latency_of("x"), 1.5);
        close(latency_of("y"), 1.0);
    }

    #[test]
    fn arrival_exactly_at_completion_instant() {
        // X{CPU:50} completes at 0.5; Y{CPU:50} arrives at exactly 0.5.
        // The start is processed first; with zero elapsed time the transient
        // double-count debits nothing, and Y then runs alone.
        let mut dags = chain_catalog("x", &[("x", &[(ResourceKind::Cpu, 50.0)])]);
        {
            let mut templates = TemplateCatalog::new();
            templates
                .insert(ToolTemplate::new("y").with_load(ResourceKind::Cpu, 50.0))
                .unwrap();
            let graph = ToolGraph::builder().node("y", "y").build(&templates).unwrap();
            dags.insert("y", graph);
        }

        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "x")).unwrap();
        engine.schedule(Event::arrival(SimTime(0.5), "y")).unwrap();

        let collector = run_to_end(&mut engine);
        let latency_of = |ty: &str| {
            collector
                .completions
                .iter()
                .find(|(t, ..)| t == ty)
                .map(|(_, _, _, l)| *l)
                .unwrap()
        };
        close(latency_of("x"), 0.5);
        close(latency_of("y"), 0.5);
    }

    #[test]
    fn simultaneous_identical_completions() {
        // Two identical requests finish at the same instant; both must be
        // swept even though each step applies only one completion.
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 60.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 120.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();

        let collector = run_to_end(&mut engine);
        assert_eq!(collector.completions.len(), 2);
        for (_, _, finish, _) in &collector.completions {
            close(*finish, 1.0);
        }
        assert_eq!(engine.active_tool_count(), 0);
    }
}

// ── Boundary behaviors ────────────────────────────────────────────────────────

#[cfg(test)]
mod boundary_tests {
    use super::*;

    #[test]
    fn zero_load_tool_completes_at_start() {
        let dags = chain_catalog("noop", &[("noop", &[])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime(3.0), "noop")).unwrap();

        let collector = run_to_end(&mut engine);
        let (_, arrival, finish, latency) = &collector.completions[0];
        close(*arrival, 3.0);
        close(*finish, 3.0);
        close(*latency, 0.0);

        let request = engine.requests().next().unwrap();
        let tool = request.tool(0);
        assert_eq!(tool.started_at, tool.finished_at);
    }

    #[test]
    fn single_tool_latency_is_load_over_capacity() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Npu, 30.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Npu, 400.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        let collector = run_to_end(&mut engine);
        close(collector.completions[0].3, 30.0 / 400.0);
    }

    #[test]
    fn deep_sequential_chain_sums_latencies() {
        // 10 tools of load 10 each on capacity 100, no contention: 10 × 0.1.
        const LINK_LOAD: &[(ResourceKind, f64)] = &[(ResourceKind::Cpu, 10.0)];
        let names: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
        let tools: Vec<(&str, &[(ResourceKind, f64)])> =
            names.iter().map(|n| (n.as_str(), LINK_LOAD)).collect();
        let dags = chain_catalog("deep", &tools);

        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "deep")).unwrap();
        let collector = run_to_end(&mut engine);
        close(collector.completions[0].3, 1.0);
    }
}

// ── Invariants ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod invariant_tests {
    use super::*;

    fn two_type_engine() -> Engine<DagCatalog> {
        let mut dags = chain_catalog(
            "short",
            &[
                ("plan", &[(ResourceKind::Cpu, 10.0)]),
                ("fetch", &[(ResourceKind::Network, 50.0), (ResourceKind::Cpu, 5.0)]),
            ],
        );
        {
            let mut templates = TemplateCatalog::new();
            templates
                .insert(
                    ToolTemplate::new("crunch")
                        .with_load(ResourceKind::Cpu, 80.0)
                        .with_load(ResourceKind::Memory, 500.0),
                )
                .unwrap();
            let graph = ToolGraph::builder().node("crunch", "crunch").build(&templates).unwrap();
            dags.insert("long", graph);
        }
        Engine::new(
            caps(&[
                (ResourceKind::Cpu, 100.0),
                (ResourceKind::Network, 100.0),
                (ResourceKind::Memory, 1000.0),
            ]),
            dags,
        )
    }

    fn staggered_arrivals(engine: &mut Engine<DagCatalog>) {
        for i in 0..6 {
            let ty = if i % 2 == 0 { "short" } else { "long" };
            engine
                .schedule(Event::arrival(SimTime(i as f64 * 0.3), ty))
                .unwrap();
        }
    }

    #[test]
    fn determinism_identical_inputs_identical_latencies() {
        let latencies = || {
            let mut engine = two_type_engine();
            staggered_arrivals(&mut engine);
            let collector = run_to_end(&mut engine);
            collector
                .completions
                .iter()
                .map(|(ty, _, _, l)| (ty.clone(), *l))
                .collect::<Vec<_>>()
        };
        assert_eq!(latencies(), latencies());
    }

    #[test]
    fn tool_timestamps_respect_dag_order() {
        let mut engine = two_type_engine();
        staggered_arrivals(&mut engine);
        run_to_end(&mut engine);

        for request in engine.requests() {
            let graph = request.graph().clone();
            let finish = request.finished_at.unwrap();
            for (node, tool) in request.tools().iter().enumerate() {
                let started = tool.started_at.unwrap();
                let finished = tool.finished_at.unwrap();
                assert!(finished >= started);
                assert!(finish >= finished, "request finish covers every tool");
                for &pred in graph.predecessors(node) {
                    let pred_finish = request.tool(pred).finished_at.unwrap();
                    assert!(
                        started >= pred_finish,
                        "tool started at {started} before predecessor finished at {pred_finish}"
                    );
                }
            }
        }
    }

    #[test]
    fn active_tools_always_have_remaining_work() {
        // Observed through snapshots: whenever tools are active, at least
        // one resource has a consumer.
        let mut engine = two_type_engine();
        staggered_arrivals(&mut engine);
        let collector = run_to_end(&mut engine);
        for snapshot in &collector.snapshots {
            if snapshot.active_tools > 0 {
                let any_consumer = ResourceKind::ALL
                    .iter()
                    .any(|&kind| snapshot.consumers.count(kind) > 0);
                assert!(any_consumer, "active tools with no consumers at {}", snapshot.time);
            }
        }
    }

    #[test]
    fn conservation_busy_capacity_equals_total_load() {
        // Two parallel {CPU:100} tools on capacity 100: the CPU is busy on
        // [0, 2], so integrated busy capacity must equal 200 work units.
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();

        let collector = run_to_end(&mut engine);
        let mut integral = 0.0;
        let mut prev: Option<&StepSnapshot> = None;
        for snapshot in &collector.snapshots {
            if let Some(p) = prev {
                integral += p.utilization[ResourceKind::Cpu] * 100.0 * (snapshot.time - p.time);
            }
            prev = Some(snapshot);
        }
        close(integral, 200.0);
    }

    #[test]
    fn remaining_work_never_negative() {
        let mut engine = two_type_engine();
        staggered_arrivals(&mut engine);
        run_to_end(&mut engine);
        for request in engine.requests() {
            for tool in request.tools() {
                for kind in ResourceKind::ALL {
                    assert!(tool.remaining(kind) >= 0.0);
                    assert!(tool.remaining(kind) <= TOL);
                }
            }
        }
    }
}

// ── Run control ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_control_tests {
    use super::*;

    #[test]
    fn rerun_on_drained_engine_is_noop() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        run_to_end(&mut engine);

        let steps = engine.steps();
        let now = engine.now();
        engine.run(SimTime(1e6), &mut NoopObserver).unwrap();
        assert_eq!(engine.steps(), steps);
        assert_eq!(engine.now(), now);
    }

    #[test]
    fn split_run_matches_one_shot_run() {
        let build = || {
            let dags = chain_catalog(
                "seq",
                &[
                    ("a", &[(ResourceKind::Cpu, 50.0)]),
                    ("b", &[(ResourceKind::Cpu, 30.0)]),
                ],
            );
            let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
            engine.schedule(Event::arrival(SimTime::ZERO, "seq")).unwrap();
            engine.schedule(Event::arrival(SimTime(0.2), "seq")).unwrap();
            engine
        };

        let mut one_shot = build();
        let full = run_to_end(&mut one_shot);

        let mut split = build();
        let mut collector = Collector::default();
        split.run(SimTime(0.4), &mut collector).unwrap();
        split.run(SimTime(1e6), &mut collector).unwrap();

        let latencies = |c: &Collector| {
            c.completions.iter().map(|(_, _, _, l)| *l).collect::<Vec<_>>()
        };
        assert_eq!(latencies(&full), latencies(&collector));
    }

    #[test]
    fn deadline_stops_midway() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();

        // Tool would complete at 1.0; the deadline cuts the run short.
        engine.run(SimTime(0.5), &mut NoopObserver).unwrap();
        assert_eq!(engine.completed_request_count(), 0);
        assert_eq!(engine.active_tool_count(), 1);

        // Resuming finishes it.
        engine.run(SimTime(2.0), &mut NoopObserver).unwrap();
        assert_eq!(engine.completed_request_count(), 1);
    }

    #[test]
    fn events_beyond_deadline_stay_queued() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime(5.0), "solo")).unwrap();

        engine.run(SimTime(1.0), &mut NoopObserver).unwrap();
        assert_eq!(engine.pending_event_count(), 1);
        assert_eq!(engine.request_count(), 0);
    }
}

// ── Error paths ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn event_in_past_rejected() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine.schedule(Event::arrival(SimTime::ZERO, "solo")).unwrap();
        engine.run(SimTime(2.0), &mut NoopObserver).unwrap();

        let err = engine
            .schedule(Event::arrival(SimTime(0.5), "solo"))
            .unwrap_err();
        assert!(matches!(err, EngineError::EventInPast { .. }));
    }

    #[test]
    fn unknown_request_type_aborts_run() {
        let dags = chain_catalog("known", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        engine
            .schedule(Event::arrival(SimTime::ZERO, "mystery"))
            .unwrap();

        let err = engine.run(SimTime(1.0), &mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownRequestType { request_type } if request_type == "mystery"
        ));
    }

    #[test]
    fn unknown_request_in_tool_start_is_invariant_violation() {
        let dags = chain_catalog("solo", &[("work", &[(ResourceKind::Cpu, 100.0)])]);
        let mut engine = Engine::new(caps(&[(ResourceKind::Cpu, 100.0)]), dags);
        // Forge a tool-start for a request that was never materialized.
        engine
            .schedule(Event {
                time: SimTime::ZERO,
                kind: crate::EventKind::ToolStart { request: RequestId(99), node: 0 },
            })
            .unwrap();

        let err = engine.run(SimTime(1.0), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, EngineError::UnknownRequest { .. }));
    }
}
