//! mixed-workload — end-to-end fairsim demo.
//!
//! Simulates a machine serving two agentic request types — quick web
//! searches and heavier deep-research runs — arriving as superposed
//! Poisson streams, then prints the latency/throughput summary and writes
//! CSV + JSON outputs under `output/mixed-workload/`.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use fsim_core::{ResourceCapacities, ResourceKind, SimTime};
use fsim_engine::Engine;
use fsim_graph::{DagCatalog, TemplateCatalog, ToolGraph, ToolTemplate};
use fsim_metrics::{CsvExporter, MetricsCollector};
use fsim_workload::{ArrivalGenerator, WorkloadSpec, schedule_all};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:              u64 = 42;
const WINDOW_SECS:       f64 = 60.0;  // arrival window
const DRAIN_UNTIL_SECS:  f64 = 120.0; // let in-flight requests finish
const WEB_SEARCH_RATE:   f64 = 30.0;  // req/min
const DEEP_RESEARCH_RATE: f64 = 10.0; // req/min

// ── Catalogs ──────────────────────────────────────────────────────────────────

/// web-search: query_planning → web_search → result_ranking.
/// deep-research: research_planning → {literature_search, data_analysis} → synthesis.
fn build_catalog() -> Result<DagCatalog> {
    let mut templates = TemplateCatalog::new();
    templates.insert(ToolTemplate::new("query_planning").with_load(ResourceKind::Cpu, 10.0))?;
    templates.insert(
        ToolTemplate::new("web_search")
            .with_load(ResourceKind::Network, 50.0)
            .with_load(ResourceKind::Cpu, 5.0),
    )?;
    templates.insert(ToolTemplate::new("result_ranking").with_load(ResourceKind::Cpu, 20.0))?;
    templates.insert(ToolTemplate::new("research_planning").with_load(ResourceKind::Cpu, 15.0))?;
    templates.insert(
        ToolTemplate::new("literature_search")
            .with_load(ResourceKind::Network, 100.0)
            .with_load(ResourceKind::Cpu, 10.0),
    )?;
    templates.insert(
        ToolTemplate::new("data_analysis")
            .with_load(ResourceKind::Cpu, 80.0)
            .with_load(ResourceKind::Memory, 500.0),
    )?;
    templates.insert(ToolTemplate::new("synthesis").with_load(ResourceKind::Cpu, 40.0))?;

    let web_search = ToolGraph::builder()
        .node("query_planning", "query_planning")
        .node("web_search", "web_search")
        .node("result_ranking", "result_ranking")
        .edge("query_planning", "web_search")
        .edge("web_search", "result_ranking")
        .build(&templates)?;

    let deep_research = ToolGraph::builder()
        .node("research_planning", "research_planning")
        .node("literature_search", "literature_search")
        .node("data_analysis", "data_analysis")
        .node("synthesis", "synthesis")
        .edge("research_planning", "literature_search")
        .edge("research_planning", "data_analysis")
        .edge("literature_search", "synthesis")
        .edge("data_analysis", "synthesis")
        .build(&templates)?;

    let mut dags = DagCatalog::new();
    dags.insert("web-search", web_search);
    dags.insert("deep-research", deep_research);
    Ok(dags)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== mixed-workload — fairsim demo ===");
    println!("Window: {WINDOW_SECS} s  |  Seed: {SEED}");
    println!();

    // 1. Resource capacities.
    let caps = ResourceCapacities::new([
        (ResourceKind::Cpu, 100.0),
        (ResourceKind::Npu, 100.0),
        (ResourceKind::Memory, 1000.0),
        (ResourceKind::Network, 100.0),
        (ResourceKind::Disk, 100.0),
    ])?;
    println!("Resources: {caps}");

    // 2. Request-type DAGs.
    let dags = build_catalog()?;
    println!("Request types: {:?}", dags.request_types());

    // 3. Seeded Poisson mix.
    let specs = [
        WorkloadSpec::new("web-search", WEB_SEARCH_RATE),
        WorkloadSpec::new("deep-research", DEEP_RESEARCH_RATE),
    ];
    let mut generator = ArrivalGenerator::new(SEED);
    let events = generator.mixed(&specs, WINDOW_SECS, SimTime::ZERO)?;
    println!("Generated {} arrivals over {WINDOW_SECS} s", events.len());
    println!();

    // 4. Run.
    let mut engine = Engine::new(caps, dags);
    schedule_all(&mut engine, events)?;

    let mut collector = MetricsCollector::new();
    let t0 = Instant::now();
    engine.run(SimTime(DRAIN_UNTIL_SECS), &mut collector)?;
    collector.mark_end(engine.now());
    let elapsed = t0.elapsed();

    println!(
        "Simulated {:.2} s in {:.3} s wall time ({} steps, {} requests completed)",
        engine.now().0,
        elapsed.as_secs_f64(),
        engine.steps(),
        engine.completed_request_count(),
    );
    println!();

    // 5. Summary.
    println!("{}", collector.summary());
    println!();

    // 6. Persist outputs.
    let out = Path::new("output/mixed-workload");
    std::fs::create_dir_all(out)?;

    let mut exporter = CsvExporter::new(out)?;
    exporter.export(&collector)?;
    exporter.finish()?;

    let json = collector.timeline().to_json()?;
    std::fs::write(out.join("utilization_timeline.json"), json)?;

    println!("Wrote request_latencies.csv, utilization_snapshots.csv,");
    println!("and utilization_timeline.json under {}", out.display());

    Ok(())
}
