//! End-to-end driver: pad, partition, upload, iterate, aggregate.

use crate::bfs_error::BfsError;
use crate::config::RunConfig;
use crate::data::{BfsDims, LayoutPlan};
use crate::fleet::sim::SimFleet;
use crate::fleet::{ComputeFleet, FleetHandle};
use crate::graph::EdgeList;
use crate::partitioning::{GridShape, Topology, pad_node_count, partition_edges};
use std::time::Instant;

use super::aggregate::{LevelMap, collect_levels};
use super::context::{OrchestratorContext, PhaseTimes};
use super::engine::{RoundStats, SyncEngine};
use super::exchange::TopologyExchange;
use super::populate::{convert_partitions, populate};

/// Everything a finished run reports.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub levels: LevelMap,
    pub stats: RoundStats,
    pub times: PhaseTimes,
    pub topology: Topology,
    pub shape: GridShape,
    /// Node count after padding.
    pub padded_nodes: u32,
}

/// BFS from node 0 of `graph` on `fleet`, which must hold `cfg.units` units.
/// The fleet is released before this returns, on success and on error.
///
/// # Errors
/// `Config` for an invalid `cfg`, a non-square or empty graph, or a fleet of
/// the wrong size; otherwise whatever partitioning, layout or the fleet
/// report. Nothing is retried.
pub fn run_bfs<F: ComputeFleet>(
    fleet: F,
    graph: EdgeList,
    cfg: &RunConfig,
) -> Result<RunReport, BfsError> {
    cfg.validate()?;
    let mut fleet = FleetHandle::new(fleet);
    if fleet.num_units() != cfg.units {
        return Err(BfsError::config(format!(
            "fleet has {} units, configuration asks for {}",
            fleet.num_units(),
            cfg.units
        )));
    }
    if graph.num_rows != graph.num_cols {
        return Err(BfsError::config(format!(
            "adjacency matrix must be square, got {}x{}",
            graph.num_rows, graph.num_cols
        )));
    }
    let num_nodes = graph.num_rows;
    if num_nodes == 0 {
        return Err(BfsError::config("graph has no nodes"));
    }

    let topology = cfg.topology();
    let shape = GridShape::for_topology(topology, cfg.units)?;
    fleet.load_program(&cfg.program_path())?;
    log::info!(
        "{} BFS over {num_nodes} nodes and {} edges on {} units ({topology}, {}x{})",
        cfg.algorithm,
        graph.num_edges(),
        cfg.units,
        shape.rows,
        shape.cols
    );

    let t = Instant::now();
    let padded = pad_node_count(num_nodes, cfg.units)?;
    if padded != num_nodes {
        log::warn!("padding {num_nodes} nodes to {padded} with isolated nodes");
    }
    let mut graph = graph;
    graph.pad_to(padded, padded);
    let parts = partition_edges(&graph, shape)?;
    drop(graph);
    let graphs = convert_partitions(cfg.algorithm, parts);

    let dims = BfsDims::new(shape, padded)?;
    let plan = LayoutPlan::for_variant(cfg.algorithm, &dims, cfg.block_words);
    let mut ctx = OrchestratorContext::new(fleet, dims)?;
    populate(&mut ctx, &plan, &graphs)?;
    drop(graphs);
    ctx.times.populate = t.elapsed();

    let mut engine = SyncEngine::new(TopologyExchange::for_topology(topology, &dims), cfg.units);
    let stats = engine.run(&mut ctx)?;
    let levels = collect_levels(&mut ctx, num_nodes)?;
    let times = ctx.times;
    drop(ctx);

    log::info!(
        "populate {:?}, compute {:?}, communication {:?}, aggregation {:?}, fetch {:?}",
        times.populate,
        times.compute,
        times.communication,
        times.aggregation,
        times.fetch
    );
    Ok(RunReport {
        levels,
        stats,
        times,
        topology,
        shape,
        padded_nodes: padded,
    })
}

/// [`run_bfs`] on a freshly allocated [`SimFleet`]. The configuration is
/// validated before anything is allocated.
pub fn run_simulated(graph: EdgeList, cfg: &RunConfig) -> Result<RunReport, BfsError> {
    cfg.validate()?;
    let fleet = SimFleet::with_heap(cfg.units, cfg.heap_bytes)?;
    run_bfs(fleet, graph, cfg)
}
