mod util;

use pim_bfs::algs::{EngineState, OrchestratorContext, SyncEngine, TopologyExchange};
use pim_bfs::algs::populate::{convert_partitions, populate};
use pim_bfs::data::{BfsDims, LayoutPlan};
use pim_bfs::partitioning::{pad_node_count, partition_edges};
use pim_bfs::prelude::*;
use util::*;

#[test]
fn path_of_depth_d_takes_d_plus_one_rounds() {
    for depth in [1u32, 5, 40] {
        for (units, algorithm, topology) in combinations() {
            let report = run_simulated(path(depth), &config(units, algorithm, topology)).unwrap();
            assert_eq!(report.stats.rounds, depth + 1, "{algorithm} {topology} {units}");
            assert_eq!(report.stats.final_level, depth);
            assert_eq!(report.levels.level(depth), Some(depth));
        }
    }
}

#[test]
fn busiest_unit_work_is_accumulated_per_round() {
    for (units, algorithm, topology) in combinations() {
        let report = run_simulated(path(6), &config(units, algorithm, topology)).unwrap();
        if algorithm == Algorithm::TopDown {
            // one frontier node with one out-edge per level, none in the last round
            assert_eq!(report.stats.critical_work, 6, "{topology} {units}");
        } else {
            assert!(report.stats.critical_work > 0, "{algorithm} {topology} {units}");
        }
    }
}

#[test]
fn isolated_root_converges_in_one_round() {
    let g = EdgeList::from_pairs(3, [(1, 2)]).unwrap();
    for (units, algorithm, topology) in combinations() {
        let report = run_simulated(g.clone(), &config(units, algorithm, topology)).unwrap();
        assert_eq!(report.stats.rounds, 1);
        assert_eq!(report.stats.final_level, 0);
        assert_eq!(report.levels.reached().collect::<Vec<_>>(), vec![(0, 0)]);
    }
}

#[test]
fn engine_steps_through_states_and_stays_converged() {
    let cfg = config(8, Algorithm::TopDown, Topology::Row);
    let shape = GridShape::for_topology(Topology::Row, 8).unwrap();
    let padded = pad_node_count(3, 8).unwrap();
    let mut g = path(2);
    g.pad_to(padded, padded);
    let graphs = convert_partitions(cfg.algorithm, partition_edges(&g, shape).unwrap());

    let mut fleet = SimFleet::with_heap(8, 1 << 20).unwrap();
    fleet.load_program(&cfg.program_path()).unwrap();
    let dims = BfsDims::new(shape, padded).unwrap();
    let plan = LayoutPlan::for_variant(cfg.algorithm, &dims, cfg.block_words);
    let mut ctx = OrchestratorContext::new(FleetHandle::new(fleet), dims).unwrap();
    populate(&mut ctx, &plan, &graphs).unwrap();

    let mut engine = SyncEngine::new(TopologyExchange::for_topology(Topology::Row, &dims), 8);
    assert_eq!(engine.state(), EngineState::Init);
    assert_eq!(engine.step(&mut ctx).unwrap(), EngineState::Round(2));
    assert_eq!(ctx.level(), 1);
    assert_eq!(engine.step(&mut ctx).unwrap(), EngineState::Round(3));
    assert_eq!(engine.step(&mut ctx).unwrap(), EngineState::Converged);
    assert_eq!(ctx.level(), 2);

    let launches = ctx.fleet().launches();
    assert_eq!(launches, 3);
    assert_eq!(engine.step(&mut ctx).unwrap(), EngineState::Converged);
    assert_eq!(ctx.fleet().launches(), launches);
}
