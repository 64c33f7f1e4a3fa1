#![allow(dead_code)]
use pim_bfs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub const ALGORITHMS: [Algorithm; 3] = [
    Algorithm::TopDown,
    Algorithm::BottomUp,
    Algorithm::EdgeCentric,
];
pub const TOPOLOGIES: [Topology; 3] = [Topology::Row, Topology::Column, Topology::Grid];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 0 → {1, 2}, {1, 2} → 3, 3 → 4.
pub fn diamond() -> EdgeList {
    EdgeList::from_pairs(5, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]).unwrap()
}

/// 0 → 1 → … → len.
pub fn path(len: u32) -> EdgeList {
    EdgeList::from_pairs(len + 1, (0..len).map(|i| (i, i + 1))).unwrap()
}

pub fn random_graph(seed: u64, num_nodes: u32, num_edges: usize) -> EdgeList {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut coo = EdgeList::with_capacity(num_nodes, num_nodes, num_edges);
    for _ in 0..num_edges {
        coo.push(rng.gen_range(0..num_nodes), rng.gen_range(0..num_nodes));
    }
    coo
}

/// Sequential BFS from node 0: `Some(level)` for reached nodes.
pub fn reference_levels(g: &EdgeList) -> Vec<Option<u32>> {
    let n = g.num_rows as usize;
    let mut adj = vec![Vec::new(); n];
    for (r, c) in g.edges() {
        adj[r as usize].push(c);
    }
    let mut level = vec![None; n];
    let mut queue = VecDeque::from([0u32]);
    level[0] = Some(0);
    while let Some(u) = queue.pop_front() {
        let next = level[u as usize].map(|l| l + 1);
        for &v in &adj[u as usize] {
            if level[v as usize].is_none() {
                level[v as usize] = next;
                queue.push_back(v);
            }
        }
    }
    level
}

pub fn config(units: u32, algorithm: Algorithm, topology: Topology) -> RunConfig {
    RunConfig {
        units,
        algorithm,
        topology: Some(topology),
        heap_bytes: 1 << 20,
        ..RunConfig::default()
    }
}

/// Every combination of unit count, algorithm and topology.
pub fn combinations() -> impl Iterator<Item = (u32, Algorithm, Topology)> {
    [8u32, 16].into_iter().flat_map(|units| {
        ALGORITHMS
            .into_iter()
            .flat_map(move |a| TOPOLOGIES.into_iter().map(move |t| (units, a, t)))
    })
}

pub fn levels_of(report: &RunReport) -> Vec<Option<u32>> {
    (0..report.levels.num_nodes())
        .map(|n| report.levels.level(n))
        .collect()
}
