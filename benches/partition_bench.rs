use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use pim_bfs::algs::populate::convert_partitions;
use pim_bfs::algs::run_simulated;
use pim_bfs::config::{Algorithm, RunConfig};
use pim_bfs::graph::EdgeList;
use pim_bfs::partitioning::{GridShape, Topology, pad_node_count, partition_edges};

// Synthetic uniform random digraph
fn random_graph(n: u32, m: usize, seed: u64) -> EdgeList {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut coo = EdgeList::with_capacity(n, n, m);
    for _ in 0..m {
        coo.push(rng.gen_range(0..n), rng.gen_range(0..n));
    }
    coo
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition+convert");
    for &(n, m) in &[(10_000u32, 80_000usize), (100_000, 800_000)] {
        let mut graph = random_graph(n, m, 42);
        let padded = pad_node_count(n, 64).unwrap();
        graph.pad_to(padded, padded);
        for (topology, algorithm) in [
            (Topology::Row, Algorithm::TopDown),
            (Topology::Column, Algorithm::BottomUp),
            (Topology::Grid, Algorithm::EdgeCentric),
        ] {
            let shape = GridShape::for_topology(topology, 64).unwrap();
            group.bench_with_input(BenchmarkId::new(topology.to_string(), n), &graph, |b, g| {
                b.iter(|| {
                    let parts = partition_edges(g, shape).unwrap();
                    convert_partitions(algorithm, parts)
                })
            });
        }
    }
    group.finish();
}

fn bench_bfs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfs");
    group.sample_size(10);
    let graph = random_graph(20_000, 160_000, 7);
    for algorithm in [Algorithm::TopDown, Algorithm::BottomUp, Algorithm::EdgeCentric] {
        let cfg = RunConfig {
            units: 16,
            algorithm,
            ..RunConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("simulated", algorithm), &graph, |b, g| {
            b.iter(|| run_simulated(g.clone(), &cfg).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition, bench_bfs);
criterion_main!(benches);
