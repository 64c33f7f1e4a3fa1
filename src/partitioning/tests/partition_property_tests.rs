use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::graph::EdgeList;
use crate::partitioning::{
    GridShape, NODE_ALIGN, Topology, nearest_factors, pad_node_count, partition_edges,
};

fn topology_strategy() -> impl Strategy<Value = Topology> {
    prop_oneof![
        Just(Topology::Row),
        Just(Topology::Column),
        Just(Topology::Grid)
    ]
}

fn random_graph(seed: u64, num_nodes: u32, num_edges: usize) -> EdgeList {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut coo = EdgeList::with_capacity(num_nodes, num_nodes, num_edges);
    for _ in 0..num_edges {
        coo.push(rng.gen_range(0..num_nodes), rng.gen_range(0..num_nodes));
    }
    coo
}

proptest! {
    #[test]
    fn padding_is_minimal_and_aligned(num_nodes in 0u32..100_000, k in 1u32..9) {
        let units = 8 * k;
        let padded = pad_node_count(num_nodes, units).unwrap();

        prop_assert!(padded >= num_nodes);
        prop_assert_eq!(padded % units, 0);
        prop_assert_eq!(padded % NODE_ALIGN, 0);
        prop_assert_eq!((padded / units) % NODE_ALIGN, 0);
        // one aligned chunk per unit less would no longer cover the graph
        if padded > 0 {
            prop_assert!(padded - units * NODE_ALIGN < num_nodes);
        }
    }

    #[test]
    fn grid_factors_are_closest_pair(n in 1u32..512) {
        let (r, c) = nearest_factors(n);
        prop_assert_eq!(r * c, n);
        prop_assert!(r <= c);
        for f in (r + 1)..=n.isqrt() {
            prop_assert!(n % f != 0, "{} divides {} and is closer to the root", f, n);
        }
    }

    #[test]
    fn partitions_cover_every_edge_once(
        seed in any::<u64>(),
        num_nodes in 1u32..700,
        num_edges in 0usize..400,
        k in prop_oneof![Just(1u32), Just(2u32)],
        topology in topology_strategy(),
    ) {
        let units = 8 * k;
        let mut coo = random_graph(seed, num_nodes, num_edges);
        let padded = pad_node_count(num_nodes, units).unwrap();
        coo.pad_to(padded, padded);

        let shape = GridShape::for_topology(topology, units).unwrap();
        let parts = partition_edges(&coo, shape).unwrap();
        prop_assert_eq!(parts.len(), units as usize);

        let rows_per = padded / shape.rows;
        let cols_per = padded / shape.cols;

        let mut rebuilt = Vec::with_capacity(num_edges);
        for (p, part) in parts.iter().enumerate() {
            prop_assert_eq!((part.num_rows, part.num_cols), (rows_per, cols_per));
            let (p_row, p_col) = shape.coords(p as u32);
            for (r, c) in part.edges() {
                prop_assert!(r < rows_per && c < cols_per);
                rebuilt.push((r + p_row * rows_per, c + p_col * cols_per));
            }
        }

        let mut want: Vec<_> = coo.edges().collect();
        want.sort_unstable();
        rebuilt.sort_unstable();
        prop_assert_eq!(rebuilt, want);
    }
}
