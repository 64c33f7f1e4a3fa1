use super::*;
#[path = "partition_property_tests.rs"]
mod partition_property_tests;

fn sample() -> EdgeList {
    let mut coo = EdgeList::from_pairs(5, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]).unwrap();
    let n = pad_node_count(5, 8).unwrap();
    coo.pad_to(n, n);
    coo
}

#[test]
fn grid_factor_choice() {
    assert_eq!(nearest_factors(8), (2, 4));
    assert_eq!(nearest_factors(16), (4, 4));
    assert_eq!(nearest_factors(32), (4, 8));
    assert_eq!(nearest_factors(24), (4, 6));
    assert_eq!(nearest_factors(1), (1, 1));
    assert_eq!(nearest_factors(7), (1, 7));
}

#[test]
fn shapes_per_topology() {
    let row = GridShape::for_topology(Topology::Row, 8).unwrap();
    let col = GridShape::for_topology(Topology::Column, 8).unwrap();
    let grid = GridShape::for_topology(Topology::Grid, 8).unwrap();
    assert_eq!((row.rows, row.cols), (8, 1));
    assert_eq!((col.rows, col.cols), (1, 8));
    assert_eq!((grid.rows, grid.cols), (2, 4));
    assert_eq!(grid.coords(5), (1, 1));
    assert_eq!(grid.linear(1, 3), 7);
    assert_eq!(
        GridShape::for_topology(Topology::Grid, 0),
        Err(PartitionError::NoUnits)
    );
}

#[test]
fn padding_examples() {
    assert_eq!(pad_node_count(5, 8), Ok(256));
    assert_eq!(pad_node_count(256, 8), Ok(256));
    assert_eq!(pad_node_count(257, 8), Ok(512));
    assert_eq!(pad_node_count(1000, 16), Ok(1024));
    assert_eq!(pad_node_count(0, 8), Ok(0));
    assert_eq!(pad_node_count(5, 0), Err(PartitionError::NoUnits));
}

#[test]
fn padding_near_index_limit_overflows() {
    assert_eq!(
        pad_node_count(u32::MAX - 5, 8),
        Err(PartitionError::NodeCountOverflow {
            num_nodes: u32::MAX - 5,
            units: 8
        })
    );
    // largest count that still pads: 2^32 - 256
    assert_eq!(pad_node_count(u32::MAX - 300, 8), Ok(u32::MAX - 255));
}

#[test]
fn row_partition_rebases_rows_only() {
    let shape = GridShape::for_topology(Topology::Row, 8).unwrap();
    let parts = partition_edges(&sample(), shape).unwrap();
    assert_eq!(parts.len(), 8);
    // every edge has a source below 32, so all land in unit 0
    assert_eq!(parts[0].num_edges(), 5);
    assert_eq!((parts[0].num_rows, parts[0].num_cols), (32, 256));
    assert!(parts[1..].iter().all(EdgeList::is_empty));
}

#[test]
fn grid_partition_rebases_both_axes() {
    let mut coo = EdgeList::new(256, 256);
    coo.push(200, 100); // p_row 1 (128..), p_col 1 (64..128)
    coo.push(3, 255); // p_row 0, p_col 3
    let shape = GridShape::for_topology(Topology::Grid, 8).unwrap();
    let parts = partition_edges(&coo, shape).unwrap();
    assert_eq!(parts[5].edges().collect::<Vec<_>>(), vec![(72, 36)]);
    assert_eq!(parts[3].edges().collect::<Vec<_>>(), vec![(3, 63)]);
    assert_eq!((parts[0].num_rows, parts[0].num_cols), (128, 64));
}

#[test]
fn unaligned_matrix_is_rejected() {
    let coo = EdgeList::new(100, 100);
    let shape = GridShape::for_topology(Topology::Row, 8).unwrap();
    let err = partition_edges(&coo, shape).unwrap_err();
    assert!(matches!(err, PartitionError::Unaligned { axis: "row", .. }));
}
