//! Partitioning errors for pim-bfs

use thiserror::Error;

/// Errors from padding, grid-shape selection and edge binning
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// The fleet must hold at least one unit
    #[error("Unit count must be non-zero")]
    NoUnits,
    /// Padding the node count would overflow the index type
    #[error("Padding {num_nodes} nodes over {units} units overflows u32")]
    NodeCountOverflow { num_nodes: u32, units: u32 },
    /// An axis cannot be split into equal chunks that are multiples of 32
    #[error("{axis} extent {extent} cannot be split into {parts} chunks aligned to 32 nodes")]
    Unaligned {
        axis: &'static str,
        extent: u32,
        parts: u32,
    },
    /// An edge lies outside the matrix it was declared in
    #[error("Edge ({row}, {col}) lies outside the {num_rows}x{num_cols} matrix")]
    IndexOutOfRange {
        row: u32,
        col: u32,
        num_rows: u32,
        num_cols: u32,
    },
    /// A compressed index points past its axis
    #[error("Compressed index {index} exceeds axis extent {extent}")]
    IndexBeyondExtent { index: u32, extent: u32 },
    /// Compressed pointer array is not a valid prefix sum
    #[error("Compressed pointer array broken at position {at}")]
    BrokenPointers { at: usize },
    /// Row and column index arrays differ in length
    #[error("Edge list has {rows} row indices but {cols} column indices")]
    Ragged { rows: usize, cols: usize },
}
