//! Coordinate-format (COO) edge lists.
//!
//! An [`EdgeList`] is the exchange format of the crate: the loader produces
//! one, the partitioner bins one into many, and the edge-centric kernel
//! consumes them directly. Edges are unordered `(row, col)` pairs, i.e.
//! `(source, destination)`.

use crate::bfs_error::BfsError;
use crate::debug_invariants::DebugInvariants;
use crate::partitioning::error::PartitionError;

/// A sparse adjacency matrix stored as parallel row/column index arrays.
///
/// # Invariants
/// - `row_idxs.len() == col_idxs.len()`
/// - every row index is `< num_rows`, every column index is `< num_cols`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeList {
    pub num_rows: u32,
    pub num_cols: u32,
    pub row_idxs: Vec<u32>,
    pub col_idxs: Vec<u32>,
}

impl EdgeList {
    /// Empty `num_rows × num_cols` matrix.
    pub fn new(num_rows: u32, num_cols: u32) -> Self {
        Self::with_capacity(num_rows, num_cols, 0)
    }

    /// Empty matrix with room for `edges` entries.
    pub fn with_capacity(num_rows: u32, num_cols: u32, edges: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            row_idxs: Vec::with_capacity(edges),
            col_idxs: Vec::with_capacity(edges),
        }
    }

    /// Build a square `num_nodes × num_nodes` matrix from `(src, dst)` pairs.
    ///
    /// # Errors
    /// `PartitionError::IndexOutOfRange` if a pair does not fit.
    pub fn from_pairs<I>(num_nodes: u32, pairs: I) -> Result<Self, BfsError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut coo = Self::new(num_nodes, num_nodes);
        for (r, c) in pairs {
            coo.push(r, c);
        }
        coo.validate_invariants()?;
        Ok(coo)
    }

    /// Append one edge. Bounds are not checked here; see
    /// [`validate_invariants`](DebugInvariants::validate_invariants).
    #[inline]
    pub fn push(&mut self, row: u32, col: u32) {
        self.row_idxs.push(row);
        self.col_idxs.push(col);
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        debug_assert_eq!(self.row_idxs.len(), self.col_idxs.len());
        self.row_idxs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_idxs.is_empty()
    }

    /// Iterate over `(row, col)` pairs in storage order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.row_idxs
            .iter()
            .copied()
            .zip(self.col_idxs.iter().copied())
    }

    /// Swap the roles of rows and columns. No index is copied.
    pub fn transpose(self) -> Self {
        Self {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            row_idxs: self.col_idxs,
            col_idxs: self.row_idxs,
        }
    }

    /// Grow the matrix to at least `num_rows × num_cols`. The added
    /// rows/columns carry no edges (isolated padding nodes).
    pub fn pad_to(&mut self, num_rows: u32, num_cols: u32) {
        self.num_rows = self.num_rows.max(num_rows);
        self.num_cols = self.num_cols.max(num_cols);
    }
}

impl DebugInvariants for EdgeList {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "EdgeList invalid");
    }

    fn validate_invariants(&self) -> Result<(), BfsError> {
        if self.row_idxs.len() != self.col_idxs.len() {
            return Err(PartitionError::Ragged {
                rows: self.row_idxs.len(),
                cols: self.col_idxs.len(),
            }
            .into());
        }
        if let Some((row, col)) = self
            .edges()
            .find(|&(r, c)| r >= self.num_rows || c >= self.num_cols)
        {
            return Err(PartitionError::IndexOutOfRange {
                row,
                col,
                num_rows: self.num_rows,
                num_cols: self.num_cols,
            }
            .into());
        }
        Ok(())
    }
}
