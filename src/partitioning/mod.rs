//! Splitting an adjacency matrix into per-unit sub-matrices.
//!
//! Units are arranged in a `rows × cols` grid ([`GridShape`]); the padded
//! node space is cut into `rows` source ranges and `cols` destination
//! ranges, and every unit receives the edges of one rectangle with indices
//! rebased to that rectangle's origin. Linear unit indices are row-major:
//! `p_row * cols + p_col`.

pub mod error;

#[cfg(test)]
mod tests;

use crate::graph::EdgeList;
use error::PartitionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bits per frontier word; every per-unit chunk is a multiple of this.
pub const NODE_ALIGN: u32 = 32;

/// Which axis of the adjacency matrix is split across units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Split by source ranges; every unit sees all destinations.
    Row,
    /// Split by destination ranges; every unit sees all sources.
    Column,
    /// Split both axes over the nearest factor pair of the unit count.
    Grid,
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row" => Ok(Topology::Row),
            "col" => Ok(Topology::Column),
            "2d" => Ok(Topology::Grid),
            other => Err(format!(
                "unknown partitioning `{other}`; supported: row | col | 2d"
            )),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Topology::Row => "row",
            Topology::Column => "col",
            Topology::Grid => "2d",
        })
    }
}

/// Arrangement of units as a `rows × cols` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    /// Grid used for `topology` over `units` units.
    pub fn for_topology(topology: Topology, units: u32) -> Result<Self, PartitionError> {
        if units == 0 {
            return Err(PartitionError::NoUnits);
        }
        let (rows, cols) = match topology {
            Topology::Row => (units, 1),
            Topology::Column => (1, units),
            Topology::Grid => nearest_factors(units),
        };
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn units(&self) -> u32 {
        self.rows * self.cols
    }

    /// `(p_row, p_col)` of a linear unit index.
    #[inline]
    pub fn coords(&self, unit: u32) -> (u32, u32) {
        (unit / self.cols, unit % self.cols)
    }

    /// Linear unit index of grid position `(p_row, p_col)`.
    #[inline]
    pub fn linear(&self, p_row: u32, p_col: u32) -> u32 {
        p_row * self.cols + p_col
    }
}

/// The two nearest factors `(f, n / f)` of `n` with `f <= n / f`, found by
/// decreasing trial division from `⌊√n⌋`.
///
/// `n` must be non-zero.
pub fn nearest_factors(n: u32) -> (u32, u32) {
    debug_assert!(n > 0, "nearest_factors of zero");
    let mut f = n.isqrt().max(1);
    while n % f != 0 {
        f -= 1;
    }
    (f, n / f)
}

/// Smallest node count `>= num_nodes` that splits into `units` chunks whose
/// size is a multiple of [`NODE_ALIGN`].
///
/// # Errors
/// - `NoUnits` if `units` is zero;
/// - `NodeCountOverflow` if the padded count does not fit in `u32`.
pub fn pad_node_count(num_nodes: u32, units: u32) -> Result<u32, PartitionError> {
    if units == 0 {
        return Err(PartitionError::NoUnits);
    }
    num_nodes
        .div_ceil(units)
        .checked_next_multiple_of(NODE_ALIGN)
        .and_then(|chunk| chunk.checked_mul(units))
        .ok_or(PartitionError::NodeCountOverflow { num_nodes, units })
}

fn extent_per_part(axis: &'static str, extent: u32, parts: u32) -> Result<u32, PartitionError> {
    if parts == 0 {
        return Err(PartitionError::NoUnits);
    }
    let per = extent / parts;
    if extent % parts != 0 || per % NODE_ALIGN != 0 {
        return Err(PartitionError::Unaligned { axis, extent, parts });
    }
    Ok(per)
}

/// Bin the edges of `coo` into `shape.units()` partitions.
///
/// Two passes over the edges: the first counts edges per partition so every
/// partition is allocated exactly once, the second appends each edge to its
/// partition with indices rebased to the partition origin. Edge order
/// inside a partition follows the input order.
///
/// # Errors
/// - `Unaligned` if either axis does not split into 32-aligned chunks
///   (pad first, see [`pad_node_count`]);
/// - `IndexOutOfRange` for an edge outside the matrix.
///
/// # Complexity
/// **O(E + N)** time, **O(E)** extra space.
pub fn partition_edges(coo: &EdgeList, shape: GridShape) -> Result<Vec<EdgeList>, PartitionError> {
    let rows_per = extent_per_part("row", coo.num_rows, shape.rows)?;
    let cols_per = extent_per_part("column", coo.num_cols, shape.cols)?;
    let n = shape.units() as usize;

    let part_of = |row: u32, col: u32| -> Result<usize, PartitionError> {
        if row >= coo.num_rows || col >= coo.num_cols {
            return Err(PartitionError::IndexOutOfRange {
                row,
                col,
                num_rows: coo.num_rows,
                num_cols: coo.num_cols,
            });
        }
        Ok(shape.linear(row / rows_per, col / cols_per) as usize)
    };

    let mut counts = vec![0usize; n];
    for (row, col) in coo.edges() {
        counts[part_of(row, col)?] += 1;
    }

    let mut parts: Vec<EdgeList> = counts
        .iter()
        .map(|&c| EdgeList::with_capacity(rows_per, cols_per, c))
        .collect();

    for (row, col) in coo.edges() {
        let p = part_of(row, col)?;
        let (p_row, p_col) = shape.coords(p as u32);
        parts[p].push(row - p_row * rows_per, col - p_col * cols_per);
    }

    debug_assert!(parts.iter().zip(&counts).all(|(p, &c)| p.num_edges() == c));
    log::debug!(
        "binned {} edges into {}x{} partitions of {}x{} nodes",
        coo.num_edges(),
        shape.rows,
        shape.cols,
        rows_per,
        cols_per
    );
    Ok(parts)
}
