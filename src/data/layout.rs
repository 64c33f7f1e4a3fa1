//! Per-run buffer layout shared by every unit.
//!
//! The dimensions of a run follow from the padded node count and the grid
//! shape: each unit sees `part_rows` sources (its current frontier) and
//! `part_cols` destinations (its next frontier, visited set and levels).
//! [`LayoutPlan`] fixes the order and sizes of the buffers that must land at
//! the same heap offset on every unit.

use crate::config::Algorithm;
use crate::partitioning::error::PartitionError;
use crate::partitioning::{GridShape, NODE_ALIGN};
use static_assertions::const_assert;

/// Bytes per frontier / index word.
pub const WORD_BYTES: u32 = 4;
/// Default rounding granule for buffer lengths, in words.
pub const DEFAULT_BLOCK_WORDS: u32 = 32;
/// Host-to-unit heap transfers must start and end on this boundary.
pub const DMA_ALIGN_BYTES: u32 = 8;

const_assert!(DMA_ALIGN_BYTES % WORD_BYTES == 0);
const_assert!(DEFAULT_BLOCK_WORDS.is_power_of_two());
const_assert!((DEFAULT_BLOCK_WORDS * WORD_BYTES) % DMA_ALIGN_BYTES == 0);

/// Names of the symbols a unit program exports.
///
/// Heap buffers are reached through a pointer symbol of the same name that
/// holds the buffer's byte offset.
pub mod sym {
    pub const LEVEL: &str = "level";
    pub const LEN_CF: &str = "len_cf";
    pub const LEN_NF: &str = "len_nf";
    pub const NUM_EDGES: &str = "num_edges";
    pub const NF_UPDATED: &str = "nf_updated";
    /// First free heap byte after the program's own static data.
    pub const HEAP_END: &str = "heap_end";

    pub const VISITED: &str = "visited";
    pub const NEXT_FRONTIER: &str = "next_frontier";
    pub const CURR_FRONTIER: &str = "curr_frontier";
    pub const NODE_LEVELS: &str = "node_levels";
    pub const NODE_PTRS: &str = "node_ptrs";
    pub const EDGES: &str = "edges";
    pub const NODES: &str = "nodes";
    pub const NEIGHBORS: &str = "neighbors";
}

#[inline]
pub fn round_up(x: u32, m: u32) -> u32 {
    x.div_ceil(m) * m
}

/// Byte length of a heap transfer carrying `words` words.
#[inline]
pub fn transfer_bytes(words: usize) -> usize {
    (words * WORD_BYTES as usize).next_multiple_of(DMA_ALIGN_BYTES as usize)
}

/// Dimensions of one run, identical for every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BfsDims {
    pub shape: GridShape,
    /// Padded node count.
    pub num_nodes: u32,
    /// Sources per unit.
    pub part_rows: u32,
    /// Destinations per unit.
    pub part_cols: u32,
    /// Current-frontier words per unit.
    pub len_cf: u32,
    /// Next-frontier (and visited) words per unit.
    pub len_nf: u32,
    /// Level entries per unit; levels are stamped on destinations.
    pub len_nl: u32,
    /// Words in the host's global frontier.
    pub len_frontier: u32,
}

impl BfsDims {
    /// # Errors
    /// `Unaligned` unless `num_nodes` splits into 32-aligned chunks on both axes.
    pub fn new(shape: GridShape, num_nodes: u32) -> Result<Self, PartitionError> {
        let per = |axis: &'static str, parts: u32| {
            let per = num_nodes / parts;
            if num_nodes % parts != 0 || per % NODE_ALIGN != 0 {
                Err(PartitionError::Unaligned {
                    axis,
                    extent: num_nodes,
                    parts,
                })
            } else {
                Ok(per)
            }
        };
        let part_rows = per("row", shape.rows)?;
        let part_cols = per("column", shape.cols)?;
        Ok(Self {
            shape,
            num_nodes,
            part_rows,
            part_cols,
            len_cf: part_rows / NODE_ALIGN,
            len_nf: part_cols / NODE_ALIGN,
            len_nl: part_cols,
            len_frontier: num_nodes / NODE_ALIGN,
        })
    }

    /// Global node id of unit `unit`'s first level entry.
    #[inline]
    pub fn level_base(&self, unit: u32) -> u32 {
        self.shape.coords(unit).1 * self.len_nl
    }
}

/// Size of one buffer in a [`LayoutPlan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSpec {
    pub name: &'static str,
    /// Unrounded length in words.
    pub words: u32,
}

/// Ordered buffer set for one algorithm variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutPlan {
    pub algorithm: Algorithm,
    pub block_words: u32,
    fixed: [BufferSpec; 4],
}

impl LayoutPlan {
    pub fn for_variant(algorithm: Algorithm, dims: &BfsDims, block_words: u32) -> Self {
        let spec = |name, words| BufferSpec { name, words };
        Self {
            algorithm,
            block_words,
            fixed: [
                spec(sym::VISITED, dims.len_nf),
                spec(sym::NEXT_FRONTIER, dims.len_nf),
                spec(sym::CURR_FRONTIER, dims.len_cf),
                spec(sym::NODE_LEVELS, dims.len_nl),
            ],
        }
    }

    /// Fixed buffers in insertion order.
    #[inline]
    pub fn fixed(&self) -> &[BufferSpec] {
        &self.fixed
    }

    /// Names of the two partition-dependent buffers, in insertion order.
    pub fn variable_names(&self) -> [&'static str; 2] {
        match self.algorithm {
            Algorithm::TopDown | Algorithm::BottomUp => [sym::NODE_PTRS, sym::EDGES],
            Algorithm::EdgeCentric => [sym::NODES, sym::NEIGHBORS],
        }
    }

    /// Bytes taken by the fixed buffers after rounding.
    pub fn fixed_bytes(&self) -> u32 {
        self.fixed
            .iter()
            .map(|b| round_up(round_up(b.words, self.block_words) * WORD_BYTES, DMA_ALIGN_BYTES))
            .sum()
    }
}
