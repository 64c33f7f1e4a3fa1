//! Gathering per-unit level arrays into one level per node.
//!
//! Level 0 means "not reached", except for the root. Units whose
//! destination ranges overlap (row and grid topologies) can report the same
//! node; the smallest non-zero report wins, so an idle unit's 0 never hides
//! another unit's level.

use crate::bfs_error::BfsError;
use crate::fleet::ComputeFleet;
use std::time::Instant;

use super::context::OrchestratorContext;

/// Global node → BFS level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelMap {
    levels: Vec<u32>,
    num_nodes: u32,
}

/// Merge `v` into `dst`, keeping the smallest non-zero value.
#[inline]
pub fn merge_min_nonzero(dst: &mut u32, v: u32) {
    if v != 0 && (*dst == 0 || v < *dst) {
        *dst = v;
    }
}

impl LevelMap {
    /// Empty map over `padded` node slots of which the first `num_nodes`
    /// belong to the input graph.
    pub fn new(num_nodes: u32, padded: u32) -> Self {
        Self {
            levels: vec![0; padded.max(num_nodes) as usize],
            num_nodes,
        }
    }

    /// Merge one unit's levels, whose first entry is node `base`.
    pub fn merge_unit(&mut self, base: usize, unit_levels: &[u32]) {
        for (dst, &v) in self.levels[base..base + unit_levels.len()]
            .iter_mut()
            .zip(unit_levels)
        {
            merge_min_nonzero(dst, v);
        }
    }

    /// `Some(level)` for the root and every reached node, `None` otherwise.
    pub fn level(&self, node: u32) -> Option<u32> {
        if node >= self.num_nodes {
            return None;
        }
        match (node, self.levels[node as usize]) {
            (0, _) => Some(0),
            (_, 0) => None,
            (_, l) => Some(l),
        }
    }

    /// Nodes of the input graph.
    #[inline]
    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    /// `(node, level)` for the root and every reached node, ascending.
    pub fn reached(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.num_nodes).filter_map(|n| self.level(n).map(|l| (n, l)))
    }

    /// Deepest level found.
    pub fn max_level(&self) -> u32 {
        self.reached().map(|(_, l)| l).max().unwrap_or(0)
    }

    /// Raw merged array over the padded node space (0 = unreached).
    #[inline]
    pub fn raw(&self) -> &[u32] {
        &self.levels
    }
}

/// Fetch every unit's level array and merge them.
pub fn collect_levels<F: ComputeFleet>(
    ctx: &mut OrchestratorContext<F>,
    num_nodes: u32,
) -> Result<LevelMap, BfsError> {
    let t = Instant::now();
    let dims = *ctx.dims();
    let mut map = LevelMap::new(num_nodes, dims.num_nodes);
    let mut scratch = vec![0u32; dims.len_nl as usize];
    for unit in 0..ctx.units() {
        ctx.read_levels(unit, &mut scratch)?;
        map.merge_unit(dims.level_base(unit) as usize, &scratch);
    }
    ctx.times.fetch += t.elapsed();
    Ok(map)
}
