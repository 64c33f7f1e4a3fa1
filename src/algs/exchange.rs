//! Frontier reduction and redistribution between rounds, one strategy per
//! topology.
//!
//! After a launch the host gathers the next-frontier slices of the units
//! that reported progress, merges them into one global frontier, bumps the
//! level and scatters the slices each unit needs back out. The merge rule
//! follows which axis the units split:
//!
//! - row: OR every slice over the whole frontier; send the whole frontier
//!   to every next frontier and unit `u`'s source range to its current
//!   frontier.
//! - column: place unit `u`'s slice at `u * len_nf`; send the whole frontier
//!   to every current frontier.
//! - grid: OR into the unit's column range; send the column range to the
//!   next frontier and the row range to the current frontier.

use crate::bfs_error::BfsError;
use crate::data::{BfsDims, Frontier};
use crate::fleet::ComputeFleet;
use crate::partitioning::Topology;
use itertools::Itertools;
use std::time::Instant;

use super::context::OrchestratorContext;

/// Outcome of one reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// No unit discovered anything; the traversal is done.
    Converged,
    /// The frontier was redistributed for the next level.
    Advanced,
}

/// Reduce the units' next frontiers and broadcast the result.
pub trait FrontierExchange {
    /// `dirty[u]` is unit `u`'s `nf_updated` flag from the last launch.
    fn reduce_and_broadcast<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
    ) -> Result<Step, BfsError>;
}

/// Host buffers every strategy needs: the global frontier and a scratch
/// slice for one unit's next frontier.
#[derive(Clone, Debug)]
struct Buffers {
    frontier: Frontier,
    scratch: Vec<u32>,
}

impl Buffers {
    fn new(dims: &BfsDims) -> Self {
        Self {
            frontier: Frontier::with_words(dims.len_frontier as usize),
            scratch: vec![0; dims.len_nf as usize],
        }
    }

    /// Fetch every dirty unit's next frontier and hand it to `merge` along
    /// with the unit index.
    fn gather<F, M>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
        mut merge: M,
    ) -> Result<(), BfsError>
    where
        F: ComputeFleet,
        M: FnMut(&mut Frontier, u32, &[u32]),
    {
        for unit in dirty.iter().positions(|&d| d) {
            let unit = unit as u32;
            ctx.read_next_frontier(unit, &mut self.scratch)?;
            let t = Instant::now();
            merge(&mut self.frontier, unit, &self.scratch);
            ctx.times.aggregation += t.elapsed();
        }
        Ok(())
    }
}

/// Sources split across units; every unit sees every destination.
#[derive(Clone, Debug)]
pub struct RowExchange {
    bufs: Buffers,
}

impl RowExchange {
    pub fn new(dims: &BfsDims) -> Self {
        Self {
            bufs: Buffers::new(dims),
        }
    }
}

impl FrontierExchange for RowExchange {
    fn reduce_and_broadcast<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
    ) -> Result<Step, BfsError> {
        self.bufs
            .gather(ctx, dirty, |frontier, _, slice| frontier.or_at(0, slice))?;
        if !dirty.contains(&true) {
            return Ok(Step::Converged);
        }
        ctx.advance_level()?;
        let len_cf = ctx.dims().len_cf as usize;
        let frontier = &mut self.bufs.frontier;
        for unit in 0..ctx.units() {
            ctx.write_next_frontier(unit, frontier.words())?;
            ctx.write_curr_frontier(unit, frontier.slice(unit as usize * len_cf, len_cf))?;
        }
        frontier.clear();
        Ok(Step::Advanced)
    }
}

/// Destinations split across units; every unit sees every source.
#[derive(Clone, Debug)]
pub struct ColumnExchange {
    bufs: Buffers,
}

impl ColumnExchange {
    pub fn new(dims: &BfsDims) -> Self {
        Self {
            bufs: Buffers::new(dims),
        }
    }
}

impl FrontierExchange for ColumnExchange {
    fn reduce_and_broadcast<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
    ) -> Result<Step, BfsError> {
        let len_nf = ctx.dims().len_nf as usize;
        self.bufs.gather(ctx, dirty, |frontier, unit, slice| {
            frontier.copy_at(unit as usize * len_nf, slice)
        })?;
        if !dirty.contains(&true) {
            return Ok(Step::Converged);
        }
        ctx.advance_level()?;
        let frontier = &mut self.bufs.frontier;
        for unit in 0..ctx.units() {
            ctx.write_curr_frontier(unit, frontier.words())?;
        }
        frontier.clear();
        Ok(Step::Advanced)
    }
}

/// Both axes split over an `R × C` grid.
#[derive(Clone, Debug)]
pub struct GridExchange {
    bufs: Buffers,
}

impl GridExchange {
    pub fn new(dims: &BfsDims) -> Self {
        Self {
            bufs: Buffers::new(dims),
        }
    }
}

impl FrontierExchange for GridExchange {
    fn reduce_and_broadcast<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
    ) -> Result<Step, BfsError> {
        // nothing to fetch when every unit is idle
        if !dirty.contains(&true) {
            return Ok(Step::Converged);
        }
        let dims = *ctx.dims();
        let (len_nf, len_cf) = (dims.len_nf as usize, dims.len_cf as usize);
        let len_frontier = dims.len_frontier as usize;
        self.bufs.gather(ctx, dirty, |frontier, unit, slice| {
            frontier.or_at((unit as usize * len_nf) % len_frontier, slice)
        })?;
        ctx.advance_level()?;
        let frontier = &mut self.bufs.frontier;
        for unit in 0..ctx.units() {
            let (p_row, p_col) = dims.shape.coords(unit);
            ctx.write_next_frontier(unit, frontier.slice(p_col as usize * len_nf, len_nf))?;
            ctx.write_curr_frontier(unit, frontier.slice(p_row as usize * len_cf, len_cf))?;
        }
        frontier.clear();
        Ok(Step::Advanced)
    }
}

/// The strategy of a run, picked once from its topology.
#[derive(Clone, Debug)]
pub enum TopologyExchange {
    Row(RowExchange),
    Column(ColumnExchange),
    Grid(GridExchange),
}

impl TopologyExchange {
    pub fn for_topology(topology: Topology, dims: &BfsDims) -> Self {
        match topology {
            Topology::Row => TopologyExchange::Row(RowExchange::new(dims)),
            Topology::Column => TopologyExchange::Column(ColumnExchange::new(dims)),
            Topology::Grid => TopologyExchange::Grid(GridExchange::new(dims)),
        }
    }
}

impl FrontierExchange for TopologyExchange {
    fn reduce_and_broadcast<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
        dirty: &[bool],
    ) -> Result<Step, BfsError> {
        match self {
            TopologyExchange::Row(x) => x.reduce_and_broadcast(ctx, dirty),
            TopologyExchange::Column(x) => x.reduce_and_broadcast(ctx, dirty),
            TopologyExchange::Grid(x) => x.reduce_and_broadcast(ctx, dirty),
        }
    }
}
