//! Host-side state of one run: the fleet, the run dimensions, cached symbol
//! addresses and buffer offsets, the current level and phase timings.
//!
//! Frontier traffic goes through the helpers here so that every copy is
//! accounted to the communication phase.

use crate::bfs_error::BfsError;
use crate::data::LayoutError;
use crate::data::layout::{BfsDims, sym};
use crate::fleet::wire::{cast_words, read_scalar, read_words, write_words};
use crate::fleet::{ComputeFleet, FleetHandle, Location, SymbolAddr, UnitId};
use crate::partitioning::GridShape;
use std::time::{Duration, Instant};

/// Wall-clock time spent per phase of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimes {
    /// Partitioning, conversion and upload of the graph.
    pub populate: Duration,
    /// Unit launches.
    pub compute: Duration,
    /// Host↔unit frontier copies.
    pub communication: Duration,
    /// Host-side merging of frontier slices.
    pub aggregation: Duration,
    /// Fetching and merging the level arrays.
    pub fetch: Duration,
}

/// Heap offsets of the fixed buffers the host touches every round. They are
/// the same on every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierOffsets {
    pub next_frontier: u32,
    pub curr_frontier: u32,
    pub node_levels: u32,
}

pub struct OrchestratorContext<F: ComputeFleet> {
    fleet: FleetHandle<F>,
    dims: BfsDims,
    level_sym: SymbolAddr,
    updated_sym: SymbolAddr,
    offsets: Option<FrontierOffsets>,
    level: u32,
    pub times: PhaseTimes,
}

impl<F: ComputeFleet> OrchestratorContext<F> {
    /// Wrap a fleet that already has its program loaded.
    pub fn new(fleet: FleetHandle<F>, dims: BfsDims) -> Result<Self, BfsError> {
        if fleet.num_units() != dims.shape.units() {
            return Err(BfsError::config(format!(
                "fleet has {} units but the grid needs {}",
                fleet.num_units(),
                dims.shape.units()
            )));
        }
        let level_sym = fleet.resolve_symbol(sym::LEVEL)?;
        let updated_sym = fleet.resolve_symbol(sym::NF_UPDATED)?;
        Ok(Self {
            fleet,
            dims,
            level_sym,
            updated_sym,
            offsets: None,
            level: 0,
            times: PhaseTimes::default(),
        })
    }

    #[inline]
    pub fn dims(&self) -> &BfsDims {
        &self.dims
    }

    #[inline]
    pub fn shape(&self) -> GridShape {
        self.dims.shape
    }

    #[inline]
    pub fn units(&self) -> u32 {
        self.dims.shape.units()
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn fleet(&self) -> &F {
        &self.fleet
    }

    #[inline]
    pub fn fleet_mut(&mut self) -> &mut F {
        &mut self.fleet
    }

    pub(crate) fn set_offsets(&mut self, offsets: FrontierOffsets) {
        self.offsets = Some(offsets);
    }

    pub fn offsets(&self) -> Result<FrontierOffsets, BfsError> {
        self.offsets
            .ok_or_else(|| LayoutError::MissingBuffer(sym::NEXT_FRONTIER).into())
    }

    /// Bump the level and publish it to every unit.
    pub fn advance_level(&mut self) -> Result<u32, BfsError> {
        self.level += 1;
        let t = Instant::now();
        self.fleet
            .broadcast(Location::Symbol(self.level_sym), cast_words(&[self.level]))?;
        self.times.communication += t.elapsed();
        Ok(self.level)
    }

    /// Run one launch on every unit.
    pub fn launch(&mut self) -> Result<(), BfsError> {
        let t = Instant::now();
        self.fleet.launch_all()?;
        self.times.compute += t.elapsed();
        Ok(())
    }

    /// Fill `dirty[u]` with unit `u`'s `nf_updated` flag; returns how many
    /// are set.
    pub fn collect_dirty(&mut self, dirty: &mut [bool]) -> Result<usize, BfsError> {
        let t = Instant::now();
        let mut count = 0;
        for (unit, flag) in dirty.iter_mut().enumerate() {
            *flag = read_scalar(&*self.fleet, unit as UnitId, self.updated_sym)? != 0;
            count += *flag as usize;
        }
        self.times.communication += t.elapsed();
        Ok(count)
    }

    pub fn read_next_frontier(&mut self, unit: UnitId, out: &mut [u32]) -> Result<(), BfsError> {
        let offset = self.offsets()?.next_frontier;
        self.timed_read(unit, offset, out)
    }

    pub fn write_next_frontier(&mut self, unit: UnitId, words: &[u32]) -> Result<(), BfsError> {
        let offset = self.offsets()?.next_frontier;
        self.timed_write(unit, offset, words)
    }

    pub fn write_curr_frontier(&mut self, unit: UnitId, words: &[u32]) -> Result<(), BfsError> {
        let offset = self.offsets()?.curr_frontier;
        self.timed_write(unit, offset, words)
    }

    /// Unit `unit`'s level array (`len_nl` entries).
    pub fn read_levels(&self, unit: UnitId, out: &mut [u32]) -> Result<(), BfsError> {
        let offset = self.offsets()?.node_levels;
        read_words(&*self.fleet, unit, offset, out)?;
        Ok(())
    }

    fn timed_read(&mut self, unit: UnitId, offset: u32, out: &mut [u32]) -> Result<(), BfsError> {
        let t = Instant::now();
        read_words(&*self.fleet, unit, offset, out)?;
        self.times.communication += t.elapsed();
        Ok(())
    }

    fn timed_write(&mut self, unit: UnitId, offset: u32, words: &[u32]) -> Result<(), BfsError> {
        let t = Instant::now();
        write_words(&mut *self.fleet, unit, offset, words)?;
        self.times.communication += t.elapsed();
        Ok(())
    }
}
