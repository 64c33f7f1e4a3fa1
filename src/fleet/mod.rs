//! Façade over a fleet of isolated compute units.
//!
//! Units share nothing: each has a small symbol memory holding the scalars
//! and buffer pointers its program exports, and a large heap the host fills
//! by bulk copies. The host is the only party that moves data between
//! units. [`sim::SimFleet`] is the in-process backend; a hardware backend
//! implements the same trait.

pub mod kernels;
pub mod sim;
pub mod wire;

use std::ops::{Deref, DerefMut};
use std::path::Path;
use thiserror::Error;

pub type UnitId = u32;

/// Resolved address of a program symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolAddr {
    /// Byte offset in symbol memory.
    pub offset: u32,
    /// Size in bytes.
    pub size: u32,
}

/// Target of a host↔unit copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Symbol(SymbolAddr),
    /// Byte offset into the unit heap; offset and length must be
    /// multiples of [`DMA_ALIGN_BYTES`](crate::data::layout::DMA_ALIGN_BYTES).
    Heap(u32),
}

/// Failures reported by a fleet backend. None is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FleetError {
    #[error("cannot allocate {requested} units: {reason}")]
    Allocation { requested: u32, reason: String },
    #[error("unknown unit program `{0}`")]
    UnknownProgram(String),
    #[error("no program loaded")]
    NoProgram,
    #[error("program does not export symbol `{0}`")]
    UnknownSymbol(String),
    #[error("unit {unit} out of range (fleet has {units})")]
    NoSuchUnit { unit: UnitId, units: u32 },
    #[error("heap transfer at {offset:#x} of {len} bytes is not 8-byte aligned")]
    Misaligned { offset: u32, len: usize },
    #[error("unit {unit}: access at {offset:#x} of {len} bytes exceeds {capacity} bytes")]
    OutOfBounds {
        unit: UnitId,
        offset: u32,
        len: usize,
        capacity: usize,
    },
    #[error("unit {unit} faulted: {msg}")]
    Kernel { unit: UnitId, msg: String },
    #[error("fleet already released")]
    Released,
}

/// Operations the orchestrator needs from a unit fleet.
pub trait ComputeFleet {
    /// Reserve `units` units with the backend's default heap size.
    fn allocate(units: u32) -> Result<Self, FleetError>
    where
        Self: Sized;

    fn num_units(&self) -> u32;

    /// Heap bytes available on every unit.
    fn heap_capacity(&self) -> u32;

    /// Load the same program on every unit.
    fn load_program(&mut self, binary: &Path) -> Result<(), FleetError>;

    fn resolve_symbol(&self, name: &str) -> Result<SymbolAddr, FleetError>;

    fn copy_to_unit(&mut self, unit: UnitId, dst: Location, bytes: &[u8]) -> Result<(), FleetError>;

    fn copy_from_unit(&self, unit: UnitId, src: Location, bytes: &mut [u8])
    -> Result<(), FleetError>;

    /// Run the loaded program on every unit and wait for all of them.
    fn launch_all(&mut self) -> Result<(), FleetError>;

    /// Per-unit work of the last launch, for backends that count it.
    fn launch_work(&self) -> Option<&[u64]> {
        None
    }

    /// Release the units. Calling it again is a no-op.
    fn free(&mut self) -> Result<(), FleetError>;

    /// Copy the same bytes to every unit.
    fn broadcast(&mut self, dst: Location, bytes: &[u8]) -> Result<(), FleetError> {
        for unit in 0..self.num_units() {
            self.copy_to_unit(unit, dst, bytes)?;
        }
        Ok(())
    }
}

/// Owns a fleet and frees it when dropped, on every exit path.
#[derive(Debug)]
pub struct FleetHandle<F: ComputeFleet> {
    fleet: F,
}

impl<F: ComputeFleet> FleetHandle<F> {
    pub fn new(fleet: F) -> Self {
        Self { fleet }
    }
}

impl<F: ComputeFleet> Deref for FleetHandle<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.fleet
    }
}

impl<F: ComputeFleet> DerefMut for FleetHandle<F> {
    fn deref_mut(&mut self) -> &mut F {
        &mut self.fleet
    }
}

impl<F: ComputeFleet> Drop for FleetHandle<F> {
    fn drop(&mut self) {
        if let Err(e) = self.fleet.free() {
            log::warn!("failed to release fleet: {e}");
        }
    }
}
