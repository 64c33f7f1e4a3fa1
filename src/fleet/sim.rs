//! In-process fleet: every unit is a pair of word vectors and the unit
//! programs are the Rust kernels of [`kernels`](super::kernels).
//!
//! Heaps grow lazily up to their capacity, so a large nominal heap costs
//! only what the run writes. Under the `rayon` feature `launch_all` runs
//! units in parallel; they share nothing, so the result is the same.

use crate::config::{Algorithm, DEFAULT_HEAP_BYTES};
use crate::data::layout::{DMA_ALIGN_BYTES, WORD_BYTES};
use crate::fleet::kernels;
use crate::fleet::wire::{cast_words, cast_words_mut};
use crate::fleet::{ComputeFleet, FleetError, Location, SymbolAddr, UnitId};
use hashbrown::HashMap;
use std::path::Path;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

type SymbolTable = HashMap<&'static str, SymbolAddr>;

#[derive(Debug)]
struct LoadedProgram {
    algorithm: Algorithm,
    symbols: SymbolTable,
}

#[derive(Debug, Default)]
struct SimUnit {
    symbols: Vec<u32>,
    heap: Vec<u32>,
}

/// A fleet of simulated units.
#[derive(Debug)]
pub struct SimFleet {
    units: Vec<SimUnit>,
    heap_bytes: u32,
    program: Option<LoadedProgram>,
    launches: u64,
    work: Vec<u64>,
    released: bool,
}

impl SimFleet {
    /// `units` units with `heap_bytes` of heap each.
    pub fn with_heap(units: u32, heap_bytes: u32) -> Result<Self, FleetError> {
        if units == 0 {
            return Err(FleetError::Allocation {
                requested: units,
                reason: "empty fleet".into(),
            });
        }
        if heap_bytes % DMA_ALIGN_BYTES != 0 {
            return Err(FleetError::Allocation {
                requested: units,
                reason: format!("heap size {heap_bytes} is not a multiple of {DMA_ALIGN_BYTES}"),
            });
        }
        log::debug!("allocated {units} simulated units with {heap_bytes} heap bytes each");
        Ok(Self {
            units: (0..units).map(|_| SimUnit::default()).collect(),
            heap_bytes,
            program: None,
            launches: 0,
            work: Vec::new(),
            released: false,
        })
    }

    /// Number of `launch_all` calls so far.
    #[inline]
    pub fn launches(&self) -> u64 {
        self.launches
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn live(&self) -> Result<(), FleetError> {
        if self.released {
            Err(FleetError::Released)
        } else {
            Ok(())
        }
    }

    fn unit(&self, unit: UnitId) -> Result<&SimUnit, FleetError> {
        self.live()?;
        self.units.get(unit as usize).ok_or(FleetError::NoSuchUnit {
            unit,
            units: self.units.len() as u32,
        })
    }

    fn unit_mut(&mut self, unit: UnitId) -> Result<&mut SimUnit, FleetError> {
        self.live()?;
        let units = self.units.len() as u32;
        self.units
            .get_mut(unit as usize)
            .ok_or(FleetError::NoSuchUnit { unit, units })
    }

    fn check_heap(&self, unit: UnitId, offset: u32, len: usize) -> Result<(), FleetError> {
        let align = DMA_ALIGN_BYTES as usize;
        if offset % DMA_ALIGN_BYTES != 0 || len % align != 0 {
            return Err(FleetError::Misaligned { offset, len });
        }
        if offset as usize + len > self.heap_bytes as usize {
            return Err(FleetError::OutOfBounds {
                unit,
                offset,
                len,
                capacity: self.heap_bytes as usize,
            });
        }
        Ok(())
    }
}

fn symbol_range(
    unit: UnitId,
    addr: SymbolAddr,
    len: usize,
    memory: &[u32],
) -> Result<std::ops::Range<usize>, FleetError> {
    let start = addr.offset as usize;
    if len > addr.size as usize || start + len > memory.len() * WORD_BYTES as usize {
        return Err(FleetError::OutOfBounds {
            unit,
            offset: addr.offset,
            len,
            capacity: addr.size as usize,
        });
    }
    Ok(start..start + len)
}

impl ComputeFleet for SimFleet {
    fn allocate(units: u32) -> Result<Self, FleetError> {
        Self::with_heap(units, DEFAULT_HEAP_BYTES)
    }

    fn num_units(&self) -> u32 {
        self.units.len() as u32
    }

    fn heap_capacity(&self) -> u32 {
        self.heap_bytes
    }

    fn load_program(&mut self, binary: &Path) -> Result<(), FleetError> {
        self.live()?;
        let algorithm = kernels::program_for(binary)
            .ok_or_else(|| FleetError::UnknownProgram(binary.display().to_string()))?;
        let symbols: SymbolTable = kernels::exported_symbols(algorithm)
            .iter()
            .enumerate()
            .map(|(i, &name)| {
                let addr = SymbolAddr {
                    offset: i as u32 * WORD_BYTES,
                    size: WORD_BYTES,
                };
                (name, addr)
            })
            .collect();
        for unit in &mut self.units {
            unit.symbols = vec![0; symbols.len()];
        }
        log::debug!("loaded `{}` on {} units", binary.display(), self.units.len());
        self.program = Some(LoadedProgram { algorithm, symbols });
        Ok(())
    }

    fn resolve_symbol(&self, name: &str) -> Result<SymbolAddr, FleetError> {
        self.live()?;
        let program = self.program.as_ref().ok_or(FleetError::NoProgram)?;
        program
            .symbols
            .get(name)
            .copied()
            .ok_or_else(|| FleetError::UnknownSymbol(name.to_string()))
    }

    fn copy_to_unit(
        &mut self,
        unit: UnitId,
        dst: Location,
        bytes: &[u8],
    ) -> Result<(), FleetError> {
        match dst {
            Location::Symbol(addr) => {
                let u = self.unit_mut(unit)?;
                let range = symbol_range(unit, addr, bytes.len(), &u.symbols)?;
                cast_words_mut(&mut u.symbols)[range].copy_from_slice(bytes);
            }
            Location::Heap(offset) => {
                self.check_heap(unit, offset, bytes.len())?;
                let u = self.unit_mut(unit)?;
                let end_words = (offset as usize + bytes.len()) / WORD_BYTES as usize;
                if u.heap.len() < end_words {
                    u.heap.resize(end_words, 0);
                }
                let start = offset as usize;
                cast_words_mut(&mut u.heap)[start..start + bytes.len()].copy_from_slice(bytes);
            }
        }
        Ok(())
    }

    fn copy_from_unit(
        &self,
        unit: UnitId,
        src: Location,
        bytes: &mut [u8],
    ) -> Result<(), FleetError> {
        match src {
            Location::Symbol(addr) => {
                let u = self.unit(unit)?;
                let range = symbol_range(unit, addr, bytes.len(), &u.symbols)?;
                bytes.copy_from_slice(&cast_words(&u.symbols)[range]);
            }
            Location::Heap(offset) => {
                self.check_heap(unit, offset, bytes.len())?;
                let u = self.unit(unit)?;
                let heap = cast_words(&u.heap);
                let start = offset as usize;
                // never-written heap reads as zero
                let written = heap.len().saturating_sub(start).min(bytes.len());
                if written > 0 {
                    bytes[..written].copy_from_slice(&heap[start..start + written]);
                }
                bytes[written..].fill(0);
            }
        }
        Ok(())
    }

    fn launch_all(&mut self) -> Result<(), FleetError> {
        self.live()?;
        let program = self.program.as_ref().ok_or(FleetError::NoProgram)?;
        let capacity = self.heap_bytes;
        let run = |(i, u): (usize, &mut SimUnit)| {
            let mut mem = UnitMemory {
                unit: i as UnitId,
                symbols: &program.symbols,
                words: &mut u.symbols,
                heap: &mut u.heap,
                capacity,
            };
            kernels::run(program.algorithm, &mut mem)
        };
        #[cfg(feature = "rayon")]
        let work: Result<Vec<u64>, FleetError> =
            self.units.par_iter_mut().enumerate().map(run).collect();
        #[cfg(not(feature = "rayon"))]
        let work: Result<Vec<u64>, FleetError> =
            self.units.iter_mut().enumerate().map(run).collect();
        self.work = work?;
        self.launches += 1;
        Ok(())
    }

    /// Edges inspected by each unit in the last launch.
    fn launch_work(&self) -> Option<&[u64]> {
        (!self.work.is_empty()).then_some(self.work.as_slice())
    }

    fn free(&mut self) -> Result<(), FleetError> {
        if !self.released {
            self.released = true;
            self.units.clear();
            self.work.clear();
            self.program = None;
            log::debug!("released simulated fleet after {} launches", self.launches);
        }
        Ok(())
    }
}

/// A kernel's view of its own unit: scalar symbols and heap buffers reached
/// through pointer symbols.
pub struct UnitMemory<'a> {
    unit: UnitId,
    symbols: &'a SymbolTable,
    words: &'a mut Vec<u32>,
    heap: &'a mut Vec<u32>,
    capacity: u32,
}

impl UnitMemory<'_> {
    #[inline]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Build a fault for this unit.
    pub fn fault(&self, msg: impl Into<String>) -> FleetError {
        FleetError::Kernel {
            unit: self.unit,
            msg: msg.into(),
        }
    }

    fn slot(&self, name: &str) -> Result<usize, FleetError> {
        self.symbols
            .get(name)
            .map(|a| (a.offset / WORD_BYTES) as usize)
            .ok_or_else(|| FleetError::UnknownSymbol(name.to_string()))
    }

    pub fn scalar(&self, name: &str) -> Result<u32, FleetError> {
        Ok(self.words[self.slot(name)?])
    }

    pub fn set_scalar(&mut self, name: &str, value: u32) -> Result<(), FleetError> {
        let slot = self.slot(name)?;
        self.words[slot] = value;
        Ok(())
    }

    fn buffer_range(
        &self,
        buffer: &str,
        words: usize,
    ) -> Result<std::ops::Range<usize>, FleetError> {
        let offset = self.scalar(buffer)?;
        if offset % WORD_BYTES != 0 {
            return Err(self.fault(format!("`{buffer}` pointer {offset:#x} is unaligned")));
        }
        let start = (offset / WORD_BYTES) as usize;
        let end = start + words;
        if end * WORD_BYTES as usize > self.capacity as usize {
            return Err(FleetError::OutOfBounds {
                unit: self.unit,
                offset,
                len: words * WORD_BYTES as usize,
                capacity: self.capacity as usize,
            });
        }
        Ok(start..end)
    }

    /// Copy `words` words of `buffer` into local memory.
    pub fn load(&self, buffer: &str, words: usize) -> Result<Vec<u32>, FleetError> {
        let range = self.buffer_range(buffer, words)?;
        let mut out = vec![0u32; words];
        let written = self.heap.len().saturating_sub(range.start).min(words);
        if written > 0 {
            out[..written].copy_from_slice(&self.heap[range.start..range.start + written]);
        }
        Ok(out)
    }

    /// Write `data` back to `buffer`.
    pub fn store(&mut self, buffer: &str, data: &[u32]) -> Result<(), FleetError> {
        let range = self.buffer_range(buffer, data.len())?;
        if self.heap.len() < range.end {
            self.heap.resize(range.end, 0);
        }
        self.heap[range].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::layout::sym;
    use crate::fleet::wire::{read_scalar, read_words, write_scalar, write_words};
    use std::path::PathBuf;

    fn fleet() -> SimFleet {
        let mut f = SimFleet::with_heap(8, 1024).unwrap();
        f.load_program(&PathBuf::from("bin/top-down-dma")).unwrap();
        f
    }

    #[test]
    fn scalars_and_heap_round_trip() {
        let mut f = fleet();
        let level = f.resolve_symbol(sym::LEVEL).unwrap();
        write_scalar(&mut f, 3, level, 7).unwrap();
        assert_eq!(read_scalar(&f, 3, level).unwrap(), 7);
        assert_eq!(read_scalar(&f, 2, level).unwrap(), 0);

        write_words(&mut f, 1, 16, &[1, 2, 3]).unwrap();
        let mut out = [0u32; 3];
        read_words(&f, 1, 16, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        // beyond what was written reads as zero
        let mut tail = [9u32; 4];
        read_words(&f, 1, 512, &mut tail).unwrap();
        assert_eq!(tail, [0; 4]);
    }

    #[test]
    fn heap_transfers_are_checked() {
        let mut f = fleet();
        assert_eq!(
            f.copy_to_unit(0, Location::Heap(4), &[0; 8]),
            Err(FleetError::Misaligned { offset: 4, len: 8 })
        );
        assert_eq!(
            f.copy_to_unit(0, Location::Heap(0), &[0; 12]),
            Err(FleetError::Misaligned { offset: 0, len: 12 })
        );
        assert!(matches!(
            f.copy_to_unit(0, Location::Heap(1024), &[0; 8]),
            Err(FleetError::OutOfBounds { .. })
        ));
        assert!(matches!(
            f.copy_to_unit(8, Location::Heap(0), &[0; 8]),
            Err(FleetError::NoSuchUnit { unit: 8, units: 8 })
        ));
    }

    #[test]
    fn programs_and_symbols_are_resolved() {
        let mut f = SimFleet::with_heap(8, 1024).unwrap();
        assert_eq!(f.resolve_symbol(sym::LEVEL), Err(FleetError::NoProgram));
        assert!(matches!(
            f.load_program(&PathBuf::from("bin/dfs")),
            Err(FleetError::UnknownProgram(_))
        ));
        f.load_program(&PathBuf::from("bin/edge-dma")).unwrap();
        assert!(f.resolve_symbol(sym::NUM_EDGES).is_ok());
        assert!(matches!(
            f.resolve_symbol(sym::NODE_PTRS),
            Err(FleetError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn free_is_idempotent_and_final() {
        let mut f = fleet();
        f.free().unwrap();
        f.free().unwrap();
        assert!(f.is_released());
        assert_eq!(f.launch_all(), Err(FleetError::Released));
    }
}
