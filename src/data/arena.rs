//! UnitArena: bump allocation of named buffers in one unit's heap.
//!
//! Every unit runs the same program, which finds its buffers through
//! pointer symbols. The host therefore lays out each unit's heap with the
//! same insertion sequence: all fixed-size buffers first, so their offsets
//! are identical on every unit, then the partition-dependent ones.
//!
//! Lengths are rounded up to the run's block size (in words) and every
//! offset stays a multiple of [`DMA_ALIGN_BYTES`](super::layout::DMA_ALIGN_BYTES).

use crate::bfs_error::BfsError;
use crate::data::error::LayoutError;
use crate::data::layout::{DMA_ALIGN_BYTES, WORD_BYTES, round_up};
use crate::debug_invariants::DebugInvariants;
use hashbrown::HashMap;

/// Whether a buffer's size is the same on every unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferClass {
    Fixed,
    Variable,
}

/// Where a buffer lives in a unit heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    /// Byte offset into the unit heap.
    pub offset: u32,
    /// Reserved length in words (after block rounding).
    pub words: u32,
}

impl BufferHandle {
    /// One past the last reserved byte.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.words * WORD_BYTES
    }
}

/// Named bump allocator for one unit heap.
///
/// # Invariants
/// - `order` lists each inserted name exactly once, and `map` holds exactly
///   those names.
/// - Spans are contiguous in insertion order and `cursor` is the end of the
///   last one.
/// - No fixed buffer follows a variable buffer.
#[derive(Clone, Debug)]
pub struct UnitArena {
    map: HashMap<&'static str, (BufferHandle, BufferClass)>,
    order: Vec<&'static str>,
    base: u32,
    cursor: u32,
    capacity: u32,
    block_words: u32,
    fixed_expected: usize,
    fixed_seen: usize,
    variable_seen: bool,
}

impl UnitArena {
    /// Arena starting at byte `base` of a heap of `capacity` bytes. Variable
    /// buffers are refused until `fixed_expected` fixed ones are in.
    pub fn new(base: u32, capacity: u32, block_words: u32, fixed_expected: usize) -> Self {
        let base = round_up(base, DMA_ALIGN_BYTES);
        Self {
            map: HashMap::new(),
            order: Vec::new(),
            base,
            cursor: base,
            capacity,
            block_words,
            fixed_expected,
            fixed_seen: 0,
            variable_seen: false,
        }
    }

    /// Reserve a buffer whose size does not depend on the unit.
    ///
    /// # Errors
    /// `FixedAfterVariable` once any variable buffer is in, plus the errors
    /// of [`insert`](Self::insert).
    pub fn insert_fixed(
        &mut self,
        name: &'static str,
        words: u32,
    ) -> Result<BufferHandle, LayoutError> {
        if self.variable_seen {
            return Err(LayoutError::FixedAfterVariable { name });
        }
        let h = self.insert(name, words, BufferClass::Fixed)?;
        self.fixed_seen += 1;
        Ok(h)
    }

    /// Reserve a partition-dependent buffer.
    ///
    /// # Errors
    /// `VariableBeforeFixed` while fixed buffers are still missing.
    pub fn insert_variable(
        &mut self,
        name: &'static str,
        words: u32,
    ) -> Result<BufferHandle, LayoutError> {
        if self.fixed_seen < self.fixed_expected {
            return Err(LayoutError::VariableBeforeFixed {
                name,
                missing: self.fixed_expected - self.fixed_seen,
            });
        }
        let h = self.insert(name, words, BufferClass::Variable)?;
        self.variable_seen = true;
        Ok(h)
    }

    fn insert(
        &mut self,
        name: &'static str,
        words: u32,
        class: BufferClass,
    ) -> Result<BufferHandle, LayoutError> {
        if self.map.contains_key(name) {
            return Err(LayoutError::DuplicateBuffer { name });
        }
        let words = round_up(words, self.block_words);
        let bytes = round_up(words * WORD_BYTES, DMA_ALIGN_BYTES);
        let available = self.capacity.saturating_sub(self.cursor);
        if bytes > available {
            return Err(LayoutError::OutOfMemory {
                name,
                requested: bytes as u64,
                available: available as u64,
            });
        }
        let handle = BufferHandle {
            offset: self.cursor,
            words,
        };
        self.cursor += bytes;
        self.map.insert(name, (handle, class));
        self.order.push(name);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(handle)
    }

    #[inline]
    pub fn get(&self, name: &'static str) -> Result<BufferHandle, LayoutError> {
        self.map
            .get(name)
            .map(|&(h, _)| h)
            .ok_or(LayoutError::MissingBuffer(name))
    }

    /// First free byte after the last buffer.
    #[inline]
    pub fn end(&self) -> u32 {
        self.cursor
    }

    /// Bytes used since `base`.
    #[inline]
    pub fn used(&self) -> u32 {
        self.cursor - self.base
    }

    /// `(name, handle, class)` in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, BufferHandle, BufferClass)> + '_ {
        self.order.iter().map(move |&n| {
            let (h, c) = self.map[n];
            (n, h, c)
        })
    }

    /// Fixed buffers only, in insertion order.
    pub fn fixed(&self) -> impl Iterator<Item = (&'static str, BufferHandle)> + '_ {
        self.entries()
            .filter(|&(_, _, c)| c == BufferClass::Fixed)
            .map(|(n, h, _)| (n, h))
    }
}

impl DebugInvariants for UnitArena {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "UnitArena invalid");
    }

    fn validate_invariants(&self) -> Result<(), BfsError> {
        if self.order.len() != self.map.len() {
            return Err(BfsError::config("arena order and map disagree"));
        }
        let mut next = self.base;
        let mut variable = false;
        for (name, h, class) in self.entries() {
            if h.offset != next || h.offset % DMA_ALIGN_BYTES != 0 {
                return Err(BfsError::config(format!(
                    "buffer `{name}` at {:#x}, expected {next:#x}",
                    h.offset
                )));
            }
            match class {
                BufferClass::Variable => variable = true,
                BufferClass::Fixed if variable => {
                    return Err(LayoutError::FixedAfterVariable { name }.into());
                }
                BufferClass::Fixed => {}
            }
            next = round_up(h.end(), DMA_ALIGN_BYTES);
        }
        if next != self.cursor {
            return Err(BfsError::config("arena cursor does not match last span"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_buffers_pack_before_variable_ones() {
        let mut a = UnitArena::new(0, 1 << 20, 32, 2);
        let v = a.insert_fixed("visited", 8).unwrap();
        let nf = a.insert_fixed("next_frontier", 8).unwrap();
        let e = a.insert_variable("edges", 33).unwrap();
        assert_eq!(v, BufferHandle { offset: 0, words: 32 });
        assert_eq!(nf.offset, 128);
        assert_eq!(e, BufferHandle { offset: 256, words: 64 });
        assert_eq!(a.end(), 512);
        assert_eq!(a.get("edges"), Ok(e));
        let names: Vec<_> = a.entries().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["visited", "next_frontier", "edges"]);
    }

    #[test]
    fn insertion_order_is_enforced() {
        let mut a = UnitArena::new(0, 1 << 20, 32, 2);
        a.insert_fixed("visited", 1).unwrap();
        assert_eq!(
            a.insert_variable("edges", 1),
            Err(LayoutError::VariableBeforeFixed {
                name: "edges",
                missing: 1
            })
        );
        a.insert_fixed("node_levels", 1).unwrap();
        a.insert_variable("edges", 1).unwrap();
        assert_eq!(
            a.insert_fixed("late", 1),
            Err(LayoutError::FixedAfterVariable { name: "late" })
        );
        assert_eq!(
            a.insert_variable("edges", 1),
            Err(LayoutError::DuplicateBuffer { name: "edges" })
        );
    }

    #[test]
    fn base_is_aligned_and_capacity_checked() {
        let mut a = UnitArena::new(12, 256, 32, 0);
        let h = a.insert_variable("edges", 0).unwrap();
        assert_eq!(h, BufferHandle { offset: 16, words: 0 });
        let err = a.insert_variable("nodes", 64).unwrap_err();
        assert!(matches!(err, LayoutError::OutOfMemory { requested: 256, available: 240, .. }));
    }
}
