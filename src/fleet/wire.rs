//! Word-level transfers on top of the byte-level [`ComputeFleet`] copies.
//!
//! Heap transfers are widened to [`DMA_ALIGN_BYTES`]: an odd number of
//! words is padded with one zero word on the way in, and read through a
//! scratch buffer on the way out. Every heap buffer is reserved with that
//! slack, see [`UnitArena`](crate::data::UnitArena).

use crate::data::layout::{DMA_ALIGN_BYTES, WORD_BYTES};
use crate::fleet::{ComputeFleet, FleetError, Location, SymbolAddr, UnitId};
use std::borrow::Cow;

const PAD_WORDS: usize = (DMA_ALIGN_BYTES / WORD_BYTES) as usize;

#[inline]
pub fn cast_words(v: &[u32]) -> &[u8] {
    bytemuck::cast_slice(v)
}

#[inline]
pub fn cast_words_mut(v: &mut [u32]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

pub fn write_scalar<F: ComputeFleet + ?Sized>(
    fleet: &mut F,
    unit: UnitId,
    addr: SymbolAddr,
    value: u32,
) -> Result<(), FleetError> {
    fleet.copy_to_unit(unit, Location::Symbol(addr), cast_words(&[value]))
}

pub fn read_scalar<F: ComputeFleet + ?Sized>(
    fleet: &F,
    unit: UnitId,
    addr: SymbolAddr,
) -> Result<u32, FleetError> {
    let mut v = [0u32];
    fleet.copy_from_unit(unit, Location::Symbol(addr), cast_words_mut(&mut v))?;
    Ok(v[0])
}

pub fn write_words<F: ComputeFleet + ?Sized>(
    fleet: &mut F,
    unit: UnitId,
    offset: u32,
    words: &[u32],
) -> Result<(), FleetError> {
    let padded: Cow<'_, [u32]> = if words.len() % PAD_WORDS == 0 {
        Cow::Borrowed(words)
    } else {
        let mut v = words.to_vec();
        v.resize(words.len().next_multiple_of(PAD_WORDS), 0);
        Cow::Owned(v)
    };
    fleet.copy_to_unit(unit, Location::Heap(offset), cast_words(&padded))
}

pub fn read_words<F: ComputeFleet + ?Sized>(
    fleet: &F,
    unit: UnitId,
    offset: u32,
    out: &mut [u32],
) -> Result<(), FleetError> {
    if out.len() % PAD_WORDS == 0 {
        return fleet.copy_from_unit(unit, Location::Heap(offset), cast_words_mut(out));
    }
    let mut scratch = vec![0u32; out.len().next_multiple_of(PAD_WORDS)];
    fleet.copy_from_unit(unit, Location::Heap(offset), cast_words_mut(&mut scratch))?;
    out.copy_from_slice(&scratch[..out.len()]);
    Ok(())
}
