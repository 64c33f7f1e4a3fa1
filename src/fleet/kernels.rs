//! The three unit programs of a BFS level.
//!
//! Every launch first folds the next frontier left by the host into the
//! unit's visited set and clears it, so a node is never rediscovered after
//! it has been broadcast once and the next frontier a unit reports holds
//! only its own discoveries of this launch. A node first reached in this
//! launch gets its bit set in both `visited` and `next_frontier` and is
//! stamped with `level + 1`; `nf_updated` reports whether anything was
//! reached.
//!
//! Frontier and level buffers are indexed by the unit's local destination
//! (`0..len_nf * 32`); the current frontier by local source.
//!
//! [`run`] returns the number of edges the launch inspected, the unit's
//! share of the level's work.

use crate::config::Algorithm;
use crate::data::frontier::{iter_ones, or_words, set_bit, test_bit};
use crate::data::layout::sym;
use crate::fleet::FleetError;
use crate::fleet::sim::UnitMemory;
use crate::partitioning::NODE_ALIGN;
use std::path::Path;

const TOP_DOWN_SYMBOLS: &[&str] = &[
    sym::LEVEL,
    sym::LEN_CF,
    sym::LEN_NF,
    sym::NF_UPDATED,
    sym::HEAP_END,
    sym::VISITED,
    sym::NEXT_FRONTIER,
    sym::CURR_FRONTIER,
    sym::NODE_LEVELS,
    sym::NODE_PTRS,
    sym::EDGES,
];

const EDGE_SYMBOLS: &[&str] = &[
    sym::LEVEL,
    sym::LEN_CF,
    sym::LEN_NF,
    sym::NUM_EDGES,
    sym::NF_UPDATED,
    sym::HEAP_END,
    sym::VISITED,
    sym::NEXT_FRONTIER,
    sym::CURR_FRONTIER,
    sym::NODE_LEVELS,
    sym::NODES,
    sym::NEIGHBORS,
];

/// Program selected by a binary's file name.
pub fn program_for(binary: &Path) -> Option<Algorithm> {
    let name = binary.file_name()?.to_str()?;
    [
        Algorithm::TopDown,
        Algorithm::BottomUp,
        Algorithm::EdgeCentric,
    ]
    .into_iter()
    .find(|a| a.program_name() == name)
}

/// Symbols exported by a program, in symbol-memory order.
pub fn exported_symbols(algorithm: Algorithm) -> &'static [&'static str] {
    match algorithm {
        Algorithm::TopDown | Algorithm::BottomUp => TOP_DOWN_SYMBOLS,
        Algorithm::EdgeCentric => EDGE_SYMBOLS,
    }
}

struct Discovery {
    next_level: u32,
    cols: u32,
    visited: Vec<u32>,
    next_frontier: Vec<u32>,
    levels: Vec<u32>,
    changed: bool,
}

impl Discovery {
    fn load(mem: &UnitMemory<'_>) -> Result<Self, FleetError> {
        let level = mem.scalar(sym::LEVEL)?;
        let len_nf = mem.scalar(sym::LEN_NF)? as usize;
        let cols = len_nf as u32 * NODE_ALIGN;
        let mut visited = mem.load(sym::VISITED, len_nf)?;
        let mut next_frontier = mem.load(sym::NEXT_FRONTIER, len_nf)?;
        or_words(&mut visited, &next_frontier);
        next_frontier.fill(0);
        Ok(Self {
            next_level: level + 1,
            cols,
            visited,
            next_frontier,
            levels: mem.load(sym::NODE_LEVELS, cols as usize)?,
            changed: false,
        })
    }

    #[inline]
    fn is_visited(&self, c: u32) -> bool {
        test_bit(&self.visited, c)
    }

    fn visit(&mut self, mem: &UnitMemory<'_>, c: u32) -> Result<(), FleetError> {
        if c >= self.cols {
            return Err(mem.fault(format!("destination {c} outside 0..{}", self.cols)));
        }
        if !self.is_visited(c) {
            set_bit(&mut self.visited, c);
            set_bit(&mut self.next_frontier, c);
            self.levels[c as usize] = self.next_level;
            self.changed = true;
        }
        Ok(())
    }

    fn store(self, mem: &mut UnitMemory<'_>) -> Result<(), FleetError> {
        mem.store(sym::VISITED, &self.visited)?;
        mem.store(sym::NEXT_FRONTIER, &self.next_frontier)?;
        mem.store(sym::NODE_LEVELS, &self.levels)?;
        mem.set_scalar(sym::NF_UPDATED, self.changed as u32)
    }
}

fn span<'e>(
    mem: &UnitMemory<'_>,
    edges: &'e [u32],
    ptrs: &[u32],
    i: usize,
) -> Result<&'e [u32], FleetError> {
    edges
        .get(ptrs[i] as usize..ptrs[i + 1] as usize)
        .ok_or_else(|| mem.fault(format!("broken pointer array at {i}")))
}

fn check_source(mem: &UnitMemory<'_>, r: u32, rows: u32) -> Result<(), FleetError> {
    if r >= rows {
        return Err(mem.fault(format!("source {r} outside 0..{rows}")));
    }
    Ok(())
}

fn top_down(mem: &UnitMemory<'_>, cf: &[u32], d: &mut Discovery) -> Result<u64, FleetError> {
    let rows = cf.len() * NODE_ALIGN as usize;
    let ptrs = mem.load(sym::NODE_PTRS, rows + 1)?;
    let edges = mem.load(sym::EDGES, ptrs[rows] as usize)?;
    let mut scanned = 0;
    for r in iter_ones(cf) {
        let out = span(mem, &edges, &ptrs, r as usize)?;
        scanned += out.len() as u64;
        for &c in out {
            d.visit(mem, c)?;
        }
    }
    Ok(scanned)
}

fn bottom_up(mem: &UnitMemory<'_>, cf: &[u32], d: &mut Discovery) -> Result<u64, FleetError> {
    let rows = cf.len() as u32 * NODE_ALIGN;
    let cols = d.cols as usize;
    let ptrs = mem.load(sym::NODE_PTRS, cols + 1)?;
    let edges = mem.load(sym::EDGES, ptrs[cols] as usize)?;
    let mut scanned = 0;
    for c in 0..d.cols {
        if d.is_visited(c) {
            continue;
        }
        for &r in span(mem, &edges, &ptrs, c as usize)? {
            scanned += 1;
            check_source(mem, r, rows)?;
            if test_bit(cf, r) {
                d.visit(mem, c)?;
                break;
            }
        }
    }
    Ok(scanned)
}

fn edge_centric(mem: &UnitMemory<'_>, cf: &[u32], d: &mut Discovery) -> Result<u64, FleetError> {
    let rows = cf.len() as u32 * NODE_ALIGN;
    let num_edges = mem.scalar(sym::NUM_EDGES)? as usize;
    let nodes = mem.load(sym::NODES, num_edges)?;
    let neighbors = mem.load(sym::NEIGHBORS, num_edges)?;
    for (&r, &c) in nodes.iter().zip(&neighbors) {
        check_source(mem, r, rows)?;
        if test_bit(cf, r) {
            d.visit(mem, c)?;
        }
    }
    Ok(num_edges as u64)
}

/// Run one launch of `algorithm` on a unit.
pub fn run(algorithm: Algorithm, mem: &mut UnitMemory<'_>) -> Result<u64, FleetError> {
    let mut d = Discovery::load(mem)?;
    let len_cf = mem.scalar(sym::LEN_CF)? as usize;
    let cf = mem.load(sym::CURR_FRONTIER, len_cf)?;
    let scanned = match algorithm {
        Algorithm::TopDown => top_down(mem, &cf, &mut d)?,
        Algorithm::BottomUp => bottom_up(mem, &cf, &mut d)?,
        Algorithm::EdgeCentric => edge_centric(mem, &cf, &mut d)?,
    };
    d.store(mem)?;
    Ok(scanned)
}
