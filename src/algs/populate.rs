//! Upload of per-unit graph partitions and initial BFS state.
//!
//! Each unit gets its scalars (`level`, `len_cf`, `len_nf`, and `num_edges`
//! for the edge program), then its heap laid out by a [`UnitArena`] in plan
//! order: `visited`, `next_frontier`, `curr_frontier`, `node_levels`, then
//! the two partition buffers. The root (global node 0) is seeded into the
//! current frontier of every unit in grid row 0 and into the next frontier
//! of every unit in grid column 0.

use crate::bfs_error::BfsError;
use crate::config::Algorithm;
use crate::data::frontier::set_bit;
use crate::data::layout::{LayoutPlan, sym};
use crate::data::{BufferHandle, LayoutError, UnitArena};
use crate::fleet::wire::{read_scalar, write_scalar, write_words};
use crate::fleet::{ComputeFleet, UnitId};
use crate::graph::{Csc, Csr, EdgeList, to_col_compressed, to_row_compressed};

use super::context::{FrontierOffsets, OrchestratorContext};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One unit's partition in the format its program reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitGraph {
    Csr(Csr),
    Csc(Csc),
    Coo(EdgeList),
}

impl UnitGraph {
    pub fn convert(algorithm: Algorithm, part: EdgeList) -> Self {
        match algorithm {
            Algorithm::TopDown => UnitGraph::Csr(to_row_compressed(&part)),
            Algorithm::BottomUp => UnitGraph::Csc(to_col_compressed(&part)),
            Algorithm::EdgeCentric => UnitGraph::Coo(part),
        }
    }

    pub fn num_edges(&self) -> usize {
        match self {
            UnitGraph::Csr(g) => g.num_edges(),
            UnitGraph::Csc(g) => g.num_edges(),
            UnitGraph::Coo(g) => g.num_edges(),
        }
    }

    /// Contents of the two partition buffers, in
    /// [`LayoutPlan::variable_names`] order.
    pub fn buffers(&self) -> [&[u32]; 2] {
        match self {
            UnitGraph::Csr(g) => [&g.row_ptrs, &g.col_idxs],
            UnitGraph::Csc(g) => [&g.col_ptrs, &g.row_idxs],
            UnitGraph::Coo(g) => [&g.row_idxs, &g.col_idxs],
        }
    }
}

/// Convert every partition; parallel under the `rayon` feature.
pub fn convert_partitions(algorithm: Algorithm, parts: Vec<EdgeList>) -> Vec<UnitGraph> {
    #[cfg(feature = "rayon")]
    let graphs = parts
        .into_par_iter()
        .map(|p| UnitGraph::convert(algorithm, p))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let graphs = parts
        .into_iter()
        .map(|p| UnitGraph::convert(algorithm, p))
        .collect();
    graphs
}

fn set_symbol<F: ComputeFleet>(
    fleet: &mut F,
    unit: UnitId,
    name: &str,
    value: u32,
) -> Result<(), BfsError> {
    let addr = fleet.resolve_symbol(name)?;
    write_scalar(fleet, unit, addr, value)?;
    Ok(())
}

fn upload<F: ComputeFleet>(
    fleet: &mut F,
    unit: UnitId,
    name: &'static str,
    handle: BufferHandle,
    data: &[u32],
) -> Result<(), BfsError> {
    write_words(fleet, unit, handle.offset, data)?;
    set_symbol(fleet, unit, name, handle.offset)
}

/// Lay out and upload every unit. Returns the shared frontier offsets, which
/// are also cached in `ctx`.
///
/// # Errors
/// `AddressMismatch` if a fixed buffer lands at different offsets on two
/// units, plus any arena or fleet error.
pub fn populate<F: ComputeFleet>(
    ctx: &mut OrchestratorContext<F>,
    plan: &LayoutPlan,
    graphs: &[UnitGraph],
) -> Result<FrontierOffsets, BfsError> {
    let dims = *ctx.dims();
    let shape = ctx.shape();
    if graphs.len() != shape.units() as usize {
        return Err(BfsError::config(format!(
            "{} partitions for {} units",
            graphs.len(),
            shape.units()
        )));
    }

    let mut reference: Vec<(&'static str, BufferHandle)> = Vec::new();
    let mut max_used = 0;
    let fleet = ctx.fleet_mut();
    let heap_end = fleet.resolve_symbol(sym::HEAP_END)?;

    for (unit, graph) in (0..).zip(graphs) {
        let (p_row, p_col) = shape.coords(unit);
        set_symbol(fleet, unit, sym::LEVEL, 0)?;
        set_symbol(fleet, unit, sym::LEN_CF, dims.len_cf)?;
        set_symbol(fleet, unit, sym::LEN_NF, dims.len_nf)?;

        let base = read_scalar(&*fleet, unit, heap_end)?;
        let mut arena = UnitArena::new(
            base,
            fleet.heap_capacity(),
            plan.block_words,
            plan.fixed().len(),
        );

        for spec in plan.fixed() {
            let handle = arena.insert_fixed(spec.name, spec.words)?;
            let mut data = vec![0u32; handle.words as usize];
            let seeded = match spec.name {
                sym::CURR_FRONTIER => p_row == 0,
                sym::NEXT_FRONTIER => p_col == 0,
                _ => false,
            };
            if seeded {
                set_bit(&mut data, 0);
            }
            upload(fleet, unit, spec.name, handle, &data)?;
        }

        for (name, data) in plan.variable_names().into_iter().zip(graph.buffers()) {
            let handle = arena.insert_variable(name, data.len() as u32)?;
            upload(fleet, unit, name, handle, data)?;
        }
        if plan.algorithm == Algorithm::EdgeCentric {
            set_symbol(fleet, unit, sym::NUM_EDGES, graph.num_edges() as u32)?;
        }
        write_scalar(fleet, unit, heap_end, arena.end())?;
        max_used = max_used.max(arena.used());

        let fixed: Vec<_> = arena.fixed().collect();
        if unit == 0 {
            reference = fixed;
        } else if let Some((&(name, expected), &(_, found))) = reference
            .iter()
            .zip(&fixed)
            .find(|((_, a), (_, b))| a.offset != b.offset)
        {
            return Err(LayoutError::AddressMismatch {
                name,
                unit,
                expected: expected.offset,
                found: found.offset,
            }
            .into());
        }
        log::trace!(
            "unit {unit} ({p_row}, {p_col}): {} edges, heap {:#x}..{:#x}",
            graph.num_edges(),
            base,
            arena.end()
        );
    }

    let offset_of = |name: &'static str| {
        reference
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, h)| h.offset)
            .ok_or(LayoutError::MissingBuffer(name))
    };
    let offsets = FrontierOffsets {
        next_frontier: offset_of(sym::NEXT_FRONTIER)?,
        curr_frontier: offset_of(sym::CURR_FRONTIER)?,
        node_levels: offset_of(sym::NODE_LEVELS)?,
    };
    log::debug!(
        "populated {} units, at most {max_used} heap bytes each ({} fixed)",
        shape.units(),
        plan.fixed_bytes()
    );
    ctx.set_offsets(offsets);
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::data::BfsDims;
    use crate::fleet::FleetHandle;
    use crate::fleet::sim::SimFleet;
    use crate::partitioning::{GridShape, Topology, pad_node_count, partition_edges};

    type Setup = (OrchestratorContext<SimFleet>, LayoutPlan, Vec<UnitGraph>);

    /// Eight row units over a 3-node path, with `heap_end` preset per unit.
    fn setup(heap_ends: &[(UnitId, u32)]) -> Setup {
        let cfg = RunConfig::default();
        let shape = GridShape::for_topology(Topology::Row, 8).unwrap();
        let padded = pad_node_count(3, 8).unwrap();
        let mut g = EdgeList::from_pairs(3, [(0, 1), (1, 2)]).unwrap();
        g.pad_to(padded, padded);
        let graphs = convert_partitions(cfg.algorithm, partition_edges(&g, shape).unwrap());

        let mut fleet = SimFleet::with_heap(8, 1 << 16).unwrap();
        fleet.load_program(&cfg.program_path()).unwrap();
        let heap_end = fleet.resolve_symbol(sym::HEAP_END).unwrap();
        for &(unit, end) in heap_ends {
            write_scalar(&mut fleet, unit, heap_end, end).unwrap();
        }
        let dims = BfsDims::new(shape, padded).unwrap();
        let plan = LayoutPlan::for_variant(cfg.algorithm, &dims, cfg.block_words);
        let ctx = OrchestratorContext::new(FleetHandle::new(fleet), dims).unwrap();
        (ctx, plan, graphs)
    }

    #[test]
    fn fixed_buffers_share_offsets() {
        let (mut ctx, plan, graphs) = setup(&[]);
        let offsets = populate(&mut ctx, &plan, &graphs).unwrap();
        assert!(0 < offsets.next_frontier);
        assert!(offsets.next_frontier < offsets.curr_frontier);
        assert!(offsets.curr_frontier < offsets.node_levels);
        let heap_end = ctx.fleet().resolve_symbol(sym::HEAP_END).unwrap();
        assert!(read_scalar(ctx.fleet(), 7, heap_end).unwrap() > 0);
    }

    #[test]
    fn diverging_heap_base_is_an_address_mismatch() {
        let (mut ctx, plan, graphs) = setup(&[(3, 64)]);
        let err = populate(&mut ctx, &plan, &graphs).unwrap_err();
        assert!(matches!(
            err,
            BfsError::Layout(LayoutError::AddressMismatch {
                name: sym::VISITED,
                unit: 3,
                expected: 0,
                found: 64,
            })
        ));
    }
}
