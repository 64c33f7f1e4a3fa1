#![cfg_attr(docsrs, feature(doc_cfg))]
//! # pim-bfs
//!
//! Breadth-first search over a graph split across a fleet of compute units
//! that cannot talk to each other. Each unit holds one rectangle of the
//! adjacency matrix and expands its part of the frontier; the host runs the
//! traversal as bulk-synchronous rounds (launch, collect, reduce,
//! broadcast) until no unit makes progress, then merges the per-unit level
//! arrays.
//!
//! ## Layout
//! - [`graph`]: edge lists and CSR/CSC conversion
//! - [`partitioning`]: node padding, unit grids and edge binning
//! - [`data`]: frontier bitsets, per-unit heap arenas, buffer layout
//! - [`fleet`]: the compute-unit façade and an in-process simulated fleet
//! - [`algs`]: population, the round engine, frontier exchange and level
//!   aggregation
//! - [`io`]: adjacency-list input, level-table output
//!
//! ## Usage
//! ```rust
//! # fn main() -> Result<(), pim_bfs::bfs_error::BfsError> {
//! use pim_bfs::prelude::*;
//!
//! let graph = EdgeList::from_pairs(4, [(0, 1), (1, 2), (2, 3)])?;
//! let cfg = RunConfig { units: 8, algorithm: Algorithm::EdgeCentric, ..RunConfig::default() };
//! let report = run_simulated(graph, &cfg)?;
//! assert_eq!(report.levels.level(3), Some(3));
//! assert_eq!(report.stats.rounds, 4);
//! # Ok(())
//! # }
//! ```

pub mod algs;
pub mod bfs_error;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod fleet;
pub mod graph;
pub mod io;
pub mod partitioning;

pub use debug_invariants::DebugInvariants;

/// The most-used types of the crate.
pub mod prelude {
    pub use crate::algs::{LevelMap, RunReport, RoundStats, run_bfs, run_simulated};
    pub use crate::bfs_error::BfsError;
    pub use crate::config::{Algorithm, RunConfig};
    pub use crate::fleet::sim::SimFleet;
    pub use crate::fleet::{ComputeFleet, FleetHandle};
    pub use crate::graph::EdgeList;
    pub use crate::io::{GraphReader, LevelWriter, read_graph_file, write_levels};
    pub use crate::partitioning::{GridShape, Topology};
}
