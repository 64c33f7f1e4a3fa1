//! Run configuration: algorithm, topology, fleet size and layout knobs.

use crate::bfs_error::BfsError;
use crate::data::layout::{DEFAULT_BLOCK_WORDS, DMA_ALIGN_BYTES};
use crate::partitioning::Topology;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Unit counts must be a multiple of this.
pub const UNIT_GRANULE: u32 = 8;
/// Default per-unit heap size (64 MiB).
pub const DEFAULT_HEAP_BYTES: u32 = 64 << 20;

/// Which unit program expands the frontier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Expand rows of the current frontier through a CSR partition.
    TopDown,
    /// Scan unvisited columns for an in-edge from the frontier through a CSC
    /// partition.
    BottomUp,
    /// Scan a COO partition edge by edge.
    EdgeCentric,
}

impl Algorithm {
    /// Topology used when none is given.
    pub fn default_topology(self) -> Topology {
        match self {
            Algorithm::TopDown => Topology::Row,
            Algorithm::BottomUp => Topology::Column,
            Algorithm::EdgeCentric => Topology::Grid,
        }
    }

    /// File name of the unit program.
    pub fn program_name(self) -> &'static str {
        match self {
            Algorithm::TopDown => "top-down-dma",
            Algorithm::BottomUp => "bottom-up-dma",
            Algorithm::EdgeCentric => "edge-dma",
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Algorithm::TopDown),
            "bot" => Ok(Algorithm::BottomUp),
            "edge" => Ok(Algorithm::EdgeCentric),
            other => Err(format!(
                "unknown algorithm `{other}`; supported: top | bot | edge"
            )),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::TopDown => "top",
            Algorithm::BottomUp => "bot",
            Algorithm::EdgeCentric => "edge",
        })
    }
}

/// Everything that selects how a run is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub units: u32,
    pub algorithm: Algorithm,
    /// `None` picks [`Algorithm::default_topology`].
    pub topology: Option<Topology>,
    /// Buffer lengths are rounded up to this many words.
    pub block_words: u32,
    /// Heap bytes per unit.
    pub heap_bytes: u32,
    /// Directory holding the unit programs.
    pub program_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            units: UNIT_GRANULE,
            algorithm: Algorithm::TopDown,
            topology: None,
            block_words: DEFAULT_BLOCK_WORDS,
            heap_bytes: DEFAULT_HEAP_BYTES,
            program_dir: PathBuf::from("bin"),
        }
    }
}

impl RunConfig {
    pub fn topology(&self) -> Topology {
        self.topology
            .unwrap_or_else(|| self.algorithm.default_topology())
    }

    /// Full path of the selected unit program.
    pub fn program_path(&self) -> PathBuf {
        self.program_dir.join(self.algorithm.program_name())
    }

    /// Reject configurations no fleet can run. Called before any allocation.
    pub fn validate(&self) -> Result<(), BfsError> {
        if self.units == 0 || self.units % UNIT_GRANULE != 0 {
            return Err(BfsError::config(format!(
                "unit count must be a positive multiple of {UNIT_GRANULE}, got {}",
                self.units
            )));
        }
        let block_bytes = u64::from(self.block_words) * 4;
        if !self.block_words.is_power_of_two() || block_bytes < u64::from(DMA_ALIGN_BYTES) {
            return Err(BfsError::config(format!(
                "block size must be a power of two of at least {} words, got {}",
                DMA_ALIGN_BYTES / 4,
                self.block_words
            )));
        }
        if self.heap_bytes == 0 || self.heap_bytes % DMA_ALIGN_BYTES != 0 {
            return Err(BfsError::config(format!(
                "heap size must be a positive multiple of {DMA_ALIGN_BYTES} bytes, got {}",
                self.heap_bytes
            )));
        }
        Ok(())
    }
}
