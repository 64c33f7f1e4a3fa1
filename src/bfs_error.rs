//! BfsError: Unified error type for pim-bfs public APIs
//!
//! Every fallible operation of the crate returns this type, wrapping the
//! narrower errors of the partitioner, the layout planner and the fleet.
//! None of them is recoverable within a run: the orchestrator aborts on the
//! first error it sees.

use crate::data::LayoutError;
use crate::fleet::FleetError;
use crate::partitioning::error::PartitionError;
use thiserror::Error;

/// Unified error type for pim-bfs operations.
#[derive(Debug, Error)]
pub enum BfsError {
    /// Invalid run selection (unit count, algorithm, topology, block size).
    /// Always reported before any fleet allocation.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Malformed input graph; `line` is 1-based and counts the header.
    #[error("Parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    /// Underlying I/O failure while reading the graph or writing levels.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// Any failure of the compute-unit fleet. Never retried.
    #[error("Fleet error: {0}")]
    Fleet(#[from] FleetError),
}

impl BfsError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BfsError::Config(msg.into())
    }

    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
        BfsError::Parse {
            line,
            msg: msg.into(),
        }
    }
}
