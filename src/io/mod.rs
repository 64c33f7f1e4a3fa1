//! Text I/O: adjacency-list graphs in, level tables out.

pub mod adjacency;
pub mod levels;

use crate::bfs_error::BfsError;
use crate::graph::EdgeList;
use std::io::BufRead;

pub use adjacency::{AdjacencyListReader, read_graph_file};
pub use levels::{LevelWriter, write_levels};

/// Reads a graph from a text stream.
pub trait GraphReader {
    fn read<R: BufRead>(&self, reader: R) -> Result<EdgeList, BfsError>;
}
