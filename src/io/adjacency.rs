//! Adjacency-list reader.
//!
//! ```text
//! <num_nodes> <num_edges>
//! <row> <col> [ignored...]
//! ...
//! ```
//!
//! The first edge's row index is taken as the index base (0 or 1) and
//! subtracted from every row and column index. Blank lines are skipped;
//! line numbers in errors are 1-based and count the header.

use crate::bfs_error::BfsError;
use crate::graph::EdgeList;
use crate::io::GraphReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const MAX_RESERVED_EDGES: usize = 1 << 20;

#[derive(Clone, Copy, Debug, Default)]
pub struct AdjacencyListReader;

fn two_numbers(line: &str) -> Option<(u32, u32)> {
    let mut it = line.split_whitespace();
    let a = it.next()?.parse().ok()?;
    let b = it.next()?.parse().ok()?;
    Some((a, b))
}

impl GraphReader for AdjacencyListReader {
    fn read<R: BufRead>(&self, reader: R) -> Result<EdgeList, BfsError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !matches!(l, Ok(s) if s.trim().is_empty()));

        let (num_nodes, num_edges) = match lines.next() {
            Some((line, text)) => two_numbers(&text?).ok_or_else(|| {
                BfsError::parse(line, "header must be of the form: NUM_NODES NUM_EDGES")
            })?,
            None => return Err(BfsError::parse(1, "empty input")),
        };
        if num_nodes == 0 {
            return Err(BfsError::parse(1, "graph must have at least one node"));
        }

        // the header count is untrusted until the edge lines are read
        let reserve = (num_edges as usize).min(MAX_RESERVED_EDGES);
        let mut coo = EdgeList::with_capacity(num_nodes, num_nodes, reserve);
        let mut offset = None;
        let mut last_line = 1;
        for (line, text) in lines.by_ref().take(num_edges as usize) {
            last_line = line;
            let (row, col) = two_numbers(&text?).ok_or_else(|| {
                BfsError::parse(line, "edge lines must be of the form: ROW_IDX COL_IDX")
            })?;
            let base = *offset.get_or_insert(row);
            let rebase = |idx: u32| {
                idx.checked_sub(base)
                    .filter(|&i| i < num_nodes)
                    .ok_or_else(|| {
                        let end = u64::from(base) + u64::from(num_nodes);
                        BfsError::parse(line, format!("index {idx} outside {base}..{end}"))
                    })
            };
            coo.push(rebase(row)?, rebase(col)?);
        }
        if coo.num_edges() < num_edges as usize {
            return Err(BfsError::parse(
                last_line + 1,
                format!("expected {num_edges} edges, found {}", coo.num_edges()),
            ));
        }
        if let Some(base @ 1..) = offset {
            log::debug!("rebased indices by {base}");
        }
        Ok(coo)
    }
}

/// Read an adjacency-list file.
pub fn read_graph_file(path: &Path) -> Result<EdgeList, BfsError> {
    let file = File::open(path)?;
    let coo = AdjacencyListReader.read(BufReader::new(file))?;
    log::info!(
        "loaded {} nodes and {} edges from {}",
        coo.num_rows,
        coo.num_edges(),
        path.display()
    );
    Ok(coo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<EdgeList, BfsError> {
        AdjacencyListReader.read(text.as_bytes())
    }

    #[test]
    fn one_indexed_input_is_rebased() {
        let coo = read("3 2\n1 2\n2 3 extra tokens\n").unwrap();
        assert_eq!(coo.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
        assert_eq!((coo.num_rows, coo.num_cols), (3, 3));
    }

    #[test]
    fn zero_indexed_input_is_kept() {
        let coo = read("5 2\n\n0 4\n3 0\n").unwrap();
        assert_eq!(coo.edges().collect::<Vec<_>>(), vec![(0, 4), (3, 0)]);
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert!(matches!(read(""), Err(BfsError::Parse { line: 1, .. })));
        assert!(matches!(read("x y\n"), Err(BfsError::Parse { line: 1, .. })));
        assert!(matches!(read("0 0\n"), Err(BfsError::Parse { line: 1, .. })));
        assert!(matches!(read("3 2\n0 1\n0 z\n"), Err(BfsError::Parse { line: 3, .. })));
        assert!(matches!(read("3 3\n0 1\n1 2\n"), Err(BfsError::Parse { line: 4, .. })));
        // index past the declared node count
        assert!(matches!(read("3 1\n0 3\n"), Err(BfsError::Parse { line: 2, .. })));
        // index below the detected base
        assert!(matches!(read("3 2\n1 2\n0 1\n"), Err(BfsError::Parse { line: 3, .. })));
        // absurd edge count in the header fails on the missing lines
        assert!(matches!(
            read("2 4294967295\n0 1\n"),
            Err(BfsError::Parse { line: 3, .. })
        ));
    }
}
