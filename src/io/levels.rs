//! Level table writer: a `node\tlevel` header, then one line per reached
//! node (and always the root), ascending.

use crate::algs::LevelMap;
use crate::bfs_error::BfsError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffered level-table output. The stream is flushed by [`finish`] and
/// closed when the writer is dropped.
///
/// [`finish`]: LevelWriter::finish
pub struct LevelWriter<W: Write> {
    out: BufWriter<W>,
}

impl LevelWriter<File> {
    /// Create (or truncate) `path`.
    pub fn create(path: &Path) -> Result<Self, BfsError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl LevelWriter<io::Sink> {
    /// A writer that discards everything.
    pub fn sink() -> Self {
        Self::new(io::sink())
    }
}

impl<W: Write> LevelWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    pub fn write(&mut self, levels: &LevelMap) -> Result<(), BfsError> {
        write_levels(levels, &mut self.out)
    }

    /// Flush and hand back the inner stream.
    pub fn finish(self) -> Result<W, BfsError> {
        self.out
            .into_inner()
            .map_err(|e| BfsError::Io(e.into_error()))
    }
}

/// Write `levels` as a level table to `out`.
pub fn write_levels<W: Write>(levels: &LevelMap, mut out: W) -> Result<(), BfsError> {
    writeln!(out, "node\tlevel")?;
    for (node, level) in levels.reached() {
        writeln!(out, "{node}\t{level}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_root_and_reached_nodes() {
        let mut map = LevelMap::new(5, 32);
        map.merge_unit(0, &[0, 1, 0, 2]);
        let mut w = LevelWriter::new(Vec::new());
        w.write(&map).unwrap();
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(text, "node\tlevel\n0\t0\n1\t1\n3\t2\n");
    }
}
