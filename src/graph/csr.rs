//! Compressed sparse row / column conversion.
//!
//! Both conversions are the classic counting sort: histogram the row
//! indices, exclusive prefix sum, then scatter every edge through a per-row
//! cursor. Column compression is the same routine run over the transposed
//! index arrays. Within a row, neighbours keep their edge-list order.

use crate::bfs_error::BfsError;
use crate::debug_invariants::DebugInvariants;
use crate::graph::EdgeList;
use crate::partitioning::error::PartitionError;

/// Row-compressed adjacency (`row_ptrs[num_rows + 1]`, `col_idxs[num_edges]`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csr {
    pub num_rows: u32,
    pub num_cols: u32,
    pub row_ptrs: Vec<u32>,
    pub col_idxs: Vec<u32>,
}

/// Column-compressed adjacency (`col_ptrs[num_cols + 1]`, `row_idxs[num_edges]`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csc {
    pub num_rows: u32,
    pub num_cols: u32,
    pub col_ptrs: Vec<u32>,
    pub row_idxs: Vec<u32>,
}

impl Csr {
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.col_idxs.len()
    }

    /// Out-neighbours of row `r`.
    #[inline]
    pub fn neighbours(&self, r: u32) -> &[u32] {
        let r = r as usize;
        &self.col_idxs[self.row_ptrs[r] as usize..self.row_ptrs[r + 1] as usize]
    }

    /// All `(row, col)` pairs, rows ascending.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.num_rows).flat_map(move |r| self.neighbours(r).iter().map(move |&c| (r, c)))
    }
}

impl Csc {
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.row_idxs.len()
    }

    /// In-neighbours of column `c`.
    #[inline]
    pub fn in_neighbours(&self, c: u32) -> &[u32] {
        let c = c as usize;
        &self.row_idxs[self.col_ptrs[c] as usize..self.col_ptrs[c + 1] as usize]
    }

    /// All `(row, col)` pairs, columns ascending.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.num_cols).flat_map(move |c| self.in_neighbours(c).iter().map(move |&r| (r, c)))
    }
}

fn compress(num_rows: u32, num_cols: u32, rows: &[u32], cols: &[u32]) -> Csr {
    let n = num_rows as usize;
    let mut row_ptrs = vec![0u32; n + 1];
    let mut col_idxs = vec![0u32; cols.len()];

    // histogram
    for &r in rows {
        row_ptrs[r as usize] += 1;
    }

    // exclusive prefix sum
    let mut sum = 0u32;
    for ptr in row_ptrs.iter_mut().take(n) {
        let count = *ptr;
        *ptr = sum;
        sum += count;
    }
    row_ptrs[n] = sum;

    // scatter; row_ptrs[r] ends up at the start of row r + 1
    for (&r, &c) in rows.iter().zip(cols) {
        let slot = &mut row_ptrs[r as usize];
        col_idxs[*slot as usize] = c;
        *slot += 1;
    }

    // restore
    for r in (1..n).rev() {
        row_ptrs[r] = row_ptrs[r - 1];
    }
    if n > 0 {
        row_ptrs[0] = 0;
    }

    let csr = Csr {
        num_rows,
        num_cols,
        row_ptrs,
        col_idxs,
    };
    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    csr.debug_assert_invariants();
    csr
}

/// Convert an edge list to row-compressed form.
///
/// # Complexity
/// **O(V + E)** time and space.
pub fn to_row_compressed(coo: &EdgeList) -> Csr {
    compress(coo.num_rows, coo.num_cols, &coo.row_idxs, &coo.col_idxs)
}

/// Convert an edge list to column-compressed form by compressing its
/// transpose and relabelling the result.
pub fn to_col_compressed(coo: &EdgeList) -> Csc {
    let t = compress(coo.num_cols, coo.num_rows, &coo.col_idxs, &coo.row_idxs);
    Csc {
        num_rows: t.num_cols,
        num_cols: t.num_rows,
        col_ptrs: t.row_ptrs,
        row_idxs: t.col_idxs,
    }
}

fn validate_compressed(
    major: u32,
    minor: u32,
    ptrs: &[u32],
    idxs: &[u32],
) -> Result<(), BfsError> {
    let broken = |at: usize| PartitionError::BrokenPointers { at };
    if ptrs.len() != major as usize + 1 {
        return Err(broken(ptrs.len()).into());
    }
    if ptrs[0] != 0 {
        return Err(broken(0).into());
    }
    if let Some(at) = ptrs.windows(2).position(|w| w[0] > w[1]) {
        return Err(broken(at + 1).into());
    }
    if ptrs[major as usize] as usize != idxs.len() {
        return Err(broken(major as usize).into());
    }
    if let Some(&i) = idxs.iter().find(|&&i| i >= minor) {
        return Err(PartitionError::IndexBeyondExtent {
            index: i,
            extent: minor,
        }
        .into());
    }
    Ok(())
}

impl DebugInvariants for Csr {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Csr invalid");
    }

    fn validate_invariants(&self) -> Result<(), BfsError> {
        validate_compressed(self.num_rows, self.num_cols, &self.row_ptrs, &self.col_idxs)
    }
}

impl DebugInvariants for Csc {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Csc invalid");
    }

    fn validate_invariants(&self) -> Result<(), BfsError> {
        validate_compressed(self.num_cols, self.num_rows, &self.col_ptrs, &self.row_idxs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> EdgeList {
        EdgeList::from_pairs(5, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]).unwrap()
    }

    #[test]
    fn csr_of_fixed_graph() {
        let csr = to_row_compressed(&sample());
        assert_eq!(csr.row_ptrs, vec![0, 2, 3, 4, 5, 5]);
        assert_eq!(csr.col_idxs, vec![1, 2, 3, 3, 4]);
        assert_eq!(csr.neighbours(0), &[1, 2]);
        assert!(csr.neighbours(4).is_empty());
    }

    #[test]
    fn csc_is_csr_of_transpose() {
        let coo = sample();
        let csc = to_col_compressed(&coo);
        let csr_t = to_row_compressed(&coo.clone().transpose());
        assert_eq!(csc.col_ptrs, csr_t.row_ptrs);
        assert_eq!(csc.row_idxs, csr_t.col_idxs);
        assert_eq!((csc.num_rows, csc.num_cols), (csr_t.num_cols, csr_t.num_rows));
        assert_eq!(csc.in_neighbours(3), &[1, 2]);
        assert_eq!(csc.col_ptrs, vec![0, 0, 1, 2, 4, 5]);
    }

    #[test]
    fn empty_matrix() {
        let csr = to_row_compressed(&EdgeList::new(0, 0));
        assert_eq!(csr.row_ptrs, vec![0]);
        assert_eq!(csr.num_edges(), 0);
    }

    #[test]
    fn broken_pointers_are_reported() {
        let mut csr = to_row_compressed(&sample());
        csr.row_ptrs[2] = 1;
        assert!(matches!(
            csr.validate_invariants(),
            Err(BfsError::Partition(PartitionError::BrokenPointers { at: 2 }))
        ));
    }

    proptest! {
        #[test]
        fn csr_preserves_edge_multiset(
            n in 1u32..40,
            raw in proptest::collection::vec((0u32..1000, 0u32..1000), 0..200),
        ) {
            let pairs: Vec<_> = raw.into_iter().map(|(r, c)| (r % n, c % n)).collect();
            let coo = EdgeList::from_pairs(n, pairs.iter().copied()).unwrap();

            let mut want = pairs.clone();
            want.sort_unstable();

            let mut got: Vec<_> = to_row_compressed(&coo).edges().collect();
            got.sort_unstable();
            prop_assert_eq!(&got, &want);

            let mut got_t: Vec<_> = to_col_compressed(&coo).edges().collect();
            got_t.sort_unstable();
            prop_assert_eq!(&got_t, &want);
        }
    }
}
