//! Sparse adjacency formats: edge lists and their compressed forms.

pub mod coo;
pub mod csr;

pub use coo::EdgeList;
pub use csr::{Csc, Csr, to_col_compressed, to_row_compressed};
