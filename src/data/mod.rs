//! Data module: frontier bitsets, per-unit heap arenas and the buffer layout
//! shared by every unit of a run.

pub mod arena;
pub mod error;
pub mod frontier;
pub mod layout;

pub use arena::{BufferClass, BufferHandle, UnitArena};
pub use error::LayoutError;
pub use frontier::Frontier;
pub use layout::{BfsDims, BufferSpec, LayoutPlan};
