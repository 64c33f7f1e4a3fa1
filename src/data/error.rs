//! Errors raised while laying out per-unit buffers.

use thiserror::Error;

/// Buffer layout and arena errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A fixed-size buffer was inserted after a variable-size one, which
    /// would make its address depend on the unit's partition.
    #[error("fixed buffer `{name}` inserted after a variable buffer")]
    FixedAfterVariable { name: &'static str },
    /// A variable-size buffer was inserted before every fixed buffer was.
    #[error("variable buffer `{name}` inserted while {missing} fixed buffer(s) are missing")]
    VariableBeforeFixed { name: &'static str, missing: usize },
    /// The same buffer name was inserted twice into one arena.
    #[error("buffer `{name}` inserted twice")]
    DuplicateBuffer { name: &'static str },
    /// The arena ran past the unit's heap capacity.
    #[error("buffer `{name}` needs {requested} bytes but only {available} are left")]
    OutOfMemory {
        name: &'static str,
        requested: u64,
        available: u64,
    },
    /// A fixed buffer landed at a different offset on some unit than on unit 0.
    #[error("buffer `{name}` is at {found:#x} on unit {unit} but at {expected:#x} on unit 0")]
    AddressMismatch {
        name: &'static str,
        unit: u32,
        expected: u32,
        found: u32,
    },
    /// Lookup of a buffer the arena never received.
    #[error("no buffer named `{0}`")]
    MissingBuffer(&'static str),
}
