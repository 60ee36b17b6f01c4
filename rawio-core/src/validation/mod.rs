//! Range and index validation for signal access
//!
//! Pure functions with no I/O, shared by every reader.

pub mod bounds;
pub mod parsing;

pub use bounds::{resolve_channel_indexes, resolve_chunk_range, validate_index};
pub use parsing::parse_range;
