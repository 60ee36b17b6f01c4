//! Binary layout definitions for the supported raw-I/O formats
//!
//! Pure data structure definitions and byte-level decoding. No file I/O.

pub mod constants;
pub mod ncs;

pub use ncs::NcsRecordHeader;
