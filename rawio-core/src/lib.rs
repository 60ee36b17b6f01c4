//! rawio-core - electrophysiology raw-I/O format definitions
//!
//! This crate provides the header parsers, record layouts and traits shared
//! by the `rawio` readers. It performs no file I/O.

pub mod error;
pub mod format;
pub mod header;
pub mod nlx;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::NcsRecordHeader;
pub use header::{
    Annotations, EventChannel, EventKind, RawHeader, SampleType, SignalChannel, SignalChunk,
    SignalStream, SpikeChannel,
};
pub use nlx::{AcqType, AppVersion, ChannelId, NlxHeader, ParseOptions};
pub use traits::*;

pub use chrono;
