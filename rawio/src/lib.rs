//! rawio - electrophysiology raw recording readers
//!
//! Concrete readers built on the format definitions of `rawio-core`:
//!
//! - **rawio-core**: header parsers, record layouts, header model and traits (no I/O)
//! - **rawio**: memory-mapped NCS files, section detection, and the
//!   Neuralynx and Maxwell [`RawIo`] implementations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rawio::{NcsFile, SectionConfig};
//!
//! fn example() -> rawio::Result<()> {
//!     let file = NcsFile::open("CSC1.ncs")?;
//!     println!("{} Hz", file.sampling_rate()?);
//!
//!     let sections = file.sections(&SectionConfig::default())?;
//!     for section in sections.iter() {
//!         println!("{:.3}s .. {:.3}s", section.t_start(), section.t_stop());
//!     }
//!     let first_second = file.read_samples(0..32_000)?;
//!     println!("{} samples", first_second.len());
//!     Ok(())
//! }
//! ```

pub use rawio_core::{
    // Header model and traits
    AcqType, AppVersion, ChannelId, NlxHeader, ParseOptions, RawHeader, RawIo, SignalChunk,
    // Error handling
    ErrorCategory, RawIoError,
    // Validation utilities
    validation::parse_range,
};

pub mod error;
pub mod maxwell;
pub mod ncs;
pub mod nlx;
pub mod summary;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use maxwell::H5Source;
pub use maxwell::{MaxwellRawIo, MaxwellSource, MemorySource};
pub use ncs::{NcsFile, NcsRawIo, NcsSection, NcsSections, SectionConfig};
pub use nlx::{read_header, NlxHeaderExt};
pub use summary::HeaderSummary;
