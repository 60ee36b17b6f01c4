//! Neuralynx `.ncs` continuously sampled channel files

pub mod file;
pub mod rawio;
pub mod sections;

pub use file::NcsFile;
pub use rawio::NcsRawIo;
pub use sections::{detect_sections, NcsSection, NcsSections, SectionConfig};
