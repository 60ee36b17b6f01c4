//! Neuralynx text header parsing
//!
//! Pure parsing of the 16 KiB header shared by all Neuralynx file types.

pub mod acq;
pub mod datetime;
pub mod header;
pub mod properties;
pub mod version;

pub use acq::AcqType;
pub use datetime::{Boundary, HeaderStyle};
pub use header::{ChannelId, NlxHeader, ParseOptions};
pub use properties::Properties;
pub use version::AppVersion;
