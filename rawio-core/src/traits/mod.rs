//! Interfaces implemented by format readers

pub mod rawio;
pub mod sample;

pub use rawio::RawIo;
pub use sample::RawSample;
