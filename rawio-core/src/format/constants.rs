//! Format constants for the supported raw-I/O layouts

/// Neuralynx files start with a 16 KiB NUL-padded text header
pub const NLX_HEADER_SIZE: usize = 1 << 14;

/// Every Neuralynx text header starts with this line prefix
pub const NLX_SIGNATURE: &str = "########";

/// NCS continuous-sampling record layout
pub mod ncs {
    /// Samples per record
    pub const RECORD_SAMPLES: usize = 512;

    /// Bytes before the sample block: timestamp, channel, frequency, valid count
    pub const RECORD_HEADER_SIZE: usize = 20;

    /// Total bytes per record
    pub const RECORD_SIZE: usize = RECORD_HEADER_SIZE + RECORD_SAMPLES * 2;

    /// Timestamps are stored in microseconds
    pub const TIMESTAMP_UNITS_PER_SECOND: f64 = 1e6;
}

/// Maxwell MaxOne/MaxTwo layout constants
pub mod maxwell {
    /// Single-well layout version stored in the `version` dataset
    pub const LEGACY_VERSION: u64 = 20160704;

    /// The legacy layout has no sampling dataset
    pub const LEGACY_SAMPLING_RATE: f64 = 20000.0;

    /// Stream id used for the legacy single-well layout
    pub const LEGACY_STREAM_ID: &str = "well000";

    /// Volts to microvolts
    pub const LSB_TO_MICROVOLT: f64 = 1e6;
}
