//! Error types for raw-I/O header parsing

use thiserror::Error;

/// Errors that can occur while decoding raw-I/O headers and records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawIoError {
    /// Neuralynx text header does not start with the `########` signature
    #[error("Neuralynx files must start with 8 # characters")]
    MissingSignature,
    /// Property value could not be converted to its declared type
    #[error("can not convert {value:?} for property {key}")]
    InvalidProperty { key: String, value: String },
    /// Per-channel property list does not line up with the channel ids
    #[error("number of channel ids ({ids}) does not match {what} ({found})")]
    ChannelCountMismatch {
        what: &'static str,
        ids: usize,
        found: usize,
    },
    /// Both `CheetahRev` and `ApplicationName` are present
    #[error("header declares both CheetahRev and ApplicationName")]
    ConflictingApplication,
    /// `ApplicationName` is not of the form `<name> "<version>"`
    #[error("impossible to find application name and version in {0:?}")]
    InvalidApplicationName(String),
    /// Application version is not a release number
    #[error("invalid application version {0:?}")]
    InvalidVersion(String),
    /// Header text has no open/close date line for the detected style
    #[error("no matching header {which} date/time for application {application} version {version}")]
    MissingDateTime {
        which: &'static str,
        application: String,
        version: String,
    },
    /// Buffer is shorter than the structure being decoded
    #[error("insufficient buffer: need {needed} bytes, got {available}")]
    InsufficientBuffer { needed: usize, available: usize },
    /// Data corruption detected
    #[error("data corruption detected: {0}")]
    CorruptedData(String),
    /// Unsupported format version or layout
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Malformed or reversed range
    #[error("invalid range")]
    InvalidRange,
    /// Index out of bounds
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// Signal access before `parse_header`
    #[error("header has not been parsed")]
    HeaderNotParsed,
    /// Several recordings exist and none was selected
    #[error("several recordings available, select one with rec_name (possible: {0:?})")]
    AmbiguousRecording(Vec<String>),
    /// Selected recording is missing from a stream
    #[error("recording {recording:?} not found in stream {stream:?}")]
    MissingRecording { stream: String, recording: String },
}

/// Coarse grouping of errors for callers that only need to branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The bytes on disk do not follow the format
    Format,
    /// The caller asked for something the file cannot provide
    Usage,
    /// The file system refused the operation
    Io,
}

impl RawIoError {
    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            RawIoError::InvalidRange
            | RawIoError::IndexOutOfBounds { .. }
            | RawIoError::HeaderNotParsed
            | RawIoError::AmbiguousRecording(_)
            | RawIoError::MissingRecording { .. } => ErrorCategory::Usage,
            _ => ErrorCategory::Format,
        }
    }

    pub(crate) fn invalid_property(key: &str, value: &str) -> Self {
        RawIoError::InvalidProperty {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type for raw-I/O header operations
pub type Result<T> = core::result::Result<T, RawIoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category() {
        assert_eq!(RawIoError::MissingSignature.category(), ErrorCategory::Format);
        assert_eq!(RawIoError::InvalidRange.category(), ErrorCategory::Usage);
        assert_eq!(
            RawIoError::IndexOutOfBounds { index: 3, len: 2 }.category(),
            ErrorCategory::Usage
        );
    }

    #[test]
    fn test_display() {
        let err = RawIoError::ChannelCountMismatch {
            what: "channel names",
            ids: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "number of channel ids (4) does not match channel names (2)"
        );
    }
}
