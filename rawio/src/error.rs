//! Error type for the file-backed readers

use rawio_core::{ErrorCategory, RawIoError};
use std::path::PathBuf;
use thiserror::Error;

/// Hint printed when compressed HDF5 data can not be decoded
pub const MAXWELL_PLUGIN_HINT: &str = "Maxwell files are HDF5 compressed with a custom \
    filter. Install the decompression plugin from \
    https://share.mxwbio.com/d/4742248b2e674a85be97/ and set HDF5_PLUGIN_PATH to the \
    directory that contains it.";

#[derive(Debug, Error)]
pub enum Error {
    /// Header or record content is invalid, or the request is out of range
    #[error(transparent)]
    Format(#[from] RawIoError),

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signal block could not be read from the HDF5 source
    #[error("can not read signal data ({reason}). {hint}")]
    CompressedData { reason: String, hint: &'static str },

    /// HDF5 library failure on `object`
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error on {object}: {source}")]
    Hdf5 {
        object: String,
        #[source]
        source: hdf5::Error,
    },

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    #[cfg(feature = "hdf5")]
    pub(crate) fn hdf5(object: impl Into<String>, source: hdf5::Error) -> Self {
        Error::Hdf5 {
            object: object.into(),
            source,
        }
    }

    pub(crate) fn compressed(reason: impl Into<String>) -> Self {
        Error::CompressedData {
            reason: reason.into(),
            hint: MAXWELL_PLUGIN_HINT,
        }
    }

    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Format(err) => err.category(),
            Error::Io { .. } => ErrorCategory::Io,
            Error::CompressedData { .. } => ErrorCategory::Format,
            #[cfg(feature = "hdf5")]
            Error::Hdf5 { .. } => ErrorCategory::Io,
            #[cfg(feature = "serde")]
            Error::Json(_) => ErrorCategory::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
