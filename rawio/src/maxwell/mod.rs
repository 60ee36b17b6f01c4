//! Maxwell Biosystems MaxOne / MaxTwo recordings
//!
//! Recordings are HDF5 files. Legacy MaxOne files (layout `20160704`) hold
//! a single well at the root; later files hold one group per well under
//! `wells/`, each with one or more recordings. Each well is one stream.
//!
//! HDF5 access goes through [`MaxwellSource`]. [`H5Source`] reads real files
//! (feature `hdf5`); [`MemorySource`] holds synthetic recordings.

#[cfg(feature = "hdf5")]
pub mod h5file;
pub mod memory;
pub mod rawio;

#[cfg(feature = "hdf5")]
pub use h5file::H5Source;
pub use memory::MemorySource;
pub use rawio::MaxwellRawIo;

use crate::error::Result;
use rawio_core::format::constants::maxwell::LEGACY_VERSION;
use rawio_core::RawIoError;
use std::ops::Range;

/// Where a stream's settings, mapping and signals live in the file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignalLocation {
    /// Root `settings`, `mapping` and `sig` of a legacy file
    Legacy,
    /// `wells/<well>/<recording>/...`
    Well { well: String, recording: String },
}

impl SignalLocation {
    /// HDF5 path of the signal dataset
    pub fn signal_path(&self) -> String {
        match self {
            SignalLocation::Legacy => "sig".to_string(),
            SignalLocation::Well { well, recording } => {
                format!("wells/{well}/{recording}/groups/routed/raw")
            }
        }
    }

    /// HDF5 path of the settings group
    pub fn settings_path(&self) -> String {
        match self {
            SignalLocation::Legacy => "settings".to_string(),
            SignalLocation::Well { well, recording } => format!("wells/{well}/{recording}/settings"),
        }
    }

    /// HDF5 path of the channel/electrode mapping table
    pub fn mapping_path(&self) -> String {
        match self {
            SignalLocation::Legacy => "mapping".to_string(),
            SignalLocation::Well { .. } => format!("{}/mapping", self.settings_path()),
        }
    }
}

/// Acquisition settings of one stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxwellSettings {
    /// Sampling rate in Hz; legacy files do not store it
    pub sampling: Option<f64>,
    /// Volts per ADC step
    pub lsb: f64,
}

/// Routing of amplifier channels to electrodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMapping {
    /// Signal row per entry; negative values mark unrouted entries
    pub channel: Vec<i64>,
    pub electrode: Vec<i64>,
}

impl ChannelMapping {
    /// `(channel, electrode)` pairs of routed entries
    pub fn routed(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        self.channel
            .iter()
            .zip(&self.electrode)
            .filter_map(|(&channel, &electrode)| {
                u32::try_from(channel).ok().map(|channel| (channel, electrode))
            })
    }
}

/// Read access to the parts of a Maxwell HDF5 file the reader needs
pub trait MaxwellSource {
    /// Content of the root `version` dataset
    fn version(&self) -> Result<String>;

    /// Group names under `wells`
    fn well_ids(&self) -> Result<Vec<String>>;

    /// Recording group names under `wells/<well>`
    fn recording_names(&self, well: &str) -> Result<Vec<String>>;

    fn settings(&self, location: &SignalLocation) -> Result<MaxwellSettings>;

    fn mapping(&self, location: &SignalLocation) -> Result<ChannelMapping>;

    /// `(rows, samples)` of the signal dataset
    fn signal_shape(&self, location: &SignalLocation) -> Result<(usize, usize)>;

    /// Samples `samples` of each row in `rows`, row after row
    fn read_rows(
        &self,
        location: &SignalLocation,
        rows: &[usize],
        samples: Range<usize>,
    ) -> Result<Vec<u16>>;
}

/// Layout generation of a file, from its `version` dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single well at the file root
    Legacy,
    /// One group per well under `wells/`
    Wells,
}

impl Layout {
    pub fn from_version(version: &str) -> Result<Self> {
        let number: u64 = version
            .trim()
            .parse()
            .map_err(|_| RawIoError::InvalidVersion(version.to_string()))?;
        match number.cmp(&LEGACY_VERSION) {
            std::cmp::Ordering::Equal => Ok(Layout::Legacy),
            std::cmp::Ordering::Greater => Ok(Layout::Wells),
            std::cmp::Ordering::Less => Err(RawIoError::UnsupportedFormat(format!(
                "Maxwell version {number} predates {LEGACY_VERSION}"
            ))
            .into()),
        }
    }
}
