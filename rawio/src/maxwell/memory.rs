//! In-memory [`MaxwellSource`], for synthetic recordings and tests

use super::{ChannelMapping, MaxwellSettings, MaxwellSource, SignalLocation};
use crate::error::{Error, Result};
use rawio_core::RawIoError;
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone)]
struct Recording {
    settings: MaxwellSettings,
    mapping: ChannelMapping,
    /// One vector per signal row
    rows: Vec<Vec<u16>>,
}

/// Maxwell file content held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    version: String,
    /// Recording names per well, in insertion order
    wells: BTreeMap<String, Vec<String>>,
    recordings: BTreeMap<(String, String), Recording>,
    legacy: Option<Recording>,
    read_failure: Option<String>,
}

impl MemorySource {
    /// Empty multi-well file with the given layout version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Legacy single-well file
    pub fn legacy(lsb: f64, mapping: ChannelMapping, rows: Vec<Vec<u16>>) -> Self {
        Self {
            version: "20160704".to_string(),
            legacy: Some(Recording {
                settings: MaxwellSettings {
                    sampling: None,
                    lsb,
                },
                mapping,
                rows,
            }),
            ..Self::default()
        }
    }

    /// Add a recording to a well
    pub fn with_recording(
        mut self,
        well: impl Into<String>,
        recording: impl Into<String>,
        settings: MaxwellSettings,
        mapping: ChannelMapping,
        rows: Vec<Vec<u16>>,
    ) -> Self {
        let well = well.into();
        let recording = recording.into();
        self.wells
            .entry(well.clone())
            .or_default()
            .push(recording.clone());
        self.recordings.insert(
            (well, recording),
            Recording {
                settings,
                mapping,
                rows,
            },
        );
        self
    }

    /// Make every signal read fail with `reason`
    pub fn with_read_failure(mut self, reason: impl Into<String>) -> Self {
        self.read_failure = Some(reason.into());
        self
    }

    fn recording(&self, location: &SignalLocation) -> Result<&Recording> {
        let found = match location {
            SignalLocation::Legacy => self.legacy.as_ref(),
            SignalLocation::Well { well, recording } => {
                self.recordings.get(&(well.clone(), recording.clone()))
            }
        };
        found.ok_or_else(|| {
            RawIoError::UnsupportedFormat(format!("no group {}", location.settings_path())).into()
        })
    }
}

impl MaxwellSource for MemorySource {
    fn version(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    fn well_ids(&self) -> Result<Vec<String>> {
        Ok(self.wells.keys().cloned().collect())
    }

    fn recording_names(&self, well: &str) -> Result<Vec<String>> {
        Ok(self.wells.get(well).cloned().unwrap_or_default())
    }

    fn settings(&self, location: &SignalLocation) -> Result<MaxwellSettings> {
        Ok(self.recording(location)?.settings)
    }

    fn mapping(&self, location: &SignalLocation) -> Result<ChannelMapping> {
        Ok(self.recording(location)?.mapping.clone())
    }

    fn signal_shape(&self, location: &SignalLocation) -> Result<(usize, usize)> {
        let rows = &self.recording(location)?.rows;
        Ok((rows.len(), rows.first().map_or(0, Vec::len)))
    }

    fn read_rows(
        &self,
        location: &SignalLocation,
        rows: &[usize],
        samples: Range<usize>,
    ) -> Result<Vec<u16>> {
        if let Some(reason) = &self.read_failure {
            return Err(Error::io(
                location.signal_path(),
                std::io::Error::other(reason.clone()),
            ));
        }

        let data = &self.recording(location)?.rows;
        let mut out = Vec::with_capacity(rows.len() * samples.len());
        for &row in rows {
            let values = data.get(row).ok_or(RawIoError::IndexOutOfBounds {
                index: row,
                len: data.len(),
            })?;
            let slice = values.get(samples.clone()).ok_or(RawIoError::IndexOutOfBounds {
                index: samples.end,
                len: values.len(),
            })?;
            out.extend_from_slice(slice);
        }
        Ok(out)
    }
}
