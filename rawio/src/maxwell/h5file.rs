//! [`MaxwellSource`] over a Maxwell `.raw.h5` file
//!
//! Needs the HDF5 library at runtime. Signal datasets of recent files are
//! compressed with a vendor filter; when its plugin is missing, reads fail
//! inside HDF5 and surface as [`Error::Hdf5`], which the reader turns into
//! `CompressedData` with the install hint.

use super::{ChannelMapping, MaxwellSettings, MaxwellSource, SignalLocation};
use crate::error::{Error, Result};
use hdf5::types::{FixedAscii, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File};
use rawio_core::RawIoError;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// One row of a `mapping` table; other fields (`x`, `y`) are not read
#[derive(hdf5::H5Type, Debug, Clone, Copy, PartialEq)]
#[repr(C)]
struct MappingRow {
    channel: i64,
    electrode: i64,
}

/// Maxwell recording opened with the HDF5 library
pub struct H5Source {
    path: PathBuf,
    file: File,
}

impl H5Source {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::hdf5(path.display().to_string(), e))?;
        tracing::debug!(path = %path.display(), "opened Maxwell file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dataset(&self, name: &str) -> Result<Dataset> {
        self.file.dataset(name).map_err(|e| Error::hdf5(name, e))
    }

    fn member_names(&self, group: &str) -> Result<Vec<String>> {
        self.file
            .group(group)
            .and_then(|g| g.member_names())
            .map_err(|e| Error::hdf5(group, e))
    }

    /// First value of a numeric dataset, `None` when absent
    fn first_f64(&self, name: &str) -> Result<Option<f64>> {
        if !self.file.link_exists(name) {
            return Ok(None);
        }
        let values = self
            .dataset(name)?
            .read_raw::<f64>()
            .map_err(|e| Error::hdf5(name, e))?;
        Ok(values.first().copied())
    }
}

impl std::fmt::Debug for H5Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("H5Source").field("path", &self.path).finish()
    }
}

/// Text of a string dataset, whichever string type it was written with
fn read_text(dataset: &Dataset, name: &str) -> Result<String> {
    let text = if let Ok(values) = dataset.read_raw::<VarLenUnicode>() {
        values.first().map(|v| v.as_str().to_string())
    } else if let Ok(values) = dataset.read_raw::<VarLenAscii>() {
        values.first().map(|v| v.as_str().to_string())
    } else {
        let values = dataset
            .read_raw::<FixedAscii<64>>()
            .map_err(|e| Error::hdf5(name, e))?;
        values.first().map(|v| v.as_str().to_string())
    };
    text.ok_or_else(|| RawIoError::CorruptedData(format!("{name} is empty")).into())
}

impl MaxwellSource for H5Source {
    fn version(&self) -> Result<String> {
        read_text(&self.dataset("version")?, "version")
    }

    fn well_ids(&self) -> Result<Vec<String>> {
        self.member_names("wells")
    }

    fn recording_names(&self, well: &str) -> Result<Vec<String>> {
        self.member_names(&format!("wells/{well}"))
    }

    fn settings(&self, location: &SignalLocation) -> Result<MaxwellSettings> {
        let settings = location.settings_path();
        let lsb = self.first_f64(&format!("{settings}/lsb"))?.ok_or_else(|| {
            RawIoError::CorruptedData(format!("{settings} has no lsb"))
        })?;
        let sampling = match location {
            SignalLocation::Legacy => None,
            SignalLocation::Well { .. } => self.first_f64(&format!("{settings}/sampling"))?,
        };
        Ok(MaxwellSettings { sampling, lsb })
    }

    fn mapping(&self, location: &SignalLocation) -> Result<ChannelMapping> {
        let name = location.mapping_path();
        let rows = self
            .dataset(&name)?
            .read_raw::<MappingRow>()
            .map_err(|e| Error::hdf5(name, e))?;
        Ok(ChannelMapping {
            channel: rows.iter().map(|r| r.channel).collect(),
            electrode: rows.iter().map(|r| r.electrode).collect(),
        })
    }

    fn signal_shape(&self, location: &SignalLocation) -> Result<(usize, usize)> {
        let name = location.signal_path();
        match self.dataset(&name)?.shape().as_slice() {
            [rows, samples] => Ok((*rows, *samples)),
            other => Err(RawIoError::CorruptedData(format!(
                "{name} has {} dimensions, expected 2",
                other.len()
            ))
            .into()),
        }
    }

    fn read_rows(
        &self,
        location: &SignalLocation,
        rows: &[usize],
        samples: Range<usize>,
    ) -> Result<Vec<u16>> {
        let name = location.signal_path();
        let dataset = self.dataset(&name)?;
        let (n_rows, n_samples) = self.signal_shape(location)?;
        if samples.end > n_samples {
            return Err(RawIoError::IndexOutOfBounds {
                index: samples.end,
                len: n_samples,
            }
            .into());
        }

        let mut out = Vec::with_capacity(rows.len() * samples.len());
        for &row in rows {
            if row >= n_rows {
                return Err(RawIoError::IndexOutOfBounds {
                    index: row,
                    len: n_rows,
                }
                .into());
            }
            let values = dataset
                .read_slice_1d::<u16, _>((row, samples.clone()))
                .map_err(|e| Error::hdf5(name.as_str(), e))?;
            out.extend(values.iter().copied());
        }
        Ok(out)
    }
}
