//! Memory-mapped access to a single `.ncs` file

use super::sections::{detect_sections, NcsSections, SectionConfig};
use crate::error::{Error, Result};
use rawio_core::format::constants::ncs::{RECORD_SAMPLES, RECORD_SIZE};
use rawio_core::format::ncs::{decode_samples, record_count, record_offset};
use rawio_core::{NcsRecordHeader, NlxHeader, ParseOptions, RawIoError};
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};

/// Sample count above which `read_samples` decodes records in parallel
pub const DEFAULT_PARALLEL_SAMPLES: usize = 1 << 16;

/// Bytes backing an open file
enum Storage {
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    Memory(Vec<u8>),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Storage::Mapped(mmap) => &mmap[..],
            Storage::Memory(bytes) => &bytes[..],
        }
    }
}

/// Open continuously sampled channel file
pub struct NcsFile {
    path: PathBuf,
    storage: Storage,
    header: NlxHeader,
    n_records: usize,
    /// `sample_offsets[i]` is the index of the first valid sample of record `i`
    sample_offsets: Vec<usize>,
    parallel_samples: usize,
}

impl NcsFile {
    /// Open and validate a file with default header options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ParseOptions::default())
    }

    /// Open and validate a file
    pub fn open_with<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let storage = Self::load(path)?;
        let file = Self::from_storage(path.to_path_buf(), storage, options)?;
        tracing::debug!(
            path = %path.display(),
            records = file.n_records,
            samples = file.total_samples(),
            "opened NCS file"
        );
        Ok(file)
    }

    /// Build from bytes already in memory; `name` is reported as the path
    pub fn from_bytes(name: impl Into<PathBuf>, bytes: Vec<u8>, options: ParseOptions) -> Result<Self> {
        Self::from_storage(name.into(), Storage::Memory(bytes), options)
    }

    #[cfg(feature = "mmap")]
    fn load(path: &Path) -> Result<Storage> {
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        // SAFETY: read-only mapping; the file is not modified while mapped
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| Error::io(path, e))?;
        Ok(Storage::Mapped(mmap))
    }

    #[cfg(not(feature = "mmap"))]
    fn load(path: &Path) -> Result<Storage> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Storage::Memory(bytes))
    }

    fn from_storage(path: PathBuf, storage: Storage, options: ParseOptions) -> Result<Self> {
        let bytes = storage.as_slice();
        let n_records = record_count(bytes.len())?;
        let header = NlxHeader::parse(bytes, options)?;

        let mut sample_offsets = Vec::with_capacity(n_records + 1);
        let mut total = 0usize;
        let mut first_channel = None;
        for index in 0..n_records {
            let record = NcsRecordHeader::from_bytes(&bytes[record_offset(index)..])?;
            match first_channel {
                None => first_channel = Some(record.channel),
                Some(channel) if channel != record.channel => {
                    tracing::warn!(
                        path = %path.display(),
                        record = index,
                        channel = record.channel,
                        expected = channel,
                        "record channel differs from the first record"
                    );
                }
                Some(_) => {}
            }
            sample_offsets.push(total);
            total += record.valid();
        }
        sample_offsets.push(total);

        Ok(Self {
            path,
            storage,
            header,
            n_records,
            sample_offsets,
            parallel_samples: DEFAULT_PARALLEL_SAMPLES,
        })
    }

    /// Set the sample count above which reads decode records with rayon
    pub fn with_parallel_threshold(mut self, samples: usize) -> Self {
        self.parallel_samples = samples;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &NlxHeader {
        &self.header
    }

    pub fn record_count(&self) -> usize {
        self.n_records
    }

    /// Valid samples in the whole file
    pub fn total_samples(&self) -> usize {
        self.sample_offsets.last().copied().unwrap_or(0)
    }

    /// Index of the first valid sample of each record, plus the total
    pub fn sample_offsets(&self) -> &[usize] {
        &self.sample_offsets
    }

    /// Sampling rate from the header, falling back to the first record
    pub fn sampling_rate(&self) -> Result<f64> {
        if let Some(rate) = self.header.sampling_rate() {
            return Ok(rate);
        }
        match self.n_records {
            0 => Err(RawIoError::CorruptedData(format!(
                "{} has no sampling rate and no records",
                self.path.display()
            ))
            .into()),
            _ => Ok(f64::from(self.record(0)?.sample_freq)),
        }
    }

    /// Scale from raw samples to microvolts, negative for inverted inputs
    pub fn microvolts_per_bit(&self) -> f64 {
        let gain = self
            .header
            .bit_to_microvolt()
            .and_then(|values| values.first().copied())
            .unwrap_or(1.0);
        if self.header.input_inverted() == Some(true) {
            -gain
        } else {
            gain
        }
    }

    fn record_bytes(&self, index: usize) -> Result<&[u8]> {
        if index >= self.n_records {
            return Err(RawIoError::IndexOutOfBounds {
                index,
                len: self.n_records,
            }
            .into());
        }
        let start = record_offset(index);
        Ok(&self.storage.as_slice()[start..start + RECORD_SIZE])
    }

    /// Header of record `index`
    pub fn record(&self, index: usize) -> Result<NcsRecordHeader> {
        Ok(NcsRecordHeader::from_bytes(self.record_bytes(index)?)?)
    }

    /// Headers of every record in file order
    pub fn records(&self) -> impl Iterator<Item = Result<NcsRecordHeader>> + '_ {
        (0..self.n_records).map(move |index| self.record(index))
    }

    /// Valid samples of record `index`
    pub fn samples(&self, index: usize) -> Result<Vec<i16>> {
        let bytes = self.record_bytes(index)?;
        let record = NcsRecordHeader::from_bytes(bytes)?;
        let mut out = Vec::with_capacity(record.valid());
        decode_samples(bytes, record.valid(), &mut out)?;
        Ok(out)
    }

    /// Valid samples `range` of the file, counted across records
    pub fn read_samples(&self, range: Range<usize>) -> Result<Vec<i16>> {
        if range.start > range.end {
            return Err(RawIoError::InvalidRange.into());
        }
        let total = self.total_samples();
        if range.end > total {
            return Err(RawIoError::IndexOutOfBounds {
                index: range.end,
                len: total,
            }
            .into());
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }

        // records whose samples overlap the range
        let first = self.sample_offsets.partition_point(|&o| o <= range.start) - 1;
        let last = self.sample_offsets.partition_point(|&o| o < range.end);
        let records = first..last.min(self.n_records);

        let decoded: Vec<i16> = if range.len() >= self.parallel_samples {
            let parts = records
                .into_par_iter()
                .map(|index| self.samples(index))
                .collect::<Result<Vec<_>>>()?;
            parts.concat()
        } else {
            let mut out = Vec::with_capacity(range.len() + RECORD_SAMPLES);
            for index in records {
                let bytes = self.record_bytes(index)?;
                let record = NcsRecordHeader::from_bytes(bytes)?;
                decode_samples(bytes, record.valid(), &mut out)?;
            }
            out
        };

        let skip = range.start - self.sample_offsets[first];
        Ok(decoded[skip..skip + range.len()].to_vec())
    }

    /// Split the file into contiguous sections
    pub fn sections(&self, config: &SectionConfig) -> Result<NcsSections> {
        let rate = self.sampling_rate()?;
        let headers: Vec<NcsRecordHeader> = if self.n_records > config.parallel_threshold {
            (0..self.n_records)
                .into_par_iter()
                .map(|index| self.record(index))
                .collect::<Result<_>>()?
        } else {
            self.records().collect::<Result<_>>()?
        };
        Ok(detect_sections(&headers, rate, config))
    }
}

impl std::fmt::Debug for NcsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcsFile")
            .field("path", &self.path)
            .field("records", &self.n_records)
            .field("samples", &self.total_samples())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawio_core::format::ncs::encode_record;

    fn file_bytes(records: &[(u64, Vec<i16>)]) -> Vec<u8> {
        let mut bytes = b"######## Neuralynx Data File Header\r\n\
            -CheetahRev 5.7.4\r\n\
            -TimeCreated 2017/02/16 17:56:04\r\n\
            -TimeClosed 2017/02/16 18:01:18\r\n\
            -SamplingFrequency 32000\r\n\
            -ADBitVolts 0.000000030517578125\r\n\
            -ADChannel 5\r\n\
            -AcqEntName CSC6\r\n"
            .to_vec();
        bytes.resize(NlxHeader::SIZE, 0);
        for (timestamp, samples) in records {
            let header = NcsRecordHeader {
                timestamp: *timestamp,
                channel: 5,
                sample_freq: 32000,
                valid_samples: samples.len() as u32,
            };
            bytes.extend_from_slice(&encode_record(&header, samples));
        }
        bytes
    }

    fn ramp(start: i16, len: usize) -> Vec<i16> {
        (0..len).map(|i| start + i as i16).collect()
    }

    #[test]
    fn test_offsets_follow_valid_counts() {
        let bytes = file_bytes(&[(0, ramp(0, 512)), (16_000, ramp(512, 10)), (16_500, ramp(600, 512))]);
        let file = NcsFile::from_bytes("mem.ncs", bytes, ParseOptions::default()).unwrap();
        assert_eq!(file.record_count(), 3);
        assert_eq!(file.sample_offsets(), &[0, 512, 522, 1034]);
        assert_eq!(file.total_samples(), 1034);
        assert_eq!(file.samples(1).unwrap(), ramp(512, 10));
    }

    #[test]
    fn test_read_samples_spans_records() {
        let bytes = file_bytes(&[(0, ramp(0, 512)), (16_000, ramp(512, 10)), (16_500, ramp(600, 512))]);
        let file = NcsFile::from_bytes("mem.ncs", bytes, ParseOptions::default()).unwrap();

        let samples = file.read_samples(510..525).unwrap();
        let mut expected = vec![510, 511];
        expected.extend(ramp(512, 10));
        expected.extend(ramp(600, 3));
        assert_eq!(samples, expected);

        assert_eq!(file.read_samples(3..3).unwrap(), Vec::<i16>::new());
        assert!(file.read_samples(0..1035).is_err());
    }

    #[test]
    fn test_parallel_read_matches_serial() {
        let records: Vec<_> = (0..8).map(|i| (i * 16_000, ramp(i as i16 * 100, 512))).collect();
        let serial = NcsFile::from_bytes("a.ncs", file_bytes(&records), ParseOptions::default()).unwrap();
        let parallel = NcsFile::from_bytes("b.ncs", file_bytes(&records), ParseOptions::default())
            .unwrap()
            .with_parallel_threshold(1);
        assert_eq!(
            serial.read_samples(100..4000).unwrap(),
            parallel.read_samples(100..4000).unwrap()
        );
    }

    #[test]
    fn test_record_out_of_bounds() {
        let file = NcsFile::from_bytes("mem.ncs", file_bytes(&[]), ParseOptions::default()).unwrap();
        assert!(matches!(
            file.record(0),
            Err(Error::Format(RawIoError::IndexOutOfBounds { index: 0, len: 0 }))
        ));
        assert_eq!(file.sampling_rate().unwrap(), 32000.0);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let mut bytes = file_bytes(&[(0, ramp(0, 512))]);
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            NcsFile::from_bytes("mem.ncs", bytes, ParseOptions::default()),
            Err(Error::Format(RawIoError::CorruptedData(_)))
        ));
    }

    #[test]
    fn test_sections_of_file() {
        let bytes = file_bytes(&[(0, ramp(0, 512)), (16_000, ramp(0, 512)), (1_000_000, ramp(0, 512))]);
        let file = NcsFile::from_bytes("mem.ncs", bytes, ParseOptions::default()).unwrap();
        let sections = file.sections(&SectionConfig::default()).unwrap();
        assert_eq!(sections.len(), 2);
        let parallel = file
            .sections(&SectionConfig::default().with_parallel_threshold(0))
            .unwrap();
        assert_eq!(sections, parallel);
    }
}
