//! NCS record layout
//!
//! After the 16 KiB text header an `.ncs` file is a flat array of fixed-size
//! little-endian records, each holding up to 512 samples of one channel.

use super::constants::ncs::{RECORD_HEADER_SIZE, RECORD_SAMPLES, RECORD_SIZE};
use super::constants::NLX_HEADER_SIZE;
use crate::{RawIoError, Result};

/// Fixed 20-byte prefix of every NCS record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NcsRecordHeader {
    /// Timestamp of the first sample in microseconds
    pub timestamp: u64,
    /// Acquisition channel number
    pub channel: u32,
    /// Sampling frequency rounded to an integer
    pub sample_freq: u32,
    /// Number of meaningful samples in this record
    pub valid_samples: u32,
}

impl NcsRecordHeader {
    /// Size of the record prefix in bytes
    pub const SIZE: usize = RECORD_HEADER_SIZE;

    /// Parse a record prefix from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(RawIoError::InsufficientBuffer {
                needed: Self::SIZE,
                available: bytes.len(),
            });
        }

        let timestamp = u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]);
        let channel = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let sample_freq = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        let valid_samples = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

        if valid_samples as usize > RECORD_SAMPLES {
            return Err(RawIoError::CorruptedData(format!(
                "record claims {valid_samples} valid samples, at most {RECORD_SAMPLES} fit"
            )));
        }

        Ok(Self {
            timestamp,
            channel,
            sample_freq,
            valid_samples,
        })
    }

    /// Convert the record prefix to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.channel.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.sample_freq.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.valid_samples.to_le_bytes());
        bytes
    }

    /// Number of valid samples as usize
    pub fn valid(&self) -> usize {
        self.valid_samples as usize
    }
}

/// Number of complete records in a file of `file_len` bytes
///
/// The file must hold the full 16 KiB text header followed by a whole
/// number of 1044-byte records. A header-only file has zero records.
pub fn record_count(file_len: usize) -> Result<usize> {
    if file_len < NLX_HEADER_SIZE {
        return Err(RawIoError::InsufficientBuffer {
            needed: NLX_HEADER_SIZE,
            available: file_len,
        });
    }

    let body = file_len - NLX_HEADER_SIZE;
    if body % RECORD_SIZE != 0 {
        return Err(RawIoError::CorruptedData(format!(
            "{} trailing bytes after the last complete record",
            body % RECORD_SIZE
        )));
    }

    Ok(body / RECORD_SIZE)
}

/// Byte offset of record `index` from the start of the file
pub const fn record_offset(index: usize) -> usize {
    NLX_HEADER_SIZE + index * RECORD_SIZE
}

/// Decode the first `count` little-endian samples of a record's sample block
pub fn decode_samples(record: &[u8], count: usize, out: &mut Vec<i16>) -> Result<()> {
    let count = count.min(RECORD_SAMPLES);
    let end = RECORD_HEADER_SIZE + count * 2;
    if record.len() < end {
        return Err(RawIoError::InsufficientBuffer {
            needed: end,
            available: record.len(),
        });
    }

    out.reserve(count);
    out.extend(
        record[RECORD_HEADER_SIZE..end]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
    );
    Ok(())
}

/// Encode one full record, zero-padding samples past `samples.len()`
pub fn encode_record(header: &NcsRecordHeader, samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(RECORD_SIZE);
    bytes.extend_from_slice(&header.to_bytes());
    for i in 0..RECORD_SAMPLES {
        let value = samples.get(i).copied().unwrap_or(0);
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_header_layout() {
        let header = NcsRecordHeader {
            timestamp: 0x0102_0304_0506_0708,
            channel: 3,
            sample_freq: 32000,
            valid_samples: 512,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[7], 0x01);
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(NcsRecordHeader::from_bytes(&bytes), Ok(header));
    }

    #[test]
    fn test_rejects_oversized_valid_count() {
        let header = NcsRecordHeader {
            timestamp: 0,
            channel: 0,
            sample_freq: 32000,
            valid_samples: 513,
        };
        assert!(matches!(
            NcsRecordHeader::from_bytes(&header.to_bytes()),
            Err(RawIoError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_short_buffer() {
        assert_eq!(
            NcsRecordHeader::from_bytes(&[0u8; 10]),
            Err(RawIoError::InsufficientBuffer {
                needed: 20,
                available: 10
            })
        );
    }

    #[test]
    fn test_record_count() {
        assert_eq!(record_count(NLX_HEADER_SIZE), Ok(0));
        assert_eq!(record_count(NLX_HEADER_SIZE + 3 * RECORD_SIZE), Ok(3));
        assert!(matches!(
            record_count(NLX_HEADER_SIZE + RECORD_SIZE + 1),
            Err(RawIoError::CorruptedData(_))
        ));
        assert!(record_count(100).is_err());
    }

    #[test]
    fn test_decode_samples_honors_count() {
        let header = NcsRecordHeader {
            timestamp: 10,
            channel: 0,
            sample_freq: 1000,
            valid_samples: 3,
        };
        let record = encode_record(&header, &[-1, 2, -300, 7]);
        assert_eq!(record.len(), RECORD_SIZE);

        let mut out = Vec::new();
        decode_samples(&record, header.valid(), &mut out).unwrap();
        assert_eq!(out, vec![-1, 2, -300]);
    }
}
