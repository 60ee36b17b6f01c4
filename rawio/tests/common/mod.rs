//! Synthetic Neuralynx files for integration tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rawio::NlxHeader;
use rawio_core::format::ncs::encode_record;
use rawio_core::NcsRecordHeader;
use std::path::{Path, PathBuf};

pub const RATE: u32 = 32000;
/// Duration of a full 512-sample record at 32 kHz
pub const RECORD_US: u64 = 16_000;

/// Header text of a Cheetah 5.7.4 channel file
pub fn header_text(channel: u32, name: &str, inverted: bool, rate: u32) -> String {
    format!(
        "######## Neuralynx Data File Header\r\n\
         -FileType NCS\r\n\
         -FileVersion 3.4\r\n\
         -RecordSize 1044\r\n\
         -CheetahRev 5.7.4\r\n\
         -TimeCreated 2017/02/16 17:56:04\r\n\
         -TimeClosed 2017/02/16 18:01:18\r\n\
         -HardwareSubSystemType DigitalLynxSX\r\n\
         -SamplingFrequency {rate}\r\n\
         -ADBitVolts 0.000000030517578125\r\n\
         -ADChannel {channel}\r\n\
         -AcqEntName {name}\r\n\
         -InputRange 1000\r\n\
         -InputInverted {}\r\n",
        if inverted { "True" } else { "False" }
    )
}

/// One record: first timestamp and its valid samples
pub struct Record {
    pub timestamp: u64,
    pub samples: Vec<i16>,
}

/// `count` full records starting at `start_us`, filled with seeded noise
pub fn noise_records(seed: u64, start_us: u64, count: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| Record {
            timestamp: start_us + i as u64 * RECORD_US,
            samples: (0..512).map(|_| rng.gen_range(-2048..2048)).collect(),
        })
        .collect()
}

pub fn ncs_bytes(header: &str, channel: u32, rate: u32, records: &[Record]) -> Vec<u8> {
    let mut bytes = header.as_bytes().to_vec();
    bytes.resize(NlxHeader::SIZE, 0);
    for record in records {
        let prefix = NcsRecordHeader {
            timestamp: record.timestamp,
            channel,
            sample_freq: rate,
            valid_samples: record.samples.len() as u32,
        };
        bytes.extend_from_slice(&encode_record(&prefix, &record.samples));
    }
    bytes
}

/// Write a channel file named `<name>.ncs` into `dir`
pub fn write_ncs(dir: &Path, name: &str, channel: u32, inverted: bool, records: &[Record]) -> PathBuf {
    let path = dir.join(format!("{name}.ncs"));
    let header = header_text(channel, name, inverted, RATE);
    std::fs::write(&path, ncs_bytes(&header, channel, RATE, records)).unwrap();
    path
}

/// All valid samples of `records`, in order
pub fn flatten(records: &[Record]) -> Vec<i16> {
    records.iter().flat_map(|r| r.samples.iter().copied()).collect()
}
