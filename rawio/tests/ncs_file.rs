mod common;

use common::{flatten, noise_records, write_ncs, Record, RECORD_US};
use rawio::{read_header, AcqType, Error, NcsFile, RawIoError, SectionConfig};

#[test]
fn test_open_reads_header_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let records = noise_records(7, 1_000_000, 5);
    let path = write_ncs(dir.path(), "CSC1", 0, true, &records);

    let file = NcsFile::open(&path).unwrap();
    assert_eq!(file.record_count(), 5);
    assert_eq!(file.total_samples(), 5 * 512);
    assert_eq!(file.sampling_rate().unwrap(), 32000.0);
    assert_eq!(file.header().channel_names(), &["CSC1".to_string()]);
    assert_eq!(file.header().type_of_recording(), AcqType::DigitalLynxSx);
    // inverted input flips the sign of the gain
    assert!((file.microvolts_per_bit() + 0.030517578125).abs() < 1e-12);

    let record = file.record(2).unwrap();
    assert_eq!(record.timestamp, 1_000_000 + 2 * RECORD_US);
    assert_eq!(file.samples(2).unwrap(), records[2].samples);
}

#[test]
fn test_read_samples_matches_written_data() {
    let dir = tempfile::tempdir().unwrap();
    let records = noise_records(11, 0, 40);
    let path = write_ncs(dir.path(), "CSC2", 1, false, &records);
    let expected = flatten(&records);

    let file = NcsFile::open(&path).unwrap();
    assert_eq!(file.read_samples(0..expected.len()).unwrap(), expected);
    assert_eq!(file.read_samples(1000..3000).unwrap(), expected[1000..3000]);

    let parallel = NcsFile::open(&path).unwrap().with_parallel_threshold(16);
    assert_eq!(parallel.read_samples(100..20_000).unwrap(), expected[100..20_000]);
}

#[test]
fn test_sections_split_on_pause() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = noise_records(3, 0, 4);
    records.extend(noise_records(4, 10_000_000, 3));
    records.push(Record {
        timestamp: 10_000_000 + 3 * RECORD_US,
        samples: vec![1, 2, 3],
    });
    let path = write_ncs(dir.path(), "CSC3", 2, false, &records);

    let file = NcsFile::open(&path).unwrap();
    let sections = file.sections(&SectionConfig::default()).unwrap();
    assert_eq!(sections.len(), 2);

    let first = sections.get(0).unwrap();
    assert_eq!((first.start_record, first.end_record), (0, 4));
    assert_eq!(first.n_samples, 2048);
    assert!((first.t_stop() - 4.0 * RECORD_US as f64 / 1e6).abs() < 1e-12);

    let second = sections.get(1).unwrap();
    assert_eq!((second.start_record, second.end_record), (4, 8));
    assert_eq!(second.n_samples, 3 * 512 + 3);
    assert_eq!(second.t_start(), 10.0);
}

#[test]
fn test_truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ncs(dir.path(), "CSC4", 3, false, &noise_records(1, 0, 2));
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 100]).unwrap();

    assert!(matches!(
        NcsFile::open(&path),
        Err(Error::Format(RawIoError::CorruptedData(_)))
    ));
    // the text header alone is still readable
    let header = read_header(&path).unwrap();
    assert_eq!(header.channel_names(), &["CSC4".to_string()]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = NcsFile::open(dir.path().join("absent.ncs")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert_eq!(err.category(), rawio::ErrorCategory::Io);
}
