//! Detection of contiguous recording sections in NCS files
//!
//! Acquisition can be paused and resumed within one file. Records keep
//! their fixed size, so pauses only show up as jumps in the record
//! timestamps, and a section is a run of records whose timestamps follow
//! from the sampling rate.

use rawio_core::format::constants::ncs::TIMESTAMP_UNITS_PER_SECOND;
use rawio_core::NcsRecordHeader;

/// Configuration for section detection
#[derive(Debug, Clone, PartialEq)]
pub struct SectionConfig {
    /// Largest timestamp deviation, in samples, still treated as contiguous
    pub gap_tolerance_samples: f64,
    /// Record count above which record headers are decoded in parallel
    pub parallel_threshold: usize,
}

impl SectionConfig {
    /// Set the gap tolerance in samples
    pub fn with_gap_tolerance(mut self, samples: f64) -> Self {
        self.gap_tolerance_samples = samples;
        self
    }

    /// Set the record count above which headers are decoded with rayon
    pub fn with_parallel_threshold(mut self, records: usize) -> Self {
        self.parallel_threshold = records;
        self
    }

    /// Tolerance in timestamp units (microseconds) for a sampling rate
    pub fn tolerance_us(&self, sampling_rate: f64) -> f64 {
        self.gap_tolerance_samples * TIMESTAMP_UNITS_PER_SECOND / sampling_rate
    }
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            gap_tolerance_samples: 1.0,
            parallel_threshold: 100_000,
        }
    }
}

/// Run of records without timing gaps
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NcsSection {
    /// First record of the section
    pub start_record: usize,
    /// One past the last record of the section
    pub end_record: usize,
    /// Timestamp of the first sample, in microseconds
    pub start_timestamp: u64,
    /// Predicted timestamp of the sample after the last one, in microseconds
    pub end_timestamp: u64,
    /// Valid samples in the section
    pub n_samples: usize,
}

impl NcsSection {
    pub fn record_count(&self) -> usize {
        self.end_record - self.start_record
    }

    /// Start time in seconds
    pub fn t_start(&self) -> f64 {
        self.start_timestamp as f64 / TIMESTAMP_UNITS_PER_SECOND
    }

    /// Stop time in seconds
    pub fn t_stop(&self) -> f64 {
        self.end_timestamp as f64 / TIMESTAMP_UNITS_PER_SECOND
    }
}

/// All sections of one file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NcsSections {
    pub sampling_rate: f64,
    pub sections: Vec<NcsSection>,
}

impl NcsSections {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NcsSection> {
        self.sections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NcsSection> {
        self.sections.iter()
    }

    /// Valid samples over all sections
    pub fn total_samples(&self) -> usize {
        self.sections.iter().map(|s| s.n_samples).sum()
    }

    /// Same sample count and start time in every section
    ///
    /// Record boundaries may differ: one file can split a section into
    /// more, shorter records than another.
    pub fn same_layout(&self, other: &NcsSections) -> bool {
        self.sections.len() == other.sections.len()
            && self
                .sections
                .iter()
                .zip(&other.sections)
                .all(|(a, b)| a.n_samples == b.n_samples && a.start_timestamp == b.start_timestamp)
    }
}

/// Duration of `samples` samples in microseconds
fn duration_us(samples: usize, sampling_rate: f64) -> f64 {
    samples as f64 * TIMESTAMP_UNITS_PER_SECOND / sampling_rate
}

/// Split a sequence of record headers into contiguous sections
///
/// Each record predicts the timestamp of the next one as its own timestamp
/// plus `valid_samples / sampling_rate` seconds. A record starts a new
/// section when:
///
/// - its timestamp differs from the prediction by more than
///   `config.gap_tolerance_samples` sample periods
/// - its `sample_freq` differs from `sampling_rate` rounded to an integer
///   (logged at `warn`)
/// - the previous record had a different `sample_freq`
///
/// Sections report their record range, their first timestamp, the
/// predicted timestamp after their last sample, and their valid sample
/// count. An empty record list gives no sections.
pub fn detect_sections(
    records: &[NcsRecordHeader],
    sampling_rate: f64,
    config: &SectionConfig,
) -> NcsSections {
    let tolerance = config.tolerance_us(sampling_rate);
    let expected_freq = sampling_rate.round() as u32;

    let mut sections = Vec::new();
    let mut current: Option<NcsSection> = None;
    let mut predicted = 0.0;
    let mut prev_freq = None;

    for (index, record) in records.iter().enumerate() {
        let freq_changed = record.sample_freq != expected_freq;
        if freq_changed {
            tracing::warn!(
                record = index,
                sample_freq = record.sample_freq,
                expected = expected_freq,
                "record sampling frequency differs from header"
            );
        }

        let contiguous = current.is_some()
            && !freq_changed
            && prev_freq == Some(record.sample_freq)
            && (record.timestamp as f64 - predicted).abs() <= tolerance;
        prev_freq = Some(record.sample_freq);

        if !contiguous {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some(NcsSection {
                start_record: index,
                end_record: index,
                start_timestamp: record.timestamp,
                end_timestamp: record.timestamp,
                n_samples: 0,
            });
        }

        predicted = record.timestamp as f64 + duration_us(record.valid(), sampling_rate);
        if let Some(section) = current.as_mut() {
            section.end_record = index + 1;
            section.n_samples += record.valid();
            section.end_timestamp = predicted.round() as u64;
        }
    }

    sections.extend(current);
    if sections.len() > 1 {
        tracing::debug!(sections = sections.len(), "NCS file has gaps");
    }

    NcsSections {
        sampling_rate,
        sections,
    }
}
