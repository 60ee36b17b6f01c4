//! Raw-I/O header model shared by every reader
//!
//! A reader describes its file as blocks of segments, with signals grouped
//! into streams of channels that share a sampling rate and sample type.

use crate::traits::RawSample;
use crate::{RawIoError, Result};
use std::collections::BTreeMap;

/// Storage type of raw samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleType {
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Size in bytes of one sample
    pub const fn size_bytes(self) -> usize {
        match self {
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }
}

impl core::fmt::Display for SampleType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SampleType::U16 => write!(f, "uint16"),
            SampleType::I16 => write!(f, "int16"),
            SampleType::I32 => write!(f, "int32"),
            SampleType::F32 => write!(f, "float32"),
            SampleType::F64 => write!(f, "float64"),
        }
    }
}

/// Group of channels read together
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalStream {
    pub name: String,
    pub id: String,
}

impl SignalStream {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One continuous signal channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalChannel {
    pub name: String,
    pub id: String,
    /// Samples per second
    pub sampling_rate: f64,
    pub dtype: SampleType,
    /// Physical units after rescaling
    pub units: String,
    /// Multiplier from raw value to `units`
    pub gain: f64,
    /// Added after applying `gain`
    pub offset: f64,
    /// Id of the owning [`SignalStream`]
    pub stream_id: String,
}

/// Spike waveform channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpikeChannel {
    pub name: String,
    pub id: String,
    pub wf_units: String,
    pub wf_gain: f64,
    pub wf_offset: f64,
    /// Samples before the alignment point
    pub wf_left_sweep: usize,
    pub wf_sampling_rate: f64,
}

/// Kind of event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// Instantaneous events
    Event,
    /// Events with a duration
    Epoch,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventChannel {
    pub name: String,
    pub id: String,
    pub kind: EventKind,
}

/// Free-form key/value annotations for a block
pub type Annotations = BTreeMap<String, String>;

/// Complete description of what a reader exposes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawHeader {
    pub nb_block: usize,
    /// Segment count per block
    pub nb_segment: Vec<usize>,
    pub signal_streams: Vec<SignalStream>,
    pub signal_channels: Vec<SignalChannel>,
    pub spike_channels: Vec<SpikeChannel>,
    pub event_channels: Vec<EventChannel>,
    /// One annotation map per block
    pub annotations: Vec<Annotations>,
}

impl RawHeader {
    /// Empty header with `nb_segment.len()` blocks
    pub fn new(nb_segment: Vec<usize>) -> Self {
        Self {
            nb_block: nb_segment.len(),
            annotations: vec![Annotations::new(); nb_segment.len()],
            nb_segment,
            ..Self::default()
        }
    }

    /// Index of the stream with the given id
    pub fn stream_index(&self, id: &str) -> Option<usize> {
        self.signal_streams.iter().position(|s| s.id == id)
    }

    /// Channels belonging to the stream at `stream_index`, in header order
    pub fn channels_of(&self, stream_index: usize) -> Result<Vec<&SignalChannel>> {
        let stream = self.stream(stream_index)?;
        Ok(self
            .signal_channels
            .iter()
            .filter(|c| c.stream_id == stream.id)
            .collect())
    }

    pub fn stream(&self, stream_index: usize) -> Result<&SignalStream> {
        self.signal_streams
            .get(stream_index)
            .ok_or(RawIoError::IndexOutOfBounds {
                index: stream_index,
                len: self.signal_streams.len(),
            })
    }

    /// Check that `block` and `segment` exist
    pub fn check_segment(&self, block: usize, segment: usize) -> Result<()> {
        let n_seg = *self
            .nb_segment
            .get(block)
            .ok_or(RawIoError::IndexOutOfBounds {
                index: block,
                len: self.nb_block,
            })?;
        if segment >= n_seg {
            return Err(RawIoError::IndexOutOfBounds {
                index: segment,
                len: n_seg,
            });
        }
        Ok(())
    }

    /// Set an annotation on a block
    pub fn annotate(&mut self, block: usize, key: impl Into<String>, value: impl Into<String>) {
        if let Some(annotations) = self.annotations.get_mut(block) {
            annotations.insert(key.into(), value.into());
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.nb_segment.len() != self.nb_block {
            return Err(RawIoError::CorruptedData(format!(
                "{} blocks but {} segment counts",
                self.nb_block,
                self.nb_segment.len()
            )));
        }
        if let Some(channel) = self
            .signal_channels
            .iter()
            .find(|c| self.stream_index(&c.stream_id).is_none())
        {
            return Err(RawIoError::CorruptedData(format!(
                "channel {} refers to unknown stream {:?}",
                channel.name, channel.stream_id
            )));
        }
        Ok(())
    }
}

/// Raw samples of one chunk, row-major `samples x channels`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalChunk {
    n_channels: usize,
    data: Vec<i32>,
}

impl SignalChunk {
    /// Wrap row-major data; its length must be a multiple of `n_channels`
    pub fn new(n_channels: usize, data: Vec<i32>) -> Result<Self> {
        let aligned = if n_channels == 0 {
            data.is_empty()
        } else {
            data.len() % n_channels == 0
        };
        if !aligned {
            return Err(RawIoError::CorruptedData(format!(
                "{} values do not fill {} channels",
                data.len(),
                n_channels
            )));
        }
        Ok(Self { n_channels, data })
    }

    /// Interleave one column of samples per channel
    ///
    /// Every column must hold the same number of samples. Values are widened
    /// with [`RawSample::to_i32`].
    pub fn from_columns<T: RawSample>(columns: &[Vec<T>]) -> Result<Self> {
        let n_samples = columns.first().map_or(0, Vec::len);
        if let Some(column) = columns.iter().find(|c| c.len() != n_samples) {
            return Err(RawIoError::CorruptedData(format!(
                "column of {} samples among columns of {}",
                column.len(),
                n_samples
            )));
        }

        let mut data = Vec::with_capacity(n_samples * columns.len());
        for i in 0..n_samples {
            data.extend(columns.iter().map(|c| c[i].to_i32()));
        }
        Ok(Self {
            n_channels: columns.len(),
            data,
        })
    }

    /// Transpose channel-major values (`channels x samples`, as stored by
    /// multi-channel datasets) into a chunk
    pub fn from_channel_major<T: RawSample>(n_channels: usize, values: &[T]) -> Result<Self> {
        if n_channels == 0 || values.len() % n_channels != 0 {
            return Self::new(n_channels, values.iter().map(|v| v.to_i32()).collect());
        }
        let n_samples = values.len() / n_channels;
        let mut data = Vec::with_capacity(values.len());
        for i in 0..n_samples {
            data.extend((0..n_channels).map(|c| values[c * n_samples + i].to_i32()));
        }
        Ok(Self { n_channels, data })
    }

    pub fn n_samples(&self) -> usize {
        if self.n_channels == 0 {
            0
        } else {
            self.data.len() / self.n_channels
        }
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// `(samples, channels)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples(), self.n_channels)
    }

    pub fn get(&self, sample: usize, channel: usize) -> Option<i32> {
        if channel >= self.n_channels {
            return None;
        }
        self.data.get(sample * self.n_channels + channel).copied()
    }

    /// Values of one sample across all selected channels
    pub fn row(&self, sample: usize) -> Option<&[i32]> {
        let start = sample.checked_mul(self.n_channels)?;
        self.data.get(start..start + self.n_channels)
    }

    /// Values of one channel across all samples
    pub fn channel(&self, channel: usize) -> Option<Vec<i32>> {
        if channel >= self.n_channels {
            return None;
        }
        Some(
            self.data
                .iter()
                .skip(channel)
                .step_by(self.n_channels)
                .copied()
                .collect(),
        )
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<i32> {
        self.data
    }
}
