//! Format-agnostic access to a raw recording
//!
//! Readers first build a [`RawHeader`] in `parse_header`, then serve signal
//! chunks addressed by block, segment and stream index.

use crate::header::{RawHeader, SignalChunk};
use crate::validation::resolve_channel_indexes;
use crate::RawIoError;

/// Reader for one recording
///
/// A recording is organized as blocks, each holding segments, each holding
/// one signal per stream. A stream groups channels that share a sampling
/// rate and sample clock, so one chunk read covers all of them.
///
/// Implementations do all file inspection in [`parse_header`]. Every other
/// method answers from the parsed state and fails with `HeaderNotParsed`
/// before it has run. Indexes outside the header fail with
/// `IndexOutOfBounds` rather than panicking.
///
/// [`parse_header`]: RawIo::parse_header
pub trait RawIo {
    /// Reader error; header-level failures convert into it
    type Error: From<RawIoError>;

    /// File or directory the reader was opened on
    fn source_name(&self) -> String;

    /// Read the file layout and build the header
    ///
    /// Calling it again re-reads the source and replaces the header.
    fn parse_header(&mut self) -> Result<(), Self::Error>;

    /// Parsed header, if `parse_header` has succeeded
    fn raw_header(&self) -> Option<&RawHeader>;

    /// Parsed header, or `HeaderNotParsed`
    fn header(&self) -> Result<&RawHeader, Self::Error> {
        self.raw_header()
            .ok_or_else(|| RawIoError::HeaderNotParsed.into())
    }

    /// Segment start time in seconds
    fn segment_t_start(&self, block: usize, segment: usize) -> Result<f64, Self::Error>;

    /// Segment stop time in seconds
    fn segment_t_stop(&self, block: usize, segment: usize) -> Result<f64, Self::Error>;

    /// Number of samples of a stream in a segment
    fn signal_size(&self, block: usize, segment: usize, stream_index: usize)
        -> Result<usize, Self::Error>;

    /// Time of the first sample of a stream in a segment, in seconds
    fn signal_t_start(
        &self,
        block: usize,
        segment: usize,
        stream_index: usize,
    ) -> Result<f64, Self::Error>;

    /// Raw samples `i_start..i_stop` for the selected channels of a stream
    ///
    /// Missing bounds default to the whole segment and `None` channel
    /// indexes select every channel of the stream.
    fn analogsignal_chunk(
        &self,
        block: usize,
        segment: usize,
        i_start: Option<usize>,
        i_stop: Option<usize>,
        stream_index: usize,
        channel_indexes: Option<&[usize]>,
    ) -> Result<SignalChunk, Self::Error>;

    /// Convert a chunk to physical units with each channel's gain and offset
    fn rescale(
        &self,
        chunk: &SignalChunk,
        stream_index: usize,
        channel_indexes: Option<&[usize]>,
    ) -> Result<Vec<f64>, Self::Error> {
        let channels = self.header()?.channels_of(stream_index)?;
        let selected = resolve_channel_indexes(channel_indexes, channels.len())?;
        if selected.len() != chunk.n_channels() {
            return Err(RawIoError::CorruptedData(format!(
                "chunk has {} channels but {} were selected",
                chunk.n_channels(),
                selected.len()
            ))
            .into());
        }

        let scales: Vec<(f64, f64)> = selected
            .iter()
            .map(|&i| (channels[i].gain, channels[i].offset))
            .collect();

        Ok(chunk
            .data()
            .iter()
            .enumerate()
            .map(|(k, &raw)| {
                let (gain, offset) = scales[k % scales.len()];
                f64::from(raw) * gain + offset
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{SampleType, SignalChannel, SignalStream};
    use crate::validation::resolve_chunk_range;

    /// One stream of two channels holding `0..len` and its negation
    struct Ramp {
        header: Option<RawHeader>,
        len: usize,
    }

    impl RawIo for Ramp {
        type Error = RawIoError;

        fn source_name(&self) -> String {
            "ramp".to_string()
        }

        fn parse_header(&mut self) -> Result<(), RawIoError> {
            let mut header = RawHeader::new(vec![1]);
            header.signal_streams = vec![SignalStream::new("s", "0")];
            header.signal_channels = (0..2)
                .map(|i| SignalChannel {
                    name: format!("ch{i}"),
                    id: i.to_string(),
                    sampling_rate: 10.0,
                    dtype: SampleType::I32,
                    units: "uV".to_string(),
                    gain: 0.5 * (i + 1) as f64,
                    offset: i as f64,
                    stream_id: "0".to_string(),
                })
                .collect();
            self.header = Some(header);
            Ok(())
        }

        fn raw_header(&self) -> Option<&RawHeader> {
            self.header.as_ref()
        }

        fn segment_t_start(&self, _: usize, _: usize) -> Result<f64, RawIoError> {
            Ok(0.0)
        }

        fn segment_t_stop(&self, _: usize, _: usize) -> Result<f64, RawIoError> {
            Ok(self.len as f64 / 10.0)
        }

        fn signal_size(&self, _: usize, _: usize, _: usize) -> Result<usize, RawIoError> {
            Ok(self.len)
        }

        fn signal_t_start(&self, _: usize, _: usize, _: usize) -> Result<f64, RawIoError> {
            Ok(0.0)
        }

        fn analogsignal_chunk(
            &self,
            block: usize,
            segment: usize,
            i_start: Option<usize>,
            i_stop: Option<usize>,
            stream_index: usize,
            channel_indexes: Option<&[usize]>,
        ) -> Result<SignalChunk, RawIoError> {
            let header = self.header()?;
            header.check_segment(block, segment)?;
            let n = header.channels_of(stream_index)?.len();
            let channels = resolve_channel_indexes(channel_indexes, n)?;
            let range = resolve_chunk_range(i_start, i_stop, self.len)?;
            let mut data = Vec::new();
            for i in range {
                for &c in &channels {
                    let v = i as i32;
                    data.push(if c == 0 { v } else { -v });
                }
            }
            SignalChunk::new(channels.len(), data)
        }
    }

    #[test]
    fn test_header_not_parsed() {
        let ramp = Ramp { header: None, len: 4 };
        assert_eq!(ramp.header().err(), Some(RawIoError::HeaderNotParsed));
        assert_eq!(
            ramp.analogsignal_chunk(0, 0, None, None, 0, None).err(),
            Some(RawIoError::HeaderNotParsed)
        );
    }

    #[test]
    fn test_rescale_applies_gain_and_offset() {
        let mut ramp = Ramp { header: None, len: 4 };
        ramp.parse_header().unwrap();

        let chunk = ramp.analogsignal_chunk(0, 0, Some(1), Some(3), 0, None).unwrap();
        assert_eq!(chunk.data(), &[1, -1, 2, -2]);
        let scaled = ramp.rescale(&chunk, 0, None).unwrap();
        assert_eq!(scaled, vec![0.5, 0.0, 1.0, -1.0]);

        let only_second = ramp.analogsignal_chunk(0, 0, None, Some(2), 0, Some(&[1])).unwrap();
        let scaled = ramp.rescale(&only_second, 0, Some(&[1])).unwrap();
        assert_eq!(scaled, vec![1.0, 0.0]);
    }

    #[test]
    fn test_rescale_rejects_mismatched_selection() {
        let mut ramp = Ramp { header: None, len: 4 };
        ramp.parse_header().unwrap();
        let chunk = ramp.analogsignal_chunk(0, 0, None, None, 0, Some(&[0])).unwrap();
        assert!(matches!(
            ramp.rescale(&chunk, 0, None),
            Err(RawIoError::CorruptedData(_))
        ));
    }
}
