//! [`RawIo`] for Maxwell MaxOne / MaxTwo recordings

use super::{Layout, MaxwellSource, SignalLocation};
use crate::error::{Error, Result, MAXWELL_PLUGIN_HINT};
use rawio_core::format::constants::maxwell::{
    LEGACY_SAMPLING_RATE, LEGACY_STREAM_ID, LSB_TO_MICROVOLT,
};
use rawio_core::validation::{resolve_channel_indexes, resolve_chunk_range};
use rawio_core::{
    RawHeader, RawIo, RawIoError, RawSample, SignalChannel, SignalChunk, SignalStream,
};

/// Per-stream state resolved by `parse_header`
#[derive(Debug, Clone)]
struct MaxwellStream {
    location: SignalLocation,
    /// Signal row of each channel, in header order
    rows: Vec<usize>,
    n_samples: usize,
}

/// Reader for Maxwell HDF5 recordings
#[derive(Debug)]
pub struct MaxwellRawIo<S> {
    source: S,
    source_name: String,
    rec_name: Option<String>,
    streams: Vec<MaxwellStream>,
    t_stop: f64,
    header: Option<RawHeader>,
}

impl<S: MaxwellSource> MaxwellRawIo<S> {
    pub fn new(source: S, source_name: impl Into<String>) -> Self {
        Self {
            source,
            source_name: source_name.into(),
            rec_name: None,
            streams: Vec::new(),
            t_stop: 0.0,
            header: None,
        }
    }

    /// Select the recording to read when wells hold several
    pub fn with_rec_name(mut self, rec_name: impl Into<String>) -> Self {
        self.rec_name = Some(rec_name.into());
        self
    }

    pub fn rec_name(&self) -> Option<&str> {
        self.rec_name.as_deref()
    }

    fn recording_for(&self, well: &str) -> Result<String> {
        let names = self.source.recording_names(well)?;
        match (&self.rec_name, names.as_slice()) {
            (Some(wanted), _) if names.contains(wanted) => Ok(wanted.clone()),
            (Some(wanted), _) => Err(RawIoError::MissingRecording {
                stream: well.to_string(),
                recording: wanted.clone(),
            }
            .into()),
            (None, [single]) => Ok(single.clone()),
            (None, []) => Err(RawIoError::UnsupportedFormat(format!(
                "well {well} holds no recording"
            ))
            .into()),
            (None, _) => Err(RawIoError::AmbiguousRecording(names).into()),
        }
    }

    fn stream_data(&self, stream_index: usize) -> Result<&MaxwellStream> {
        self.streams.get(stream_index).ok_or_else(|| {
            RawIoError::IndexOutOfBounds {
                index: stream_index,
                len: self.streams.len(),
            }
            .into()
        })
    }
}

impl<S: MaxwellSource> RawIo for MaxwellRawIo<S> {
    type Error = Error;

    fn source_name(&self) -> String {
        self.source_name.clone()
    }

    fn parse_header(&mut self) -> Result<()> {
        let version = self.source.version()?;
        let layout = Layout::from_version(&version)?;

        let wells = match layout {
            Layout::Legacy => vec![(LEGACY_STREAM_ID.to_string(), SignalLocation::Legacy)],
            Layout::Wells => self
                .source
                .well_ids()?
                .into_iter()
                .map(|well| {
                    let recording = self.recording_for(&well)?;
                    Ok((well.clone(), SignalLocation::Well { well, recording }))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let mut header = RawHeader::new(vec![1]);
        let mut streams = Vec::with_capacity(wells.len());
        let mut t_stop: f64 = 0.0;

        for (stream_id, location) in wells {
            let settings = self.source.settings(&location)?;
            let sampling_rate = match location {
                SignalLocation::Legacy => LEGACY_SAMPLING_RATE,
                SignalLocation::Well { .. } => settings.sampling.ok_or_else(|| {
                    RawIoError::CorruptedData(format!(
                        "{} has no sampling rate",
                        location.settings_path()
                    ))
                })?,
            };
            let gain = settings.lsb * LSB_TO_MICROVOLT;
            let mapping = self.source.mapping(&location)?;
            let (n_rows, n_samples) = self.source.signal_shape(&location)?;

            let mut rows = Vec::new();
            for (position, (channel, electrode)) in mapping.routed().enumerate() {
                // `sig` holds every amplifier channel; `routed/raw` one row per routed entry
                let row = match location {
                    SignalLocation::Legacy => channel as usize,
                    SignalLocation::Well { .. } => position,
                };
                if row >= n_rows {
                    return Err(RawIoError::IndexOutOfBounds {
                        index: row,
                        len: n_rows,
                    }
                    .into());
                }
                rows.push(row);
                header.signal_channels.push(SignalChannel {
                    name: format!("ch{channel} elec{electrode}"),
                    id: channel.to_string(),
                    sampling_rate,
                    dtype: u16::sample_type(),
                    units: "uV".to_string(),
                    gain,
                    offset: 0.0,
                    stream_id: stream_id.clone(),
                });
            }

            header
                .signal_streams
                .push(SignalStream::new(stream_id.clone(), stream_id));
            t_stop = t_stop.max(n_samples as f64 / sampling_rate);
            streams.push(MaxwellStream {
                location,
                rows,
                n_samples,
            });
        }

        header.annotate(0, "maxwell_version", version.trim());
        header.validate()?;

        tracing::debug!(
            source = %self.source_name,
            version = version.trim(),
            streams = streams.len(),
            channels = header.signal_channels.len(),
            "parsed Maxwell header"
        );
        self.streams = streams;
        self.t_stop = t_stop;
        self.header = Some(header);
        Ok(())
    }

    fn raw_header(&self) -> Option<&RawHeader> {
        self.header.as_ref()
    }

    fn segment_t_start(&self, block: usize, segment: usize) -> Result<f64> {
        self.header()?.check_segment(block, segment)?;
        Ok(0.0)
    }

    fn segment_t_stop(&self, block: usize, segment: usize) -> Result<f64> {
        self.header()?.check_segment(block, segment)?;
        Ok(self.t_stop)
    }

    fn signal_size(&self, block: usize, segment: usize, stream_index: usize) -> Result<usize> {
        self.header()?.check_segment(block, segment)?;
        Ok(self.stream_data(stream_index)?.n_samples)
    }

    fn signal_t_start(&self, block: usize, segment: usize, stream_index: usize) -> Result<f64> {
        self.header()?.check_segment(block, segment)?;
        self.stream_data(stream_index)?;
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
    ) -> Result<SignalChunk> {
        self.header()?.check_segment(block, segment)?;
        let stream = self.stream_data(stream_index)?;
        let range = resolve_chunk_range(i_start, i_stop, stream.n_samples)?;
        let selected = resolve_channel_indexes(channel_indexes, stream.rows.len())?;
        let rows: Vec<usize> = selected.iter().map(|&c| stream.rows[c]).collect();

        let raw = self
            .source
            .read_rows(&stream.location, &rows, range.clone())
            .map_err(|err| match err {
                Error::Format(err) => Error::Format(err),
                other => {
                    tracing::error!(error = %other, "{MAXWELL_PLUGIN_HINT}");
                    Error::compressed(other.to_string())
                }
            })?;

        let n_samples = range.len();
        if raw.len() != n_samples * rows.len() {
            return Err(RawIoError::CorruptedData(format!(
                "read {} values, expected {}",
                raw.len(),
                n_samples * rows.len()
            ))
            .into());
        }

        Ok(SignalChunk::from_channel_major(rows.len(), &raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maxwell::{ChannelMapping, MaxwellSettings, MemorySource};

    fn rows(n_rows: usize, n_samples: usize) -> Vec<Vec<u16>> {
        (0..n_rows)
            .map(|r| (0..n_samples).map(|s| (r * 1000 + s) as u16).collect())
            .collect()
    }

    fn settings(sampling: f64) -> MaxwellSettings {
        MaxwellSettings {
            sampling: Some(sampling),
            lsb: 6.2e-6,
        }
    }

    fn mapping(channels: &[i64]) -> ChannelMapping {
        ChannelMapping {
            channel: channels.to_vec(),
            electrode: channels.iter().map(|c| 2000 + c).collect(),
        }
    }

    #[test]
    fn test_legacy_layout() {
        let source = MemorySource::legacy(1e-6, mapping(&[2, 0, -1]), rows(3, 40));
        let mut io = MaxwellRawIo::new(source, "legacy.raw.h5");
        io.parse_header().unwrap();

        let header = io.header().unwrap();
        assert_eq!(header.signal_streams.len(), 1);
        assert_eq!(header.signal_streams[0].id, "well000");
        assert_eq!(header.signal_channels.len(), 2);
        assert_eq!(header.signal_channels[0].name, "ch2 elec2002");
        assert_eq!(header.signal_channels[0].id, "2");
        assert_eq!(header.signal_channels[0].sampling_rate, 20000.0);
        assert!((header.signal_channels[0].gain - 1.0).abs() < 1e-12);
        assert_eq!(
            header.annotations[0].get("maxwell_version").map(String::as_str),
            Some("20160704")
        );
        assert_eq!(io.segment_t_stop(0, 0).unwrap(), 40.0 / 20000.0);

        let chunk = io.analogsignal_chunk(0, 0, Some(5), Some(7), 0, None).unwrap();
        assert_eq!(chunk.shape(), (2, 2));
        assert_eq!(chunk.data(), &[2005, 5, 2006, 6]);
    }

    #[test]
    fn test_wells_are_streams() {
        let source = MemorySource::new("20190530")
            .with_recording("well000", "rec0000", settings(10000.0), mapping(&[0, 1]), rows(2, 100))
            .with_recording("well001", "rec0000", settings(20000.0), mapping(&[1]), rows(2, 100));
        let mut io = MaxwellRawIo::new(source, "maxtwo.raw.h5");
        io.parse_header().unwrap();

        let header = io.header().unwrap();
        assert_eq!(header.signal_streams.len(), 2);
        assert_eq!(header.channels_of(1).unwrap().len(), 1);
        // t_stop is the longest stream
        assert_eq!(io.segment_t_stop(0, 0).unwrap(), 0.01);
        assert_eq!(io.signal_size(0, 0, 1).unwrap(), 100);

        let chunk = io.analogsignal_chunk(0, 0, Some(1), Some(4), 1, None).unwrap();
        assert_eq!(chunk.channel(0), Some(vec![1, 2, 3]));
        let scaled = io.rescale(&chunk, 1, None).unwrap();
        assert!((scaled[2] - 3.0 * 6.2).abs() < 1e-9);
    }

    #[test]
    fn test_routed_rows_follow_mapping_order() {
        let source = MemorySource::new("20190530").with_recording(
            "well000",
            "rec0000",
            settings(20000.0),
            mapping(&[517, -1, 900]),
            rows(2, 10),
        );
        let mut io = MaxwellRawIo::new(source, "maxtwo.raw.h5");
        io.parse_header().unwrap();

        let header = io.header().unwrap();
        let ids: Vec<_> = header.signal_channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["517", "900"]);
        assert_eq!(header.signal_channels[1].name, "ch900 elec2900");

        let chunk = io.analogsignal_chunk(0, 0, Some(1), Some(3), 0, None).unwrap();
        assert_eq!(chunk.data(), &[1, 1001, 2, 1002]);
        let second = io.analogsignal_chunk(0, 0, None, Some(1), 0, Some(&[1])).unwrap();
        assert_eq!(second.data(), &[1000]);
    }

    #[test]
    fn test_more_routed_channels_than_rows() {
        let source = MemorySource::new("20190530").with_recording(
            "well000",
            "rec0000",
            settings(20000.0),
            mapping(&[3, 4, 5]),
            rows(2, 10),
        );
        let mut io = MaxwellRawIo::new(source, "f.h5");
        assert!(matches!(
            io.parse_header(),
            Err(Error::Format(RawIoError::IndexOutOfBounds { index: 2, len: 2 }))
        ));
    }

    #[test]
    fn test_several_recordings_need_rec_name() {
        let source = MemorySource::new("20190530")
            .with_recording("well000", "rec0000", settings(20000.0), mapping(&[0]), rows(1, 10))
            .with_recording("well000", "rec0001", settings(20000.0), mapping(&[0]), rows(1, 20));

        let mut io = MaxwellRawIo::new(source.clone(), "f.h5");
        assert!(matches!(
            io.parse_header(),
            Err(Error::Format(RawIoError::AmbiguousRecording(names))) if names.len() == 2
        ));

        let mut io = MaxwellRawIo::new(source.clone(), "f.h5").with_rec_name("rec0001");
        io.parse_header().unwrap();
        assert_eq!(io.signal_size(0, 0, 0).unwrap(), 20);

        let mut io = MaxwellRawIo::new(source, "f.h5").with_rec_name("rec0009");
        assert!(matches!(
            io.parse_header(),
            Err(Error::Format(RawIoError::MissingRecording { .. }))
        ));
    }

    #[test]
    fn test_read_failure_carries_plugin_hint() {
        let source = MemorySource::legacy(1e-6, mapping(&[0]), rows(1, 10))
            .with_read_failure("can't open directory /usr/local/hdf5/lib/plugin");
        let mut io = MaxwellRawIo::new(source, "compressed.raw.h5");
        io.parse_header().unwrap();

        let err = io.analogsignal_chunk(0, 0, None, None, 0, None).unwrap_err();
        assert!(matches!(err, Error::CompressedData { .. }));
        assert!(err.to_string().contains("HDF5_PLUGIN_PATH"));
    }

    #[test]
    fn test_out_of_range_requests() {
        let source = MemorySource::legacy(1e-6, mapping(&[0]), rows(1, 10));
        let mut io = MaxwellRawIo::new(source, "f.h5");
        assert!(matches!(
            io.signal_size(0, 0, 0),
            Err(Error::Format(RawIoError::HeaderNotParsed))
        ));
        io.parse_header().unwrap();
        assert!(io.analogsignal_chunk(0, 0, None, Some(11), 0, None).is_err());
        assert!(io.analogsignal_chunk(0, 0, None, None, 0, Some(&[1])).is_err());
        assert!(io.analogsignal_chunk(0, 1, None, None, 0, None).is_err());
        assert!(io.signal_size(0, 0, 1).is_err());
    }

    #[test]
    fn test_mapping_beyond_signal_rows() {
        let source = MemorySource::legacy(1e-6, mapping(&[5]), rows(2, 10));
        let mut io = MaxwellRawIo::new(source, "f.h5");
        assert!(matches!(
            io.parse_header(),
            Err(Error::Format(RawIoError::IndexOutOfBounds { index: 5, len: 2 }))
        ));
    }
}
