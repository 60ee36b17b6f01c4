//! [`RawIo`] over a set of `.ncs` channel files
//!
//! Every file holds one channel. Files sharing a sampling rate form one
//! stream, and each contiguous section of the recording is one segment of
//! a single block.

use super::file::NcsFile;
use super::sections::{NcsSection, NcsSections, SectionConfig};
use crate::error::{Error, Result};
use rawio_core::validation::{resolve_channel_indexes, resolve_chunk_range};
use rawio_core::{
    RawHeader, RawIo, RawIoError, RawSample, SignalChannel, SignalChunk, SignalStream,
};
use rayon::prelude::*;
use std::path::PathBuf;

/// Files of one stream with the sections of each file
///
/// All files share one layout (sample counts and start times), but record
/// boundaries are per file.
#[derive(Debug)]
struct NcsStream {
    files: Vec<NcsFile>,
    sections: Vec<NcsSections>,
}

impl NcsStream {
    /// Layout shared by every file of the stream
    fn layout(&self) -> &NcsSections {
        &self.sections[0]
    }
}

/// Reader for Neuralynx continuously sampled channels
#[derive(Debug)]
pub struct NcsRawIo {
    paths: Vec<PathBuf>,
    config: SectionConfig,
    streams: Vec<NcsStream>,
    header: Option<RawHeader>,
}

impl NcsRawIo {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            config: SectionConfig::default(),
            streams: Vec::new(),
            header: None,
        }
    }

    /// Set the section detection configuration used by `parse_header`
    pub fn with_config(mut self, config: SectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Every `.ncs` file directly inside `dir`, sorted by name
    pub fn from_dir<P: AsRef<std::path::Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            let is_ncs = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ncs"));
            if is_ncs {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self::new(paths))
    }

    fn stream_data(&self, stream_index: usize) -> Result<&NcsStream> {
        self.streams.get(stream_index).ok_or_else(|| {
            RawIoError::IndexOutOfBounds {
                index: stream_index,
                len: self.streams.len(),
            }
            .into()
        })
    }

    fn section(&self, block: usize, segment: usize, stream_index: usize) -> Result<&NcsSection> {
        self.header()?.check_segment(block, segment)?;
        let stream = self.stream_data(stream_index)?;
        stream.layout().get(segment).ok_or_else(|| {
            RawIoError::IndexOutOfBounds {
                index: segment,
                len: stream.layout().len(),
            }
            .into()
        })
    }
}

impl RawIo for NcsRawIo {
    type Error = Error;

    fn source_name(&self) -> String {
        match self.paths.as_slice() {
            [single] => single.display().to_string(),
            paths => format!("{} ncs files", paths.len()),
        }
    }

    fn parse_header(&mut self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(RawIoError::UnsupportedFormat("no .ncs files given".to_string()).into());
        }

        let files = self
            .paths
            .par_iter()
            .map(NcsFile::open)
            .collect::<Result<Vec<_>>>()?;

        // group by sampling rate, keeping first-seen order
        let mut streams: Vec<(f64, Vec<NcsFile>)> = Vec::new();
        for file in files {
            let rate = file.sampling_rate()?;
            match streams.iter_mut().find(|(r, _)| *r == rate) {
                Some((_, group)) => group.push(file),
                None => streams.push((rate, vec![file])),
            }
        }

        let mut built = Vec::with_capacity(streams.len());
        for (_, files) in streams {
            let sections = files
                .iter()
                .map(|file| file.sections(&self.config))
                .collect::<Result<Vec<_>>>()?;
            for (file, file_sections) in files.iter().zip(&sections).skip(1) {
                if !file_sections.same_layout(&sections[0]) {
                    return Err(RawIoError::CorruptedData(format!(
                        "{} has different gaps than {}",
                        file.path().display(),
                        files[0].path().display()
                    ))
                    .into());
                }
            }
            built.push(NcsStream { files, sections });
        }

        let n_segments = built[0].layout().len();
        if let Some(other) = built.iter().find(|s| s.layout().len() != n_segments) {
            return Err(RawIoError::CorruptedData(format!(
                "streams disagree on segment count ({} and {})",
                n_segments,
                other.layout().len()
            ))
            .into());
        }

        let mut header = RawHeader::new(vec![n_segments]);
        for (index, stream) in built.iter().enumerate() {
            let stream_id = index.to_string();
            header.signal_streams.push(SignalStream::new(
                format!("stream{index} {}Hz", stream.layout().sampling_rate),
                stream_id.clone(),
            ));
            for file in &stream.files {
                let nlx = file.header();
                let name = nlx
                    .channel_names()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                let id = nlx
                    .channel_ids()
                    .first()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                header.signal_channels.push(SignalChannel {
                    name,
                    id,
                    sampling_rate: stream.layout().sampling_rate,
                    dtype: i16::sample_type(),
                    units: "uV".to_string(),
                    gain: file.microvolts_per_bit(),
                    offset: 0.0,
                    stream_id: stream_id.clone(),
                });
            }
        }

        let first = built[0].files[0].header();
        header.annotate(0, "application_name", first.application_name());
        header.annotate(0, "application_version", first.application_version().to_string());
        header.annotate(0, "acquisition_type", first.type_of_recording().to_string());
        if let Some(opened) = first.recording_opened() {
            header.annotate(0, "recording_opened", opened.to_string());
        }
        header.validate()?;

        tracing::debug!(
            streams = built.len(),
            segments = n_segments,
            channels = header.signal_channels.len(),
            "parsed NCS header"
        );
        self.streams = built;
        self.header = Some(header);
        Ok(())
    }

    fn raw_header(&self) -> Option<&RawHeader> {
        self.header.as_ref()
    }

    fn segment_t_start(&self, block: usize, segment: usize) -> Result<f64> {
        self.header()?.check_segment(block, segment)?;
        Ok(self
            .streams
            .iter()
            .filter_map(|s| s.layout().get(segment))
            .map(|s| s.t_start())
            .fold(f64::INFINITY, f64::min))
    }

    fn segment_t_stop(&self, block: usize, segment: usize) -> Result<f64> {
        self.header()?.check_segment(block, segment)?;
        Ok(self
            .streams
            .iter()
            .filter_map(|s| s.layout().get(segment))
            .map(|s| s.t_stop())
            .fold(f64::NEG_INFINITY, f64::max))
    }

    fn signal_size(&self, block: usize, segment: usize, stream_index: usize) -> Result<usize> {
        Ok(self.section(block, segment, stream_index)?.n_samples)
    }

    fn signal_t_start(&self, block: usize, segment: usize, stream_index: usize) -> Result<f64> {
        Ok(self.section(block, segment, stream_index)?.t_start())
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
        let section = *self.section(block, segment, stream_index)?;
        let stream = self.stream_data(stream_index)?;
        let range = resolve_chunk_range(i_start, i_stop, section.n_samples)?;
        let channels = resolve_channel_indexes(channel_indexes, stream.files.len())?;

        let columns = channels
            .iter()
            .map(|&c| {
                let file = &stream.files[c];
                let start_record = stream.sections[c]
                    .get(segment)
                    .map_or(file.record_count(), |own| own.start_record);
                let base = file.sample_offsets()[start_record];
                file.read_samples(base + range.start..base + range.end)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SignalChunk::from_columns(&columns)?)
    }
}
