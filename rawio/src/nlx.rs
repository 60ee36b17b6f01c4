//! Reading Neuralynx headers from disk

use crate::error::{Error, Result};
use rawio_core::{NlxHeader, ParseOptions};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// I/O-backed constructors for [`NlxHeader`]
///
/// The core crate only parses bytes already in memory. These read the
/// 16 KiB header from a stream or a file and report read failures with the
/// source they came from.
pub trait NlxHeaderExt: Sized {
    /// Read and parse the header from the start of a byte stream.
    ///
    /// At most [`NlxHeader::SIZE`] bytes are consumed; the stream is left
    /// positioned at the first record. `name` labels I/O errors.
    fn from_reader<R: Read>(reader: R, name: &Path, options: ParseOptions) -> Result<Self>;

    /// Read and parse the text header at the start of any Neuralynx file
    fn from_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self>;
}

impl NlxHeaderExt for NlxHeader {
    fn from_reader<R: Read>(reader: R, name: &Path, options: ParseOptions) -> Result<Self> {
        let mut bytes = Vec::with_capacity(NlxHeader::SIZE);
        reader
            .take(NlxHeader::SIZE as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| Error::io(name, e))?;
        Ok(NlxHeader::parse(&bytes, options)?)
    }

    fn from_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let header = NlxHeader::from_reader(file, path, options)?;
        tracing::debug!(
            path = %path.display(),
            application = header.application_name(),
            version = %header.application_version(),
            "parsed Neuralynx header"
        );
        Ok(header)
    }
}

/// Read the header of a Neuralynx file with default options
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<NlxHeader> {
    NlxHeader::from_file(path, ParseOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_header_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = b"######## Neuralynx Data File Header\r\n\
            -CheetahRev 5.6.3\r\n\
            ## Time Opened (m/d/y): 11/29/2013  (h:m:s.ms) 17:5:16.793\r\n\
            ## Time Closed (m/d/y): 11/29/2013  (h:m:s.ms) 18:3:13.603\r\n"
            .to_vec();
        bytes.resize(NlxHeader::SIZE, 0);
        file.write_all(&bytes).unwrap();

        let header = read_header(file.path()).unwrap();
        assert_eq!(header.application_name(), "Cheetah");
        assert!(header.recording_closed().is_some());
    }

    #[test]
    fn test_from_reader_stops_after_header() {
        let mut bytes = b"######## Neuralynx Data File Header\r\n\
            -CheetahRev 5.7.4\r\n\
            -TimeCreated 2017/02/16 17:56:04\r\n\
            -TimeClosed 2017/02/16 18:01:18\r\n\
            -SamplingFrequency 32000\r\n"
            .to_vec();
        bytes.resize(NlxHeader::SIZE, 0);
        bytes.extend_from_slice(&[0xFF; 64]);

        let mut reader = &bytes[..];
        let header =
            NlxHeader::from_reader(&mut reader, Path::new("stream"), ParseOptions::default())
                .unwrap();
        assert_eq!(header.sampling_rate(), Some(32000.0));
        assert_eq!(reader.len(), 64);
    }

    #[test]
    fn test_from_reader_reports_format_errors() {
        let err = NlxHeader::from_reader(&b"no signature"[..], Path::new("x"), ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Format(rawio_core::RawIoError::MissingSignature)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_header("/nonexistent/file.ncs").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
