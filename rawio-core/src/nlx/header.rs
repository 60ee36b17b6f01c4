//! Neuralynx 16 KiB text header
//!
//! Every Neuralynx file (`.ncs`, `.nev`, `.nse`, `.ntt`, `.nvt`) starts with a
//! NUL-padded Latin-1 text header. [`NlxHeader::parse`] extracts the
//! recognized `-Key value` properties, converts the per-channel ones into
//! typed lists, resolves the writing application and its version, and reads
//! the recording open/close timestamps using the wording that application
//! uses.

use super::acq::AcqType;
use super::datetime::{Boundary, HeaderStyle};
use super::properties::Properties;
use super::version::AppVersion;
use crate::format::constants::{NLX_HEADER_SIZE, NLX_SIGNATURE};
use crate::{RawIoError, Result};
use chrono::NaiveDateTime;
use core::fmt;

/// Options controlling how much of the header is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Only read properties: skip the signature check and the timestamps
    pub props_only: bool,
}

impl ParseOptions {
    /// Skip the signature check and timestamp parsing
    pub fn props_only() -> Self {
        Self { props_only: true }
    }
}

/// Channel id as written in `-ADChannel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelId {
    Id(u32),
    /// Header carries no `-ADChannel` property
    Unknown,
}

impl ChannelId {
    pub fn id(&self) -> Option<u32> {
        match self {
            ChannelId::Id(id) => Some(*id),
            ChannelId::Unknown => None,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Id(id) => write!(f, "{id}"),
            ChannelId::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parsed Neuralynx text header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NlxHeader {
    properties: Properties,
    channel_ids: Vec<ChannelId>,
    channel_names: Vec<String>,
    sampling_rate: Option<f64>,
    bit_to_microvolt: Option<Vec<f64>>,
    input_ranges: Option<Vec<i32>>,
    input_inverted: Option<bool>,
    waveform_length: Option<i64>,
    application_name: String,
    application_version: AppVersion,
    recording_opened: Option<NaiveDateTime>,
    recording_closed: Option<NaiveDateTime>,
}

impl NlxHeader {
    /// Size of the text header in bytes
    pub const SIZE: usize = NLX_HEADER_SIZE;

    /// Parse a header from its raw bytes.
    ///
    /// Only the first [`NlxHeader::SIZE`] bytes are read, so the whole file
    /// or just its start may be passed. Leading and trailing NULs are
    /// stripped and the rest is decoded as Latin-1.
    ///
    /// Unless `options.props_only` is set, the text must start with the
    /// `########` signature and the open (and, where the application writes
    /// one, close) timestamp must be present.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` when the signature is absent
    /// - `InvalidProperty` when a typed property does not convert
    /// - `ChannelCountMismatch` when per-channel lists disagree in length
    /// - `ConflictingApplication` when `CheetahRev` and `ApplicationName` are both set
    /// - `MissingDateTime` when the application's date line is not found
    pub fn parse(bytes: &[u8], options: ParseOptions) -> Result<Self> {
        let bytes = &bytes[..bytes.len().min(Self::SIZE)];
        let text = decode_latin1(trim_nul(bytes));

        if !options.props_only && !text.starts_with(NLX_SIGNATURE) {
            return Err(RawIoError::MissingSignature);
        }

        let properties = Properties::scan(&text);

        let sampling_rate = properties
            .get("SamplingFrequency")
            .map(|v| parse_number::<f64>("SamplingFrequency", v))
            .transpose()?;
        let input_inverted = properties
            .get("InputInverted")
            .map(|v| parse_bool("InputInverted", v))
            .transpose()?;
        let waveform_length = properties
            .get("WaveformLength")
            .map(|v| parse_number::<i64>("WaveformLength", v))
            .transpose()?;

        let (channel_ids, id_entries) = channel_ids(&properties)?;
        let channel_names = channel_names(&properties, channel_ids.len())?;
        let (application_name, application_version) = application(&properties)?;
        let bit_to_microvolt = bit_to_microvolt(&properties, channel_ids.len())?;
        let input_ranges = input_ranges(&properties, id_entries)?;

        let mut header = Self {
            properties,
            channel_ids,
            channel_names,
            sampling_rate,
            bit_to_microvolt,
            input_ranges,
            input_inverted,
            waveform_length,
            application_name,
            application_version,
            recording_opened: None,
            recording_closed: None,
        };

        if !options.props_only {
            header.read_time_date(&text)?;
        }

        Ok(header)
    }

    fn read_time_date(&mut self, text: &str) -> Result<()> {
        let style = self.header_style();
        let missing = |which: Boundary| {
            // only Cheetah is matched by version, the others report "2"
            let (application, version) = match self.application_name.as_str() {
                "Cheetah" => (
                    self.application_name.clone(),
                    self.application_version.to_string(),
                ),
                "BML" | "Neuraview" | "Pegasus" => {
                    (self.application_name.clone(), "2".to_string())
                }
                _ => ("Unknown".to_string(), "NA".to_string()),
            };
            RawIoError::MissingDateTime {
                which: which.as_str(),
                application,
                version,
            }
        };

        self.recording_opened = style
            .read(text, Boundary::Opened)
            .ok_or_else(|| missing(Boundary::Opened))?;

        if style.pattern(Boundary::Closed).is_some() {
            self.recording_closed = style
                .read(text, Boundary::Closed)
                .ok_or_else(|| missing(Boundary::Closed))?;
        }

        Ok(())
    }

    /// Header wording used for the open/close timestamps
    pub fn header_style(&self) -> HeaderStyle {
        HeaderStyle::for_application(&self.application_name, &self.application_version)
    }

    /// Raw text of a recognized property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// All recognized properties in first-seen order
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn channel_ids(&self) -> &[ChannelId] {
        &self.channel_ids
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn sampling_rate(&self) -> Option<f64> {
        self.sampling_rate
    }

    /// Per-channel conversion factor from ADC units to microvolts
    pub fn bit_to_microvolt(&self) -> Option<&[f64]> {
        self.bit_to_microvolt.as_deref()
    }

    pub fn input_ranges(&self) -> Option<&[i32]> {
        self.input_ranges.as_deref()
    }

    pub fn input_inverted(&self) -> Option<bool> {
        self.input_inverted
    }

    pub fn waveform_length(&self) -> Option<i64> {
        self.waveform_length
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn application_version(&self) -> &AppVersion {
        &self.application_version
    }

    pub fn recording_opened(&self) -> Option<NaiveDateTime> {
        self.recording_opened
    }

    pub fn recording_closed(&self) -> Option<NaiveDateTime> {
        self.recording_closed
    }

    /// Acquisition system family
    pub fn type_of_recording(&self) -> AcqType {
        AcqType::classify(|key| self.properties.get(key))
    }
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn parse_number<T: core::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RawIoError::invalid_property(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => Err(RawIoError::invalid_property(key, value)),
    }
}

/// Channel ids plus the number of entries actually present in the header
fn channel_ids(props: &Properties) -> Result<(Vec<ChannelId>, usize)> {
    match props.get("ADChannel") {
        Some(text) => {
            let ids = text
                .split_whitespace()
                .map(|id| parse_number::<u32>("ADChannel", id).map(ChannelId::Id))
                .collect::<Result<Vec<_>>>()?;
            let entries = ids.len();
            Ok((ids, entries))
        }
        None => Ok((vec![ChannelId::Unknown], 0)),
    }
}

fn channel_names(props: &Properties, n_ids: usize) -> Result<Vec<String>> {
    let Some(text) = props.get("AcqEntName") else {
        return Ok(vec!["unknown".to_string(); n_ids]);
    };

    let names: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let names = match names.as_slice() {
        [single] => vec![single.clone(); n_ids],
        _ => names,
    };

    if names.len() != n_ids {
        return Err(RawIoError::ChannelCountMismatch {
            what: "channel names",
            ids: n_ids,
            found: names.len(),
        });
    }
    Ok(names)
}

fn application(props: &Properties) -> Result<(String, AppVersion)> {
    let (name, version) = if let Some(rev) = props.get("CheetahRev") {
        if props.contains("ApplicationName") {
            return Err(RawIoError::ConflictingApplication);
        }
        ("Cheetah".to_string(), rev.to_string())
    } else if let Some(app) = props.get("ApplicationName") {
        split_application_name(app)?
    } else if props.contains("NLX_Base_Class_Type") {
        ("BML".to_string(), "2.0".to_string())
    } else {
        ("Neuraview".to_string(), "2".to_string())
    };

    let version = version.replace(" Development", ".dev0");
    Ok((name, AppVersion::parse(&version)?))
}

/// Split `Cheetah "6.4.1 Development"` into name and quoted version
fn split_application_name(text: &str) -> Result<(String, String)> {
    let invalid = || RawIoError::InvalidApplicationName(text.to_string());

    let open = text.find(" \"").ok_or_else(invalid)?;
    let close = text.rfind('"').ok_or_else(invalid)?;
    if close <= open + 1 {
        return Err(invalid());
    }

    let name = text[..open].rsplit(' ').next().unwrap_or("");
    let version = &text[open + 2..close];
    Ok((name.to_string(), version.to_string()))
}

fn bit_to_microvolt(props: &Properties, n_ids: usize) -> Result<Option<Vec<f64>>> {
    let Some(text) = props.get("ADBitVolts") else {
        return Ok(None);
    };

    let volts = text
        .split_whitespace()
        .map(|v| parse_number::<f64>("ADBitVolts", v))
        .collect::<Result<Vec<_>>>()?;
    let volts = match volts.as_slice() {
        [single] => vec![*single; n_ids],
        _ => volts,
    };

    if volts.len() != n_ids {
        return Err(RawIoError::ChannelCountMismatch {
            what: "bit_to_microVolt conversion factors",
            ids: n_ids,
            found: volts.len(),
        });
    }
    Ok(Some(volts.into_iter().map(|v| v * 1e6).collect()))
}

fn input_ranges(props: &Properties, id_entries: usize) -> Result<Option<Vec<i32>>> {
    let Some(text) = props.get("InputRange") else {
        return Ok(None);
    };

    let ranges = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .map(|word| parse_number::<i32>("InputRange", word))
        .collect::<Result<Vec<_>>>()?;
    let ranges = match ranges.as_slice() {
        [single] => vec![*single; id_entries],
        _ => ranges,
    };

    if ranges.len() != id_entries {
        return Err(RawIoError::ChannelCountMismatch {
            what: "input range values",
            ids: id_entries,
            found: ranges.len(),
        });
    }
    Ok(Some(ranges))
}
