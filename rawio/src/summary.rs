//! Human and JSON summaries of parsed headers

use rawio_core::NlxHeader;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Flattened view of a Neuralynx header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderSummary {
    pub file: String,
    pub application: String,
    pub version: String,
    pub acquisition_type: String,
    pub sampling_rate: Option<f64>,
    pub channel_ids: Vec<String>,
    pub channel_names: Vec<String>,
    pub bit_to_microvolt: Option<Vec<f64>>,
    pub input_ranges: Option<Vec<i32>>,
    pub input_inverted: Option<bool>,
    pub recording_opened: Option<String>,
    pub recording_closed: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl HeaderSummary {
    pub fn new(file: impl Into<String>, header: &NlxHeader) -> Self {
        Self {
            file: file.into(),
            application: header.application_name().to_string(),
            version: header.application_version().to_string(),
            acquisition_type: header.type_of_recording().to_string(),
            sampling_rate: header.sampling_rate(),
            channel_ids: header.channel_ids().iter().map(|id| id.to_string()).collect(),
            channel_names: header.channel_names().to_vec(),
            bit_to_microvolt: header.bit_to_microvolt().map(<[f64]>::to_vec),
            input_ranges: header.input_ranges().map(<[i32]>::to_vec),
            input_inverted: header.input_inverted(),
            recording_opened: header.recording_opened().map(|t| t.to_string()),
            recording_closed: header.recording_closed().map(|t| t.to_string()),
            properties: header
                .properties()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Multi-line report for terminals
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "File: {}", self.file);
        let _ = writeln!(out, "Application: {} {}", self.application, self.version);
        let _ = writeln!(out, "Acquisition: {}", self.acquisition_type);
        if let Some(rate) = self.sampling_rate {
            let _ = writeln!(out, "Sampling rate: {rate} Hz");
        }
        let _ = writeln!(out, "Channels: {}", self.channel_ids.join(" "));
        let _ = writeln!(out, "Names: {}", self.channel_names.join(" "));
        if let Some(btm) = &self.bit_to_microvolt {
            let values: Vec<String> = btm.iter().map(|v| format!("{v:.6}")).collect();
            let _ = writeln!(out, "uV per bit: {}", values.join(" "));
        }
        if let Some(inverted) = self.input_inverted {
            let _ = writeln!(out, "Input inverted: {inverted}");
        }
        if let Some(opened) = &self.recording_opened {
            let _ = writeln!(out, "Opened: {opened}");
        }
        if let Some(closed) = &self.recording_closed {
            let _ = writeln!(out, "Closed: {closed}");
        }
        let _ = writeln!(out, "Properties: {}", self.properties.len());
        for (key, value) in &self.properties {
            let _ = writeln!(out, "  {key} = {value}");
        }
        out
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawio_core::ParseOptions;

    fn header() -> NlxHeader {
        let text = "-CheetahRev 5.7.4\r\n\
            -SamplingFrequency 32000\r\n\
            -ADChannel 3\r\n\
            -AcqEntName CSC4\r\n\
            -InputInverted False\r\n";
        NlxHeader::parse(text.as_bytes(), ParseOptions::props_only()).unwrap()
    }

    #[test]
    fn test_text_report() {
        let text = HeaderSummary::new("CSC4.ncs", &header()).to_text();
        assert!(text.contains("Application: Cheetah 5.7.4"));
        assert!(text.contains("Sampling rate: 32000 Hz"));
        assert!(text.contains("Names: CSC4"));
        assert!(text.contains("  ADChannel = 3"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_report() {
        let json = HeaderSummary::new("CSC4.ncs", &header()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["application"], "Cheetah");
        assert_eq!(value["channel_ids"][0], "3");
        assert_eq!(value["input_inverted"], false);
        assert_eq!(value["recording_opened"], serde_json::Value::Null);
    }
}
