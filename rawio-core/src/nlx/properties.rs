//! `-Key value` property lines of a Neuralynx text header

/// Property keys read from the header; anything else is ignored
pub const KNOWN_KEYS: &[&str] = &[
    "AcqEntName",
    "FileType",
    "FileVersion",
    "RecordSize",
    "HardwareSubSystemName",
    "HardwareSubSystemType",
    "SamplingFrequency",
    "ADMaxValue",
    "ADBitVolts",
    "NumADChannels",
    "ADChannel",
    "InputRange",
    "InputInverted",
    "DSPLowCutFilterEnabled",
    "DspLowCutFrequency",
    "DspLowCutNumTaps",
    "DspLowCutFilterType",
    "DSPHighCutFilterEnabled",
    "DspHighCutFrequency",
    "DspHighCutNumTaps",
    "DspHighCutFilterType",
    "DspDelayCompensation",
    "DspFilterDelay_\u{b5}s",
    "DisabledSubChannels",
    "WaveformLength",
    "AlignmentPt",
    "ThreshVal",
    "MinRetriggerSamples",
    "SpikeRetriggerTime",
    "DualThresholding",
    "SessionUUID",
    "FileUUID",
    "CheetahRev",
    "ProbeName",
    "OriginalFileName",
    "TimeCreated",
    "TimeClosed",
    "ApplicationName",
    "AcquisitionSystem",
    "ReferenceChannel",
    "NLX_Base_Class_Type",
];

/// Key/value store ordered like [`KNOWN_KEYS`]
///
/// Entries follow the key table rather than the header text. `-Feature`
/// lines sit between `DualThresholding` and `SessionUUID`, in header order.
/// A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every recognized property line from header text
    pub fn scan(text: &str) -> Self {
        let mut props = Self::new();
        for line in text.split('\n') {
            if let Some((key, value)) = parse_line(line) {
                props.insert(key, value);
            }
        }
        props.entries.sort_by_key(|(key, _)| key_rank(key));
        props
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Position of a key in the table order; `Feature` keys share one slot
fn key_rank(key: &str) -> usize {
    if key.starts_with("Feature ") {
        let session = KNOWN_KEYS
            .iter()
            .position(|k| *k == "SessionUUID")
            .unwrap_or(KNOWN_KEYS.len());
        return 2 * session - 1;
    }
    2 * KNOWN_KEYS
        .iter()
        .position(|k| *k == key)
        .unwrap_or(KNOWN_KEYS.len())
}

/// Split one header line into a recognized key and its value
fn parse_line(line: &str) -> Option<(String, String)> {
    let body = line.trim_start().strip_prefix('-')?;
    let key_len = body.find(char::is_whitespace).unwrap_or(body.len());
    let mut key = body[..key_len].to_string();
    let mut rest = &body[key_len..];

    if key == "Feature" {
        // `-Feature <word> <digits> value...`
        let rest_words = rest.strip_prefix(' ')?;
        let word_len = rest_words
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest_words.len());
        let after_word = rest_words[word_len..].strip_prefix(' ')?;
        let digits_len = after_word
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_word.len());
        if word_len == 0 || digits_len == 0 {
            return None;
        }
        key = format!(
            "Feature {} {}",
            &rest_words[..word_len],
            &after_word[..digits_len]
        );
        rest = &after_word[digits_len..];
    } else if !KNOWN_KEYS.contains(&key.as_str()) {
        return None;
    }

    // the key must be followed by whitespace or the end of the line
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let value = rest.trim_start_matches([' ', '\t']);
    let end = value.find(['\t', '\r', '\n']).unwrap_or(value.len());
    Some((key, value[..end].trim_end_matches(' ').to_string()))
}
