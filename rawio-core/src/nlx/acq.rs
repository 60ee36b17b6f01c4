//! Acquisition system that produced an NCS file

use core::fmt;

/// Recording hardware/software family, inferred from header properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcqType {
    /// Older standard acquisition with rounded sampling frequency
    Pre4,
    /// BML style with fractional frequency
    Bml,
    DigitalLynx,
    DigitalLynxSx,
    Cheetah64,
    RawDataFile,
    /// Cheetah 5.6.0, the only known case of `FileType` without `FileVersion`
    Cheetah560,
    Atlas,
    Unknown,
}

impl AcqType {
    /// Look up a variant by its upper-case name (`DIGITALLYNXSX`, `ATLAS`, ...)
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PRE4" => AcqType::Pre4,
            "BML" => AcqType::Bml,
            "DIGITALLYNX" => AcqType::DigitalLynx,
            "DIGITALLYNXSX" => AcqType::DigitalLynxSx,
            "CHEETAH64" => AcqType::Cheetah64,
            "RAWDATAFILE" => AcqType::RawDataFile,
            "CHEETAH560" => AcqType::Cheetah560,
            "ATLAS" => AcqType::Atlas,
            _ => AcqType::Unknown,
        }
    }

    /// Classify from header properties; `get` returns the raw text of a key
    pub fn classify<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Self {
        if let Some(base_class) = get("NLX_Base_Class_Type") {
            return match base_class {
                "CscAcqEnt" => AcqType::Pre4,
                "BmlAcq" => AcqType::Bml,
                _ => AcqType::Unknown,
            };
        }

        if let Some(subsystem) = get("HardwareSubSystemType") {
            return match subsystem {
                "DigitalLynx" => AcqType::DigitalLynx,
                "DigitalLynxSX" => AcqType::DigitalLynxSx,
                "Cheetah64" => AcqType::Cheetah64,
                "RawDataFile" => AcqType::RawDataFile,
                _ => AcqType::Unknown,
            };
        }

        if get("FileType").is_some() {
            return match get("FileVersion") {
                Some("3.2" | "3.3" | "3.4") => get("AcquisitionSystem")
                    .and_then(|system| system.split_whitespace().nth(1))
                    .map(AcqType::from_name)
                    .unwrap_or(AcqType::Unknown),
                _ => AcqType::Cheetah560,
            };
        }

        AcqType::Unknown
    }
}

impl fmt::Display for AcqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcqType::Pre4 => "PRE4",
            AcqType::Bml => "BML",
            AcqType::DigitalLynx => "DIGITALLYNX",
            AcqType::DigitalLynxSx => "DIGITALLYNXSX",
            AcqType::Cheetah64 => "CHEETAH64",
            AcqType::RawDataFile => "RAWDATAFILE",
            AcqType::Cheetah560 => "CHEETAH560",
            AcqType::Atlas => "ATLAS",
            AcqType::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}
