//! Sample types that can appear in raw signal data

use crate::header::SampleType;

/// Integer sample type stored by a reader
///
/// Chunks are widened to `i32` so readers with different storage types
/// share one chunk representation.
pub trait RawSample: Copy + PartialEq + Send + Sync {
    /// Header representation of this type
    fn sample_type() -> SampleType;

    fn to_i32(self) -> i32;

    /// Size in bytes of one sample
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }
}

impl RawSample for i16 {
    fn sample_type() -> SampleType {
        SampleType::I16
    }

    fn to_i32(self) -> i32 {
        i32::from(self)
    }
}

impl RawSample for u16 {
    fn sample_type() -> SampleType {
        SampleType::U16
    }

    fn to_i32(self) -> i32 {
        i32::from(self)
    }
}

impl RawSample for i32 {
    fn sample_type() -> SampleType {
        SampleType::I32
    }

    fn to_i32(self) -> i32 {
        self
    }
}
