//! Bounds checks for chunk ranges and channel selections

use crate::RawIoError;
use core::ops::Range;

/// Check that `index` addresses an element of a collection of length `len`
pub const fn validate_index(index: usize, len: usize) -> Result<usize, RawIoError> {
    if index >= len {
        return Err(RawIoError::IndexOutOfBounds { index, len });
    }
    Ok(index)
}

/// Resolve optional chunk bounds against a signal of `size` samples
///
/// Missing bounds default to the start and end of the signal. Both bounds
/// must lie within `0..=size` and `i_start <= i_stop`; otherwise the
/// result is `IndexOutOfBounds` (bound past the end) or `InvalidRange`.
pub fn resolve_chunk_range(
    i_start: Option<usize>,
    i_stop: Option<usize>,
    size: usize,
) -> Result<Range<usize>, RawIoError> {
    let start = i_start.unwrap_or(0);
    let stop = i_stop.unwrap_or(size);

    if start > stop {
        return Err(RawIoError::InvalidRange);
    }
    if stop > size {
        return Err(RawIoError::IndexOutOfBounds {
            index: stop,
            len: size,
        });
    }

    Ok(start..stop)
}

/// Resolve an optional channel selection against `n_channels` channels
///
/// `None` selects every channel in order.
pub fn resolve_channel_indexes(
    channel_indexes: Option<&[usize]>,
    n_channels: usize,
) -> Result<Vec<usize>, RawIoError> {
    match channel_indexes {
        None => Ok((0..n_channels).collect()),
        Some(indexes) => indexes
            .iter()
            .map(|&index| validate_index(index, n_channels))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_index() {
        assert_eq!(validate_index(0, 1), Ok(0));
        assert_eq!(
            validate_index(1, 1),
            Err(RawIoError::IndexOutOfBounds { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_resolve_chunk_range() {
        assert_eq!(resolve_chunk_range(None, None, 100), Ok(0..100));
        assert_eq!(resolve_chunk_range(Some(10), None, 100), Ok(10..100));
        assert_eq!(resolve_chunk_range(None, Some(0), 100), Ok(0..0));
        assert_eq!(
            resolve_chunk_range(Some(20), Some(10), 100),
            Err(RawIoError::InvalidRange)
        );
        assert_eq!(
            resolve_chunk_range(None, Some(101), 100),
            Err(RawIoError::IndexOutOfBounds {
                index: 101,
                len: 100
            })
        );
    }

    #[test]
    fn test_resolve_channel_indexes() {
        assert_eq!(resolve_channel_indexes(None, 3), Ok(vec![0, 1, 2]));
        assert_eq!(resolve_channel_indexes(Some(&[2, 0]), 3), Ok(vec![2, 0]));
        assert_eq!(
            resolve_channel_indexes(Some(&[3]), 3),
            Err(RawIoError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }
}
