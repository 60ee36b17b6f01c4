//! Parsing of user-supplied sample ranges

use crate::RawIoError;
use core::ops::Range;

/// Parse a range string in the format "start:end" or "start-end"
///
/// Both ends are required, unsigned and decimal; the end is exclusive. An
/// empty range (`"5:5"`) is accepted, a reversed one is not.
///
/// # Errors
///
/// Returns `InvalidRange` for a missing separator, a non-numeric or
/// signed bound, or `start > end`.
pub fn parse_range(range_str: &str) -> Result<Range<usize>, RawIoError> {
    if range_str.is_empty() {
        return Err(RawIoError::InvalidRange);
    }

    let (start_str, end_str) = range_str
        .split_once(':')
        .or_else(|| range_str.split_once('-'))
        .ok_or(RawIoError::InvalidRange)?;

    let start = parse_usize(start_str)?;
    let end = parse_usize(end_str)?;

    if start > end {
        return Err(RawIoError::InvalidRange);
    }

    Ok(start..end)
}

fn parse_usize(s: &str) -> Result<usize, RawIoError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RawIoError::InvalidRange);
    }
    s.parse().map_err(|_| RawIoError::InvalidRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0:10"), Ok(0..10));
        assert_eq!(parse_range("512:1024"), Ok(512..1024));
        assert_eq!(parse_range("0-10"), Ok(0..10));
        assert_eq!(parse_range("7:7"), Ok(7..7));

        assert_eq!(parse_range(""), Err(RawIoError::InvalidRange));
        assert_eq!(parse_range("10:5"), Err(RawIoError::InvalidRange)); // start > end
        assert_eq!(parse_range("abc:def"), Err(RawIoError::InvalidRange));
        assert_eq!(parse_range("10"), Err(RawIoError::InvalidRange)); // no separator
        assert_eq!(parse_range("10:"), Err(RawIoError::InvalidRange));
        assert_eq!(parse_range(":10"), Err(RawIoError::InvalidRange));
        assert_eq!(parse_range("+1:3"), Err(RawIoError::InvalidRange));
    }

    #[test]
    fn test_parse_usize_overflow() {
        assert_eq!(parse_usize("99999999999999999999999"), Err(RawIoError::InvalidRange));
        assert_eq!(parse_usize("123"), Ok(123));
    }
}
