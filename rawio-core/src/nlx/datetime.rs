//! Recording open/close timestamps embedded in Neuralynx headers
//!
//! The file name and open/close times appear either in `## ...` comment lines
//! at the top of the header or, in later versions, as `-TimeCreated` and
//! `-TimeClosed` properties. The exact wording depends on the application
//! and its version, so each known wording is a [`HeaderStyle`].

use super::version::AppVersion;
use chrono::{NaiveDate, NaiveDateTime};

/// Which of the two header timestamps is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Opened,
    Closed,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::Opened => "open",
            Boundary::Closed => "close",
        }
    }
}

/// Field order of the date token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `m/d/yy`
    MonthDayShortYear,
    /// `m/d/yyyy`
    MonthDayYear,
    /// `yyyy/m/d`
    YearMonthDay,
}

/// Whether the time token carries fractional seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fraction {
    Required,
    Forbidden,
    Optional,
}

/// Literal text around the date and time tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimePattern {
    /// Text immediately before the date token
    pub prefix: &'static str,
    /// Text between the date and time tokens
    pub separator: &'static str,
}

impl DateTimePattern {
    /// Find the first `(date, time)` token pair following this pattern
    pub fn find<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        for (pos, _) in text.match_indices(self.prefix) {
            let rest = &text[pos + self.prefix.len()..];
            let date = take_token(rest);
            if date.is_empty() {
                continue;
            }

            let Some(rest) = rest[date.len()..].strip_prefix(self.separator) else {
                continue;
            };
            let time = take_token(rest);
            if time.is_empty() {
                continue;
            }

            return Some((date, time));
        }
        None
    }
}

fn take_token(text: &str) -> &str {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    &text[..end]
}

/// Known header wordings for the open/close timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderStyle {
    /// BML acquisition: `## Time Opened: (m/d/y): 12/11/15  At Time: 11:37:39.000`
    Bml,
    /// Cheetah up to 5.4.0: `## Time Opened (m/d/y): 1/01/2001  At Time: 0:00:00.000`
    V5_4_0,
    /// Cheetah 1 and 5.x up to 5.6.4: `## Time Opened (m/d/y): 11/29/2013  (h:m:s.ms) 17:5:16.793`
    Bv5_6_4,
    /// Neuraview 2: `## Date Opened: (mm/dd/yyy): 12/14/2015 At Time: 15:58:32`
    Neuraview2,
    /// Pegasus and later Cheetah: `-TimeCreated 2019/06/28 17:36:50`
    InProps,
    /// Generic `## Time Opened: (m/d/y): ...  At Time: ...` line
    InHeader,
}

impl HeaderStyle {
    /// Pick the style for an application name and version
    pub fn for_application(name: &str, version: &AppVersion) -> Self {
        match name {
            "Cheetah" => {
                if *version <= AppVersion::new(&[2]) {
                    HeaderStyle::Bv5_6_4
                } else if *version < AppVersion::new(&[5]) {
                    HeaderStyle::InHeader
                } else if *version <= AppVersion::new(&[5, 4, 0]) {
                    HeaderStyle::V5_4_0
                } else if *version == AppVersion::new(&[5, 6, 0]) {
                    HeaderStyle::InHeader
                } else if *version <= AppVersion::new(&[5, 6, 4]) {
                    HeaderStyle::Bv5_6_4
                } else {
                    HeaderStyle::InProps
                }
            }
            "BML" => HeaderStyle::InHeader,
            "Neuraview" => HeaderStyle::Neuraview2,
            _ => HeaderStyle::InProps,
        }
    }

    /// Pattern for the requested timestamp; `None` when the style has no close line
    pub fn pattern(&self, boundary: Boundary) -> Option<DateTimePattern> {
        let pattern = |prefix, separator| Some(DateTimePattern { prefix, separator });
        match (self, boundary) {
            (HeaderStyle::Bml | HeaderStyle::InHeader, Boundary::Opened) => {
                pattern("## Time Opened: (m/d/y): ", "  At Time: ")
            }
            (HeaderStyle::Bml | HeaderStyle::InHeader, Boundary::Closed) => None,
            (HeaderStyle::V5_4_0, Boundary::Opened) => {
                pattern("## Time Opened (m/d/y): ", "  At Time: ")
            }
            (HeaderStyle::V5_4_0, Boundary::Closed) => {
                pattern("## Time Closed (m/d/y): ", "  At Time: ")
            }
            (HeaderStyle::Bv5_6_4, Boundary::Opened) => {
                pattern("## Time Opened (m/d/y): ", "  (h:m:s.ms) ")
            }
            (HeaderStyle::Bv5_6_4, Boundary::Closed) => {
                pattern("## Time Closed (m/d/y): ", "  (h:m:s.ms) ")
            }
            (HeaderStyle::Neuraview2, Boundary::Opened) => {
                pattern("## Date Opened: (mm/dd/yyy): ", " At Time: ")
            }
            (HeaderStyle::Neuraview2, Boundary::Closed) => {
                pattern("## Date Closed: (mm/dd/yyy): ", " At Time: ")
            }
            (HeaderStyle::InProps, Boundary::Opened) => pattern("-TimeCreated ", " "),
            (HeaderStyle::InProps, Boundary::Closed) => pattern("-TimeClosed ", " "),
        }
    }

    /// Field order of the date token
    pub fn date_order(&self) -> DateOrder {
        match self {
            HeaderStyle::Bml | HeaderStyle::InHeader => DateOrder::MonthDayShortYear,
            HeaderStyle::V5_4_0 | HeaderStyle::Bv5_6_4 | HeaderStyle::Neuraview2 => {
                DateOrder::MonthDayYear
            }
            HeaderStyle::InProps => DateOrder::YearMonthDay,
        }
    }

    /// Fractional-second rule for the requested timestamp
    pub fn fraction(&self, boundary: Boundary) -> Fraction {
        match (self, boundary) {
            (HeaderStyle::Neuraview2, _) => Fraction::Forbidden,
            (HeaderStyle::InProps, Boundary::Opened) => Fraction::Optional,
            (HeaderStyle::InProps, Boundary::Closed) => Fraction::Forbidden,
            _ => Fraction::Required,
        }
    }

    /// Locate and decode one timestamp
    ///
    /// The outer `None` means the pattern is absent (or the style has no such
    /// line); the inner `None` means the line exists but does not parse.
    pub fn read(&self, text: &str, boundary: Boundary) -> Option<Option<NaiveDateTime>> {
        let pattern = self.pattern(boundary)?;
        let (date, time) = pattern.find(text)?;
        Some(parse_date_time(
            date,
            time,
            self.date_order(),
            self.fraction(boundary),
        ))
    }
}

/// Parse a date token and a time token into a timestamp
pub fn parse_date_time(
    date: &str,
    time: &str,
    order: DateOrder,
    fraction: Fraction,
) -> Option<NaiveDateTime> {
    let mut parts = date.split('/');
    let (a, b, c) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let (year, month, day) = match order {
        DateOrder::MonthDayShortYear => (short_year(c)?, field(a, 1, 2)?, field(b, 1, 2)?),
        DateOrder::MonthDayYear => (field(c, 4, 4)? as i32, field(a, 1, 2)?, field(b, 1, 2)?),
        DateOrder::YearMonthDay => (field(a, 4, 4)? as i32, field(b, 1, 2)?, field(c, 1, 2)?),
    };

    let (clock, micros) = match (time.split_once('.'), fraction) {
        (Some(_), Fraction::Forbidden) | (None, Fraction::Required) => return None,
        (Some((clock, frac)), _) => (clock, fraction_micros(frac)?),
        (None, _) => (time, 0),
    };

    let mut parts = clock.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_micro_opt(
        field(h, 1, 2)?,
        field(m, 1, 2)?,
        field(s, 1, 2)?,
        micros,
    )
}

fn field(text: &str, min_digits: usize, max_digits: usize) -> Option<u32> {
    if text.len() < min_digits || text.len() > max_digits {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn short_year(text: &str) -> Option<i32> {
    let yy = field(text, 1, 2)? as i32;
    Some(if yy >= 69 { 1900 + yy } else { 2000 + yy })
}

fn fraction_micros(text: &str) -> Option<u32> {
    let digits = field(text, 1, 6)?;
    Some(digits * 10u32.pow((6 - text.len()) as u32))
}
