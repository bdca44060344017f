// src/data/datetime.rs

//! Functions to transform date and time values found in artifacts into
//! chrono [`DateTime`] instances.
//!
//! Many log formats record only part of a date. A syslog line like
//! `Jan  2 03:04:05 host cron[1]: hello` has no year. The year must be
//! derived from elsewhere, see [`YearLessLogHelper`].
//!
//! [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
//! [`YearLessLogHelper`]: crate::readers::yearless::YearLessLogHelper

#[doc(hidden)]
pub use std::time::SystemTime;

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    Datelike, // adds method `.year()` onto `DateTime`
    FixedOffset,
    Local,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    Offset, // adds method `.fix()` onto `Utc`
    TimeZone,
    Utc,
};
use ::phf::phf_map;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A _Year_ in a date
pub type Year = i32;

/// A _Month_ in a date, `1` is January.
pub type Month = u32;

/// A chrono [`DateTime`] type used in _axlib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// Lower-case month names and abbreviations to a [`Month`] number.
static MONTHS: phf::Map<&'static str, Month> = phf_map! {
    "jan" => 1,
    "feb" => 2,
    "mar" => 3,
    "apr" => 4,
    "may" => 5,
    "jun" => 6,
    "jul" => 7,
    "aug" => 8,
    "sep" => 9,
    "sept" => 9,
    "oct" => 10,
    "nov" => 11,
    "dec" => 12,
    "january" => 1,
    "february" => 2,
    "march" => 3,
    "april" => 4,
    "june" => 6,
    "july" => 7,
    "august" => 8,
    "september" => 9,
    "october" => 10,
    "november" => 11,
    "december" => 12,
};

/// Map a month name or abbreviation (any case) to a [`Month`] number.
pub fn month_from_str(month: &str) -> Option<Month> {
    // longest month name is "september"
    if month.len() > 9 {
        return None;
    }
    let lower: String = month.to_ascii_lowercase();

    MONTHS.get(lower.as_str()).copied()
}

/// The UTC timezone offset as a `FixedOffset`.
pub fn fixedoffset_utc() -> FixedOffset {
    // offset zero is always in range
    FixedOffset::east_opt(0).unwrap_or_else(|| Utc.fix())
}

/// Convert separate date and time values into a `DateTimeL`.
///
/// `microsecond` is the fraction of a second. Returns `None` for
/// impossible values, e.g. February 30 or hour 24.
#[allow(clippy::too_many_arguments)]
pub fn datetime_from_elements(
    year: Year,
    month: Month,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    microsecond: u32,
    tz_offset: &FixedOffset,
) -> DateTimeLOpt {
    let date: NaiveDate = NaiveDate::from_ymd_opt(year, month, day)?;
    let time: NaiveTime = NaiveTime::from_hms_micro_opt(hour, minute, second, microsecond)?;
    let naive: NaiveDateTime = NaiveDateTime::new(date, time);

    tz_offset
        .from_local_datetime(&naive)
        .single()
}

/// Convert a fractional seconds string (the digits after the `.`) to
/// microseconds, e.g. `"5"` is 500000, `"123456789"` is 123456.
pub fn fraction_to_microseconds(fraction: &str) -> Option<u32> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = fraction.chars().take(6).collect();
    while digits.len() < 6 {
        digits.push('0');
    }

    digits.parse::<u32>().ok()
}

/// Parse an ISO 8601 / RFC 3339 datetime string, e.g.
/// `"2020-01-01T00:00:00Z"` or `"2019-10-28T14:07:59.123456789+01:00"`.
///
/// A datetime without a timezone is presumed UTC.
pub fn datetime_parse_iso8601(value: &str) -> DateTimeLOpt {
    defñ!("({:?})", value);
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return fixedoffset_utc()
                .from_local_datetime(&naive)
                .single();
        }
    }

    None
}

/// Convert `SystemTime` to `DateTimeL` at the passed timezone offset.
pub fn systemtime_to_datetime(
    fixedoffset: &FixedOffset,
    systemtime: &SystemTime,
) -> DateTimeL {
    let dt_utc: DateTime<Utc> = DateTime::<Utc>::from(*systemtime);

    dt_utc.with_timezone(fixedoffset)
}

/// The year of a `SystemTime`, e.g. a file modification time, in UTC.
pub fn systemtime_to_year(systemtime: &SystemTime) -> Year {
    systemtime_to_datetime(&fixedoffset_utc(), systemtime).year()
}

/// The current year of the local system.
pub fn year_now() -> Year {
    Local::now().year()
}
