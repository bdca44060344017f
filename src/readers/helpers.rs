// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_, and the value-extraction
//! helpers plugins use to pull typed values out of a [`ParseRecord`] or a
//! JSON object.
//!
//! [`ParseRecord`]: crate::readers::grammar::ParseRecord

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};
use ::thiserror::Error;

use crate::common::{
    FPath,
    FileSz,
};
use crate::data::datetime::{
    datetime_from_elements,
    datetime_parse_iso8601,
    fraction_to_microseconds,
    month_from_str,
    DateTimeL,
    FixedOffset,
    Month,
    Year,
};
use crate::readers::grammar::ParseRecord;
use crate::readers::yearless::YearLessError;

/// A JSON object, one line of a JSON-L file.
pub type JsonObject = ::serde_json::Map<String, ::serde_json::Value>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// paths
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    let mut riter = path.rsplit(std::path::MAIN_SEPARATOR);

    FPath::from(riter.next().unwrap_or(""))
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &std::path::Path {
    std::path::Path::new(path)
}

/// Return the size of the file.
pub fn path_filesz(path: &std::path::Path) -> Option<FileSz> {
    defn!("({:?})", path);
    let metadata = match std::fs::metadata(path) {
        Ok(val) => val,
        Err(_err) => {
            defx!("error {}, return None", _err);
            return None;
        }
    };
    let len: FileSz = metadata.len();
    defx!("return {}", len);

    Some(len)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// record values
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A record could not be turned into an event. The record is skipped and
/// one extraction warning is produced; the file continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field {0:?}")]
    MissingField(String),
    #[error("invalid value {value:?} of field {field:?}")]
    InvalidValue { field: String, value: String },
    #[error("invalid date and time: {0}")]
    InvalidDateTime(String),
    #[error(transparent)]
    YearLess(#[from] YearLessError),
}

impl RecordError {
    pub fn invalid_value(
        field: &str,
        value: &str,
    ) -> RecordError {
        RecordError::InvalidValue {
            field: String::from(field),
            value: String::from(value),
        }
    }
}

/// Required string field of a record.
pub fn record_str<'a>(
    record: &'a ParseRecord,
    name: &str,
) -> Result<&'a str, RecordError> {
    match record.get(name) {
        Some(value) => Ok(value),
        None => Err(RecordError::MissingField(String::from(name))),
    }
}

/// Required unsigned number field of a record.
pub fn record_u32(
    record: &ParseRecord,
    name: &str,
) -> Result<u32, RecordError> {
    let value = record_str(record, name)?;
    match value.trim().parse::<u32>() {
        Ok(val) => Ok(val),
        Err(_) => Err(RecordError::invalid_value(name, value)),
    }
}

/// Required signed year field of a record.
pub fn record_year(
    record: &ParseRecord,
    name: &str,
) -> Result<Year, RecordError> {
    let value = record_str(record, name)?;
    match value.trim().parse::<Year>() {
        Ok(val) => Ok(val),
        Err(_) => Err(RecordError::invalid_value(name, value)),
    }
}

/// Required month name field of a record, e.g. `"Jan"`.
pub fn record_month(
    record: &ParseRecord,
    name: &str,
) -> Result<Month, RecordError> {
    let value = record_str(record, name)?;
    match month_from_str(value) {
        Some(month) => Ok(month),
        None => Err(RecordError::invalid_value(name, value)),
    }
}

/// Optional fraction-of-second field, as microseconds. A missing field is
/// zero.
pub fn record_microseconds(
    record: &ParseRecord,
    name: &str,
) -> Result<u32, RecordError> {
    match record.get(name) {
        None => Ok(0),
        Some(value) => match fraction_to_microseconds(value) {
            Some(micro) => Ok(micro),
            None => Err(RecordError::invalid_value(name, value)),
        },
    }
}

/// Time elements of a year-less record, the fields named `month`, `day`,
/// `hour`, `minute`, `second`, and optionally `fraction`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeElements {
    pub month: Month,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl TimeElements {
    pub fn from_record(record: &ParseRecord) -> Result<TimeElements, RecordError> {
        Ok(TimeElements {
            month: record_month(record, "month")?,
            day: record_u32(record, "day")?,
            hour: record_u32(record, "hour")?,
            minute: record_u32(record, "minute")?,
            second: record_u32(record, "second")?,
            microsecond: record_microseconds(record, "fraction")?,
        })
    }

    /// Plausible values for a record, without knowing the year.
    pub fn is_plausible(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            // leap second
            && self.second < 61
    }

    /// Combine with `year` into a `DateTimeL` at `tz_offset`.
    pub fn to_datetime(
        &self,
        year: Year,
        tz_offset: &FixedOffset,
    ) -> Result<DateTimeL, RecordError> {
        match datetime_from_elements(
            year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
            tz_offset,
        ) {
            Some(dt) => Ok(dt),
            None => Err(RecordError::InvalidDateTime(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
                year, self.month, self.day, self.hour, self.minute, self.second, self.microsecond
            ))),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON values
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Does `object` have every key in `keys`?
pub fn json_has_keys(
    object: &JsonObject,
    keys: &[&str],
) -> bool {
    keys.iter()
        .all(|key| object.contains_key(*key))
}

/// Value at a path of nested object keys, e.g. `["resource", "type"]`.
pub fn json_path<'a>(
    object: &'a JsonObject,
    path: &[&str],
) -> Option<&'a ::serde_json::Value> {
    let (first, rest) = path.split_first()?;
    let mut value = object.get(*first)?;
    for key in rest {
        value = value.as_object()?.get(*key)?;
    }

    Some(value)
}

/// Optional string value at a path of nested object keys.
pub fn json_path_str<'a>(
    object: &'a JsonObject,
    path: &[&str],
) -> Option<&'a str> {
    json_path(object, path).and_then(|value| value.as_str())
}

/// Required string value of `key`.
pub fn json_str<'a>(
    object: &'a JsonObject,
    key: &str,
) -> Result<&'a str, RecordError> {
    match object.get(key) {
        Some(::serde_json::Value::String(value)) => Ok(value.as_str()),
        Some(value) => Err(RecordError::invalid_value(key, &value.to_string())),
        None => Err(RecordError::MissingField(String::from(key))),
    }
}

/// Required ISO 8601 datetime string value of `key`.
pub fn json_datetime(
    object: &JsonObject,
    key: &str,
) -> Result<DateTimeL, RecordError> {
    let value = json_str(object, key)?;
    match datetime_parse_iso8601(value) {
        Some(dt) => Ok(dt),
        None => Err(RecordError::InvalidDateTime(String::from(value))),
    }
}
