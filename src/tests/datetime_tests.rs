// src/tests/datetime_tests.rs

//! tests for `datetime.rs` and `event.rs`

#![allow(non_snake_case)]

use crate::data::datetime::{
    datetime_from_elements,
    datetime_parse_iso8601,
    fixedoffset_utc,
    fraction_to_microseconds,
    month_from_str,
    systemtime_to_year,
    Datelike,
    FixedOffset,
    Month,
    SystemTime,
};
use crate::data::event::{EventData, ExtractionWarning};

use std::time::Duration;

use ::serde_json::json;
use ::test_case::test_case;

#[test_case("Jan", Some(1); "jan")]
#[test_case("FEB", Some(2); "upper")]
#[test_case("sept", Some(9); "sept")]
#[test_case("September", Some(9); "long")]
#[test_case("december", Some(12); "december")]
#[test_case("Ja", None; "short")]
#[test_case("Januaryyyyy", None; "too long")]
#[test_case("", None; "empty")]
fn test_month_from_str(
    month: &str,
    expect: Option<Month>,
) {
    assert_eq!(month_from_str(month), expect);
}

#[test_case("5", Some(500000); "tenths")]
#[test_case("000001", Some(1); "micro")]
#[test_case("123456789", Some(123456); "nano truncated")]
#[test_case("", None; "empty")]
#[test_case("12a", None; "not digits")]
fn test_fraction_to_microseconds(
    fraction: &str,
    expect: Option<u32>,
) {
    assert_eq!(fraction_to_microseconds(fraction), expect);
}

#[test]
fn test_datetime_from_elements() {
    let tz = FixedOffset::east_opt(3600).unwrap();
    let dt = datetime_from_elements(2024, 2, 29, 23, 59, 59, 5, &tz).unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-02-29T23:59:59.000005+01:00");
    // not a leap year
    assert!(datetime_from_elements(2023, 2, 29, 0, 0, 0, 0, &tz).is_none());
    assert!(datetime_from_elements(2023, 13, 1, 0, 0, 0, 0, &tz).is_none());
    assert!(datetime_from_elements(2023, 1, 1, 24, 0, 0, 0, &tz).is_none());
}

#[test_case("2020-01-01T00:00:00Z", Some("2020-01-01T00:00:00+00:00"); "zulu")]
#[test_case(
    "2019-10-28T14:07:59.123456789+01:00",
    Some("2019-10-28T14:07:59.123456789+01:00");
    "nanoseconds offset"
)]
#[test_case("2019-10-28T14:07:59", Some("2019-10-28T14:07:59+00:00"); "no offset")]
#[test_case("2019-10-28 14:07:59.5", Some("2019-10-28T14:07:59.500+00:00"); "space")]
#[test_case("2019-10-28", None; "date only")]
#[test_case("yesterday", None; "words")]
fn test_datetime_parse_iso8601(
    value: &str,
    expect: Option<&str>,
) {
    assert_eq!(datetime_parse_iso8601(value).map(|dt| dt.to_rfc3339()), expect.map(String::from));
}

#[test]
fn test_systemtime_to_year() {
    assert_eq!(systemtime_to_year(&SystemTime::UNIX_EPOCH), 1970);
    // 2001-09-09T01:46:40Z
    let systemtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    assert_eq!(systemtime_to_year(&systemtime), 2001);
}

#[test]
fn test_fixedoffset_utc() {
    assert_eq!(fixedoffset_utc().local_minus_utc(), 0);
    let dt = datetime_from_elements(1999, 12, 31, 0, 0, 0, 0, &fixedoffset_utc()).unwrap();
    assert_eq!(dt.year(), 1999);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// event
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_EventData() {
    let mut data = EventData::new("syslog:line")
        .with("hostname", "myhost")
        .with("pid", 42);
    data.set_opt::<&str>("reporter", None);
    data.set_opt("body", Some("hello"));
    data.set("pid", 43);
    assert_eq!(data.get_str("hostname"), Some("myhost"));
    assert_eq!(data.get_str("pid"), None);
    assert_eq!(data.get("pid"), Some(&json!(43)));
    assert_eq!(data.get("reporter"), None);
    assert_eq!(data.attributes.len(), 3);
    assert_eq!(data.to_string(), "syslog:line body=\"hello\" hostname=\"myhost\" pid=43");
}

#[test_case("", "gone", "gone"; "no chain")]
#[test_case("text/syslog", "bad line", "[text/syslog] bad line"; "chain")]
fn test_ExtractionWarning_display(
    parser: &str,
    message: &str,
    expect: &str,
) {
    let warning = ExtractionWarning {
        parser: String::from(parser),
        message: String::from(message),
    };
    assert_eq!(warning.to_string(), expect);
}
