// tests/integration_tests.rs

//! Tests of the public API of _axlib_ and of the driver program _ax_.

#![allow(non_snake_case)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use ::axlib::data::event::TIME_DESCRIPTION_WRITTEN;
use ::axlib::plugins::{build_parser_registry, PRESETS};
use ::axlib::readers::dispatcher::{DispatchError, Dispatcher};
use ::axlib::readers::filter::FilterExpression;
use ::axlib::readers::mediator::{BufferedMediator, ParserContext};

use ::filetime::{set_file_mtime, FileTime};
use ::serde_json::Value;
use ::tempfile::TempDir;

const SYSLOG_ROLLOVER: &str = "\
Dec 31 23:59:58 host1 cron[100]: last of the year
Dec 31 23:59:59 host1 last message repeated 2 times
Jan  1 00:00:00 host1 kernel: first of the year
";

const XCHAT: &str = "\
**** BEGIN LOGGING AT Mon Dec 31 21:11:55 2018

Dec 31 21:12:01 <ron>\thappy new year
**** ENDING LOGGING AT Mon Dec 31 21:20:00 2018
";

const DOCKER: &str = r#"{"log":"hello\n","stream":"stdout","time":"2024-01-02T03:04:05Z"}
"#;

/// 2015-06-15T00:00:00Z
const MTIME_2015: i64 = 1_434_326_400;

fn write_file(
    dir: &TempDir,
    name: &str,
    data: &str,
) -> PathBuf {
    let path: PathBuf = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(data.as_bytes()).unwrap();

    path
}

fn ax(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ax"))
        .args(args)
        .output()
        .unwrap()
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| ::serde_json::from_str(line).unwrap())
        .collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// library
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_library_syslog_rollover() {
    let registry = build_parser_registry().unwrap();
    let dispatcher = Dispatcher::new(&registry, &FilterExpression::parse("linux", &PRESETS));
    let mut mediator = BufferedMediator::new("syslog", 2015).with_latest_year(Some(2016));
    let mut file = Cursor::new(SYSLOG_ROLLOVER.as_bytes().to_vec());
    let processed = {
        let mut context = ParserContext::new(&mut mediator);
        dispatcher
            .process(&mut context, &mut file)
            .unwrap()
    };
    assert_eq!(processed.parser, "text");
    assert!(!processed.summary.aborted());
    let timestamps: Vec<String> = mediator
        .events()
        .iter()
        .map(|e| e.event.as_ref().unwrap().timestamp.to_rfc3339())
        .collect();
    assert_eq!(
        timestamps,
        vec!["2015-12-31T23:59:58+00:00", "2015-12-31T23:59:59+00:00", "2016-01-01T00:00:00+00:00"]
    );
    assert!(mediator
        .events()
        .iter()
        .all(|e| e.event.as_ref().unwrap().timestamp_description == TIME_DESCRIPTION_WRITTEN));
    assert!(mediator.warnings().is_empty());
}

#[test]
fn test_library_filter_selects_nothing() {
    let registry = build_parser_registry().unwrap();
    let dispatcher = Dispatcher::new(&registry, &FilterExpression::parse("irc", &PRESETS));
    let mut mediator = BufferedMediator::new("docker", 2024);
    let mut file = Cursor::new(DOCKER.as_bytes().to_vec());
    let mut context = ParserContext::new(&mut mediator);
    let result = dispatcher.process(&mut context, &mut file);
    assert!(matches!(result, Err(DispatchError::NoMatch(_))));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// driver program
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_ax_year_from_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "messages", SYSLOG_ROLLOVER);
    set_file_mtime(&path, FileTime::from_unix_time(MTIME_2015, 0)).unwrap();

    let output = ax(&["--json", "--color", "never", path_str(&path)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["timestamp"], "2015-12-31T23:59:58+00:00");
    assert_eq!(lines[2]["timestamp"], "2016-01-01T00:00:00+00:00");
    assert_eq!(lines[0]["event_data"]["parser"], "text/syslog");
    assert_eq!(lines[0]["event_data"]["data_type"], "syslog:line");
    assert_eq!(lines[1]["event_data"]["data_type"], "syslog:repeated");
    assert_eq!(lines[1]["event_data"]["attributes"]["times"], 2);
}

#[test]
fn test_ax_year_option() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "messages", SYSLOG_ROLLOVER);

    let output = ax(&["--json", "--year", "2010", path_str(&path)]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines[0]["timestamp"], "2010-12-31T23:59:58+00:00");
    assert_eq!(lines[2]["timestamp"], "2011-01-01T00:00:00+00:00");
}

#[test]
fn test_ax_directory_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "a-xchat.log", XCHAT);
    write_file(&dir, "b-container.log", DOCKER);

    let output = ax(&["--json", "--threads", "2", path_str(dir.path())]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let parsers: Vec<String> = json_lines(&output)
        .iter()
        .map(|line| line["event_data"]["parser"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        parsers,
        vec!["text/xchatlog", "text/xchatlog", "text/xchatlog", "jsonl/docker_container_log"]
    );
}

#[test]
fn test_ax_no_parser() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "container.log", DOCKER);

    let output = ax(&["--parsers", "!jsonl", path_str(&path)]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no parser recognized"));
}

#[test]
fn test_ax_unknown_filter() {
    let output = ax(&["--parsers", "no_such_parser", "."]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("selects no parser"));
}

#[test]
fn test_ax_list_parsers() {
    let output = ax(&["--list-parsers"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("text/syslog: System log (syslog) file"), "{}", stdout);
    assert!(stdout.contains("jsonl/gcp_log: Google Cloud (GCP) log"), "{}", stdout);
}

#[test]
fn test_ax_path_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");

    let output = ax(&[path_str(&missing)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("path not found"));
}
