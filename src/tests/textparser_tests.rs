// src/tests/textparser_tests.rs

//! tests for `textparser.rs`

#![allow(non_snake_case)]

use crate::data::datetime::{Datelike, Year};
use crate::data::event::{EventData, TIME_DESCRIPTION_END, TIME_DESCRIPTION_START, TIME_DESCRIPTION_WRITTEN};
use crate::plugins::syslog::{self, SyslogPlugin};
use crate::plugins::xchatlog::{self, XChatLogPlugin};
use crate::readers::decoder::TextDecoder;
use crate::readers::dispatcher::FileParser;
use crate::readers::grammar::{LineGrammar, LineGrammars, ParseRecord};
use crate::readers::helpers::{record_str, RecordError};
use crate::readers::mediator::{ParserContext, ProducedEvent};
use crate::readers::registry::HandlerDescriptor;
use crate::readers::summary::{SummaryParserData, SummaryTextParser};
use crate::readers::textparser::{GrammarEngine, GrammarEngineState, TextParser, TextPlugin};
use crate::readers::textreader::TextReader;
use crate::tests::common::{new_mediator, run_parser, ParserRun, SYSLOG_10, YEAR_EST};

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::Ordering;

use ::more_asserts::assert_le;
use ::serde_json::json;
use ::test_case::test_case;

const BAD_LINE: &str = "this is not a syslog line\n";

const XCHAT_SESSION: &str = "\
**** BEGIN LOGGING AT Sun Dec 31 21:11:55 2023

Dec 31 21:11:55 -->\tYou are now talking on #gugle
Dec 31 21:12:01 <ron>\thappy new year
Jan 01 00:00:02 <ron>\thappy new year!
**** ENDING LOGGING AT Mon Jan  1 00:10:00 2024
";

fn syslog_parser() -> TextParser {
    TextParser::new(vec![syslog::PLUGIN_CLASS.create()])
}

fn xchatlog_parser() -> TextParser {
    TextParser::new(vec![xchatlog::PLUGIN_CLASS.create()])
}

fn text_summary(run: &ParserRun) -> &SummaryTextParser {
    match run.summary.as_ref() {
        Some(SummaryParserData::Text(summary)) => summary,
        other => panic!("expected a text summary, got {:?}", other),
    }
}

fn years(events: &[ProducedEvent]) -> Vec<Year> {
    events
        .iter()
        .map(|e| e.event.as_ref().unwrap().timestamp.year())
        .collect()
}

fn data_types(events: &[ProducedEvent]) -> Vec<&str> {
    events
        .iter()
        .map(|e| e.event_data.data_type.as_str())
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// syslog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_syslog_10() {
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), SYSLOG_10.as_bytes());
    assert!(run.recognized);
    assert_eq!(parser.active_plugin(), Some("syslog"));
    assert_eq!(run.events_len(), 10);
    assert_eq!(run.warnings_len(), 0);

    let summary = text_summary(&run);
    assert_eq!(summary.TextParser_plugin, "syslog");
    assert_eq!(summary.TextParser_encoding, "UTF-8");
    assert_eq!(summary.TextParser_records, 10);
    assert_eq!(summary.TextParser_line_failures, 0);
    assert!(!summary.TextParser_too_many_failures);
    assert!(summary.reader.is_conserved());
    assert_eq!(summary.reader.TextReader_bytes_consumed, SYSLOG_10.len() as u64);

    let first = &run.mediator.events()[0];
    let event = first.event.as_ref().unwrap();
    assert_eq!(event.timestamp.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    assert_eq!(event.timestamp_description, TIME_DESCRIPTION_WRITTEN);
    let data: &EventData = &first.event_data;
    assert_eq!(data.data_type, syslog::DATA_TYPE_LINE);
    assert_eq!(data.parser, "syslog");
    assert_eq!(data.offset, Some(0));
    assert_eq!(data.get_str("hostname"), Some("host1"));
    assert_eq!(data.get_str("reporter"), Some("cron"));
    assert_eq!(data.get("pid"), Some(&json!(100)));
    assert_eq!(data.get_str("body"), Some("line 1"));
    // no pid
    let third = &run.mediator.events()[2].event_data;
    assert_eq!(third.get_str("reporter"), Some("kernel"));
    assert_eq!(third.get("pid"), None);
    assert_eq!(third.offset, Some(80));
}

#[test]
fn test_syslog_record_kinds() {
    let data = "\
Jan  2 03:04:05 myhost cron[1234]: (root) CMD (run-parts /etc/cron.hourly)
Jan  2 03:04:06 myhost kernel: eth0: link up
Jan  2 03:04:07 myhost last message repeated 3 times
Jan  2 03:04:08 --- restarted ---
2024-01-02T03:04:09.123456+00:00 myhost sshd[99]: Accepted publickey
";
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.warnings_len(), 0, "{:?}", run.mediator.warnings());
    let events = run.mediator.events();
    assert_eq!(
        data_types(events),
        vec![
            syslog::DATA_TYPE_LINE,
            syslog::DATA_TYPE_LINE,
            syslog::DATA_TYPE_REPEATED,
            syslog::DATA_TYPE_COMMENT,
            syslog::DATA_TYPE_LINE,
        ]
    );
    assert_eq!(years(events), vec![2020, 2020, 2020, 2020, 2024]);
    assert_eq!(events[1].event_data.get_str("body"), Some("eth0: link up"));
    assert_eq!(events[2].event_data.get("times"), Some(&json!(3)));
    assert_eq!(events[3].event_data.get_str("body"), Some("restarted"));
    assert_eq!(events[4].event_data.get("pid"), Some(&json!(99)));
    assert_eq!(
        events[4].event.as_ref().unwrap().timestamp.timestamp_subsec_micros(),
        123456
    );
}

#[test_case(None, &[2020, 2021]; "no maximum")]
#[test_case(Some(2020), &[2020, 2020]; "maximum year")]
fn test_syslog_year_rollover(
    latest_year: Option<Year>,
    expect: &[Year],
) {
    let data = "Dec 31 23:59:59 host r: a\nJan  1 00:00:00 host r: b\n";
    let mut parser = syslog_parser();
    let mediator = new_mediator().with_latest_year(latest_year);
    let run = run_parser(&mut parser, mediator, data.as_bytes());
    assert_eq!(years(run.mediator.events()), expect);
    let year_less = text_summary(&run).TextParser_year_less.unwrap();
    assert_eq!(year_less.estimated_creation_year, Some(YEAR_EST));
    assert_eq!(year_less.last_relative_year, 1);
}

#[test]
fn test_syslog_record_failure() {
    let data = "Feb 30 00:00:00 host r: x\nMar  1 00:00:00 host r: y\n";
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.events_len(), 1);
    assert_eq!(run.warnings_len(), 1);
    let warning = &run.mediator.warnings()[0];
    assert_eq!(warning.parser, "syslog");
    assert!(
        warning
            .message
            .starts_with("unable to parse record: syslog_line at offset 0 with error: invalid date and time"),
        "{}",
        warning
    );
    let summary = text_summary(&run);
    assert_eq!(summary.TextParser_records, 1);
    assert_eq!(summary.TextParser_record_failures, 1);
    assert_eq!(summary.TextParser_line_failures, 0);
}

#[test]
fn test_syslog_too_many_consecutive_failures() {
    let mut data: String = String::from("Jan  1 00:00:00 host1 cron[100]: line 1\n");
    for _ in 0..30 {
        data.push_str(BAD_LINE);
    }
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.events_len(), 1);
    // one per failed line, then one for the remainder
    assert_eq!(run.warnings_len(), 22);
    assert_eq!(run.warnings_containing("unable to parse log line"), 21);
    assert_eq!(
        run.warnings_containing("more than 20 consecutive failures to parse lines, remainder of file skipped"),
        1
    );
    assert!(run.mediator.warnings()[0]
        .message
        .starts_with("unable to parse log line: 2 at offset 40: "));

    let summary = text_summary(&run);
    assert!(summary.TextParser_too_many_failures);
    assert_eq!(summary.TextParser_line_failures, 21);
    assert!(summary.reader.TextReader_bytes_abandoned > 0);
    assert_eq!(summary.reader.TextReader_bytes_skipped, 21 * BAD_LINE.len() as u64);
    assert!(summary.reader.is_conserved(), "{}", summary.reader);
    assert!(run.summary.as_ref().unwrap().stopped_early());
}

#[test]
fn test_syslog_failures_under_threshold() {
    let mut data: String = String::from("Jan  1 00:00:00 host1 cron[100]: line 1\n");
    for _ in 0..TextParser::MAXIMUM_CONSECUTIVE_LINE_FAILURES {
        data.push_str(BAD_LINE);
    }
    data.push_str("Jan  1 00:00:01 host1 cron[100]: line 22\n");
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data.as_bytes());
    assert_eq!(run.events_len(), 2);
    assert_eq!(run.warnings_len(), 20);
    let summary = text_summary(&run);
    assert!(!summary.TextParser_too_many_failures);
    assert_eq!(summary.reader.TextReader_bytes_abandoned, 0);
    assert_eq!(
        summary.reader.TextReader_bytes_consumed + summary.reader.TextReader_bytes_skipped,
        summary.reader.TextReader_bytes_read
    );
    assert_eq!(summary.reader.TextReader_bytes_read, data.len() as u64);
}

#[test]
fn test_syslog_decode_warning() {
    let data: &[u8] = b"Jan  1 00:00:00 host r: caf\xe9\n";
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data);
    assert!(run.recognized);
    assert_eq!(run.events_len(), 1);
    assert_eq!(run.mediator.events()[0].event_data.get_str("body"), Some("caf\\xe9"));
    assert_eq!(run.warnings_len(), 1);
    let warning = &run.mediator.warnings()[0];
    assert_eq!(warning.parser, "syslog");
    assert_eq!(warning.message, "unable to decode byte 0xe9 at offset 27 with encoding UTF-8");
    assert_eq!(text_summary(&run).reader.TextReader_decode_errors, 1);
}

#[test]
fn test_syslog_code_page_windows_1252() {
    let data: &[u8] = b"Jan  1 00:00:00 host r: caf\xe9\n";
    let mut parser = syslog_parser();
    let mediator = new_mediator().with_code_page("windows-1252");
    let run = run_parser(&mut parser, mediator, data);
    assert_eq!(run.warnings_len(), 0);
    assert_eq!(run.mediator.events()[0].event_data.get_str("body"), Some("café"));
    assert_eq!(text_summary(&run).TextParser_encoding, "windows-1252");
}

#[test]
fn test_syslog_code_page_unknown() {
    let mut parser = syslog_parser();
    let mediator = new_mediator().with_code_page("no-such-encoding");
    let run = run_parser(&mut parser, mediator, SYSLOG_10.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.events_len(), 10);
    assert_eq!(run.warnings_len(), 1);
    assert_eq!(run.warnings_containing("unsupported encoding \"no-such-encoding\", using UTF-8"), 1);
}

#[test]
fn test_syslog_abort() {
    let mut parser = syslog_parser();
    let mediator = new_mediator();
    mediator.abort_flag().store(true, Ordering::Relaxed);
    let run = run_parser(&mut parser, mediator, SYSLOG_10.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.events_len(), 0);
    let summary = text_summary(&run);
    assert!(summary.TextParser_aborted);
    assert_eq!(summary.reader.TextReader_bytes_abandoned, summary.reader.TextReader_bytes_read);
    assert!(summary.reader.is_conserved());
    assert!(run.summary.as_ref().unwrap().aborted());
}

#[test_case(b"" ; "empty")]
#[test_case(b"Jan  1 00:00:00 host r: a\n\x00\x00\n" ; "binary")]
#[test_case(b"garbage\nJan  1 00:00:00 host r: a\n" ; "not at start")]
#[test_case(b"Jan 39 00:00:00 host r: a\n" ; "implausible day")]
fn test_syslog_not_recognized(data: &[u8]) {
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data);
    assert!(!run.recognized);
    assert_eq!(parser.active_plugin(), None);
    assert_eq!(run.events_len(), 0);
    assert_eq!(run.warnings_len(), 0);
}

/// Counts the bytes read through it.
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    bytes_read: u64,
}

impl CountingReader {
    fn new(data: Vec<u8>) -> CountingReader {
        CountingReader {
            inner: Cursor::new(data),
            bytes_read: 0,
        }
    }
}

impl Read for CountingReader {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.bytes_read += read as u64;

        Ok(read)
    }
}

impl Seek for CountingReader {
    fn seek(
        &mut self,
        pos: SeekFrom,
    ) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

fn syslog_and_xchatlog_parser() -> TextParser {
    TextParser::new(vec![
        syslog::PLUGIN_CLASS.create(),
        xchatlog::PLUGIN_CLASS.create(),
    ])
}

#[test]
fn test_check_required_format_reads_prefix_only() {
    let mut mediator = new_mediator();
    let context = ParserContext::new(&mut mediator);

    // 20 MiB without a newline
    let mut parser = syslog_and_xchatlog_parser();
    let mut file = CountingReader::new(vec![b'A'; 20 * 0x10_0000]);
    assert!(!parser.check_required_format(&context, &mut file));
    assert_le!(file.bytes_read, TextParser::PROBE_PREFIX_SZ);
    assert_eq!(file.inner.position(), 0);

    let mut parser = syslog_and_xchatlog_parser();
    let mut file = CountingReader::new(SYSLOG_10.repeat(10_000).into_bytes());
    assert!(parser.check_required_format(&context, &mut file));
    assert_eq!(parser.active_plugin(), Some("syslog"));
    assert_le!(file.bytes_read, TextParser::PROBE_PREFIX_SZ);
    assert_eq!(file.inner.position(), 0);
}

#[test]
fn test_first_line_longer_than_prefix() {
    let body: String = "x".repeat(TextParser::PROBE_PREFIX_SZ as usize);
    let data: String = format!("Jan  1 00:00:00 host r: {}\nJan  1 00:00:01 host r: b\n", body);
    let mut parser = syslog_parser();
    let run = run_parser(&mut parser, new_mediator(), data.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.events_len(), 2);
    assert_eq!(run.warnings_len(), 0);
    // the whole line is parsed, not only the recognized prefix
    assert_eq!(run.mediator.events()[0].event_data.get_str("body"), Some(body.as_str()));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// xchatlog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_xchatlog_session() {
    let mut parser = xchatlog_parser();
    let run = run_parser(&mut parser, new_mediator(), XCHAT_SESSION.as_bytes());
    assert!(run.recognized);
    assert_eq!(run.warnings_len(), 0, "{:?}", run.mediator.warnings());
    let events = run.mediator.events();
    assert_eq!(
        data_types(events),
        vec![
            xchatlog::DATA_TYPE_ACTION,
            xchatlog::DATA_TYPE_LINE,
            xchatlog::DATA_TYPE_LINE,
            xchatlog::DATA_TYPE_LINE,
            xchatlog::DATA_TYPE_ACTION,
        ]
    );
    assert_eq!(years(events), vec![2023, 2023, 2023, 2024, 2024]);
    let descriptions: Vec<&str> = events
        .iter()
        .map(|e| e.event.as_ref().unwrap().timestamp_description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            TIME_DESCRIPTION_START,
            TIME_DESCRIPTION_WRITTEN,
            TIME_DESCRIPTION_WRITTEN,
            TIME_DESCRIPTION_WRITTEN,
            TIME_DESCRIPTION_END,
        ]
    );
    assert_eq!(events[0].event_data.get_str("action"), Some("BEGIN"));
    assert_eq!(events[1].event_data.get("nickname"), None);
    assert_eq!(
        events[1].event_data.get_str("text"),
        Some("-->\tYou are now talking on #gugle")
    );
    assert_eq!(events[2].event_data.get_str("nickname"), Some("ron"));
    assert_eq!(events[2].event_data.get_str("text"), Some("happy new year"));
    assert_eq!(
        events[4].event.as_ref().unwrap().timestamp.to_rfc3339(),
        "2024-01-01T00:10:00+00:00"
    );

    let summary = text_summary(&run);
    // two headers, one empty line, three lines
    assert_eq!(summary.TextParser_records, 6);
    assert!(!summary.TextParser_header_mismatch);
    let year_less = summary.TextParser_year_less.unwrap();
    assert_eq!(year_less.estimated_creation_year, None);
    assert_eq!(year_less.earliest_year, Some(2023));
    assert_eq!(year_less.latest_year, Some(2024));
}

#[test]
fn test_xchatlog_requires_header() {
    let mut parser = xchatlog_parser();
    let run = run_parser(&mut parser, new_mediator(), b"Dec 31 21:12:01 <ron>\thappy new year\n");
    assert!(!run.recognized);
}

#[test]
fn test_GrammarEngine_header_mismatch() {
    let mut plugin = XChatLogPlugin::new();
    let mut engine = GrammarEngine::new(&plugin).unwrap();
    assert_eq!(engine.state(), GrammarEngineState::AwaitingHeader);
    let mut mediator = new_mediator();
    let mut file = Cursor::new(SYSLOG_10.as_bytes().to_vec());
    let summary = {
        let mut context = ParserContext::new(&mut mediator);
        let mut reader = TextReader::new(&mut file, TextDecoder::default()).unwrap();
        let ok = engine
            .run(&mut context, &mut plugin, &mut reader)
            .unwrap();
        assert!(!ok);
        engine.summary(&plugin, &reader)
    };
    assert_eq!(engine.state(), GrammarEngineState::Finalized);
    assert!(summary.TextParser_header_mismatch);
    assert_eq!(summary.TextParser_records, 0);
    assert_eq!(summary.reader.TextReader_bytes_abandoned, summary.reader.TextReader_bytes_read);
    assert!(mediator.events().is_empty());
}

#[test]
fn test_GrammarEngine_check() {
    let plugin = SyslogPlugin::new();
    let engine = GrammarEngine::new(&plugin).unwrap();
    assert_eq!(engine.state(), GrammarEngineState::ScanningBody);
    let mut file = Cursor::new(SYSLOG_10.as_bytes().to_vec());
    let mut reader = TextReader::new(&mut file, TextDecoder::default()).unwrap();
    assert!(engine.check(&plugin, &mut reader).unwrap());
    let mut file = Cursor::new(XCHAT_SESSION.as_bytes().to_vec());
    let mut reader = TextReader::new(&mut file, TextDecoder::default()).unwrap();
    assert!(!engine.check(&plugin, &mut reader).unwrap());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// a plugin with its own encoding, producing event data only
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

static KV_DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "kv",
    data_format: "key=value test file",
    encoding: Some("windows-1252"),
    supports_plugins: false,
};

static KV_GRAMMARS: [LineGrammar; 1] = [LineGrammar {
    key: "pair",
    pattern: r"(?P<key>[a-z]+)=(?P<value>[^\r\n]*)\r?\n",
}];

struct KeyValuePlugin {}

impl TextPlugin for KeyValuePlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &KV_DESCRIPTOR
    }

    fn line_grammars(&self) -> LineGrammars {
        &KV_GRAMMARS
    }

    fn check_required_format(
        &self,
        record: &ParseRecord,
    ) -> bool {
        record.get("key").is_some()
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        _key: &str,
        record: &ParseRecord,
    ) -> Result<(), RecordError> {
        let value = record_str(record, "value")?;
        if value.is_empty() {
            return Err(RecordError::MissingField(String::from("value")));
        }
        context.produce_event_data(EventData::new("kv:pair").with(record_str(record, "key")?, value));

        Ok(())
    }
}

#[test]
fn test_plugin_encoding_and_event_data() {
    let plugins: Vec<Box<dyn TextPlugin>> = vec![Box::new(KeyValuePlugin {})];
    let mut parser = TextParser::new(plugins);
    let run = run_parser(&mut parser, new_mediator(), b"name=caf\xe9\nempty=\n");
    assert!(run.recognized);
    assert_eq!(run.events_len(), 1);
    let produced = &run.mediator.events()[0];
    assert!(produced.event.is_none());
    assert_eq!(produced.event_data.get_str("name"), Some("café"));
    assert_eq!(produced.event_data.parser, "kv");
    assert_eq!(run.warnings_len(), 1);
    assert_eq!(
        run.mediator.warnings()[0].message,
        "unable to parse record: pair at offset 10 with error: missing required field \"value\""
    );
    let summary = text_summary(&run);
    assert_eq!(summary.TextParser_encoding, "windows-1252");
    assert_eq!(summary.TextParser_year_less, None);
}

static TIE_DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "tie",
    data_format: "two grammars for the same line",
    encoding: None,
    supports_plugins: false,
};

static TIE_GRAMMARS: [LineGrammar; 3] = [
    LineGrammar {
        key: "word",
        pattern: r"[a-w]+\n",
    },
    LineGrammar {
        key: "one",
        pattern: r"x\n",
    },
    LineGrammar {
        key: "two",
        pattern: r"x\n",
    },
];

struct TiePlugin {}

impl TextPlugin for TiePlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &TIE_DESCRIPTOR
    }

    fn line_grammars(&self) -> LineGrammars {
        &TIE_GRAMMARS
    }

    fn check_required_format(
        &self,
        _record: &ParseRecord,
    ) -> bool {
        true
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        key: &str,
        _record: &ParseRecord,
    ) -> Result<(), RecordError> {
        context.produce_event_data(EventData::new(key));

        Ok(())
    }
}

#[test]
fn test_GrammarEngine_same_span_is_line_failure() {
    let mut plugin = TiePlugin {};
    let mut engine = GrammarEngine::new(&plugin).unwrap();
    let mut mediator = new_mediator();
    let mut file = Cursor::new(b"ok\nx\nfine\n".to_vec());
    let summary = {
        let mut context = ParserContext::new(&mut mediator);
        let mut reader = TextReader::new(&mut file, TextDecoder::default()).unwrap();
        assert!(engine
            .run(&mut context, &mut plugin, &mut reader)
            .unwrap());
        engine.summary(&plugin, &reader)
    };
    assert_eq!(summary.TextParser_records, 2);
    assert_eq!(summary.TextParser_line_failures, 1);
    let warnings = mediator.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .message
            .starts_with("unable to parse log line: 2 at offset 3: line grammars [\"one\", \"two\"] matched the same text"),
        "{}",
        warnings[0]
    );
    assert_eq!(mediator.events().len(), 2);
}

#[test]
fn test_first_recognizing_plugin_wins() {
    let mut parser = TextParser::new(vec![
        xchatlog::PLUGIN_CLASS.create(),
        syslog::PLUGIN_CLASS.create(),
    ]);
    let run = run_parser(&mut parser, new_mediator(), SYSLOG_10.as_bytes());
    assert!(run.recognized);
    assert_eq!(parser.active_plugin(), Some("syslog"));
    assert_eq!(run.mediator.events()[0].event_data.parser, "syslog");
}
