// src/readers/summary.rs

//! Implements `Summary` statistics tracking structs.

#![allow(non_snake_case)]

use crate::common::{Count, FPath};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::textreader::SummaryTextReader;
use crate::readers::yearless::YearLessLogHelperInfo;

use std::fmt;

use ::more_asserts::debug_assert_ge;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Summary of parsers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated statistics of a [`TextParser`] run over one file.
///
/// [`TextParser`]: crate::readers::textparser::TextParser
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryTextParser {
    /// name of the plugin that recognized the file
    pub TextParser_plugin: String,
    /// name of the encoding used to decode the file
    pub TextParser_encoding: String,
    /// grammar matches passed to the plugin without error
    pub TextParser_records: Count,
    /// grammar matches the plugin could not turn into an event
    pub TextParser_record_failures: Count,
    /// lines that matched no grammar
    pub TextParser_line_failures: Count,
    /// the rest of the file was abandoned after too many line failures
    pub TextParser_too_many_failures: bool,
    /// processing stopped by the abort flag
    pub TextParser_aborted: bool,
    /// the header grammar did not match
    pub TextParser_header_mismatch: bool,
    pub TextParser_year_less: Option<YearLessLogHelperInfo>,
    pub reader: SummaryTextReader,
}

/// Accumulated statistics of a [`JsonlParser`] run over one file.
///
/// [`JsonlParser`]: crate::readers::jsonlparser::JsonlParser
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryJsonlParser {
    /// name of the plugin bound to the file
    pub JsonlParser_plugin: String,
    pub JsonlParser_lines: Count,
    /// lines with only whitespace
    pub JsonlParser_lines_empty: Count,
    /// lines passed to the plugin without error
    pub JsonlParser_records: Count,
    /// lines the plugin could not turn into an event
    pub JsonlParser_record_failures: Count,
    /// lines that are not a JSON object
    pub JsonlParser_json_failures: Count,
    /// processing stopped by the abort flag
    pub JsonlParser_aborted: bool,
}

/// Wrapper for the `Summary*` data of the various parser families.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SummaryParserData {
    /// Unset. Stand-in value where no parser ran; e.g. files no parser
    /// recognized.
    #[default]
    Dummy,
    Text(SummaryTextParser),
    Jsonl(SummaryJsonlParser),
}

impl SummaryParserData {
    pub fn is_dummy(&self) -> bool {
        matches!(self, SummaryParserData::Dummy)
    }

    /// Processing of the file stopped before the end of the file.
    pub fn stopped_early(&self) -> bool {
        match self {
            SummaryParserData::Dummy => false,
            SummaryParserData::Text(summary) => summary.TextParser_aborted || summary.TextParser_too_many_failures,
            SummaryParserData::Jsonl(summary) => summary.JsonlParser_aborted,
        }
    }

    /// Was processing stopped by the abort flag?
    pub fn aborted(&self) -> bool {
        match self {
            SummaryParserData::Dummy => false,
            SummaryParserData::Text(summary) => summary.TextParser_aborted,
            SummaryParserData::Jsonl(summary) => summary.JsonlParser_aborted,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Summary of a file
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated statistics about processing a single file.
///
/// For CLI option `--summary`.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct SummaryFile {
    /// the `FPath` of the processed file
    pub path: FPath,
    /// provenance chain of the parser that processed the file, e.g.
    /// `"text/syslog"`
    pub parser_chain: Option<String>,
    pub events: Count,
    pub warnings: Count,
    /// Data specific to the parser family.
    pub parserdata: SummaryParserData,
    /// The first encountered [`Error`], if any, as a `String`.
    ///
    /// [`Error`]: std::io::Error
    pub error: Option<String>,
}

impl SummaryFile {
    pub fn new(
        path: FPath,
        parser_chain: Option<String>,
        events: Count,
        warnings: Count,
        parserdata: SummaryParserData,
        error: Option<String>,
    ) -> SummaryFile {
        if let SummaryParserData::Text(summary) = &parserdata {
            debug_assert!(summary.reader.is_conserved(), "bytes not conserved {}", summary.reader);
            debug_assert_ge!(
                summary.reader.TextReader_lines_read,
                summary.TextParser_line_failures,
                "more line failures than lines"
            );
        }

        SummaryFile {
            path,
            parser_chain,
            events,
            warnings,
            parserdata,
            error,
        }
    }

    /// Create a new `SummaryFile` for a file that was not parsed, e.g. no
    /// parser recognized it.
    pub fn new_failed(
        path: FPath,
        error: Option<String>,
    ) -> SummaryFile {
        SummaryFile {
            path,
            error,
            ..Default::default()
        }
    }

    /// Year-less log details, if the parser kept any.
    pub fn year_less(&self) -> Option<YearLessLogHelperInfo> {
        match &self.parserdata {
            SummaryParserData::Text(summary) => summary.TextParser_year_less,
            _ => None,
        }
    }
}

impl fmt::Debug for SummaryFile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match &self.parserdata {
            SummaryParserData::Dummy => f
                .debug_struct("")
                .field("path", &self.path)
                .field("error", &self.error)
                .finish(),
            SummaryParserData::Text(summary) => f
                .debug_struct("")
                .field("path", &self.path)
                .field("parser", &self.parser_chain)
                .field("encoding", &summary.TextParser_encoding)
                .field("events", &self.events)
                .field("warnings", &self.warnings)
                .field("records", &summary.TextParser_records)
                .field("record failures", &summary.TextParser_record_failures)
                .field("line failures", &summary.TextParser_line_failures)
                .field("too many failures", &summary.TextParser_too_many_failures)
                .field("aborted", &summary.TextParser_aborted)
                .field("lines", &summary.reader.TextReader_lines_read)
                .field("bytes", &summary.reader.TextReader_bytes_read)
                .field("bytes consumed", &summary.reader.TextReader_bytes_consumed)
                .field("bytes skipped", &summary.reader.TextReader_bytes_skipped)
                .field("bytes abandoned", &summary.reader.TextReader_bytes_abandoned)
                .field("decode errors", &summary.reader.TextReader_decode_errors)
                .field("year-less", &summary.TextParser_year_less)
                .field("error", &self.error)
                .finish(),
            SummaryParserData::Jsonl(summary) => f
                .debug_struct("")
                .field("path", &self.path)
                .field("parser", &self.parser_chain)
                .field("events", &self.events)
                .field("warnings", &self.warnings)
                .field("lines", &summary.JsonlParser_lines)
                .field("lines empty", &summary.JsonlParser_lines_empty)
                .field("records", &summary.JsonlParser_records)
                .field("record failures", &summary.JsonlParser_record_failures)
                .field("json failures", &summary.JsonlParser_json_failures)
                .field("aborted", &summary.JsonlParser_aborted)
                .field("error", &self.error)
                .finish(),
        }
    }
}

impl fmt::Display for SummaryFile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "File: {:?}", self.path)?;
        match &self.parser_chain {
            Some(chain) => write!(f, "\n  parser   : {}", chain)?,
            None => write!(f, "\n  parser   : (none)")?,
        }
        write!(f, "\n  events   : {}", self.events)?;
        write!(f, "\n  warnings : {}", self.warnings)?;
        match &self.parserdata {
            SummaryParserData::Dummy => {}
            SummaryParserData::Text(summary) => {
                write!(f, "\n  encoding : {}", summary.TextParser_encoding)?;
                write!(
                    f,
                    "\n  records  : {} (failures {}, line failures {})",
                    summary.TextParser_records, summary.TextParser_record_failures, summary.TextParser_line_failures,
                )?;
                write!(f, "\n  reader   : {}", summary.reader)?;
                if let Some(year_less) = &summary.TextParser_year_less {
                    write!(f, "\n  year-less: {}", year_less)?;
                }
                if summary.TextParser_too_many_failures {
                    write!(f, "\n  too many failures, remainder of file skipped")?;
                }
                if summary.TextParser_aborted {
                    write!(f, "\n  aborted")?;
                }
            }
            SummaryParserData::Jsonl(summary) => {
                write!(
                    f,
                    "\n  lines    : {} (empty {}, JSON failures {})",
                    summary.JsonlParser_lines, summary.JsonlParser_lines_empty, summary.JsonlParser_json_failures,
                )?;
                write!(
                    f,
                    "\n  records  : {} (failures {})",
                    summary.JsonlParser_records, summary.JsonlParser_record_failures,
                )?;
                if summary.JsonlParser_aborted {
                    write!(f, "\n  aborted")?;
                }
            }
        }
        if let Some(error) = &self.error {
            write!(f, "\n  error    : {}", error)?;
        }

        Ok(())
    }
}
