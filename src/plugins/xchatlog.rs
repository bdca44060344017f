// src/plugins/xchatlog.rs

//! The `text/xchatlog` plugin, for XChat and HexChat IRC session logs.
//!
//! ```text
//! **** BEGIN LOGGING AT Mon Dec 31 21:11:55 2023
//!
//! Dec 31 21:11:55 -->	You are now talking on #gugle
//! Dec 31 21:12:01 <ron>	happy new year
//! Jan 01 00:00:02 <ron>	happy new year!
//! **** ENDING LOGGING AT Mon Jan  1 00:10:00 2024
//! ```
//!
//! A session header carries the year; the lines that follow do not. The
//! header sets the year of the [`YearLessLogHelper`] explicitly, and the year
//! increments when the month goes backwards.
//!
//! [`YearLessLogHelper`]: crate::readers::yearless::YearLessLogHelper

use crate::data::datetime::fixedoffset_utc;
use crate::data::event::{Event, EventData, TIME_DESCRIPTION_END, TIME_DESCRIPTION_START, TIME_DESCRIPTION_WRITTEN};
use crate::plugins::{CGP_DATETIME_YEARLESS, RP_LINE_END};
use crate::readers::grammar::{LineGrammar, LineGrammars, ParseRecord};
use crate::readers::helpers::{record_str, record_year, RecordError, TimeElements};
use crate::readers::mediator::ParserContext;
use crate::readers::registry::HandlerDescriptor;
use crate::readers::textparser::{TextPlugin, TextPluginClass};
use crate::readers::yearless::{YearLessLogHelper, YearLessLogHelperInfo};

use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

pub static DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "xchatlog",
    data_format: "XChat log file",
    encoding: None,
    supports_plugins: false,
};

pub static PLUGIN_CLASS: TextPluginClass = TextPluginClass::new(&DESCRIPTOR, XChatLogPlugin::new_boxed);

pub const KEY_HEADER: &str = "header";
pub const KEY_LOGLINE: &str = "logline";
pub const KEY_EMPTY_LINE: &str = "empty_line";

pub const DATA_TYPE_ACTION: &str = "xchat:log:action";
pub const DATA_TYPE_LINE: &str = "xchat:log:line";

const RP_HEADER: &str = concatcp!(
    r"\*\*\*\*[ ](?P<action>BEGIN|ENDING)[ ]LOGGING[ ]AT[ ](?P<weekday>Mon|Tue|Wed|Thu|Fri|Sat|Sun)[ ]",
    CGP_DATETIME_YEARLESS,
    r"[ ](?P<year>[0-9]{4})",
    RP_LINE_END
);
const RP_LOGLINE: &str = concatcp!(
    CGP_DATETIME_YEARLESS,
    r"[ ](?:<(?P<nickname>[^>\r\n]+)>)?[ \t]*(?P<text>[^\r\n]*)",
    RP_LINE_END
);
const RP_EMPTY_LINE: &str = r"\A\r?\n";

static HEADER_GRAMMARS: [LineGrammar; 1] = [LineGrammar {
    key: KEY_HEADER,
    pattern: RP_HEADER,
}];

static LINE_GRAMMARS: [LineGrammar; 3] = [
    LineGrammar {
        key: KEY_HEADER,
        pattern: RP_HEADER,
    },
    LineGrammar {
        key: KEY_LOGLINE,
        pattern: RP_LOGLINE,
    },
    LineGrammar {
        key: KEY_EMPTY_LINE,
        pattern: RP_EMPTY_LINE,
    },
];

/// Parses XChat log records; see the [module] documentation.
///
/// [module]: self
#[derive(Debug, Default)]
pub struct XChatLogPlugin {
    year_less: YearLessLogHelper,
}

impl XChatLogPlugin {
    pub fn new() -> XChatLogPlugin {
        XChatLogPlugin::default()
    }

    fn new_boxed() -> Box<dyn TextPlugin> {
        Box::new(XChatLogPlugin::new())
    }

    /// A `BEGIN` or `ENDING` session header; sets the year.
    fn parse_session(
        &mut self,
        context: &mut ParserContext<'_>,
        record: &ParseRecord,
    ) -> Result<(), RecordError> {
        let elements: TimeElements = TimeElements::from_record(record)?;
        let year = record_year(record, "year")?;
        self.year_less
            .set_month_and_year(elements.month, year)?;
        let timestamp = elements.to_datetime(year, &fixedoffset_utc())?;
        let action: &str = record_str(record, "action")?;
        let description: &str = match action {
            "BEGIN" => TIME_DESCRIPTION_START,
            _ => TIME_DESCRIPTION_END,
        };
        let mut event_data = EventData::new(DATA_TYPE_ACTION).with("action", action);
        event_data.offset = Some(record.start_offset);
        context.produce_event_with_event_data(Event::new(timestamp, description), event_data);

        Ok(())
    }
}

impl TextPlugin for XChatLogPlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &DESCRIPTOR
    }

    fn line_grammars(&self) -> LineGrammars {
        &LINE_GRAMMARS
    }

    fn header_grammars(&self) -> Option<LineGrammars> {
        Some(&HEADER_GRAMMARS)
    }

    fn check_required_format(
        &self,
        record: &ParseRecord,
    ) -> bool {
        if record.key != KEY_HEADER || record_year(record, "year").is_err() {
            return false;
        }
        match TimeElements::from_record(record) {
            Ok(elements) => elements.is_plausible(),
            Err(_) => false,
        }
    }

    fn begin_file(
        &mut self,
        _context: &ParserContext<'_>,
    ) {
        self.year_less = YearLessLogHelper::new();
    }

    fn parse_header(
        &mut self,
        context: &mut ParserContext<'_>,
        record: &ParseRecord,
    ) -> Result<(), RecordError> {
        self.parse_session(context, record)
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        key: &str,
        record: &ParseRecord,
    ) -> Result<(), RecordError> {
        match key {
            KEY_HEADER => self.parse_session(context, record),
            KEY_LOGLINE => {
                let elements: TimeElements = TimeElements::from_record(record)?;
                let year = self.year_less.update(elements.month)?;
                let timestamp = elements.to_datetime(year, &fixedoffset_utc())?;
                let mut event_data = EventData::new(DATA_TYPE_LINE).with("text", record_str(record, "text")?);
                event_data.set_opt("nickname", record.get("nickname"));
                event_data.offset = Some(record.start_offset);
                context.produce_event_with_event_data(Event::new(timestamp, TIME_DESCRIPTION_WRITTEN), event_data);

                Ok(())
            }
            KEY_EMPTY_LINE => Ok(()),
            _ => Err(RecordError::invalid_value("key", key)),
        }
    }

    fn year_less_log_helper(&self) -> Option<YearLessLogHelperInfo> {
        Some(self.year_less.year_less_log_helper())
    }
}
