// src/plugins/syslog.rs

//! The `text/syslog` plugin, for traditional system log files, e.g.
//! `/var/log/messages`.
//!
//! ```text
//! Jan  2 03:04:05 myhost cron[1234]: (root) CMD (run-parts /etc/cron.hourly)
//! Jan  2 03:04:06 myhost kernel: eth0: link up
//! Jan  2 03:04:07 myhost last message repeated 3 times
//! Jan  2 03:04:08 --- restarted ---
//! 2024-01-02T03:04:09.123456+00:00 myhost sshd[99]: Accepted publickey
//! ```
//!
//! Traditional lines have no year. The year of the first record is presumed
//! to be the estimated year of the file (its modification year), and it
//! increments each time the month goes backwards, never past the latest
//! year. See [`YearLessLogHelper`].
//!
//! [`YearLessLogHelper`]: crate::readers::yearless::YearLessLogHelper

use crate::data::datetime::{datetime_parse_iso8601, fixedoffset_utc, DateTimeL};
use crate::data::event::{Event, EventData, TIME_DESCRIPTION_WRITTEN};
use crate::plugins::{CGP_DATETIME_YEARLESS, RP_LINE_END};
use crate::readers::grammar::{LineGrammar, LineGrammars, ParseRecord};
use crate::readers::helpers::{record_str, record_u32, RecordError, TimeElements};
use crate::readers::mediator::ParserContext;
use crate::readers::registry::HandlerDescriptor;
use crate::readers::textparser::{TextPlugin, TextPluginClass};
use crate::readers::yearless::{YearLessLogHelper, YearLessLogHelperInfo};

use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

pub static DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "syslog",
    data_format: "System log (syslog) file",
    encoding: None,
    supports_plugins: false,
};

pub static PLUGIN_CLASS: TextPluginClass = TextPluginClass::new(&DESCRIPTOR, SyslogPlugin::new_boxed);

pub const KEY_LINE: &str = "syslog_line";
pub const KEY_REPEATED: &str = "syslog_repeated";
pub const KEY_COMMENT: &str = "syslog_comment";
pub const KEY_RSYSLOG_LINE: &str = "rsyslog_line";

pub const DATA_TYPE_LINE: &str = "syslog:line";
pub const DATA_TYPE_REPEATED: &str = "syslog:repeated";
pub const DATA_TYPE_COMMENT: &str = "syslog:comment";

const CGP_HOSTNAME: &str = r"(?P<hostname>[^\s\[\]:]+)";
/// reporter and optional process identifier, e.g. `cron[1234]:`
const CGP_REPORTER_PID: &str = r"(?P<reporter>[^\s\[\]:]+)(?:\[(?P<pid>[0-9]+)\])?:";
const CGP_BODY: &str = r"(?P<body>[^\r\n]*)";

const RP_LINE: &str = concatcp!(
    CGP_DATETIME_YEARLESS, r"[ ]+", CGP_HOSTNAME, r"[ ]+", CGP_REPORTER_PID, r"[ ]?", CGP_BODY, RP_LINE_END
);
const RP_REPEATED: &str = concatcp!(
    CGP_DATETIME_YEARLESS,
    r"[ ]+",
    CGP_HOSTNAME,
    r"[ ]+last message repeated (?P<times>[0-9]+) times?",
    RP_LINE_END
);
const RP_COMMENT: &str = concatcp!(CGP_DATETIME_YEARLESS, r"[ ]+---[ ](?P<body>[^\r\n]*?)[ ]---", RP_LINE_END);
const RP_RSYSLOG_LINE: &str = concatcp!(
    r"(?P<timestamp>[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]{1,9})?(?:Z|[+-][0-9]{2}:[0-9]{2}))",
    r"[ ]+",
    CGP_HOSTNAME,
    r"[ ]+",
    CGP_REPORTER_PID,
    r"[ ]?",
    CGP_BODY,
    RP_LINE_END
);

static LINE_GRAMMARS: [LineGrammar; 4] = [
    LineGrammar {
        key: KEY_LINE,
        pattern: RP_LINE,
    },
    LineGrammar {
        key: KEY_REPEATED,
        pattern: RP_REPEATED,
    },
    LineGrammar {
        key: KEY_COMMENT,
        pattern: RP_COMMENT,
    },
    LineGrammar {
        key: KEY_RSYSLOG_LINE,
        pattern: RP_RSYSLOG_LINE,
    },
];

/// Parses syslog records; see the [module] documentation.
///
/// [module]: self
#[derive(Debug, Default)]
pub struct SyslogPlugin {
    year_less: YearLessLogHelper,
}

impl SyslogPlugin {
    pub fn new() -> SyslogPlugin {
        SyslogPlugin::default()
    }

    fn new_boxed() -> Box<dyn TextPlugin> {
        Box::new(SyslogPlugin::new())
    }

    fn rsyslog_timestamp(record: &ParseRecord) -> Result<DateTimeL, RecordError> {
        let value: &str = record_str(record, "timestamp")?;
        match datetime_parse_iso8601(value) {
            Some(dt) => Ok(dt),
            None => Err(RecordError::InvalidDateTime(String::from(value))),
        }
    }

    /// Timestamp of a year-less record; advances the year-less helper.
    fn yearless_timestamp(
        &mut self,
        record: &ParseRecord,
    ) -> Result<DateTimeL, RecordError> {
        let elements: TimeElements = TimeElements::from_record(record)?;
        let year = self.year_less.update(elements.month)?;

        elements.to_datetime(year, &fixedoffset_utc())
    }
}

impl TextPlugin for SyslogPlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &DESCRIPTOR
    }

    fn line_grammars(&self) -> LineGrammars {
        &LINE_GRAMMARS
    }

    fn check_required_format(
        &self,
        record: &ParseRecord,
    ) -> bool {
        match record.key.as_str() {
            KEY_RSYSLOG_LINE => Self::rsyslog_timestamp(record).is_ok(),
            _ => match TimeElements::from_record(record) {
                Ok(elements) => elements.is_plausible(),
                Err(_) => false,
            },
        }
    }

    fn begin_file(
        &mut self,
        context: &ParserContext<'_>,
    ) {
        self.year_less
            .set_estimated_year(context.estimated_year(), context.latest_year());
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        key: &str,
        record: &ParseRecord,
    ) -> Result<(), RecordError> {
        let (timestamp, mut event_data): (DateTimeL, EventData) = match key {
            KEY_LINE | KEY_RSYSLOG_LINE => {
                let timestamp = match key {
                    KEY_LINE => self.yearless_timestamp(record)?,
                    _ => Self::rsyslog_timestamp(record)?,
                };
                let mut event_data = EventData::new(DATA_TYPE_LINE)
                    .with("hostname", record_str(record, "hostname")?)
                    .with("reporter", record_str(record, "reporter")?)
                    .with("body", record_str(record, "body")?);
                if record.get("pid").is_some() {
                    event_data.set("pid", record_u32(record, "pid")?);
                }
                (timestamp, event_data)
            }
            KEY_REPEATED => {
                let timestamp = self.yearless_timestamp(record)?;
                let event_data = EventData::new(DATA_TYPE_REPEATED)
                    .with("hostname", record_str(record, "hostname")?)
                    .with("times", record_u32(record, "times")?);
                (timestamp, event_data)
            }
            KEY_COMMENT => {
                let timestamp = self.yearless_timestamp(record)?;
                let event_data = EventData::new(DATA_TYPE_COMMENT).with("body", record_str(record, "body")?);
                (timestamp, event_data)
            }
            _ => return Err(RecordError::invalid_value("key", key)),
        };
        event_data.offset = Some(record.start_offset);
        context.produce_event_with_event_data(Event::new(timestamp, TIME_DESCRIPTION_WRITTEN), event_data);

        Ok(())
    }

    fn year_less_log_helper(&self) -> Option<YearLessLogHelperInfo> {
        Some(self.year_less.year_less_log_helper())
    }
}
