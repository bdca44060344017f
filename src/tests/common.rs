// src/tests/common.rs

//! Common data and helpers for tests.

#![allow(non_upper_case_globals)]

use crate::common::Count;
use crate::data::datetime::Year;
use crate::readers::dispatcher::FileParser;
use crate::readers::mediator::{BufferedMediator, ParserContext};
use crate::readers::summary::SummaryParserData;

use std::io::Cursor;

/// Estimated year of test files.
pub const YEAR_EST: Year = 2020;

/// Ten well-formed syslog lines, in January.
pub const SYSLOG_10: &str = "\
Jan  1 00:00:00 host1 cron[100]: line 1
Jan  1 00:00:01 host1 cron[100]: line 2
Jan  1 00:00:02 host1 kernel: line 3
Jan  1 00:00:03 host1 kernel: line 4
Jan  1 00:00:04 host1 sshd[22]: line 5
Jan  1 00:00:05 host1 sshd[22]: line 6
Jan  1 00:00:06 host1 sshd[22]: line 7
Jan  1 00:00:07 host1 su: line 8
Jan  1 00:00:08 host1 su: line 9
Jan  1 00:00:09 host1 su: line 10
";

/// A `BufferedMediator` for a test file.
pub fn new_mediator() -> BufferedMediator {
    BufferedMediator::new("test-file", YEAR_EST)
}

/// Result of [`run_parser`].
pub struct ParserRun {
    pub recognized: bool,
    pub summary: Option<SummaryParserData>,
    pub mediator: BufferedMediator,
}

impl ParserRun {
    pub fn events_len(&self) -> Count {
        self.mediator.events().len() as Count
    }

    pub fn warnings_len(&self) -> Count {
        self.mediator.warnings().len() as Count
    }

    /// Warnings whose message contains `pattern`.
    pub fn warnings_containing(
        &self,
        pattern: &str,
    ) -> Count {
        self.mediator
            .warnings()
            .iter()
            .filter(|w| w.message.contains(pattern))
            .count() as Count
    }
}

/// Probe `data` with `parser` and, if recognized, parse it.
pub fn run_parser(
    parser: &mut dyn FileParser,
    mut mediator: BufferedMediator,
    data: &[u8],
) -> ParserRun {
    let mut file = Cursor::new(data.to_vec());
    let (recognized, summary) = {
        let mut context = ParserContext::new(&mut mediator);
        let recognized: bool = parser.check_required_format(&context, &mut file);
        assert_eq!(file.position(), 0, "probe did not rewind");
        assert_eq!(context.warnings_produced(), 0, "probe produced warnings");
        assert_eq!(context.events_produced(), 0, "probe produced events");
        let summary = match recognized {
            true => Some(
                parser
                    .parse_file(&mut context, &mut file)
                    .unwrap(),
            ),
            false => None,
        };
        assert_eq!(context.chain_len(), 0, "chain not popped");
        (recognized, summary)
    };

    ParserRun {
        recognized,
        summary,
        mediator,
    }
}
