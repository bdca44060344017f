// src/readers/textparser.rs

//! Implements the [`TextParser`], the parser of line-oriented text logs, and
//! its [`GrammarEngine`].
//!
//! ## Overview
//!
//! The `TextParser` owns a family of [`TextPlugin`]s. Each plugin declares
//! line grammars (and optionally a header grammar). To recognize a file, each
//! plugin in turn has its grammars matched against the first
//! [`TextParser::PROBE_PREFIX_SZ`] bytes of the file; the
//! first plugin whose grammar matches, and whose [`check_required_format`]
//! agrees, parses the whole file.
//!
//! The `GrammarEngine` is a state machine,
//! `AwaitingHeader → ScanningBody → Finalized`, over the bounded line window
//! of a [`TextReader`]. Each step matches the [`CombinedGrammar`] against the
//! window and consumes exactly the matched bytes. A line that matches nothing
//! is skipped with a warning. After more than
//! [`TextParser::MAXIMUM_CONSECUTIVE_LINE_FAILURES`] consecutive failures the
//! remainder of the file is abandoned with one warning.
//!
//! [`check_required_format`]: TextPlugin::check_required_format
//! [`TextReader`]: crate::readers::textreader::TextReader

use crate::common::{Bytes, Count, FileObject};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn, str_to_String_noraw};
use crate::readers::decoder::TextDecoder;
use crate::readers::dispatcher::FileParser;
use crate::readers::grammar::{CombinedGrammar, GrammarError, LineGrammars, ParseRecord};
use crate::readers::helpers::RecordError;
use crate::readers::mediator::ParserContext;
use crate::readers::registry::{HandlerClass, HandlerDescriptor, ParserClass, Registry};
use crate::readers::summary::{SummaryParserData, SummaryTextParser};
use crate::readers::textreader::TextReader;
use crate::readers::yearless::YearLessLogHelperInfo;

use std::fmt;
use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TextPlugin
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A plugin of the [`TextParser`], one text log format.
pub trait TextPlugin: Send {
    fn descriptor(&self) -> &'static HandlerDescriptor;

    /// Grammars of the records of the file body.
    fn line_grammars(&self) -> LineGrammars;

    /// Grammars of a header that must start the file.
    fn header_grammars(&self) -> Option<LineGrammars> {
        None
    }

    /// Verify the first record (the header, if declared) found at the start
    /// of a file. Must be side-effect free.
    fn check_required_format(
        &self,
        record: &ParseRecord,
    ) -> bool;

    /// Prepare for a new file, e.g. seed a year-less helper from the
    /// estimated year.
    fn begin_file(
        &mut self,
        _context: &ParserContext<'_>,
    ) {
    }

    fn parse_header(
        &mut self,
        _context: &mut ParserContext<'_>,
        _record: &ParseRecord,
    ) -> Result<(), RecordError> {
        Ok(())
    }

    /// Turn one record of the file body into events.
    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        key: &str,
        record: &ParseRecord,
    ) -> Result<(), RecordError>;

    /// Year-less log details, for plugins of year-less formats.
    fn year_less_log_helper(&self) -> Option<YearLessLogHelperInfo> {
        None
    }
}

/// A registrable [`TextPlugin`].
#[derive(Clone, Copy)]
pub struct TextPluginClass {
    descriptor: &'static HandlerDescriptor,
    constructor: fn() -> Box<dyn TextPlugin>,
}

impl TextPluginClass {
    pub const fn new(
        descriptor: &'static HandlerDescriptor,
        constructor: fn() -> Box<dyn TextPlugin>,
    ) -> TextPluginClass {
        TextPluginClass {
            descriptor,
            constructor,
        }
    }

    pub fn create(&self) -> Box<dyn TextPlugin> {
        (self.constructor)()
    }
}

impl HandlerClass for TextPluginClass {
    fn descriptor(&self) -> &HandlerDescriptor {
        self.descriptor
    }
}

impl fmt::Debug for TextPluginClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "TextPluginClass({})", self.descriptor.name)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GrammarEngine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// States of a [`GrammarEngine`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GrammarEngineState {
    /// Only for plugins declaring a header grammar.
    #[default]
    AwaitingHeader,
    ScanningBody,
    Finalized,
}

/// The outcome of matching a grammar against the window.
#[derive(Debug)]
enum WindowMatch {
    /// a record and the extent of its text in the window
    Found(ParseRecord, usize),
    NoMatch,
    /// the match starts on a later line; the first line would be skipped
    /// silently
    NotAtStart(ParseRecord),
    Error(GrammarError),
}

/// Runs the grammars of one plugin over one file.
#[derive(Debug)]
pub struct GrammarEngine {
    body: CombinedGrammar,
    header: Option<CombinedGrammar>,
    state: GrammarEngineState,
    consecutive_failures: Count,
    records: Count,
    record_failures: Count,
    line_failures: Count,
    too_many_failures: bool,
    aborted: bool,
    header_mismatch: bool,
}

impl GrammarEngine {
    pub fn new(plugin: &dyn TextPlugin) -> Result<GrammarEngine, GrammarError> {
        let body = CombinedGrammar::new(plugin.line_grammars())?;
        let header = match plugin.header_grammars() {
            Some(grammars) => Some(CombinedGrammar::new(grammars)?),
            None => None,
        };
        let state = match header {
            Some(_) => GrammarEngineState::AwaitingHeader,
            None => GrammarEngineState::ScanningBody,
        };

        Ok(GrammarEngine {
            body,
            header,
            state,
            consecutive_failures: 0,
            records: 0,
            record_failures: 0,
            line_failures: 0,
            too_many_failures: false,
            aborted: false,
            header_mismatch: false,
        })
    }

    pub const fn state(&self) -> GrammarEngineState {
        self.state
    }

    /// Match `grammar` against the window of `reader`.
    fn match_window(
        grammar: &CombinedGrammar,
        reader: &TextReader,
    ) -> WindowMatch {
        let window: &str = reader.window();
        let found = match grammar.scan(window) {
            Ok(Some(val)) => val,
            Ok(None) => return WindowMatch::NoMatch,
            Err(err) => return WindowMatch::Error(err),
        };
        // an empty match consumes nothing
        if found.end == 0 {
            return WindowMatch::NoMatch;
        }
        let record = ParseRecord {
            key: String::from(found.key),
            start_offset: reader.fileoffset_at(found.start),
            end_offset: reader.fileoffset_at(found.end),
            fields: found.fields,
        };
        if window[..found.start].contains('\n') {
            return WindowMatch::NotAtStart(record);
        }

        WindowMatch::Found(record, found.end)
    }

    /// Does the start of the file match, and does `plugin` agree?
    /// Reads only the first window of `reader`.
    pub fn check(
        &self,
        plugin: &dyn TextPlugin,
        reader: &mut TextReader,
    ) -> std::io::Result<bool> {
        reader.read_lines()?;
        if reader.is_empty() {
            return Ok(false);
        }
        let grammar: &CombinedGrammar = self.header.as_ref().unwrap_or(&self.body);
        match Self::match_window(grammar, reader) {
            WindowMatch::Found(record, _) if record.start_offset == 0 => Ok(plugin.check_required_format(&record)),
            _ => Ok(false),
        }
    }

    fn forward_decode_warnings(
        context: &mut ParserContext<'_>,
        reader: &mut TextReader,
    ) {
        for warning in reader.drain_decode_warnings() {
            context.produce_extraction_warning(warning.to_string());
        }
    }

    /// Refill the window of `reader`.
    fn refill(
        context: &mut ParserContext<'_>,
        reader: &mut TextReader,
    ) -> std::io::Result<()> {
        reader.read_lines()?;
        Self::forward_decode_warnings(context, reader);

        Ok(())
    }

    /// Record a line failure; the first line of the window is skipped.
    /// Returns `false` if there were too many consecutive failures and the
    /// remainder of the file was abandoned.
    fn line_failure(
        &mut self,
        context: &mut ParserContext<'_>,
        reader: &mut TextReader,
        reason: Option<String>,
    ) -> bool {
        let line_number: Count = reader.line_number();
        let fileoffset = reader.window_fileoffset();
        let line: String = str_to_String_noraw(reader.first_line());
        reader.skip_first_line();
        self.line_failures += 1;
        self.consecutive_failures += 1;
        match reason {
            Some(reason) => context.produce_extraction_warning(format!(
                "unable to parse log line: {} at offset {}: {}: {:?}",
                line_number, fileoffset, reason, line,
            )),
            None => context.produce_extraction_warning(format!(
                "unable to parse log line: {} at offset {}: {:?}",
                line_number, fileoffset, line,
            )),
        }
        if self.consecutive_failures > TextParser::MAXIMUM_CONSECUTIVE_LINE_FAILURES {
            context.produce_extraction_warning(format!(
                "more than {} consecutive failures to parse lines, remainder of file skipped",
                TextParser::MAXIMUM_CONSECUTIVE_LINE_FAILURES,
            ));
            self.too_many_failures = true;
            reader.abandon();
            return false;
        }

        true
    }

    /// Parse the whole file of `reader` with `plugin`.
    ///
    /// Returns `false` if a declared header did not match; nothing else of
    /// the file is parsed then.
    pub fn run(
        &mut self,
        context: &mut ParserContext<'_>,
        plugin: &mut dyn TextPlugin,
        reader: &mut TextReader,
    ) -> std::io::Result<bool> {
        defn!("({:?})", plugin.descriptor().name);
        Self::refill(context, reader)?;
        if let Some(header) = &self.header {
            debug_assert_eq!(self.state, GrammarEngineState::AwaitingHeader);
            match Self::match_window(header, reader) {
                WindowMatch::Found(record, end) if record.start_offset == reader.window_fileoffset() => {
                    defo!("header {}", record);
                    reader.consume(end);
                    match plugin.parse_header(context, &record) {
                        Ok(()) => self.records += 1,
                        Err(err) => {
                            context.produce_extraction_warning(format!(
                                "unable to parse header: {} with error: {}",
                                record.key, err
                            ));
                            self.record_failures += 1;
                        }
                    }
                }
                _ => {
                    defx!("header mismatch");
                    self.header_mismatch = true;
                    self.state = GrammarEngineState::Finalized;
                    reader.abandon();
                    return Ok(false);
                }
            }
        }
        self.state = GrammarEngineState::ScanningBody;
        loop {
            if context.abort() {
                defo!("abort");
                self.aborted = true;
                reader.abandon();
                break;
            }
            if reader.is_empty() {
                Self::refill(context, reader)?;
                if reader.is_empty() {
                    break;
                }
            }
            match Self::match_window(&self.body, reader) {
                WindowMatch::Found(record, end) => {
                    self.consecutive_failures = 0;
                    reader.consume(end);
                    match plugin.parse_record(context, &record.key, &record) {
                        Ok(()) => self.records += 1,
                        Err(err) => {
                            context.produce_extraction_warning(format!(
                                "unable to parse record: {} at offset {} with error: {}",
                                record.key, record.start_offset, err
                            ));
                            self.record_failures += 1;
                        }
                    }
                }
                WindowMatch::NoMatch => {
                    if !self.line_failure(context, reader, None) {
                        break;
                    }
                }
                WindowMatch::NotAtStart(_record) => {
                    defo!("match {} not at start of window", _record);
                    if !self.line_failure(context, reader, None) {
                        break;
                    }
                }
                WindowMatch::Error(err) => {
                    if !self.line_failure(context, reader, Some(err.to_string())) {
                        break;
                    }
                }
            }
            Self::refill(context, reader)?;
        }
        self.state = GrammarEngineState::Finalized;
        defx!("records {}, line failures {}", self.records, self.line_failures);

        Ok(true)
    }

    /// Summary of the run so far.
    pub fn summary(
        &self,
        plugin: &dyn TextPlugin,
        reader: &TextReader,
    ) -> SummaryTextParser {
        SummaryTextParser {
            TextParser_plugin: String::from(plugin.descriptor().name),
            TextParser_encoding: String::from(reader.encoding_name()),
            TextParser_records: self.records,
            TextParser_record_failures: self.record_failures,
            TextParser_line_failures: self.line_failures,
            TextParser_too_many_failures: self.too_many_failures,
            TextParser_aborted: self.aborted,
            TextParser_header_mismatch: self.header_mismatch,
            TextParser_year_less: plugin.year_less_log_helper(),
            reader: reader.summary(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TextParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub static TEXT_PARSER_DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "text",
    data_format: "Text-based log file",
    encoding: None,
    supports_plugins: true,
};

/// The parser of line-oriented text logs; see the [module] documentation.
///
/// [module]: self
pub struct TextParser {
    plugins: Vec<Box<dyn TextPlugin>>,
    /// compiled grammars of the plugin that recognized the file
    engine: Option<GrammarEngine>,
    active: Option<usize>,
}

impl fmt::Debug for TextParser {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("TextParser")
            .field(
                "plugins",
                &self
                    .plugins
                    .iter()
                    .map(|p| p.descriptor().name)
                    .collect::<Vec<&str>>(),
            )
            .field("active", &self.active_plugin())
            .finish()
    }
}

impl TextParser {
    /// After more than this many lines in a row fail to parse the rest of
    /// the file is skipped.
    pub const MAXIMUM_CONSECUTIVE_LINE_FAILURES: Count = 20;
    /// Bytes at the start of a file read to recognize it: checked for `NUL`,
    /// then scanned by each plugin's grammars.
    pub const PROBE_PREFIX_SZ: u64 = 0x1000;
    /// More `NUL` bytes than this in the probe prefix means a binary file.
    pub const PROBE_NULL_BYTES_MAX: usize = 0;

    pub fn new(plugins: Vec<Box<dyn TextPlugin>>) -> TextParser {
        TextParser {
            plugins,
            engine: None,
            active: None,
        }
    }

    /// The registrable class of a `TextParser` owning `plugins`.
    pub fn parser_class(plugins: Registry<TextPluginClass>) -> ParserClass {
        let descriptors: Vec<HandlerDescriptor> = plugins
            .iter()
            .map(|(_, class)| *class.descriptor())
            .collect();
        let plugins: Arc<Registry<TextPluginClass>> = Arc::new(plugins);

        ParserClass::with_plugins(
            TEXT_PARSER_DESCRIPTOR,
            descriptors,
            Box::new(move |enabled: &[String]| {
                let instances: Vec<Box<dyn TextPlugin>> = enabled
                    .iter()
                    .filter_map(|name| plugins.lookup(name))
                    .map(|class| class.create())
                    .collect();
                Box::new(TextParser::new(instances)) as Box<dyn FileParser>
            }),
        )
    }

    /// Name of the plugin that recognized the file.
    pub fn active_plugin(&self) -> Option<&'static str> {
        self.active
            .map(|index| self.plugins[index].descriptor().name)
    }

    /// The decoder for `plugin`: its own encoding, else the code page.
    /// An unknown label falls back to UTF-8 and returns a warning message.
    fn decoder_for(
        plugin: &dyn TextPlugin,
        code_page: &str,
    ) -> (TextDecoder, Option<String>) {
        let label: &str = plugin
            .descriptor()
            .encoding
            .unwrap_or(code_page);
        match TextDecoder::for_label(label) {
            Some(decoder) => (decoder, None),
            None => (
                TextDecoder::default(),
                Some(format!("unsupported encoding {:?}, using UTF-8", label)),
            ),
        }
    }

    /// Read at most [`TextParser::PROBE_PREFIX_SZ`] bytes from the start of
    /// `file`, leaving it at offset zero.
    fn read_prefix(file: &mut dyn FileObject) -> std::io::Result<Bytes> {
        file.seek(SeekFrom::Start(0))?;
        let mut prefix: Bytes = Bytes::with_capacity(Self::PROBE_PREFIX_SZ as usize);
        (&mut *file)
            .take(Self::PROBE_PREFIX_SZ)
            .read_to_end(&mut prefix)?;
        file.seek(SeekFrom::Start(0))?;

        Ok(prefix)
    }

    /// Does `prefix` have more `NUL` bytes than a text file would?
    fn is_binary(prefix: &[u8]) -> bool {
        let nulls: usize = prefix
            .iter()
            .filter(|b| **b == 0)
            .count();

        nulls > Self::PROBE_NULL_BYTES_MAX
    }
}

impl FileParser for TextParser {
    fn descriptor(&self) -> &HandlerDescriptor {
        &TEXT_PARSER_DESCRIPTOR
    }

    fn check_required_format(
        &mut self,
        context: &ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> bool {
        defn!("({:?})", context.display_name());
        self.active = None;
        self.engine = None;
        let prefix: Bytes = match Self::read_prefix(file) {
            Ok(val) => val,
            Err(_err) => {
                defx!("error {}", _err);
                return false;
            }
        };
        if Self::is_binary(&prefix) {
            defx!("binary file");
            return false;
        }
        for (index, plugin) in self.plugins.iter().enumerate() {
            let engine: GrammarEngine = match GrammarEngine::new(plugin.as_ref()) {
                Ok(val) => val,
                Err(err) => {
                    de_err!("plugin {:?} grammar error {}", plugin.descriptor().name, err);
                    continue;
                }
            };
            let (decoder, _) = Self::decoder_for(plugin.as_ref(), context.code_page());
            // only the prefix is ever scanned
            let mut probe: Cursor<&[u8]> = Cursor::new(prefix.as_slice());
            let recognized: bool =
                match TextReader::with_line_sz_max(&mut probe, decoder, Self::PROBE_PREFIX_SZ as usize) {
                    Ok(mut reader) => engine
                        .check(plugin.as_ref(), &mut reader)
                        .unwrap_or(false),
                    Err(_) => false,
                };
            if recognized {
                defx!("plugin {:?} recognized", plugin.descriptor().name);
                self.engine = Some(engine);
                self.active = Some(index);
                return file.seek(SeekFrom::Start(0)).is_ok();
            }
            defo!("plugin {:?} rejected", plugin.descriptor().name);
        }
        let _ = file.seek(SeekFrom::Start(0));
        defx!("no plugin recognized");

        false
    }

    fn parse_file(
        &mut self,
        context: &mut ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> std::io::Result<SummaryParserData> {
        if self.active.is_none() && !self.check_required_format(context, file) {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("no text plugin recognized {:?}", context.display_name()),
            ));
        }
        let index: usize = match self.active {
            Some(val) => val,
            None => return Err(std::io::Error::new(ErrorKind::InvalidInput, "no active text plugin")),
        };
        let plugin: &mut Box<dyn TextPlugin> = &mut self.plugins[index];
        let mut engine: GrammarEngine = match self.engine.take() {
            Some(val) => val,
            None => GrammarEngine::new(plugin.as_ref()).map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?,
        };
        let mut context = context.push_chain(plugin.descriptor().name);
        let (decoder, warning) = Self::decoder_for(plugin.as_ref(), context.code_page());
        if let Some(warning) = warning {
            context.produce_extraction_warning(warning);
        }
        plugin.begin_file(&context);
        let mut reader: TextReader = TextReader::new(file, decoder)?;
        engine.run(&mut context, plugin.as_mut(), &mut reader)?;
        let summary: SummaryTextParser = engine.summary(plugin.as_ref(), &reader);
        defo!("{:?}", summary);

        Ok(SummaryParserData::Text(summary))
    }
}
