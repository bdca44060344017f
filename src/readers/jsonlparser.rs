// src/readers/jsonlparser.rs

//! Implements the [`JsonlParser`], the parser of line-delimited JSON logs,
//! and its [`LineStreamDispatcher`].
//!
//! Only the first line of a file is used to choose a [`JsonlPlugin`]. It
//! must be a JSON object. Each plugin in turn is asked if it recognizes the
//! object; the first that does is _bound_ to the file and parses every line
//! of it.
//!
//! A later line that is not JSON, not an object, or that the bound plugin
//! fails on is skipped with a warning. It is never offered to another plugin,
//! so a file mixing the shapes of different plugins is parsed by the first
//! plugin only.

#![allow(non_snake_case)]

use crate::common::{Bytes, Count, FileObject, FileOffset, ResultS3};
#[allow(unused_imports)]
use crate::debug::printers::{buffer_to_String_noraw, de_err, de_wrn, e_err, e_wrn};
use crate::readers::decoder::TextDecoder;
use crate::readers::dispatcher::FileParser;
use crate::readers::helpers::{JsonObject, RecordError};
use crate::readers::mediator::ParserContext;
use crate::readers::registry::{HandlerClass, HandlerDescriptor, ParserClass, Registry};
use crate::readers::summary::{SummaryJsonlParser, SummaryParserData};
use crate::readers::textreader::TextReader;

use std::fmt;
use std::io::{ErrorKind, Seek, SeekFrom};
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A plugin of the [`JsonlParser`], one JSON-L log format.
pub trait JsonlPlugin: Send {
    fn descriptor(&self) -> &'static HandlerDescriptor;

    /// Is `object`, the first line of a file, of this plugin's format?
    /// Must be side-effect free; a missing key is `false`.
    fn check_required_format(
        &self,
        object: &JsonObject,
    ) -> bool;

    /// Turn one line into events. `fileoffset` is the offset of the line.
    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        object: &JsonObject,
        fileoffset: FileOffset,
    ) -> Result<(), RecordError>;
}

/// A registrable [`JsonlPlugin`].
#[derive(Clone, Copy)]
pub struct JsonlPluginClass {
    descriptor: &'static HandlerDescriptor,
    constructor: fn() -> Box<dyn JsonlPlugin>,
}

impl JsonlPluginClass {
    pub const fn new(
        descriptor: &'static HandlerDescriptor,
        constructor: fn() -> Box<dyn JsonlPlugin>,
    ) -> JsonlPluginClass {
        JsonlPluginClass {
            descriptor,
            constructor,
        }
    }

    pub fn create(&self) -> Box<dyn JsonlPlugin> {
        (self.constructor)()
    }
}

impl HandlerClass for JsonlPluginClass {
    fn descriptor(&self) -> &HandlerDescriptor {
        self.descriptor
    }
}

impl fmt::Debug for JsonlPluginClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "JsonlPluginClass({})", self.descriptor.name)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineStreamDispatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Binds the first accepting [`JsonlPlugin`] to a file.
pub struct LineStreamDispatcher {
    plugins: Vec<Box<dyn JsonlPlugin>>,
    bound: Option<usize>,
}

impl fmt::Debug for LineStreamDispatcher {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("LineStreamDispatcher")
            .field("plugins", &self.plugin_names())
            .field("bound", &self.bound_name())
            .finish()
    }
}

impl LineStreamDispatcher {
    pub fn new(plugins: Vec<Box<dyn JsonlPlugin>>) -> LineStreamDispatcher {
        LineStreamDispatcher {
            plugins,
            bound: None,
        }
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins
            .iter()
            .map(|plugin| plugin.descriptor().name)
            .collect()
    }

    /// Bind the first plugin recognizing `first`. A bound plugin stays bound.
    /// Returns the bound plugin name.
    pub fn bind(
        &mut self,
        first: &JsonObject,
    ) -> Option<&'static str> {
        if self.bound.is_none() {
            self.bound = self
                .plugins
                .iter()
                .position(|plugin| plugin.check_required_format(first));
        }

        self.bound_name()
    }

    pub fn bound_name(&self) -> Option<&'static str> {
        self.bound
            .map(|index| self.plugins[index].descriptor().name)
    }

    /// The bound plugin.
    pub fn bound_mut(&mut self) -> Option<&mut Box<dyn JsonlPlugin>> {
        match self.bound {
            Some(index) => self.plugins.get_mut(index),
            None => None,
        }
    }

    pub fn unbind(&mut self) {
        self.bound = None;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JsonlParser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub static JSONL_PARSER_DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "jsonl",
    data_format: "JSON-L log file",
    encoding: Some("utf-8"),
    supports_plugins: true,
};

/// The parser of line-delimited JSON logs; see the [module] documentation.
///
/// [module]: self
#[derive(Debug)]
pub struct JsonlParser {
    dispatcher: LineStreamDispatcher,
}

/// Decode one line as a JSON object.
fn parse_object(line: &[u8]) -> Result<JsonObject, String> {
    match ::serde_json::from_slice::<::serde_json::Value>(line) {
        Ok(::serde_json::Value::Object(object)) => Ok(object),
        Ok(_) => Err(String::from("not a JSON object")),
        Err(err) => Err(err.to_string()),
    }
}

/// Only whitespace?
fn is_blank(line: &[u8]) -> bool {
    line.iter()
        .all(|b| b.is_ascii_whitespace())
}

impl JsonlParser {
    /// The first line is read at most this far. A longer first line is
    /// rejected.
    pub const FIRST_LINE_SZ_MAX: usize = 0x10000;

    pub fn new(plugins: Vec<Box<dyn JsonlPlugin>>) -> JsonlParser {
        JsonlParser {
            dispatcher: LineStreamDispatcher::new(plugins),
        }
    }

    /// The registrable class of a `JsonlParser` owning `plugins`.
    pub fn parser_class(plugins: Registry<JsonlPluginClass>) -> ParserClass {
        let descriptors: Vec<HandlerDescriptor> = plugins
            .iter()
            .map(|(_, class)| *class.descriptor())
            .collect();
        let plugins: Arc<Registry<JsonlPluginClass>> = Arc::new(plugins);

        ParserClass::with_plugins(
            JSONL_PARSER_DESCRIPTOR,
            descriptors,
            Box::new(move |enabled: &[String]| {
                let instances: Vec<Box<dyn JsonlPlugin>> = enabled
                    .iter()
                    .filter_map(|name| plugins.lookup(name))
                    .map(|class| class.create())
                    .collect();
                Box::new(JsonlParser::new(instances)) as Box<dyn FileParser>
            }),
        )
    }

    /// Name of the plugin bound to the file.
    pub fn bound_plugin(&self) -> Option<&'static str> {
        self.dispatcher.bound_name()
    }

    /// Read the first line of `file`, at most [`Self::FIRST_LINE_SZ_MAX`]
    /// bytes, and decode it as a JSON object.
    fn read_first_object(file: &mut dyn FileObject) -> Option<JsonObject> {
        let mut reader = match TextReader::with_line_sz_max(file, TextDecoder::default(), Self::FIRST_LINE_SZ_MAX) {
            Ok(val) => val,
            Err(_) => return None,
        };
        let line: Bytes = match reader.read_line() {
            ResultS3::Found((_, line)) => line,
            ResultS3::Done | ResultS3::Err(_) => return None,
        };
        if line.len() >= Self::FIRST_LINE_SZ_MAX && line.last() != Some(&b'\n') {
            defo!("first line too long");
            return None;
        }
        match parse_object(&line) {
            Ok(object) => Some(object),
            Err(_err) => {
                defo!("first line {:?}: {}", buffer_to_String_noraw(&line), _err);
                None
            }
        }
    }
}

impl FileParser for JsonlParser {
    fn descriptor(&self) -> &HandlerDescriptor {
        &JSONL_PARSER_DESCRIPTOR
    }

    fn check_required_format(
        &mut self,
        context: &ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> bool {
        defn!("({:?})", context.display_name());
        self.dispatcher.unbind();
        let first: Option<JsonObject> = Self::read_first_object(file);
        let rewound: bool = file.seek(SeekFrom::Start(0)).is_ok();
        let first: JsonObject = match first {
            Some(val) => val,
            None => {
                defx!("first line is not a JSON object");
                return false;
            }
        };
        let _bound = self.dispatcher.bind(&first);
        defx!("bound {:?}", _bound);

        rewound && _bound.is_some()
    }

    fn parse_file(
        &mut self,
        context: &mut ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> std::io::Result<SummaryParserData> {
        if self.dispatcher.bound_name().is_none() && !self.check_required_format(context, file) {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("no JSON-L plugin recognized {:?}", context.display_name()),
            ));
        }
        let plugin: &mut Box<dyn JsonlPlugin> = match self.dispatcher.bound_mut() {
            Some(val) => val,
            None => return Err(std::io::Error::new(ErrorKind::InvalidInput, "no bound JSON-L plugin")),
        };
        let mut context = context.push_chain(plugin.descriptor().name);
        let mut summary = SummaryJsonlParser {
            JsonlParser_plugin: String::from(plugin.descriptor().name),
            ..Default::default()
        };
        // a record is never split, however long
        let mut reader: TextReader = TextReader::with_line_sz_max(file, TextDecoder::default(), usize::MAX)?;
        loop {
            if context.abort() {
                defo!("abort");
                summary.JsonlParser_aborted = true;
                break;
            }
            let (fileoffset, line): (FileOffset, Bytes) = match reader.read_line() {
                ResultS3::Found(val) => val,
                ResultS3::Done => break,
                ResultS3::Err(err) => return Err(err),
            };
            summary.JsonlParser_lines += 1;
            let line_number: Count = summary.JsonlParser_lines;
            if is_blank(&line) {
                summary.JsonlParser_lines_empty += 1;
                continue;
            }
            let object: JsonObject = match parse_object(&line) {
                Ok(val) => val,
                Err(err) => {
                    summary.JsonlParser_json_failures += 1;
                    context.produce_extraction_warning(format!(
                        "unable to parse JSON line: {} at offset {}: {}",
                        line_number, fileoffset, err,
                    ));
                    continue;
                }
            };
            match plugin.parse_record(&mut context, &object, fileoffset) {
                Ok(()) => summary.JsonlParser_records += 1,
                Err(err) => {
                    summary.JsonlParser_record_failures += 1;
                    context.produce_extraction_warning(format!(
                        "unable to parse record: line {} at offset {} with error: {}",
                        line_number, fileoffset, err,
                    ));
                }
            }
        }
        defo!("{:?}", summary);

        Ok(SummaryParserData::Jsonl(summary))
    }
}
