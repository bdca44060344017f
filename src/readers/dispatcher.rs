// src/readers/dispatcher.rs

//! Implements the [`Dispatcher`], matching a file to a parser and running it.
//!
//! Candidate parsers are those a [`FilterExpression`] resolves from the
//! [`ParserRegistry`], in registration order. [`Dispatcher::probe`] asks
//! each candidate, a fresh instance, to [`check_required_format`]; the first
//! that accepts wins. [`Dispatcher::run`] then runs the winner with its name
//! pushed onto the provenance chain.
//!
//! A probe reads a bounded prefix of the file. The file is rewound to offset
//! zero before and after every probe.
//!
//! [`check_required_format`]: FileParser::check_required_format

use crate::common::{FileObject, FileOffset};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::filter::FilterExpression;
use crate::readers::mediator::ParserContext;
use crate::readers::registry::{HandlerDescriptor, ParserRegistry, ResolvedParser};
use crate::readers::summary::SummaryParserData;

use std::fmt;
use std::io::{Seek, SeekFrom};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

/// A parser of a whole file.
pub trait FileParser {
    fn descriptor(&self) -> &HandlerDescriptor;

    /// Does the file look like this parser's format?
    ///
    /// Reads a bounded prefix of `file`. Never produces events or warnings.
    fn check_required_format(
        &mut self,
        context: &ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> bool;

    /// Extract everything from `file`.
    ///
    /// Problems with the content become extraction warnings. Only I/O
    /// errors are returned.
    fn parse_file(
        &mut self,
        context: &mut ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> std::io::Result<SummaryParserData>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No candidate parser recognized the file.
    #[error("no parser recognized {0:?}")]
    NoMatch(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The parser that won a [`Dispatcher::probe`].
pub struct MatchedParser {
    pub name: String,
    pub parser: Box<dyn FileParser>,
}

impl fmt::Debug for MatchedParser {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("MatchedParser")
            .field("name", &self.name)
            .finish()
    }
}

/// Result of [`Dispatcher::process`].
#[derive(Debug)]
pub struct ProcessedFile {
    /// provenance chain at the top of the run, the parser name
    pub parser: String,
    pub summary: SummaryParserData,
}

/// Matches files to candidate parsers.
#[derive(Debug)]
pub struct Dispatcher<'r> {
    candidates: Vec<ResolvedParser<'r>>,
}

fn rewind(file: &mut dyn FileObject) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;

    Ok(())
}

impl<'r> Dispatcher<'r> {
    /// A `Dispatcher` for the parsers of `registry` selected by `filter`.
    pub fn new(
        registry: &'r ParserRegistry,
        filter: &FilterExpression,
    ) -> Dispatcher<'r> {
        Dispatcher {
            candidates: registry.resolve_filter(filter),
        }
    }

    /// Candidates, in the order they are tried.
    pub fn candidates(&self) -> &[ResolvedParser<'r>] {
        &self.candidates
    }

    /// Find the first candidate that recognizes `file`.
    ///
    /// Returns `DispatchError::NoMatch` if none do.
    pub fn probe(
        &self,
        context: &ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> Result<MatchedParser, DispatchError> {
        defn!("({:?})", context.display_name());
        for candidate in self.candidates.iter() {
            rewind(file)?;
            let mut parser: Box<dyn FileParser> = candidate.create();
            let recognized: bool = parser.check_required_format(context, file);
            let _position: FileOffset = file.stream_position()?;
            if _position != 0 {
                de_wrn!("parser {:?} left the file at offset {}", candidate.name, _position);
            }
            rewind(file)?;
            if recognized {
                defx!("{:?} recognized {:?}", candidate.name, context.display_name());
                return Ok(MatchedParser {
                    name: candidate.name.clone(),
                    parser,
                });
            }
            defo!("{:?} rejected", candidate.name);
        }
        defx!("no match");

        Err(DispatchError::NoMatch(String::from(context.display_name())))
    }

    /// Run `matched` over `file` with its name pushed on the provenance
    /// chain. The name is popped on every exit path.
    pub fn run(
        &self,
        context: &mut ParserContext<'_>,
        matched: &mut MatchedParser,
        file: &mut dyn FileObject,
    ) -> std::io::Result<SummaryParserData> {
        defn!("({:?})", matched.name);
        let mut context = context.push_chain(&matched.name);
        rewind(file)?;
        let result = matched
            .parser
            .parse_file(&mut context, file);
        defx!("({:?}) ok {}", matched.name, result.is_ok());

        result
    }

    /// [`probe`] then [`run`].
    ///
    /// [`probe`]: Dispatcher::probe
    /// [`run`]: Dispatcher::run
    pub fn process(
        &self,
        context: &mut ParserContext<'_>,
        file: &mut dyn FileObject,
    ) -> Result<ProcessedFile, DispatchError> {
        let mut matched: MatchedParser = self.probe(context, file)?;
        let summary: SummaryParserData = self.run(context, &mut matched, file)?;

        Ok(ProcessedFile {
            parser: matched.name,
            summary,
        })
    }
}
