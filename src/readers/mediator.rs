// src/readers/mediator.rs

//! The [`Mediator`] is where parsers send what they extract, and where they
//! learn about the file being parsed.
//!
//! Parsers do not hold a `Mediator` directly. They are passed a
//! [`ParserContext`] which adds the _provenance chain_, the stack of handler
//! names active for the current file, e.g. `text/syslog`. Every event and
//! warning is stamped with the chain.
//!
//! [`ParserContext::push_chain`] returns a [`ChainGuard`]; dropping the guard
//! pops the name, on every exit path.

use crate::common::{Count, CHAIN_SEP};
use crate::data::datetime::Year;
use crate::data::event::{Event, EventData, ExtractionWarning};

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Receives extracted events and warnings, provides context of the file.
pub trait Mediator {
    /// Receive event data that carries no separate timeline event.
    fn produce_event_data(
        &mut self,
        event_data: EventData,
    );

    /// Receive an event and the event data it refers to.
    fn produce_event_with_event_data(
        &mut self,
        event: Event,
        event_data: EventData,
    );

    fn produce_extraction_warning(
        &mut self,
        warning: ExtractionWarning,
    );

    /// Name of the file for display, e.g. a path.
    fn display_name(&self) -> &str;

    /// Encoding label for text without a known encoding, e.g. `"utf-8"`.
    fn code_page(&self) -> &str;

    /// Estimated year of the first record of the file, typically the year
    /// of the file modification time.
    fn estimated_year(&self) -> Year;

    /// The latest year a record of the file could be in.
    fn latest_year(&self) -> Option<Year>;

    /// Processing should stop as soon as possible.
    fn abort(&self) -> bool;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BufferedMediator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An event as held by a [`BufferedMediator`]. `event` is `None` for event
/// data produced without an event.
#[derive(Clone, Debug, PartialEq)]
pub struct ProducedEvent {
    pub event: Option<Event>,
    pub event_data: EventData,
}

/// A [`Mediator`] that stores everything produced, for one file.
#[derive(Debug)]
pub struct BufferedMediator {
    display_name: String,
    code_page: String,
    estimated_year: Year,
    latest_year: Option<Year>,
    abort: Arc<AtomicBool>,
    events: Vec<ProducedEvent>,
    warnings: Vec<ExtractionWarning>,
}

impl BufferedMediator {
    /// Default code page.
    pub const CODE_PAGE_DEFAULT: &'static str = "utf-8";

    pub fn new(
        display_name: &str,
        estimated_year: Year,
    ) -> BufferedMediator {
        BufferedMediator {
            display_name: String::from(display_name),
            code_page: String::from(Self::CODE_PAGE_DEFAULT),
            estimated_year,
            latest_year: None,
            abort: Arc::new(AtomicBool::new(false)),
            events: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_code_page(
        mut self,
        code_page: &str,
    ) -> BufferedMediator {
        self.code_page = String::from(code_page);

        self
    }

    pub fn with_latest_year(
        mut self,
        latest_year: Option<Year>,
    ) -> BufferedMediator {
        self.latest_year = latest_year;

        self
    }

    /// Share an abort flag, e.g. one set by a signal handler.
    pub fn with_abort(
        mut self,
        abort: Arc<AtomicBool>,
    ) -> BufferedMediator {
        self.abort = abort;

        self
    }

    /// The abort flag polled by [`Mediator::abort`].
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        self.abort.clone()
    }

    pub fn events(&self) -> &[ProducedEvent] {
        &self.events
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Take the stored events and warnings, leaving none.
    pub fn take(&mut self) -> (Vec<ProducedEvent>, Vec<ExtractionWarning>) {
        (std::mem::take(&mut self.events), std::mem::take(&mut self.warnings))
    }
}

impl Mediator for BufferedMediator {
    fn produce_event_data(
        &mut self,
        event_data: EventData,
    ) {
        self.events.push(ProducedEvent {
            event: None,
            event_data,
        });
    }

    fn produce_event_with_event_data(
        &mut self,
        event: Event,
        event_data: EventData,
    ) {
        self.events.push(ProducedEvent {
            event: Some(event),
            event_data,
        });
    }

    fn produce_extraction_warning(
        &mut self,
        warning: ExtractionWarning,
    ) {
        defñ!("{}", warning);
        self.warnings.push(warning);
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn code_page(&self) -> &str {
        &self.code_page
    }

    fn estimated_year(&self) -> Year {
        self.estimated_year
    }

    fn latest_year(&self) -> Option<Year> {
        self.latest_year
    }

    fn abort(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ParserContext
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`Mediator`] plus the provenance chain of the current file.
pub struct ParserContext<'m> {
    mediator: &'m mut dyn Mediator,
    chain: Vec<String>,
    events_produced: Count,
    warnings_produced: Count,
}

impl<'m> ParserContext<'m> {
    pub fn new(mediator: &'m mut dyn Mediator) -> ParserContext<'m> {
        ParserContext {
            mediator,
            chain: Vec::new(),
            events_produced: 0,
            warnings_produced: 0,
        }
    }

    /// Push `name` onto the provenance chain until the returned guard drops.
    pub fn push_chain<'c>(
        &'c mut self,
        name: &str,
    ) -> ChainGuard<'c, 'm> {
        defñ!("({:?})", name);
        self.chain.push(String::from(name));

        ChainGuard { context: self }
    }

    /// The provenance chain, e.g. `"text/syslog"`.
    pub fn parser_chain(&self) -> String {
        self.chain
            .join(&CHAIN_SEP.to_string())
    }

    /// Depth of the provenance chain.
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    pub fn produce_event_data(
        &mut self,
        mut event_data: EventData,
    ) {
        event_data.parser = self.parser_chain();
        self.events_produced += 1;
        self.mediator
            .produce_event_data(event_data);
    }

    pub fn produce_event_with_event_data(
        &mut self,
        event: Event,
        mut event_data: EventData,
    ) {
        event_data.parser = self.parser_chain();
        self.events_produced += 1;
        self.mediator
            .produce_event_with_event_data(event, event_data);
    }

    pub fn produce_extraction_warning<S: Into<String>>(
        &mut self,
        message: S,
    ) {
        let warning = ExtractionWarning {
            parser: self.parser_chain(),
            message: message.into(),
        };
        self.warnings_produced += 1;
        self.mediator
            .produce_extraction_warning(warning);
    }

    pub fn display_name(&self) -> &str {
        self.mediator.display_name()
    }

    pub fn code_page(&self) -> &str {
        self.mediator.code_page()
    }

    pub fn estimated_year(&self) -> Year {
        self.mediator.estimated_year()
    }

    pub fn latest_year(&self) -> Option<Year> {
        self.mediator.latest_year()
    }

    pub fn abort(&self) -> bool {
        self.mediator.abort()
    }

    /// Count of events and event data produced through this context.
    pub const fn events_produced(&self) -> Count {
        self.events_produced
    }

    /// Count of warnings produced through this context.
    pub const fn warnings_produced(&self) -> Count {
        self.warnings_produced
    }
}

/// Pops the provenance chain when dropped. Dereferences to the
/// [`ParserContext`] so a guard is used wherever a context is.
pub struct ChainGuard<'c, 'm> {
    context: &'c mut ParserContext<'m>,
}

impl<'m> Deref for ChainGuard<'_, 'm> {
    type Target = ParserContext<'m>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ChainGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ChainGuard<'_, '_> {
    fn drop(&mut self) {
        let _name = self.context.chain.pop();
        defñ!("popped {:?}", _name);
    }
}
