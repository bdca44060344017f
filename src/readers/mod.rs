// src/readers/mod.rs

//! "Readers" for _axlib_.
//!
//! ## Overview of readers
//!
//! * A [`Dispatcher`] matches a file to one [`FileParser`] chosen from a
//!   [`ParserRegistry`] by a [`FilterExpression`].
//! * A [`TextParser`] drives a [`GrammarEngine`] over the window of a
//!   [`TextReader`] to derive [`ParseRecord`s], handed to a text plugin.
//! * A [`JsonlParser`] binds one JSON-L plugin to a file by its first line
//!   and hands it every line.
//! * Parsers produce [`Event`s] and warnings through a [`ParserContext`],
//!   which stamps them with the provenance chain, to a [`Mediator`].
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Dispatcher`]: crate::readers::dispatcher::Dispatcher
//! [`FileParser`]: crate::readers::dispatcher::FileParser
//! [`ParserRegistry`]: crate::readers::registry::ParserRegistry
//! [`FilterExpression`]: crate::readers::filter::FilterExpression
//! [`TextParser`]: crate::readers::textparser::TextParser
//! [`GrammarEngine`]: crate::readers::textparser::GrammarEngine
//! [`TextReader`]: crate::readers::textreader::TextReader
//! [`ParseRecord`s]: crate::readers::grammar::ParseRecord
//! [`JsonlParser`]: crate::readers::jsonlparser::JsonlParser
//! [`Event`s]: crate::data::event::Event
//! [`ParserContext`]: crate::readers::mediator::ParserContext
//! [`Mediator`]: crate::readers::mediator::Mediator

pub mod decoder;
pub mod dispatcher;
pub mod filepreprocessor;
pub mod filter;
pub mod grammar;
pub mod helpers;
pub mod jsonlparser;
pub mod mediator;
pub mod registry;
pub mod summary;
pub mod textparser;
pub mod textreader;
pub mod yearless;
