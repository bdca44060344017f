// src/lib.rs

//! _axlib_ matches forensic artifact files to format parsers and extracts a
//! normalized stream of timestamped events.
//!
//! ## Overview
//!
//! * A [`ParserRegistry`] holds every parser, built once by
//!   [`build_parser_registry`]. Parsers that support plugins, e.g. `text` and
//!   `jsonl`, own a registry of their plugins.
//! * A [`FilterExpression`], e.g. `"linux,!text/xchatlog"`, selects the
//!   candidate parsers and plugins.
//! * A [`Dispatcher`] offers a file to each candidate in turn; the first that
//!   recognizes it extracts events and warnings into a [`Mediator`].
//!
//! The driver program _ax_ wraps this for files and directories on the
//! command line.
//!
//! [`ParserRegistry`]: crate::readers::registry::ParserRegistry
//! [`build_parser_registry`]: crate::plugins::build_parser_registry
//! [`FilterExpression`]: crate::readers::filter::FilterExpression
//! [`Dispatcher`]: crate::readers::dispatcher::Dispatcher
//! [`Mediator`]: crate::readers::mediator::Mediator

pub mod common;
pub mod data;
pub mod debug;
pub mod plugins;
pub mod readers;
#[cfg(test)]
pub mod tests;
