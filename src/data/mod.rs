// src/data/mod.rs

//! The `data` module is data containers for what parsers produce, and the
//! date and time functions to create them.
//!
//! ## Definitions of data
//!
//! ### EventData
//!
//! An [`EventData`] is the named attributes of one artifact record, e.g.
//! one syslog line or one JSON object of a container log.
//!
//! ### Event
//!
//! An [`Event`] is a timestamp, and a description of what that timestamp
//! means, that refers to an `EventData`.
//!
//! ### ExtractionWarning
//!
//! An [`ExtractionWarning`] is a note that part of an artifact could not be
//! extracted, e.g. a line that matched no grammar.
//!
//! [`EventData`]: crate::data::event::EventData
//! [`Event`]: crate::data::event::Event
//! [`ExtractionWarning`]: crate::data::event::ExtractionWarning

pub mod datetime;
pub mod event;
