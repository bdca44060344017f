// src/data/event.rs

//! Implements [`EventData`] and [`Event`], the things parsers produce.
//!
//! An `EventData` is the attributes extracted from one record of an
//! artifact, e.g. the hostname and message of a syslog line.
//! An `Event` is a point on the timeline that refers to an `EventData`.
//! One record may yield several `Event`s, e.g. a creation time and a
//! modification time, each sharing the same `EventData`.

use crate::common::FileOffset;
use crate::data::datetime::DateTimeL;

use std::collections::BTreeMap;
use std::fmt;

use ::serde::Serialize;

/// Attribute values of an [`EventData`]. Kept as JSON values so any parser
/// may store strings, numbers, or nested structures.
pub type AttributeValue = ::serde_json::Value;

/// Named attributes of an [`EventData`], ordered by name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Timestamp description for the time a record was written.
pub const TIME_DESCRIPTION_WRITTEN: &str = "Written Time";
/// Timestamp description for the time a record was recorded by a collector.
pub const TIME_DESCRIPTION_RECORDED: &str = "Recorded Time";
/// Timestamp description for the time a session started.
pub const TIME_DESCRIPTION_START: &str = "Start Time";
/// Timestamp description for the time a session ended.
pub const TIME_DESCRIPTION_END: &str = "End Time";

/// Structured data extracted from one artifact record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventData {
    /// Identifier of the kind of record, e.g. `"syslog:line"`.
    pub data_type: String,
    /// Parser chain that produced this, e.g. `"text/syslog"`.
    /// Filled in by the [`ParserContext`].
    ///
    /// [`ParserContext`]: crate::readers::mediator::ParserContext
    pub parser: String,
    /// Byte offset of the record in the file, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<FileOffset>,
    pub attributes: Attributes,
}

impl EventData {
    pub fn new(data_type: &str) -> EventData {
        EventData {
            data_type: String::from(data_type),
            ..Default::default()
        }
    }

    /// Builder-style [`EventData::set`].
    pub fn with<V: Into<AttributeValue>>(
        mut self,
        name: &str,
        value: V,
    ) -> EventData {
        self.set(name, value);

        self
    }

    /// Set attribute `name`. An existing value is replaced.
    pub fn set<V: Into<AttributeValue>>(
        &mut self,
        name: &str,
        value: V,
    ) {
        self.attributes
            .insert(String::from(name), value.into());
    }

    /// Set attribute `name` only if `value` is `Some`.
    pub fn set_opt<V: Into<AttributeValue>>(
        &mut self,
        name: &str,
        value: Option<V>,
    ) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Attribute `name` as a `&str`, if it is a JSON string.
    pub fn get_str(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|value| value.as_str())
    }
}

impl fmt::Display for EventData {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}", self.data_type)?;
        for (name, value) in self.attributes.iter() {
            match value {
                AttributeValue::String(s) => write!(f, " {}={:?}", name, s)?,
                _ => write!(f, " {}={}", name, value)?,
            }
        }

        Ok(())
    }
}

/// A point on the timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub timestamp: DateTimeL,
    /// What `timestamp` means, e.g. [`TIME_DESCRIPTION_WRITTEN`].
    pub timestamp_description: String,
}

impl Event {
    pub fn new(
        timestamp: DateTimeL,
        timestamp_description: &str,
    ) -> Event {
        Event {
            timestamp,
            timestamp_description: String::from(timestamp_description),
        }
    }
}

/// An extraction warning; something in an artifact that could not be
/// parsed. It does not stop the processing of the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    /// Parser chain active when the warning was produced.
    pub parser: String,
    pub message: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        if self.parser.is_empty() {
            return write!(f, "{}", self.message);
        }

        write!(f, "[{}] {}", self.parser, self.message)
    }
}
