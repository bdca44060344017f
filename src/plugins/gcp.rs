// src/plugins/gcp.rs

//! The `jsonl/gcp_log` plugin, for Google Cloud Logging entries exported
//! as JSON-L, e.g. by `gcloud logging read --format=json`.
//!
//! Only a few well-known fields of a `LogEntry` are kept.

use crate::common::FileOffset;
use crate::data::datetime::datetime_parse_iso8601;
use crate::data::event::{Event, EventData, TIME_DESCRIPTION_RECORDED, TIME_DESCRIPTION_WRITTEN};
use crate::readers::helpers::{json_datetime, json_has_keys, json_path, json_path_str, json_str, JsonObject, RecordError};
use crate::readers::jsonlparser::{JsonlPlugin, JsonlPluginClass};
use crate::readers::mediator::ParserContext;
use crate::readers::registry::HandlerDescriptor;

pub static DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "gcp_log",
    data_format: "Google Cloud (GCP) log",
    encoding: None,
    supports_plugins: false,
};

pub static PLUGIN_CLASS: JsonlPluginClass = JsonlPluginClass::new(&DESCRIPTOR, GcpLogPlugin::new_boxed);

pub const DATA_TYPE: &str = "gcp:log:entry";

const REQUIRED_KEYS: [&str; 2] = ["logName", "timestamp"];

/// Parses GCP log entries.
#[derive(Debug, Default)]
pub struct GcpLogPlugin {}

impl GcpLogPlugin {
    pub fn new() -> GcpLogPlugin {
        GcpLogPlugin {}
    }

    fn new_boxed() -> Box<dyn JsonlPlugin> {
        Box::new(GcpLogPlugin::new())
    }
}

impl JsonlPlugin for GcpLogPlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &DESCRIPTOR
    }

    fn check_required_format(
        &self,
        object: &JsonObject,
    ) -> bool {
        json_has_keys(object, &REQUIRED_KEYS) && json_str(object, "logName").is_ok()
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        object: &JsonObject,
        fileoffset: FileOffset,
    ) -> Result<(), RecordError> {
        let timestamp = json_datetime(object, "timestamp")?;
        let mut event_data = EventData::new(DATA_TYPE).with("log_name", json_str(object, "logName")?);
        event_data.set_opt("severity", json_path_str(object, &["severity"]));
        event_data.set_opt("insert_id", json_path_str(object, &["insertId"]));
        event_data.set_opt("resource_type", json_path_str(object, &["resource", "type"]));
        event_data.set_opt("text_payload", json_path_str(object, &["textPayload"]));
        event_data.set_opt("message", json_path_str(object, &["jsonPayload", "message"]));
        event_data.set_opt("json_payload", json_path(object, &["jsonPayload"]).cloned());
        event_data.offset = Some(fileoffset);

        // the time the entry was received, if well-formed
        let received = json_path_str(object, &["receiveTimestamp"]).and_then(datetime_parse_iso8601);
        if let Some(received) = received {
            context.produce_event_with_event_data(
                Event::new(received, TIME_DESCRIPTION_RECORDED),
                event_data.clone(),
            );
        }
        context.produce_event_with_event_data(Event::new(timestamp, TIME_DESCRIPTION_WRITTEN), event_data);

        Ok(())
    }
}
