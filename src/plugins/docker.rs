// src/plugins/docker.rs

//! The `jsonl/docker_container_log` plugin, for the JSON-L logs written by
//! the Docker `json-file` logging driver, e.g.
//! `/var/lib/docker/containers/<id>/<id>-json.log`.
//!
//! ```text
//! {"log":"hello\n","stream":"stdout","time":"2024-01-02T03:04:05.123456789Z"}
//! ```

use crate::common::FileOffset;
use crate::data::event::{Event, EventData, TIME_DESCRIPTION_WRITTEN};
use crate::readers::helpers::{json_datetime, json_has_keys, json_str, JsonObject, RecordError};
use crate::readers::jsonlparser::{JsonlPlugin, JsonlPluginClass};
use crate::readers::mediator::ParserContext;
use crate::readers::registry::HandlerDescriptor;

pub static DESCRIPTOR: HandlerDescriptor = HandlerDescriptor {
    name: "docker_container_log",
    data_format: "Docker container log file",
    encoding: None,
    supports_plugins: false,
};

pub static PLUGIN_CLASS: JsonlPluginClass = JsonlPluginClass::new(&DESCRIPTOR, DockerContainerLogPlugin::new_boxed);

pub const DATA_TYPE: &str = "docker:json:container:log";

const REQUIRED_KEYS: [&str; 3] = ["log", "stream", "time"];

/// Parses Docker container log lines.
#[derive(Debug, Default)]
pub struct DockerContainerLogPlugin {}

impl DockerContainerLogPlugin {
    pub fn new() -> DockerContainerLogPlugin {
        DockerContainerLogPlugin {}
    }

    fn new_boxed() -> Box<dyn JsonlPlugin> {
        Box::new(DockerContainerLogPlugin::new())
    }
}

impl JsonlPlugin for DockerContainerLogPlugin {
    fn descriptor(&self) -> &'static HandlerDescriptor {
        &DESCRIPTOR
    }

    fn check_required_format(
        &self,
        object: &JsonObject,
    ) -> bool {
        json_has_keys(object, &REQUIRED_KEYS) && json_datetime(object, "time").is_ok()
    }

    fn parse_record(
        &mut self,
        context: &mut ParserContext<'_>,
        object: &JsonObject,
        fileoffset: FileOffset,
    ) -> Result<(), RecordError> {
        let timestamp = json_datetime(object, "time")?;
        let log: &str = json_str(object, "log")?;
        let mut event_data = EventData::new(DATA_TYPE)
            .with("log_line", log.trim_end_matches(['\r', '\n']))
            .with("log_source", json_str(object, "stream")?);
        event_data.offset = Some(fileoffset);
        context.produce_event_with_event_data(Event::new(timestamp, TIME_DESCRIPTION_WRITTEN), event_data);

        Ok(())
    }
}
