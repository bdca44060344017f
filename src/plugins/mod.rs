// src/plugins/mod.rs

//! Format plugins, and the registries and presets built from them.
//!
//! * [`syslog`]: `text/syslog`, year-less system log files
//! * [`xchatlog`]: `text/xchatlog`, XChat IRC session logs
//! * [`docker`]: `jsonl/docker_container_log`, Docker container logs
//! * [`gcp`]: `jsonl/gcp_log`, Google Cloud (GCP) logs
//!
//! [`build_parser_registry`] registers every parser and plugin; call it once
//! at start of the process and share the result.

pub mod docker;
pub mod gcp;
pub mod syslog;
pub mod xchatlog;

use crate::readers::filter::Presets;
use crate::readers::jsonlparser::{JsonlParser, JsonlPluginClass};
use crate::readers::registry::{ParserRegistry, Registry, RegistrationError};
use crate::readers::textparser::{TextParser, TextPluginClass};

use ::const_format::concatcp;
use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// shared grammar pieces
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// capture group names of the time fields read by `TimeElements::from_record`
pub(crate) const CGN_MONTH: &str = "month";
pub(crate) const CGN_DAY: &str = "day";
pub(crate) const CGN_HOUR: &str = "hour";
pub(crate) const CGN_MINUTE: &str = "minute";
pub(crate) const CGN_SECOND: &str = "second";
pub(crate) const CGN_FRACTION: &str = "fraction";

/// abbreviated month name
pub(crate) const CGP_MONTH: &str = concatcp!(
    "(?P<",
    CGN_MONTH,
    r">Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)"
);
/// day of month, space padded, e.g. `" 2"`
pub(crate) const CGP_DAY: &str = concatcp!("(?P<", CGN_DAY, r">[0-3]?[0-9])");
pub(crate) const CGP_HOUR: &str = concatcp!("(?P<", CGN_HOUR, r">[0-2][0-9])");
pub(crate) const CGP_MINUTE: &str = concatcp!("(?P<", CGN_MINUTE, r">[0-5][0-9])");
pub(crate) const CGP_SECOND: &str = concatcp!("(?P<", CGN_SECOND, r">[0-6][0-9])");
pub(crate) const CGP_FRACTION: &str = concatcp!(r"(?:\.(?P<", CGN_FRACTION, r">[0-9]{1,9}))?");

/// `Jan  2 03:04:05`, optionally with a fraction of seconds
pub(crate) const CGP_DATETIME_YEARLESS: &str = concatcp!(
    CGP_MONTH, r"[ ]{1,2}", CGP_DAY, r"[ ]", CGP_HOUR, ":", CGP_MINUTE, ":", CGP_SECOND, CGP_FRACTION
);

/// The end of a line, or of the text.
pub(crate) const RP_LINE_END: &str = r"\r?(?:\n|\z)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// registries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The plugins of the `text` parser, in the order they are tried.
pub fn build_text_plugin_registry() -> Result<Registry<TextPluginClass>, RegistrationError> {
    let mut registry: Registry<TextPluginClass> = Registry::new();
    registry.register(syslog::PLUGIN_CLASS)?;
    registry.register(xchatlog::PLUGIN_CLASS)?;

    Ok(registry)
}

/// The plugins of the `jsonl` parser, in the order they are tried.
pub fn build_jsonl_plugin_registry() -> Result<Registry<JsonlPluginClass>, RegistrationError> {
    let mut registry: Registry<JsonlPluginClass> = Registry::new();
    registry.register(docker::PLUGIN_CLASS)?;
    registry.register(gcp::PLUGIN_CLASS)?;

    Ok(registry)
}

/// Every parser, in the order they are tried. The `jsonl` parser, requiring
/// a JSON object on the first line, is tried before the `text` parser.
pub fn build_parser_registry() -> Result<ParserRegistry, RegistrationError> {
    defn!();
    let mut registry: ParserRegistry = ParserRegistry::new();
    registry.register(JsonlParser::parser_class(build_jsonl_plugin_registry()?))?;
    registry.register(TextParser::parser_class(build_text_plugin_registry()?))?;
    defx!("{:?}", registry);

    Ok(registry)
}

lazy_static! {
    /// Presets usable in a filter expression.
    pub static ref PRESETS: Presets = {
        let mut presets = Presets::new();
        presets.add("linux", &["text/syslog", "jsonl/docker_container_log"]);
        presets.add("irc", &["text/xchatlog"]);
        presets.add("cloud", &["jsonl/gcp_log"]);
        presets.add("text_logs", &["text"]);
        presets.add("all", &["linux", "irc", "cloud"]);
        presets
    };
}
