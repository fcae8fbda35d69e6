//! Host runtime for the drowsiness alert controller.
//!
//! Wires the pure escalation core to the outside world: sensor sources,
//! actuator sinks, the paced sampling loop, episode telemetry and
//! configuration.

pub mod config;
pub mod runtime;
pub mod script;
pub mod sensor;
pub mod sinks;
pub mod telemetry;

pub use config::{ConfigError, MonitorConfig, OutputFormat};
pub use runtime::{elapsed_ticks, Monitor, MonitorError, RunSummary, TickReport};
pub use script::{parse_sample, parse_script, ScriptError, MAX_SCRIPT_SAMPLES};
pub use sensor::{FeedItem, LineSensor, SampleFeed, SampleSource};
pub use sinks::{JsonLinesSink, TracingSink};
pub use telemetry::{EpisodeEndReason, EpisodeSummary, EpisodeTelemetry, TelemetryError};
