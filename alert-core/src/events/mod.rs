//! Event-driven observation of the monitor
//!
//! The monitor actor derives [`MonitorEvent`]s from each decision and
//! publishes them on the [`EventBus`]. Subscribers (telemetry writers,
//! dashboards) receive clones; they never mutate escalation state.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Monitor tick │────▶│  Event Bus   │────▶│  Subscribers │
//! │  (publish)   │     │  (broadcast) │     │   (recv)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, SharedEventBus};
pub use types::{events_for, MonitorEvent, StopReason};
