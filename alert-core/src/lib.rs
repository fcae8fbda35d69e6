//! Drowsiness Alert Core Library
//!
//! This library provides:
//! - A deterministic escalation state machine turning a periodic "eyes closed"
//!   sample into a leveled alert policy
//! - A dispatcher mapping each decision to a normalized actuator command set
//! - Collaborator traits for sensor input and actuator output
//! - A broadcast event bus for observers of edges and level-ups
//!
//! # Escalation Ladder
//!
//! | Closed for (ticks) | Level  | Relay | Vibrator | Buzzer            |
//! |--------------------|--------|-------|----------|-------------------|
//! | 0-29               | None   | on    | off      | -                 |
//! | 30-59              | Level1 | on    | off      | 100 Hz x10        |
//! | 60-89              | Level2 | on    | off      | 200 Hz x15        |
//! | 90-119             | Level3 | on    | on       | 300 Hz x20        |
//! | 120+               | Cutoff | off   | off      | -                 |
//!
//! # Usage
//!
//! ```
//! use alert_core::{AlertDispatcher, AlertLevel, EscalationStateMachine};
//!
//! let mut machine = EscalationStateMachine::new();
//! let dispatcher = AlertDispatcher::new();
//!
//! let mut last = machine.step(true);
//! for _ in 1..30 {
//!     last = machine.step(true);
//! }
//! assert_eq!(last.level, AlertLevel::Level1);
//! assert!(last.level_up);
//!
//! let commands = dispatcher.dispatch(&last);
//! assert!(commands.buzzer.is_some());
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod dispatch;
pub mod escalation;
pub mod events;
pub mod sensor;
pub mod sink;

// Re-export escalation types
pub use escalation::{
    AlertLevel, ClosureState, Decision, EdgeEvent, EpisodeEnd, EscalationRecord,
    EscalationStateMachine, Rung, ThresholdLadder,
};

// Re-export dispatch types
pub use dispatch::{AlertDispatcher, BuzzerPattern, CommandSet, Switch, VisualIndicator};

// Re-export collaborator traits
pub use sensor::{ScriptedSensor, SensorError, SensorSource};
pub use sink::{ActuatorSink, RecordingSink, SinkError};

// Re-export key event types
pub use events::{events_for, EventBus, MonitorEvent, SharedEventBus, StopReason};
