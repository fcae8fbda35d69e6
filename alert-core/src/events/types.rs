//! Event types for monitor observers
//!
//! Derived from decisions; published on the bus for telemetry and UIs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::escalation::{AlertLevel, Decision, EdgeEvent};

/// All monitor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// The sampling loop started
    MonitorStarted {
        tick_period_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// open → closed edge
    EyesClosed { timestamp: DateTime<Utc> },

    /// closed → open edge, with the episode that just ended
    EyesReopened {
        closed_ticks: u64,
        peak_level: AlertLevel,
        timestamp: DateTime<Utc>,
    },

    /// The alert level rose within the current episode
    LevelRaised {
        level: AlertLevel,
        closed_ticks: u64,
        timestamp: DateTime<Utc>,
    },

    /// Motor relay released
    MotorCutoff {
        closed_ticks: u64,
        timestamp: DateTime<Utc>,
    },

    /// The sampling loop stopped
    MonitorStopped {
        ticks: u64,
        reason: StopReason,
        timestamp: DateTime<Utc>,
    },
}

/// Why the sampling loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Sensor source ran out of samples
    SensorExhausted,
    /// Cancellation requested
    Cancelled,
    /// Configured tick limit reached
    MaxTicks,
    /// Sensor read failed
    SensorFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SensorExhausted => write!(f, "sensor_exhausted"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::MaxTicks => write!(f, "max_ticks"),
            Self::SensorFailed => write!(f, "sensor_failed"),
        }
    }
}

impl MonitorEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MonitorStarted { .. } => "monitor_started",
            Self::EyesClosed { .. } => "eyes_closed",
            Self::EyesReopened { .. } => "eyes_reopened",
            Self::LevelRaised { .. } => "level_raised",
            Self::MotorCutoff { .. } => "motor_cutoff",
            Self::MonitorStopped { .. } => "monitor_stopped",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MonitorStarted { timestamp, .. }
            | Self::EyesClosed { timestamp }
            | Self::EyesReopened { timestamp, .. }
            | Self::LevelRaised { timestamp, .. }
            | Self::MotorCutoff { timestamp, .. }
            | Self::MonitorStopped { timestamp, .. } => *timestamp,
        }
    }
}

/// Events carried by one tick's decision, in the order they happened
///
/// A single tick can carry both an edge and a level-up (large elapsed jump
/// from open); both are reported.
pub fn events_for(decision: &Decision, timestamp: DateTime<Utc>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();

    match decision.edge {
        Some(EdgeEvent::EyesClosedDetected) => {
            events.push(MonitorEvent::EyesClosed { timestamp });
        }
        Some(EdgeEvent::EyesReopened) => {
            let (closed_ticks, peak_level) = decision
                .episode_end
                .map(|end| (end.closed_ticks, end.peak_level))
                .unwrap_or((0, AlertLevel::None));
            events.push(MonitorEvent::EyesReopened {
                closed_ticks,
                peak_level,
                timestamp,
            });
        }
        None => {}
    }

    if decision.level_up {
        events.push(MonitorEvent::LevelRaised {
            level: decision.level,
            closed_ticks: decision.closed_duration_ticks,
            timestamp,
        });
        if decision.level.is_cutoff() {
            events.push(MonitorEvent::MotorCutoff {
                closed_ticks: decision.closed_duration_ticks,
                timestamp,
            });
        }
    }

    events
}
