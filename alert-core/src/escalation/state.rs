//! Escalation State — Tracks closure duration and the level reached

use serde::{Deserialize, Serialize};

/// Logical eye state as tracked by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureState {
    #[default]
    EyesOpen,
    EyesClosed,
}

impl ClosureState {
    /// Map a raw sensor sample (true = eyes closed)
    pub fn from_sample(raw_closed: bool) -> Self {
        if raw_closed {
            Self::EyesClosed
        } else {
            Self::EyesOpen
        }
    }
}

impl std::fmt::Display for ClosureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EyesOpen => write!(f, "eyes_open"),
            Self::EyesClosed => write!(f, "eyes_closed"),
        }
    }
}

/// Alert severity, ordered from quiet to motor cutoff
///
/// Declaration order is the severity order: `None < Level1 < Level2 < Level3 < Cutoff`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Closed, but below the first threshold
    #[default]
    None,
    /// Audible warning
    Level1,
    /// Faster audible warning
    Level2,
    /// Fastest audible warning plus haptic
    Level3,
    /// Motor relay released
    Cutoff,
}

impl AlertLevel {
    /// All levels in severity order
    pub fn all() -> &'static [AlertLevel] {
        &[
            Self::None,
            Self::Level1,
            Self::Level2,
            Self::Level3,
            Self::Cutoff,
        ]
    }

    /// Whether this level keeps the motor relay released
    pub fn is_cutoff(&self) -> bool {
        matches!(self, Self::Cutoff)
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Level1 => write!(f, "level1"),
            Self::Level2 => write!(f, "level2"),
            Self::Level3 => write!(f, "level3"),
            Self::Cutoff => write!(f, "cutoff"),
        }
    }
}

/// One-shot signal that the logical eye state changed direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEvent {
    /// open → closed
    EyesClosedDetected,
    /// closed → open
    EyesReopened,
}

impl std::fmt::Display for EdgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EyesClosedDetected => write!(f, "eyes_closed_detected"),
            Self::EyesReopened => write!(f, "eyes_reopened"),
        }
    }
}

/// Mutable escalation record, owned exclusively by the state machine
///
/// Invariants:
/// - `closed_duration_ticks == 0` whenever `previous_state == EyesOpen`
/// - `current_level` never decreases while `previous_state == EyesClosed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EscalationRecord {
    /// Consecutive ticks with eyes closed; 0 while open
    pub closed_duration_ticks: u64,
    /// Highest level reached in the current closed episode
    pub current_level: AlertLevel,
    /// Last reported state, used only for edge detection
    pub previous_state: ClosureState,
}

impl EscalationRecord {
    /// Fresh record: open, no duration, no level
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reset on reopen
    pub(crate) fn reset(&mut self) {
        self.previous_state = ClosureState::EyesOpen;
        self.closed_duration_ticks = 0;
        self.current_level = AlertLevel::None;
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "state={} closed_ticks={} level={}",
            self.previous_state, self.closed_duration_ticks, self.current_level,
        )
    }
}
