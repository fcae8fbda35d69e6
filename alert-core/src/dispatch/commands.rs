//! Actuator command types
//!
//! A [`CommandSet`] is the normalized, order-independent description of what
//! the actuators should be doing after one tick. Relay, vibrator and visual
//! fields are level-indicative states and safe to apply redundantly; the
//! buzzer pattern and log line are one-shot effects.

use serde::{Deserialize, Serialize};

/// Binary actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl std::fmt::Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Red/green indicator pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualIndicator {
    pub red: bool,
    pub green: bool,
}

impl VisualIndicator {
    pub const OFF: Self = Self {
        red: false,
        green: false,
    };
    /// Eyes closed, below the first threshold
    pub const RED: Self = Self {
        red: true,
        green: false,
    };
    /// Any alert level
    pub const RED_GREEN: Self = Self {
        red: true,
        green: true,
    };
}

impl std::fmt::Display for VisualIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.red, self.green) {
            (false, false) => write!(f, "off"),
            (true, false) => write!(f, "red"),
            (false, true) => write!(f, "green"),
            (true, true) => write!(f, "red+green"),
        }
    }
}

/// Discrete beep pattern: `repetitions` square-wave pulses separated by `gap_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuzzerPattern {
    /// Tone frequency class
    pub frequency_hz: u32,
    /// Nominal tone length per beep
    pub tone_ms: u32,
    /// Silence between beeps
    pub gap_ms: u32,
    pub repetitions: u32,
}

impl BuzzerPattern {
    pub const fn new(frequency_hz: u32, tone_ms: u32, gap_ms: u32, repetitions: u32) -> Self {
        Self {
            frequency_hz,
            tone_ms,
            gap_ms,
            repetitions,
        }
    }

    /// Half of the square-wave period in microseconds
    pub fn half_period_us(&self) -> u32 {
        1_000_000 / self.frequency_hz.max(1)
    }

    /// Time the whole pattern keeps the driver busy, in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        let per_beep_us = 2 * self.half_period_us() as u64 + self.gap_ms as u64 * 1_000;
        per_beep_us * self.repetitions as u64 / 1_000
    }
}

/// Everything the actuators and log sink should do for one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    /// Motor relay; `Off` cuts the motor
    pub relay: Switch,
    pub vibrator: Switch,
    pub visual: VisualIndicator,
    /// One-shot beep pattern, only on a level-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buzzer: Option<BuzzerPattern>,
    /// One-shot status line, only on an edge or level-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl CommandSet {
    /// Idle state: motor enabled, everything else off
    pub fn idle() -> Self {
        Self {
            relay: Switch::On,
            vibrator: Switch::Off,
            visual: VisualIndicator::OFF,
            buzzer: None,
            log: None,
        }
    }

    pub fn motor_enabled(&self) -> bool {
        self.relay.is_on()
    }

    /// Compact single-line rendering for logs
    pub fn summary(&self) -> String {
        let mut out = format!(
            "relay={} vibrator={} visual={}",
            self.relay, self.vibrator, self.visual
        );
        if let Some(buzzer) = &self.buzzer {
            out.push_str(&format!(
                " buzzer={}Hzx{}",
                buzzer.frequency_hz, buzzer.repetitions
            ));
        }
        out
    }
}

impl Default for CommandSet {
    fn default() -> Self {
        Self::idle()
    }
}
