//! Escalation Engine — Deterministic per-tick decisions
//!
//! Consumes one eye-closure sample per tick and the owned [`EscalationRecord`]
//! to produce a [`Decision`]. All decisions are deterministic and total: every
//! boolean sample and every `elapsed_ticks` value is accepted.

use super::ladder::ThresholdLadder;
use super::state::{AlertLevel, ClosureState, EdgeEvent, EscalationRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Summary of a closed episode, captured just before the reset on reopen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeEnd {
    /// How long the eyes stayed closed
    pub closed_ticks: u64,
    /// Highest level reached during the episode
    pub peak_level: AlertLevel,
}

/// Decision produced by the state machine for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Logical eye state after this sample
    pub state: ClosureState,
    /// Level in force after this sample
    pub level: AlertLevel,
    /// Edge event, only on a state change
    pub edge: Option<EdgeEvent>,
    /// Whether `level` rose on this sample
    pub level_up: bool,
    /// Continuous-closure duration after this sample
    pub closed_duration_ticks: u64,
    /// Set on the reopen sample that ends a closed episode
    pub episode_end: Option<EpisodeEnd>,
}

/// The escalation state machine
///
/// Owns the single [`EscalationRecord`]; callers drive it with one
/// [`advance`](Self::advance) per tick.
#[derive(Debug, Clone)]
pub struct EscalationStateMachine {
    record: EscalationRecord,
    ladder: ThresholdLadder,
}

impl EscalationStateMachine {
    /// Create a machine with the standard ladder and a fresh record
    pub fn new() -> Self {
        Self {
            record: EscalationRecord::new(),
            ladder: ThresholdLadder::standard(),
        }
    }

    pub fn record(&self) -> &EscalationRecord {
        &self.record
    }

    /// Advance by exactly one sampling period
    pub fn step(&mut self, raw_closed: bool) -> Decision {
        self.advance(raw_closed, 1)
    }

    /// Process a sample and produce a decision
    ///
    /// `elapsed_ticks` is the number of sampling periods since the previous
    /// call. A duration that crosses several thresholds in one call resolves
    /// straight to the final level with a single level-up.
    pub fn advance(&mut self, raw_closed: bool, elapsed_ticks: u64) -> Decision {
        let decision = match ClosureState::from_sample(raw_closed) {
            ClosureState::EyesClosed => self.advance_closed(elapsed_ticks),
            ClosureState::EyesOpen => self.advance_open(),
        };

        debug!(
            record = %self.record.summary(),
            level_up = decision.level_up,
            elapsed_ticks,
            "escalation tick"
        );

        decision
    }

    fn advance_open(&mut self) -> Decision {
        let mut edge = None;
        let mut episode_end = None;

        if self.record.previous_state == ClosureState::EyesClosed {
            let ended = EpisodeEnd {
                closed_ticks: self.record.closed_duration_ticks,
                peak_level: self.record.current_level,
            };
            info!(
                closed_ticks = ended.closed_ticks,
                peak_level = %ended.peak_level,
                "Eyes reopened, resetting alerts"
            );
            edge = Some(EdgeEvent::EyesReopened);
            episode_end = Some(ended);
        }

        self.record.reset();

        Decision {
            state: ClosureState::EyesOpen,
            level: AlertLevel::None,
            edge,
            level_up: false,
            closed_duration_ticks: 0,
            episode_end,
        }
    }

    fn advance_closed(&mut self, elapsed_ticks: u64) -> Decision {
        let mut edge = None;

        if self.record.previous_state == ClosureState::EyesOpen {
            info!("Eyes closed detected");
            edge = Some(EdgeEvent::EyesClosedDetected);
            self.record.previous_state = ClosureState::EyesClosed;
        }

        self.record.closed_duration_ticks = self
            .record
            .closed_duration_ticks
            .saturating_add(elapsed_ticks);

        let new_level = self.ladder.level_for(self.record.closed_duration_ticks);
        let level_up = new_level > self.record.current_level;
        if level_up {
            info!(
                from = %self.record.current_level,
                to = %new_level,
                closed_ticks = self.record.closed_duration_ticks,
                "Alert level raised"
            );
            self.record.current_level = new_level;
        }

        Decision {
            state: ClosureState::EyesClosed,
            level: self.record.current_level,
            edge,
            level_up,
            closed_duration_ticks: self.record.closed_duration_ticks,
            episode_end: None,
        }
    }
}

impl Default for EscalationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
