//! Escalation — Deterministic State Machine for Eye-Closure Alerts
//!
//! Converts one boolean sample per tick into a leveled alert decision. This
//! is a pure state machine with no I/O: every decision is a function of the
//! owned record and the incoming sample.
//!
//! # Escalation Ladder
//!
//! ```text
//! EyesOpen ──(sample=closed)──▶ EyesClosed, None      [EyesClosedDetected]
//!                                   │ 30 ticks
//!                                   ▼
//!                               Level1  (buzzer x10)
//!                                   │ 60 ticks
//!                                   ▼
//!                               Level2  (buzzer x15)
//!                                   │ 90 ticks
//!                                   ▼
//!                               Level3  (buzzer x20, vibrator)
//!                                   │ 120 ticks
//!                                   ▼
//!                               Cutoff  (motor relay off)
//!
//! any level ──(sample=open)──▶ EyesOpen, None          [EyesReopened]
//! ```

pub mod engine;
pub mod ladder;
pub mod state;

pub use engine::{Decision, EpisodeEnd, EscalationStateMachine};
pub use ladder::{Rung, ThresholdLadder};
pub use state::{AlertLevel, ClosureState, EdgeEvent, EscalationRecord};
