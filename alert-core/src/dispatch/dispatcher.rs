//! Alert Dispatcher — maps a decision to actuator commands
//!
//! Pure translation: no side effects. The caller forwards the resulting
//! [`CommandSet`] to an [`ActuatorSink`](crate::sink::ActuatorSink).

use super::commands::{BuzzerPattern, CommandSet, Switch, VisualIndicator};
use crate::escalation::{AlertLevel, ClosureState, Decision, EdgeEvent};

pub const MSG_EYES_CLOSED: &str = "Eyes closed detected.";
pub const MSG_EYES_OPEN: &str = "Eyes open. Resetting alerts.";
pub const MSG_LEVEL1: &str = "Level 1 Alert: Eyes closed for 3 seconds.";
pub const MSG_LEVEL2: &str = "Level 2 Alert: Eyes closed for 6 seconds.";
pub const MSG_LEVEL3: &str = "Level 3 Alert: Eyes closed for 9 seconds.";
pub const MSG_CUTOFF: &str = "Level 4 Alert: Eyes closed for 12 seconds. Motor turned OFF.";

/// Steady actuator states plus one-shot effects for a closed-eyes level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProfile {
    pub relay: Switch,
    pub vibrator: Switch,
    pub visual: VisualIndicator,
    pub buzzer: Option<BuzzerPattern>,
    pub message: Option<&'static str>,
}

/// Profile for each level while the eyes are closed
pub fn closed_profile(level: AlertLevel) -> LevelProfile {
    match level {
        AlertLevel::None => LevelProfile {
            relay: Switch::On,
            vibrator: Switch::Off,
            visual: VisualIndicator::RED,
            buzzer: None,
            message: None,
        },
        AlertLevel::Level1 => LevelProfile {
            relay: Switch::On,
            vibrator: Switch::Off,
            visual: VisualIndicator::RED_GREEN,
            buzzer: Some(BuzzerPattern::new(100, 100, 150, 10)),
            message: Some(MSG_LEVEL1),
        },
        AlertLevel::Level2 => LevelProfile {
            relay: Switch::On,
            vibrator: Switch::Off,
            visual: VisualIndicator::RED_GREEN,
            buzzer: Some(BuzzerPattern::new(200, 80, 100, 15)),
            message: Some(MSG_LEVEL2),
        },
        AlertLevel::Level3 => LevelProfile {
            relay: Switch::On,
            vibrator: Switch::On,
            visual: VisualIndicator::RED_GREEN,
            buzzer: Some(BuzzerPattern::new(300, 50, 70, 20)),
            message: Some(MSG_LEVEL3),
        },
        // Level3 visuals carry into cutoff
        AlertLevel::Cutoff => LevelProfile {
            relay: Switch::Off,
            vibrator: Switch::Off,
            visual: VisualIndicator::RED_GREEN,
            buzzer: None,
            message: Some(MSG_CUTOFF),
        },
    }
}

/// Decision-to-command mapper
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertDispatcher;

impl AlertDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Translate one decision into the command set for this tick
    pub fn dispatch(&self, decision: &Decision) -> CommandSet {
        match decision.state {
            ClosureState::EyesOpen => CommandSet {
                log: edge_message(decision.edge).map(str::to_string),
                ..CommandSet::idle()
            },
            ClosureState::EyesClosed => {
                let profile = closed_profile(decision.level);
                let (buzzer, log) = if decision.level_up {
                    (profile.buzzer, profile.message)
                } else {
                    (None, edge_message(decision.edge))
                };
                CommandSet {
                    relay: profile.relay,
                    vibrator: profile.vibrator,
                    visual: profile.visual,
                    buzzer,
                    log: log.map(str::to_string),
                }
            }
        }
    }
}

fn edge_message(edge: Option<EdgeEvent>) -> Option<&'static str> {
    match edge? {
        EdgeEvent::EyesClosedDetected => Some(MSG_EYES_CLOSED),
        EdgeEvent::EyesReopened => Some(MSG_EYES_OPEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::EscalationStateMachine;

    fn closed(level: AlertLevel, level_up: bool) -> Decision {
        Decision {
            state: ClosureState::EyesClosed,
            level,
            edge: None,
            level_up,
            closed_duration_ticks: 0,
            episode_end: None,
        }
    }

    #[test]
    fn test_open_without_edge_is_idle() {
        let dispatcher = AlertDispatcher::new();
        let mut machine = EscalationStateMachine::new();
        let commands = dispatcher.dispatch(&machine.step(false));
        assert_eq!(commands, CommandSet::idle());
    }

    #[test]
    fn test_reopen_logs_reset() {
        let dispatcher = AlertDispatcher::new();
        let mut machine = EscalationStateMachine::new();
        machine.step(true);
        let commands = dispatcher.dispatch(&machine.step(false));
        assert_eq!(commands.log.as_deref(), Some(MSG_EYES_OPEN));
        assert!(commands.motor_enabled());
        assert_eq!(commands.vibrator, Switch::Off);
        assert_eq!(commands.visual, VisualIndicator::OFF);
    }

    #[test]
    fn test_closed_edge_lights_red() {
        let dispatcher = AlertDispatcher::new();
        let mut machine = EscalationStateMachine::new();
        let commands = dispatcher.dispatch(&machine.step(true));
        assert_eq!(commands.visual, VisualIndicator::RED);
        assert_eq!(commands.relay, Switch::On);
        assert_eq!(commands.log.as_deref(), Some(MSG_EYES_CLOSED));
        assert!(commands.buzzer.is_none());
    }

    #[test]
    fn test_level_up_fires_buzzer_and_log() {
        let dispatcher = AlertDispatcher::new();
        let commands = dispatcher.dispatch(&closed(AlertLevel::Level2, true));
        assert_eq!(commands.buzzer, Some(BuzzerPattern::new(200, 80, 100, 15)));
        assert_eq!(commands.log.as_deref(), Some(MSG_LEVEL2));
        assert_eq!(commands.visual, VisualIndicator::RED_GREEN);
    }

    #[test]
    fn test_steady_level_has_no_one_shots() {
        let dispatcher = AlertDispatcher::new();
        for &level in AlertLevel::all() {
            let commands = dispatcher.dispatch(&closed(level, false));
            assert!(
                commands.buzzer.is_none() && commands.log.is_none(),
                "{} repeated tick",
                level
            );
        }
    }

    #[test]
    fn test_level3_vibrates_with_motor_on() {
        let dispatcher = AlertDispatcher::new();
        let commands = dispatcher.dispatch(&closed(AlertLevel::Level3, false));
        assert_eq!(commands.vibrator, Switch::On);
        assert_eq!(commands.relay, Switch::On);
    }

    #[test]
    fn test_cutoff_releases_relay_and_keeps_visuals() {
        let dispatcher = AlertDispatcher::new();
        let commands = dispatcher.dispatch(&closed(AlertLevel::Cutoff, true));
        assert_eq!(commands.relay, Switch::Off);
        assert_eq!(commands.vibrator, Switch::Off);
        assert_eq!(commands.visual, VisualIndicator::RED_GREEN);
        assert!(commands.buzzer.is_none());
        assert_eq!(commands.log.as_deref(), Some(MSG_CUTOFF));
    }

    #[test]
    fn test_jump_from_open_prefers_level_line() {
        let dispatcher = AlertDispatcher::new();
        let mut machine = EscalationStateMachine::new();
        let decision = machine.advance(true, 95);
        assert_eq!(decision.edge, Some(EdgeEvent::EyesClosedDetected));
        let commands = dispatcher.dispatch(&decision);
        assert_eq!(commands.log.as_deref(), Some(MSG_LEVEL3));
        assert_eq!(commands.buzzer, closed_profile(AlertLevel::Level3).buzzer);
    }
}
