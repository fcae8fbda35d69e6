//! Actuator output contract
//!
//! Sinks turn an abstract [`CommandSet`] into physical writes (or text, or a
//! record). Relay/vibrator/visual are re-issued every tick, so a sink must
//! tolerate redundant application.

use crate::dispatch::CommandSet;

/// Error type for actuator sinks
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write commands: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode commands: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Actuator {actuator} rejected command: {reason}")]
    Rejected { actuator: String, reason: String },
}

/// Consumer of per-tick command sets
pub trait ActuatorSink {
    fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError>;
}

impl<S: ActuatorSink + ?Sized> ActuatorSink for Box<S> {
    fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError> {
        (**self).apply(commands)
    }
}

/// Keeps every applied command set in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    applied: Vec<CommandSet>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> &[CommandSet] {
        &self.applied
    }

    /// Log lines in the order they were emitted
    pub fn log_lines(&self) -> Vec<&str> {
        self.applied
            .iter()
            .filter_map(|c| c.log.as_deref())
            .collect()
    }

    /// Number of ticks that carried a buzzer pattern
    pub fn buzzer_count(&self) -> usize {
        self.applied.iter().filter(|c| c.buzzer.is_some()).count()
    }
}

impl ActuatorSink for RecordingSink {
    fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError> {
        self.applied.push(commands.clone());
        Ok(())
    }
}
