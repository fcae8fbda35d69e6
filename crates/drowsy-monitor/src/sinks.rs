//! Actuator sinks for the host
//!
//! - [`TracingSink`]: status lines and actuator changes through `tracing`
//! - [`JsonLinesSink`]: one JSON object per tick, for replay and piping

use std::io::Write;

use alert_core::{ActuatorSink, CommandSet, SinkError};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Emits the one-shot status line at info and steady-state changes at debug
#[derive(Debug, Default)]
pub struct TracingSink {
    last: Option<CommandSet>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActuatorSink for TracingSink {
    fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError> {
        if let Some(line) = &commands.log {
            if commands.motor_enabled() {
                info!("{}", line);
            } else {
                warn!("{}", line);
            }
        }

        if let Some(buzzer) = &commands.buzzer {
            info!(
                frequency_hz = buzzer.frequency_hz,
                half_period_us = buzzer.half_period_us(),
                repetitions = buzzer.repetitions,
                gap_ms = buzzer.gap_ms,
                duration_ms = buzzer.total_duration_ms(),
                "Buzzer pattern"
            );
        }

        let changed = self.last.as_ref().map_or(true, |prev| {
            prev.relay != commands.relay
                || prev.vibrator != commands.vibrator
                || prev.visual != commands.visual
        });
        if changed {
            debug!(
                relay = %commands.relay,
                vibrator = %commands.vibrator,
                visual = %commands.visual,
                "Actuator state"
            );
        }

        self.last = Some(commands.clone());
        Ok(())
    }
}

#[derive(Serialize)]
struct TickLine<'a> {
    tick: u64,
    #[serde(flatten)]
    commands: &'a CommandSet,
}

/// Writes `{"tick":N, ...commands}` per line and flushes each tick
pub struct JsonLinesSink<W> {
    writer: W,
    tick: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, tick: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ActuatorSink for JsonLinesSink<W> {
    fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError> {
        self.tick += 1;
        let line = serde_json::to_string(&TickLine {
            tick: self.tick,
            commands,
        })?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}
