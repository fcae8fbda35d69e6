//! Episode telemetry.
//!
//! Tracks each closed-eyes episode from its closing edge to its reopening
//! edge and appends an [`EpisodeSummary`] to `.jsonl` when it ends.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use alert_core::{AlertLevel, ClosureState, Decision, EdgeEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to write telemetry to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode episode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEndReason {
    /// Eyes reopened
    Reopened,
    /// Monitor stopped while the eyes were still closed
    Shutdown,
}

/// One closed-eyes episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub closed_ticks: u64,
    pub peak_level: AlertLevel,
    pub motor_cutoff: bool,
    pub ended_by: EpisodeEndReason,
}

#[derive(Debug, Clone)]
struct OpenEpisode {
    id: Uuid,
    started_at: DateTime<Utc>,
    closed_ticks: u64,
    peak_level: AlertLevel,
}

impl OpenEpisode {
    fn close(
        self,
        ended_at: DateTime<Utc>,
        closed_ticks: u64,
        peak_level: AlertLevel,
        ended_by: EpisodeEndReason,
    ) -> EpisodeSummary {
        EpisodeSummary {
            id: self.id,
            started_at: self.started_at,
            ended_at,
            closed_ticks,
            peak_level,
            motor_cutoff: peak_level.is_cutoff(),
            ended_by,
        }
    }
}

/// Episode tracker with an optional append-only JSONL sink
#[derive(Debug, Default)]
pub struct EpisodeTelemetry {
    path: Option<PathBuf>,
    open: Option<OpenEpisode>,
}

impl EpisodeTelemetry {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, open: None }
    }

    /// Feed one tick's decision; returns the summary when an episode ends
    pub fn observe(&mut self, decision: &Decision, now: DateTime<Utc>) -> Option<EpisodeSummary> {
        if decision.edge == Some(EdgeEvent::EyesClosedDetected) {
            self.open = Some(OpenEpisode {
                id: Uuid::new_v4(),
                started_at: now,
                closed_ticks: 0,
                peak_level: AlertLevel::None,
            });
        }

        match decision.state {
            ClosureState::EyesClosed => {
                if let Some(open) = self.open.as_mut() {
                    open.closed_ticks = decision.closed_duration_ticks;
                    open.peak_level = open.peak_level.max(decision.level);
                }
                None
            }
            ClosureState::EyesOpen => {
                let end = decision.episode_end?;
                let open = self.open.take()?;
                Some(open.close(
                    now,
                    end.closed_ticks,
                    end.peak_level,
                    EpisodeEndReason::Reopened,
                ))
            }
        }
    }

    /// Close any episode still open at shutdown
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<EpisodeSummary> {
        let open = self.open.take()?;
        let (ticks, peak) = (open.closed_ticks, open.peak_level);
        Some(open.close(now, ticks, peak, EpisodeEndReason::Shutdown))
    }

    /// Append a summary to the JSONL file, if one is configured
    pub fn persist(&self, summary: &EpisodeSummary) -> Result<(), TelemetryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let line = serde_json::to_string(summary)?;
        let io_err = |source| TelemetryError::Io {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)?;
        Ok(())
    }
}
