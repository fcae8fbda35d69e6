//! Monitor configuration
//!
//! Layered: defaults → optional TOML file → `DROWSY_*` environment → CLI
//! flags (applied by the binary). Escalation thresholds are fixed policy and
//! are not configurable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Nominal sampling period
pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("tick_period_ms must be greater than zero")]
    ZeroTickPeriod,

    #[error("max_ticks must be greater than zero when set")]
    ZeroMaxTicks,
}

/// How per-tick command sets are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Status lines through `tracing`
    #[default]
    Tracing,
    /// One JSON object per tick on stdout
    Json,
}

/// Runtime configuration for the monitor host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sampling period in milliseconds
    pub tick_period_ms: u64,
    /// Stop after this many ticks (None = run until the sensor is exhausted)
    pub max_ticks: Option<u64>,
    /// Append closed-episode summaries to this JSONL file
    pub telemetry_path: Option<PathBuf>,
    pub output: OutputFormat,
    /// Pace samples on the tick period; false replays as fast as possible
    pub paced: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            max_ticks: None,
            telemetry_path: None,
            output: OutputFormat::Tracing,
            paced: true,
        }
    }
}

impl MonitorConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DROWSY_TICK_MS`, `DROWSY_MAX_TICKS` and `DROWSY_TELEMETRY_PATH`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup("DROWSY_TICK_MS") {
            self.tick_period_ms = parse_u64("DROWSY_TICK_MS", &value)?;
        }
        if let Some(value) = lookup("DROWSY_MAX_TICKS") {
            self.max_ticks = Some(parse_u64("DROWSY_MAX_TICKS", &value)?);
        }
        if let Some(value) = lookup("DROWSY_TELEMETRY_PATH") {
            if !value.trim().is_empty() {
                self.telemetry_path = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.max_ticks == Some(0) {
            return Err(ConfigError::ZeroMaxTicks);
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        })
}
