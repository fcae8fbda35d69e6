//! Monitor actor: drives sample → advance → dispatch → sink once per tick.
//!
//! The [`Monitor`] owns the escalation state machine, the dispatcher and the
//! actuator sink. Exactly one task drives it; other tasks observe through the
//! event bus or stop it through a [`CancellationToken`].

use std::time::Duration;

use alert_core::{
    events_for, ActuatorSink, AlertDispatcher, AlertLevel, CommandSet, Decision, EdgeEvent,
    EscalationStateMachine, MonitorEvent, SensorError, SharedEventBus, StopReason,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ConfigError, MonitorConfig};
use crate::script::ScriptError;
use crate::sensor::SampleSource;
use crate::telemetry::{EpisodeSummary, EpisodeTelemetry};

pub const STARTUP_MESSAGE: &str = "System initialized. Monitoring started.";

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("sensor failed: {0}")]
    Sensor(#[from] SensorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid sample script: {0}")]
    Script(#[from] ScriptError),
}

/// Everything that happened on one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub decision: Decision,
    pub commands: CommandSet,
    pub events: Vec<MonitorEvent>,
}

/// Totals for one run of the sampling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// Closed episodes started
    pub episodes: u64,
    /// Highest level reached in any episode
    pub peak_level: AlertLevel,
    /// Times the motor relay was released
    pub cutoffs: u64,
    pub sink_failures: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Default)]
struct RunStats {
    ticks: u64,
    episodes: u64,
    peak_level: AlertLevel,
    cutoffs: u64,
    sink_failures: u64,
}

impl RunStats {
    fn record(&mut self, decision: &Decision) {
        self.ticks += 1;
        if decision.edge == Some(EdgeEvent::EyesClosedDetected) {
            self.episodes += 1;
        }
        if decision.level_up {
            self.peak_level = self.peak_level.max(decision.level);
            if decision.level.is_cutoff() {
                self.cutoffs += 1;
            }
        }
    }

    fn summary(&self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            episodes: self.episodes,
            peak_level: self.peak_level,
            cutoffs: self.cutoffs,
            sink_failures: self.sink_failures,
            stop_reason,
        }
    }
}

/// Number of sampling periods covered by `gap`, rounded, never below one
pub fn elapsed_ticks(gap: Duration, period: Duration) -> u64 {
    let period_ns = period.as_nanos().max(1);
    let ticks = (gap.as_nanos() + period_ns / 2) / period_ns;
    u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
}

/// Next sample, or `None` once cancellation is requested
///
/// Cancellation is checked first, so an always-ready source still stops.
async fn sample_or_cancel<S>(
    source: &mut S,
    cancel: &CancellationToken,
) -> Option<Result<Option<bool>, SensorError>>
where
    S: SampleSource + ?Sized,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        sample = source.next_sample() => Some(sample),
    }
}

/// The monitor actor
pub struct Monitor<K> {
    config: MonitorConfig,
    machine: EscalationStateMachine,
    dispatcher: AlertDispatcher,
    sink: K,
    bus: Option<SharedEventBus>,
    telemetry: EpisodeTelemetry,
    stats: RunStats,
}

impl<K: ActuatorSink> Monitor<K> {
    pub fn new(config: MonitorConfig, sink: K) -> Self {
        let telemetry = EpisodeTelemetry::new(config.telemetry_path.clone());
        Self {
            config,
            machine: EscalationStateMachine::new(),
            dispatcher: AlertDispatcher::new(),
            sink,
            bus: None,
            telemetry,
            stats: RunStats::default(),
        }
    }

    /// Publish derived events on `bus`
    pub fn with_event_bus(mut self, bus: SharedEventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn machine(&self) -> &EscalationStateMachine {
        &self.machine
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Run one tick: advance, dispatch, apply, observe
    ///
    /// A sink failure is logged and counted; the decision has already been
    /// taken and the next tick re-issues the steady actuator states.
    pub fn tick(&mut self, raw_closed: bool, elapsed_ticks: u64) -> TickReport {
        let now = Utc::now();
        let decision = self.machine.advance(raw_closed, elapsed_ticks);
        let commands = self.dispatcher.dispatch(&decision);

        if let Err(e) = self.sink.apply(&commands) {
            self.stats.sink_failures += 1;
            warn!(error = %e, "Actuator sink rejected commands");
        }

        self.stats.record(&decision);

        if let Some(summary) = self.telemetry.observe(&decision, now) {
            self.persist_episode(&summary);
        }

        let events = events_for(&decision, now);
        if let Some(bus) = &self.bus {
            for event in &events {
                bus.publish(event.clone());
            }
        }

        TickReport {
            decision,
            commands,
            events,
        }
    }

    /// Paced sampling loop on the configured tick period
    ///
    /// Stops on sensor exhaustion, cancellation or `max_ticks`. When the
    /// loop falls behind (a slow source, a stalled host), the missed periods
    /// are folded into the next sample's `elapsed_ticks`.
    pub async fn run<S>(
        &mut self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, MonitorError>
    where
        S: SampleSource + ?Sized,
    {
        let period = self.config.tick_period();
        self.start();

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick: Option<Instant> = None;

        let reason = loop {
            if self.limit_reached() {
                break StopReason::MaxTicks;
            }

            let now = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                now = interval.tick() => now,
            };

            let elapsed = last_tick
                .map(|prev| elapsed_ticks(now - prev, period))
                .unwrap_or(1);
            if elapsed > 1 {
                warn!(elapsed, "Tick source fell behind, folding missed periods");
            }
            last_tick = Some(now);

            match sample_or_cancel(source, cancel).await {
                None => break StopReason::Cancelled,
                Some(Ok(Some(raw_closed))) => {
                    self.tick(raw_closed, elapsed);
                }
                Some(Ok(None)) => break StopReason::SensorExhausted,
                Some(Err(e)) => {
                    self.stop(StopReason::SensorFailed);
                    return Err(e.into());
                }
            }
        };

        Ok(self.stop(reason))
    }

    /// Consume samples as they arrive, one period per sample
    ///
    /// Used for replays and for sources that set their own pace (stdin).
    /// Stops on exhaustion, cancellation or `max_ticks`.
    pub async fn run_unpaced<S>(
        &mut self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, MonitorError>
    where
        S: SampleSource + ?Sized,
    {
        self.start();

        let reason = loop {
            if self.limit_reached() {
                break StopReason::MaxTicks;
            }
            match sample_or_cancel(source, cancel).await {
                None => break StopReason::Cancelled,
                Some(Ok(Some(raw_closed))) => {
                    self.tick(raw_closed, 1);
                }
                Some(Ok(None)) => break StopReason::SensorExhausted,
                Some(Err(e)) => {
                    self.stop(StopReason::SensorFailed);
                    return Err(e.into());
                }
            }
        };

        Ok(self.stop(reason))
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_ticks
            .is_some_and(|max| self.stats.ticks >= max)
    }

    fn start(&mut self) {
        info!(
            tick_period_ms = self.config.tick_period_ms,
            observers = self.bus.as_ref().map_or(0, |bus| bus.subscriber_count()),
            "{}",
            STARTUP_MESSAGE
        );
        self.publish(MonitorEvent::MonitorStarted {
            tick_period_ms: self.config.tick_period_ms,
            timestamp: Utc::now(),
        });
    }

    fn stop(&mut self, reason: StopReason) -> RunSummary {
        let now = Utc::now();
        if let Some(summary) = self.telemetry.finish(now) {
            self.persist_episode(&summary);
        }

        let summary = self.stats.summary(reason);
        info!(
            ticks = summary.ticks,
            episodes = summary.episodes,
            peak_level = %summary.peak_level,
            cutoffs = summary.cutoffs,
            sink_failures = summary.sink_failures,
            reason = %reason,
            "Monitoring stopped"
        );
        self.publish(MonitorEvent::MonitorStopped {
            ticks: summary.ticks,
            reason,
            timestamp: now,
        });
        summary
    }

    fn publish(&self, event: MonitorEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }

    fn persist_episode(&self, summary: &EpisodeSummary) {
        if let Err(e) = self.telemetry.persist(summary) {
            warn!(error = %e, episode = %summary.id, "Failed to record episode");
        }
    }
}
