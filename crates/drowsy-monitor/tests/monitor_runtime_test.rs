//! Integration tests for the monitor actor: paced loop, cancellation,
//! failure handling, events and episode telemetry.

use std::time::Duration;

use alert_core::{
    ActuatorSink, AlertLevel, CommandSet, EventBus, RecordingSink, ScriptedSensor, SensorError,
    SensorSource, SinkError, StopReason, Switch,
};
use drowsy_monitor::{
    parse_script, EpisodeEndReason, EpisodeSummary, Monitor, MonitorConfig, MonitorError,
    SampleFeed,
};
use mockall::mock;
use tokio_util::sync::CancellationToken;

mock! {
    pub Sink {}

    impl ActuatorSink for Sink {
        fn apply(&mut self, commands: &CommandSet) -> Result<(), SinkError>;
    }
}

/// Yields its samples, then fails
struct FailingSensor {
    samples: ScriptedSensor,
}

impl SensorSource for FailingSensor {
    fn sample(&mut self) -> Result<Option<bool>, SensorError> {
        match self.samples.sample()? {
            Some(raw) => Ok(Some(raw)),
            None => Err(SensorError::Disconnected),
        }
    }
}

fn config_with_period(ms: u64) -> MonitorConfig {
    MonitorConfig {
        tick_period_ms: ms,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_paced_run_reaches_cutoff() {
    let mut monitor = Monitor::new(config_with_period(100), RecordingSink::new());
    let mut sensor = ScriptedSensor::new(vec![true; 150]);
    let cancel = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let summary = monitor.run(&mut sensor, &cancel).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.ticks, 150);
    assert_eq!(summary.cutoffs, 1);
    assert_eq!(summary.peak_level, AlertLevel::Cutoff);
    assert_eq!(summary.stop_reason, StopReason::SensorExhausted);
    assert!(elapsed >= Duration::from_millis(14_900), "elapsed {:?}", elapsed);

    let sink = monitor.into_sink();
    assert_eq!(sink.applied()[118].relay, Switch::On);
    assert_eq!(sink.applied()[119].relay, Switch::Off);
    assert_eq!(sink.buzzer_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_loop() {
    let mut monitor = Monitor::new(config_with_period(100), RecordingSink::new());
    let mut sensor = ScriptedSensor::new(vec![false; 1_000]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        trigger.cancel();
    });

    let summary = monitor.run(&mut sensor, &cancel).await.unwrap();
    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert!(
        (10..=12).contains(&summary.ticks),
        "ticks {}",
        summary.ticks
    );
    assert!(sensor.remaining() > 900);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start() {
    let mut monitor = Monitor::new(config_with_period(100), RecordingSink::new());
    let mut sensor = ScriptedSensor::new(vec![true; 10]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = monitor.run(&mut sensor, &cancel).await.unwrap();
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert!(monitor.sink().applied().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_paced_max_ticks() {
    let config = MonitorConfig {
        max_ticks: Some(25),
        ..config_with_period(50)
    };
    let mut monitor = Monitor::new(config, RecordingSink::new());
    let mut sensor = ScriptedSensor::new(vec![true; 100]);

    let summary = monitor
        .run(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.ticks, 25);
    assert_eq!(summary.stop_reason, StopReason::MaxTicks);
    assert_eq!(monitor.machine().record().closed_duration_ticks, 25);
}

#[tokio::test(start_paused = true)]
async fn test_sensor_failure_is_fatal() {
    let mut monitor = Monitor::new(config_with_period(100), RecordingSink::new());
    let mut sensor = FailingSensor {
        samples: ScriptedSensor::new(vec![true; 5]),
    };

    let err = monitor
        .run(&mut sensor, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::Sensor(SensorError::Disconnected)));
    assert_eq!(monitor.sink().applied().len(), 5);
}

#[tokio::test]
async fn test_sink_failures_are_counted_not_fatal() {
    let mut sink = MockSink::new();
    sink.expect_apply().times(40).returning(|_| {
        Err(SinkError::Rejected {
            actuator: "relay".to_string(),
            reason: "bus fault".to_string(),
        })
    });

    let mut monitor = Monitor::new(MonitorConfig::default(), sink);
    let mut sensor = ScriptedSensor::new(vec![true; 40]);

    let summary = monitor
        .run_unpaced(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.ticks, 40);
    assert_eq!(summary.sink_failures, 40);
    assert_eq!(summary.stop_reason, StopReason::SensorExhausted);
    assert_eq!(monitor.machine().record().current_level, AlertLevel::Level1);
}

#[tokio::test]
async fn test_sink_sees_every_tick() {
    let mut sink = MockSink::new();
    let mut seq = mockall::Sequence::new();
    sink.expect_apply()
        .times(29)
        .in_sequence(&mut seq)
        .withf(|c| c.buzzer.is_none())
        .returning(|_| Ok(()));
    sink.expect_apply()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|c| c.buzzer.is_some() && c.log.is_some())
        .returning(|_| Ok(()));

    let mut monitor = Monitor::new(MonitorConfig::default(), sink);
    let mut sensor = ScriptedSensor::new(vec![true; 30]);
    let summary = monitor
        .run_unpaced(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.sink_failures, 0);
}

#[tokio::test]
async fn test_events_published_in_order() {
    let bus = EventBus::new().shared();
    let mut rx = bus.subscribe();

    let mut monitor =
        Monitor::new(MonitorConfig::default(), RecordingSink::new()).with_event_bus(bus.clone());
    let mut sensor = ScriptedSensor::new(vec![true; 130]);
    monitor
        .run_unpaced(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();

    let mut types = Vec::new();
    while let Ok(event) = rx.try_recv() {
        types.push(event.event_type());
    }

    assert_eq!(
        types,
        vec![
            "monitor_started",
            "eyes_closed",
            "level_raised",
            "level_raised",
            "level_raised",
            "level_raised",
            "motor_cutoff",
            "monitor_stopped",
        ]
    );
}

#[tokio::test]
async fn test_telemetry_records_episodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episodes.jsonl");
    let config = MonitorConfig {
        telemetry_path: Some(path.clone()),
        ..Default::default()
    };

    let mut monitor = Monitor::new(config, RecordingSink::new());
    let mut sensor = ScriptedSensor::new(parse_script("40x1, 1x0, 10x1").unwrap());
    let summary = monitor
        .run_unpaced(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.episodes, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let episodes: Vec<EpisodeSummary> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].ended_by, EpisodeEndReason::Reopened);
    assert_eq!(episodes[0].closed_ticks, 40);
    assert_eq!(episodes[0].peak_level, AlertLevel::Level1);
    assert!(!episodes[0].motor_cutoff);

    assert_eq!(episodes[1].ended_by, EpisodeEndReason::Shutdown);
    assert_eq!(episodes[1].closed_ticks, 10);
    assert_eq!(episodes[1].peak_level, AlertLevel::None);
}

#[tokio::test]
async fn test_unwritable_telemetry_does_not_stop_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let config = MonitorConfig {
        // A directory cannot be opened for append
        telemetry_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    let mut monitor = Monitor::new(config, RecordingSink::new());
    let mut sensor = ScriptedSensor::new(parse_script("35x1 1x0").unwrap());
    let summary = monitor
        .run_unpaced(&mut sensor, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.ticks, 36);
    assert_eq!(summary.episodes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unpaced_feed_stops_on_cancel() {
    let mut monitor = Monitor::new(MonitorConfig::default(), RecordingSink::new());
    let (tx, mut feed) = SampleFeed::channel(16);
    for _ in 0..5 {
        tx.send(Ok(true)).await.unwrap();
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    // The sender stays open, like a terminal that never sends EOF
    let summary = monitor.run_unpaced(&mut feed, &cancel).await.unwrap();
    assert_eq!(summary.ticks, 5);
    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert_eq!(monitor.machine().record().closed_duration_ticks, 5);
    assert!(!tx.is_closed());
}

#[tokio::test]
async fn test_unpaced_feed_read_failure() {
    let mut monitor = Monitor::new(MonitorConfig::default(), RecordingSink::new());
    let (tx, mut feed) = SampleFeed::channel(4);
    tx.send(Ok(true)).await.unwrap();
    tx.send(Err(SensorError::Disconnected)).await.unwrap();

    let err = monitor
        .run_unpaced(&mut feed, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::Sensor(SensorError::Disconnected)));
    assert_eq!(monitor.sink().applied().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_paced_run_folds_stalled_periods() {
    let mut monitor = Monitor::new(config_with_period(100), RecordingSink::new());
    let (tx, mut feed) = SampleFeed::channel(8);

    // One sample, a 450ms stall, then three more
    tokio::spawn(async move {
        tx.send(Ok(true)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(450)).await;
        for _ in 0..3 {
            tx.send(Ok(true)).await.unwrap();
        }
    });

    let summary = monitor
        .run(&mut feed, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.stop_reason, StopReason::SensorExhausted);

    // Ticks land on 0, 100, 200 (late) and 500ms: the skipped periods
    // between 200 and 500 are folded into the last sample
    assert_eq!(monitor.machine().record().closed_duration_ticks, 6);
}
