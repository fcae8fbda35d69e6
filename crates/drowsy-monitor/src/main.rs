//! Drowsiness monitor CLI
//!
//! # Usage
//!
//! ```bash
//! # Replay a run-length script at the nominal 100ms tick
//! drowsy-monitor run --script "5x0,95x1,1x0"
//!
//! # Pipe samples (one per line) and emit JSON command sets
//! sensor-reader | drowsy-monitor run --json
//!
//! # Show the escalation ladder
//! drowsy-monitor ladder
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use alert_core::{
    ActuatorSink, AlertDispatcher, AlertLevel, ClosureState, Decision, EventBus, ScriptedSensor,
    ThresholdLadder,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drowsy_monitor::{
    parse_script, JsonLinesSink, LineSensor, Monitor, MonitorConfig, MonitorError, OutputFormat,
    RunSummary, SampleFeed, SampleSource, TracingSink,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Samples buffered between the reader thread and the monitor
const FEED_CAPACITY: usize = 64;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the sampling loop
    Run(RunArgs),
    /// Print the escalation ladder and each level's actuator commands
    Ladder,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Run-length sample script, e.g. "5x0,95x1,1x0"
    #[arg(long, conflicts_with = "input")]
    script: Option<String>,

    /// File with one sample per line (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick period in milliseconds (overrides DROWSY_TICK_MS)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Stop after this many ticks (overrides DROWSY_MAX_TICKS)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Replay samples without waiting for the tick period
    #[arg(long, default_value_t = false)]
    unpaced: bool,

    /// Emit one JSON command set per tick on stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Append episode summaries to this JSONL file (overrides DROWSY_TELEMETRY_PATH)
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Print monitor events as JSON lines on stderr
    #[arg(long, default_value_t = false)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drowsy_monitor=info,alert_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Run(run) => run_monitor(run).await,
        Command::Ladder => {
            print_ladder();
            Ok(())
        }
    }
}

fn load_config(args: &RunArgs) -> Result<MonitorConfig, MonitorError> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    config.apply_env()?;

    if let Some(tick_ms) = args.tick_ms {
        config.tick_period_ms = tick_ms;
    }
    if let Some(max) = args.max_ticks {
        config.max_ticks = Some(max);
    }
    if let Some(path) = &args.telemetry {
        config.telemetry_path = Some(path.clone());
    }
    if args.json {
        config.output = OutputFormat::Json;
    }
    if args.unpaced {
        config.paced = false;
    }

    config.validate()?;
    Ok(config)
}

/// Where samples come from
enum Input {
    Script(ScriptedSensor),
    Feed(SampleFeed),
}

fn script_sensor(script: &str) -> Result<ScriptedSensor, MonitorError> {
    Ok(ScriptedSensor::new(parse_script(script)?))
}

async fn drive<K, S>(
    monitor: &mut Monitor<K>,
    source: &mut S,
    paced: bool,
    cancel: &CancellationToken,
) -> Result<RunSummary, MonitorError>
where
    K: ActuatorSink,
    S: SampleSource,
{
    if paced {
        monitor.run(source, cancel).await
    } else {
        monitor.run_unpaced(source, cancel).await
    }
}

async fn run_monitor(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;

    // stdin is consumed as samples arrive, so it is never paced
    let (input, paced) = match (&args.script, &args.input) {
        (Some(script), _) => (Input::Script(script_sensor(script)?), config.paced),
        (None, Some(path)) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open sample file {}", path.display()))?;
            let sensor = LineSensor::new(BufReader::new(file));
            (
                Input::Feed(SampleFeed::spawn_reader(sensor, FEED_CAPACITY)?),
                config.paced,
            )
        }
        (None, None) => {
            let sensor = LineSensor::new(BufReader::new(std::io::stdin()));
            (
                Input::Feed(SampleFeed::spawn_reader(sensor, FEED_CAPACITY)?),
                false,
            )
        }
    };

    let sink: Box<dyn ActuatorSink> = match config.output {
        OutputFormat::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
        OutputFormat::Tracing => Box::new(TracingSink::new()),
    };

    tracing::info!(
        tick_period_ms = config.tick_period_ms,
        max_ticks = ?config.max_ticks,
        paced,
        telemetry = ?config.telemetry_path,
        "Drowsiness monitor starting"
    );

    let bus = EventBus::new().shared();
    let printer = args.events.then(|| {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => eprintln!("{}", line),
                        Err(e) => tracing::warn!("Failed to encode event: {e}"),
                    },
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Event printer lagged")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    });

    let mut monitor = Monitor::new(config, sink).with_event_bus(bus.clone());

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping monitor");
                cancel.cancel();
            }
        })
    };

    let result = match input {
        Input::Script(mut sensor) => drive(&mut monitor, &mut sensor, paced, &cancel).await,
        Input::Feed(mut feed) => drive(&mut monitor, &mut feed, paced, &cancel).await,
    };
    ctrl_c.abort();

    drop(monitor);
    drop(bus);
    if let Some(handle) = printer {
        join_printer(handle).await;
    }

    let summary = result?;
    if summary.cutoffs > 0 {
        tracing::warn!(cutoffs = summary.cutoffs, "Motor cutoff occurred during run");
    }
    Ok(())
}

/// Wait for the event printer to drain; a failed task is logged, not fatal
async fn join_printer(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Event printer task failed");
            false
        }
    }
}

fn print_ladder() {
    let ladder = ThresholdLadder::standard();
    let dispatcher = AlertDispatcher::new();
    println!("{:<8} {:>14}  commands", "level", "closed ticks");
    for &level in AlertLevel::all() {
        let from = ladder.min_ticks_for(level).unwrap_or(0);
        let range = match ladder.max_ticks_exclusive(level) {
            Some(to) => format!("{}-{}", from, to - 1),
            None => format!("{}+", from),
        };
        // Commands as issued on the tick the level is entered
        let commands = dispatcher.dispatch(&Decision {
            state: ClosureState::EyesClosed,
            level,
            edge: None,
            level_up: level != AlertLevel::None,
            closed_duration_ticks: from,
            episode_end: None,
        });
        println!(
            "{:<8} {:>14}  {}",
            level.to_string(),
            range,
            commands.summary()
        );
    }
}
