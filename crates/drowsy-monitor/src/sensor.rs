//! Sensor sources for the monitor loop
//!
//! - [`SampleSource`]: what the loop awaits each tick; every blocking
//!   [`SensorSource`] is one
//! - [`LineSensor`]: one sample per line from any `BufRead`, skipping blank
//!   lines and `#` comments
//! - [`SampleFeed`]: channel-backed source, fed by a reader thread or a task

use std::future::Future;
use std::io::BufRead;

use alert_core::{SensorError, SensorSource};
use tokio::sync::mpsc;

use crate::script::parse_sample;

/// Sample source awaited by the monitor loop
pub trait SampleSource {
    /// Next sample (true = eyes closed); `Ok(None)` once exhausted
    fn next_sample(&mut self) -> impl Future<Output = Result<Option<bool>, SensorError>>;
}

impl<S: SensorSource + ?Sized> SampleSource for S {
    fn next_sample(&mut self) -> impl Future<Output = Result<Option<bool>, SensorError>> {
        std::future::ready(self.sample())
    }
}

/// What a feed producer sends: a sample or the read failure that ends it
pub type FeedItem = Result<bool, SensorError>;

/// Channel-backed sample source
///
/// Exhausted once every sender is dropped.
#[derive(Debug)]
pub struct SampleFeed {
    rx: mpsc::Receiver<FeedItem>,
}

impl SampleFeed {
    /// Bounded feed and the sender its producer pushes into
    pub fn channel(capacity: usize) -> (mpsc::Sender<FeedItem>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    /// Drain a blocking sensor on a dedicated OS thread
    ///
    /// The thread is detached and may stay parked in a read after the feed
    /// is dropped; it exits on its next send.
    pub fn spawn_reader<S>(mut sensor: S, capacity: usize) -> Result<Self, SensorError>
    where
        S: SensorSource + Send + 'static,
    {
        let (tx, feed) = Self::channel(capacity);
        std::thread::Builder::new()
            .name("sensor-reader".to_string())
            .spawn(move || loop {
                let item = match sensor.sample() {
                    Ok(Some(raw_closed)) => Ok(raw_closed),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() || failed {
                    break;
                }
            })?;
        Ok(feed)
    }
}

impl SampleSource for SampleFeed {
    fn next_sample(&mut self) -> impl Future<Output = Result<Option<bool>, SensorError>> {
        async move { self.rx.recv().await.transpose() }
    }
}

pub struct LineSensor<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> LineSensor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> SensorSource for LineSensor<R> {
    fn sample(&mut self) -> Result<Option<bool>, SensorError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return parse_sample(line)
                .map(Some)
                .ok_or_else(|| SensorError::InvalidSample {
                    line: self.line_no,
                    value: line.to_string(),
                });
        }
    }
}
