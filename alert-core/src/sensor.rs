//! Sensor input contract
//!
//! The machine treats whatever boolean it receives as ground truth; stuck or
//! disconnected sensors are the source's concern.

use std::collections::VecDeque;

/// Error type for sensor reads
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor read failed: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Invalid sample {value:?} at line {line}")]
    InvalidSample { line: usize, value: String },

    #[error("Sensor disconnected")]
    Disconnected,
}

/// One boolean per tick (true = eyes closed)
pub trait SensorSource {
    /// Read the next sample. `Ok(None)` means the source is exhausted.
    fn sample(&mut self) -> Result<Option<bool>, SensorError>;
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn sample(&mut self) -> Result<Option<bool>, SensorError> {
        (**self).sample()
    }
}

/// Fixed sequence of samples, used for replays and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    samples: VecDeque<bool>,
}

impl ScriptedSensor {
    pub fn new(samples: impl IntoIterator<Item = bool>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SensorSource for ScriptedSensor {
    fn sample(&mut self) -> Result<Option<bool>, SensorError> {
        Ok(self.samples.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_sensor_drains_in_order() {
        let mut sensor = ScriptedSensor::new([false, true, true]);
        assert_eq!(sensor.remaining(), 3);
        assert_eq!(sensor.sample().unwrap(), Some(false));
        assert_eq!(sensor.sample().unwrap(), Some(true));
        assert_eq!(sensor.sample().unwrap(), Some(true));
        assert_eq!(sensor.sample().unwrap(), None);
        assert_eq!(sensor.sample().unwrap(), None);
    }

    #[test]
    fn test_boxed_sensor() {
        let mut sensor: Box<dyn SensorSource> = Box::new(ScriptedSensor::new([true]));
        assert_eq!(sensor.sample().unwrap(), Some(true));
    }
}
