//! Threshold ladder — maps a continuous-closure duration to an alert level
//!
//! Rungs are half-open `[min_ticks, next.min_ticks)`; the last rung is
//! open-ended. A duration sitting exactly on a boundary belongs to the
//! higher level.

use super::state::AlertLevel;
use serde::Serialize;

/// One step of the ladder: from `min_ticks` onward the level is `level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rung {
    pub min_ticks: u64,
    pub level: AlertLevel,
}

/// Policy thresholds at the nominal 100ms tick
static STANDARD_RUNGS: [Rung; 4] = [
    Rung {
        min_ticks: 30,
        level: AlertLevel::Level1,
    },
    Rung {
        min_ticks: 60,
        level: AlertLevel::Level2,
    },
    Rung {
        min_ticks: 90,
        level: AlertLevel::Level3,
    },
    Rung {
        min_ticks: 120,
        level: AlertLevel::Cutoff,
    },
];

/// Declarative threshold table scanned by duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdLadder {
    rungs: &'static [Rung],
}

impl ThresholdLadder {
    /// The fixed drowsiness policy: 30 / 60 / 90 / 120 ticks
    pub fn standard() -> Self {
        Self {
            rungs: &STANDARD_RUNGS,
        }
    }

    /// Level for a continuous-closure duration
    pub fn level_for(&self, closed_ticks: u64) -> AlertLevel {
        self.rungs
            .iter()
            .rev()
            .find(|rung| closed_ticks >= rung.min_ticks)
            .map(|rung| rung.level)
            .unwrap_or(AlertLevel::None)
    }

    /// Duration at which `level` is first reached (`None` level starts at 0)
    pub fn min_ticks_for(&self, level: AlertLevel) -> Option<u64> {
        if level == AlertLevel::None {
            return Some(0);
        }
        self.rungs
            .iter()
            .find(|rung| rung.level == level)
            .map(|rung| rung.min_ticks)
    }

    /// Duration at which the ladder leaves `level`, if it ever does
    pub fn max_ticks_exclusive(&self, level: AlertLevel) -> Option<u64> {
        self.rungs
            .iter()
            .find(|rung| rung.level > level)
            .map(|rung| rung.min_ticks)
    }
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_boundaries() {
        let ladder = ThresholdLadder::standard();
        assert_eq!(ladder.level_for(0), AlertLevel::None);
        assert_eq!(ladder.level_for(29), AlertLevel::None);
        assert_eq!(ladder.level_for(30), AlertLevel::Level1);
        assert_eq!(ladder.level_for(59), AlertLevel::Level1);
        assert_eq!(ladder.level_for(60), AlertLevel::Level2);
        assert_eq!(ladder.level_for(89), AlertLevel::Level2);
        assert_eq!(ladder.level_for(90), AlertLevel::Level3);
        assert_eq!(ladder.level_for(119), AlertLevel::Level3);
        assert_eq!(ladder.level_for(120), AlertLevel::Cutoff);
        assert_eq!(ladder.level_for(u64::MAX), AlertLevel::Cutoff);
    }

    #[test]
    fn test_every_level_has_a_contiguous_range() {
        let ladder = ThresholdLadder::standard();
        for pair in AlertLevel::all().windows(2) {
            assert_eq!(
                ladder.max_ticks_exclusive(pair[0]),
                ladder.min_ticks_for(pair[1]),
                "{} -> {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_min_and_max_ticks() {
        let ladder = ThresholdLadder::standard();
        assert_eq!(ladder.min_ticks_for(AlertLevel::None), Some(0));
        assert_eq!(ladder.min_ticks_for(AlertLevel::Level2), Some(60));
        assert_eq!(ladder.max_ticks_exclusive(AlertLevel::Level2), Some(90));
        assert_eq!(ladder.max_ticks_exclusive(AlertLevel::Cutoff), None);
    }
}
