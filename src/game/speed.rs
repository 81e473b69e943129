use std::time::Duration;

use crate::constants::{frames, MAX_LEVEL};
use crate::error::GameError;

/// Sparse level -> frames-per-row table.
///
/// Levels between two thresholds use the lower threshold's speed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedCurve {
    steps: Vec<(i32, u32)>,
}

impl SpeedCurve {
    pub fn new(steps: Vec<(i32, u32)>) -> Result<Self, GameError> {
        let Some(&(first_level, _)) = steps.first() else {
            return Err(GameError::EmptySpeedTable);
        };
        if first_level > 0 {
            return Err(GameError::SpeedTableUnreachable { first_level });
        }

        for pair in steps.windows(2) {
            let (prev_level, prev_frames) = pair[0];
            let (level, frame_count) = pair[1];
            if level <= prev_level || frame_count > prev_frames {
                return Err(GameError::SpeedTableOrder { level });
            }
        }
        if steps.iter().any(|&(_, frame_count)| frame_count == 0) {
            return Err(GameError::ZeroFrames { what: "speed table entry" });
        }

        Ok(Self { steps })
    }

    /// Frames per row at `level`, clamped to `0..=MAX_LEVEL`.
    pub fn frames_for(&self, level: i32) -> u32 {
        let level = level.clamp(0, MAX_LEVEL);
        // The first threshold is <= 0, so the search always finds an entry.
        self.steps
            .iter()
            .rev()
            .find(|&&(threshold, _)| threshold <= level)
            .map_or(self.steps[0].1, |&(_, frame_count)| frame_count)
    }

    pub fn gravity_interval(&self, level: i32) -> Duration {
        frames(self.frames_for(level))
    }
}

/// Gravity interval while down is held.
pub fn soft_drop_interval(base: Duration, floor: Duration) -> Duration {
    (base / 2).min(floor)
}

/// Descending (min_row, frames) buckets plus the delay for anything higher up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryDelays {
    buckets: Vec<(i32, u32)>,
    fallback: u32,
}

impl EntryDelays {
    pub fn new(buckets: Vec<(i32, u32)>, fallback: u32) -> Result<Self, GameError> {
        if let Some(pair) = buckets.windows(2).find(|pair| pair[1].0 >= pair[0].0) {
            return Err(GameError::EntryDelayOrder { min_row: pair[1].0 });
        }
        Ok(Self { buckets, fallback })
    }

    /// Delay before the next spawn for a piece whose lowest cell is at `bottom_row`.
    pub fn delay_for(&self, bottom_row: i32) -> Duration {
        let frame_count = self
            .buckets
            .iter()
            .find(|&&(min_row, _)| bottom_row >= min_row)
            .map_or(self.fallback, |&(_, frame_count)| frame_count);
        frames(frame_count)
    }
}
