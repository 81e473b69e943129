use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::constants::{
    frames, CLASSIC_ENTRY_DELAYS, CLASSIC_SPEED_TABLE, DAS_CHARGED_FRAMES, DAS_CHARGE_FRAMES,
    ENTRY_DELAY_FALLBACK_FRAMES, SOFT_DROP_FLOOR_FRAMES,
};
use crate::error::GameError;
use crate::game::speed::{EntryDelays, SpeedCurve};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedStep {
    pub level: i32,
    pub frames: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDelayStep {
    pub min_row: i32,
    pub frames: u32,
}

// Defaults are the NES tables; a JSON file overrides any subset of fields.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rules {
    pub speed_table: Vec<SpeedStep>,
    pub das_charge_frames: u32,
    pub das_charged_frames: u32,
    pub soft_drop_floor_frames: u32,
    pub entry_delays: Vec<EntryDelayStep>,
    pub entry_delay_fallback_frames: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            speed_table: CLASSIC_SPEED_TABLE
                .iter()
                .map(|&(level, frames)| SpeedStep { level, frames })
                .collect(),
            das_charge_frames: DAS_CHARGE_FRAMES,
            das_charged_frames: DAS_CHARGED_FRAMES,
            soft_drop_floor_frames: SOFT_DROP_FLOOR_FRAMES,
            entry_delays: CLASSIC_ENTRY_DELAYS
                .iter()
                .map(|&(min_row, frames)| EntryDelayStep { min_row, frames })
                .collect(),
            entry_delay_fallback_frames: ENTRY_DELAY_FALLBACK_FRAMES,
        }
    }
}

impl Rules {
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let json = fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.das_charge_frames == 0 {
            return Err(GameError::ZeroFrames { what: "das_charge_frames" });
        }
        if self.soft_drop_floor_frames == 0 {
            return Err(GameError::ZeroFrames { what: "soft_drop_floor_frames" });
        }
        if self.das_charged_frames >= self.das_charge_frames {
            return Err(GameError::DasChargedTooHigh {
                charged: self.das_charged_frames,
                charge: self.das_charge_frames,
            });
        }
        self.speed_curve()?;
        self.entry_delay_table()?;
        Ok(())
    }

    pub fn speed_curve(&self) -> Result<SpeedCurve, GameError> {
        SpeedCurve::new(self.speed_table.iter().map(|s| (s.level, s.frames)).collect())
    }

    pub fn entry_delay_table(&self) -> Result<EntryDelays, GameError> {
        EntryDelays::new(
            self.entry_delays.iter().map(|s| (s.min_row, s.frames)).collect(),
            self.entry_delay_fallback_frames,
        )
    }

    pub fn das_charge(&self) -> Duration {
        frames(self.das_charge_frames)
    }

    pub fn das_charged(&self) -> Duration {
        frames(self.das_charged_frames)
    }

    pub fn soft_drop_floor(&self) -> Duration {
        frames(self.soft_drop_floor_frames)
    }
}

/// Everything needed to start a session besides the piece catalog.
#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub level: i32,
    /// Fixed seed for the piece sequence; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub rules: Rules,
}
