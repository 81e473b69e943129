use std::{fmt, io, path::PathBuf};

/// Failures detected while building a game session.
///
/// Once a [`crate::game::Game`] exists every tick is infallible; all of these
/// are configuration problems caught up front.
#[derive(Debug)]
pub enum GameError {
    EmptyCatalog,
    InvalidShape { name: String, reason: &'static str },
    EmptySpeedTable,
    SpeedTableUnreachable { first_level: i32 },
    SpeedTableOrder { level: i32 },
    ZeroFrames { what: &'static str },
    EntryDelayOrder { min_row: i32 },
    DasChargedTooHigh { charged: u32, charge: u32 },
    Json(serde_json::Error),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "piece catalog has no pieces"),
            Self::InvalidShape { name, reason } => {
                write!(f, "piece '{name}' has an invalid shape: {reason}")
            }
            Self::EmptySpeedTable => write!(f, "speed table has no entries"),
            Self::SpeedTableUnreachable { first_level } => write!(
                f,
                "speed table starts at level {first_level}, levels below it have no speed"
            ),
            Self::SpeedTableOrder { level } => write!(
                f,
                "speed table entry for level {level} is out of order or slower than the level before it"
            ),
            Self::ZeroFrames { what } => write!(f, "{what} must be at least one frame"),
            Self::EntryDelayOrder { min_row } => write!(
                f,
                "entry delay bucket for row {min_row} is not in descending row order"
            ),
            Self::DasChargedTooHigh { charged, charge } => write!(
                f,
                "das_charged_frames ({charged}) must be below das_charge_frames ({charge})"
            ),
            Self::Json(e) => write!(f, "invalid json: {e}"),
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
