pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod input;
pub mod ui;

pub use config::{GameConfig, Rules};
pub use error::GameError;
pub use game::Game;
