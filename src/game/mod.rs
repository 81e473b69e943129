pub mod board;
pub mod catalog;
pub mod piece;
pub mod speed;
pub mod state;

pub use board::{Board, Cell};
pub use catalog::{PieceCatalog, PieceDescriptor};
pub use piece::{ColorId, Piece};
pub use speed::{soft_drop_interval, EntryDelays, SpeedCurve};
pub use state::{Game, Phase, TickEvents, TimingState};
