pub mod handler;
pub mod keys;

pub use handler::{handle_input, InputState};
pub use keys::{HeldKeys, InputSource, Key};
