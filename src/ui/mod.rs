pub mod renderer;

pub use renderer::{compose_cells, palette_color, ui};
