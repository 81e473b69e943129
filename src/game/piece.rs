use crate::constants::BOARD_WIDTH;
use crate::game::catalog::PieceDescriptor;

/// Palette index used by the renderer.
pub type ColorId = u8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub name: String,
    pub shape: Vec<Vec<bool>>,
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
    pub color: ColorId,
}

impl Piece {
    /// Builds a piece in its spawn orientation, centered at the top of the board.
    pub fn new(descriptor: &PieceDescriptor) -> Self {
        let size = descriptor.shape.len() as i32;
        Self {
            name: descriptor.name.clone(),
            shape: descriptor.shape.clone(),
            rotation: 0,
            x: (BOARD_WIDTH as i32 - size) / 2,
            y: 0,
            color: descriptor.color,
        }
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn rotate_right(&mut self) {
        let size = self.shape.len();
        let mut new_shape = vec![vec![false; size]; size];

        for i in 0..size {
            for j in 0..size {
                new_shape[j][size - 1 - i] = self.shape[i][j];
            }
        }

        self.shape = new_shape;
        self.rotation = (self.rotation + 1) % 4;
    }

    pub fn rotate_left(&mut self) {
        let size = self.shape.len();
        let mut new_shape = vec![vec![false; size]; size];

        for i in 0..size {
            for j in 0..size {
                new_shape[size - 1 - j][i] = self.shape[i][j];
            }
        }

        self.shape = new_shape;
        self.rotation = (self.rotation + 3) % 4;
    }

    /// Board coordinates `(x, y)` of every occupied cell.
    pub fn blocks(&self) -> Vec<(i32, i32)> {
        let mut blocks = Vec::new();
        for (i, row) in self.shape.iter().enumerate() {
            for (j, &cell) in row.iter().enumerate() {
                if cell {
                    blocks.push((self.x + j as i32, self.y + i as i32));
                }
            }
        }
        blocks
    }

    pub fn out_of_bounds(&self, width: usize, height: usize) -> bool {
        self.blocks()
            .iter()
            .any(|&(x, y)| x < 0 || y < 0 || x >= width as i32 || y >= height as i32)
    }

    /// Lowest occupied row (largest index).
    pub fn bottom_row(&self) -> i32 {
        self.blocks().iter().map(|&(_, y)| y).max().unwrap_or(self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BOARD_HEIGHT;

    fn t_piece() -> Piece {
        let descriptor = PieceDescriptor::parse("T", 4, &["...", "XXX", ".X."]).unwrap();
        Piece::new(&descriptor)
    }

    #[test]
    fn test_spawn_position() {
        let piece = t_piece();
        assert_eq!((piece.x, piece.y), (3, 0));
        assert_eq!(piece.rotation, 0);
        assert_eq!(piece.blocks(), vec![(3, 1), (4, 1), (5, 1), (4, 2)]);
    }

    #[test]
    fn test_move_is_reversible() {
        let mut piece = t_piece();
        let before = piece.clone();
        piece.move_by(-2, 3);
        assert_eq!((piece.x, piece.y), (1, 3));
        piece.move_by(2, -3);
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotations_are_inverses() {
        let mut piece = t_piece();
        let before = piece.clone();

        piece.rotate_right();
        assert_eq!(piece.rotation, 1);
        assert_ne!(piece.shape, before.shape);
        piece.rotate_left();
        assert_eq!(piece, before);

        piece.rotate_left();
        assert_eq!(piece.rotation, 3);
        piece.rotate_right();
        assert_eq!(piece, before);
    }

    #[test]
    fn test_four_turns_return_to_spawn() {
        let mut piece = t_piece();
        let before = piece.clone();
        for _ in 0..4 {
            piece.rotate_right();
        }
        assert_eq!(piece, before);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut piece = t_piece();
        assert!(!piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));

        piece.move_by(-4, 0);
        assert!(piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));
        piece.move_by(4, 0);

        // Top row of the T shape is empty, so y = -1 is still inside.
        piece.move_by(0, -1);
        assert!(!piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));
        piece.move_by(0, -1);
        assert!(piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));

        // Stem on the last row, then one past it.
        piece.move_by(0, 19);
        assert!(!piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));
        piece.move_by(0, 1);
        assert!(piece.out_of_bounds(BOARD_WIDTH, BOARD_HEIGHT));
    }

    #[test]
    fn test_bottom_row() {
        let mut piece = t_piece();
        assert_eq!(piece.bottom_row(), 2);
        piece.move_by(0, 10);
        assert_eq!(piece.bottom_row(), 12);
    }
}
