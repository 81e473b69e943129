use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::piece::{ColorId, Piece};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Filled(ColorId),
}

/// Locked cells. Rows grow downward, `cells[y][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Returns false if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self
            .cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&cell| cell == Cell::Empty)
    }

    /// Occupancy check only: cells of `piece` outside the grid are ignored here,
    /// bounds are the caller's concern.
    pub fn is_valid(&self, piece: &Piece) -> bool {
        piece
            .blocks()
            .into_iter()
            .all(|(x, y)| !matches!(self.get(x, y), Some(Cell::Filled(_))))
    }

    /// Takes ownership of `piece` and turns its cells into permanent board cells.
    pub fn add_piece(&mut self, piece: Piece) {
        for (x, y) in piece.blocks() {
            self.set(x, y, Cell::Filled(piece.color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::PieceDescriptor;

    fn o_piece() -> Piece {
        Piece::new(&PieceDescriptor::parse("O", 2, &["XX", "XX"]).unwrap())
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.get(0, 0), Some(Cell::Empty));
        assert_eq!(board.get(9, 19), Some(Cell::Empty));
    }

    #[test]
    fn test_get_and_set_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, 20), None);
        assert_eq!(board.get(10, 0), None);
        assert!(!board.set(-1, 0, Cell::Filled(1)));
        assert!(!board.set(0, 20, Cell::Filled(1)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_add_piece_fills_cells() {
        let mut board = Board::new();
        let mut piece = o_piece();
        piece.move_by(0, 18);
        board.add_piece(piece);

        assert_eq!(board.get(4, 18), Some(Cell::Filled(2)));
        assert_eq!(board.get(5, 18), Some(Cell::Filled(2)));
        assert_eq!(board.get(4, 19), Some(Cell::Filled(2)));
        assert_eq!(board.get(5, 19), Some(Cell::Filled(2)));
        assert_eq!(board.get(3, 19), Some(Cell::Empty));
        assert_eq!(board.rows().iter().flatten().filter(|c| **c != Cell::Empty).count(), 4);
    }

    #[test]
    fn test_is_valid_checks_occupancy() {
        let mut board = Board::new();
        let piece = o_piece();
        assert!(board.is_valid(&piece));

        board.set(5, 1, Cell::Filled(0));
        assert!(!board.is_valid(&piece));
    }

    #[test]
    fn test_is_valid_ignores_cells_outside_grid() {
        let board = Board::new();
        let mut piece = o_piece();
        piece.move_by(-10, 0);
        assert!(board.is_valid(&piece));
    }
}
