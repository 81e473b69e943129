use std::{fs, path::Path};

use rand::Rng;
use serde::Deserialize;

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::GameError;
use crate::game::piece::ColorId;

const CLASSIC_PIECES: &str = include_str!("../../assets/pieces.json");

// { "pieces": [ { "name": "T", "color": 3, "shape": ["...", "XXX", ".X."] } ] }
// X or # marks an occupied cell, . or a space an empty one.
#[derive(Deserialize)]
struct RawCatalog {
    pieces: Vec<RawPiece>,
}

#[derive(Deserialize)]
struct RawPiece {
    name: String,
    color: ColorId,
    shape: Vec<String>,
}

/// Shape data a [`crate::game::piece::Piece`] is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceDescriptor {
    pub name: String,
    pub color: ColorId,
    pub shape: Vec<Vec<bool>>,
}

impl PieceDescriptor {
    pub fn parse<S: AsRef<str>>(name: &str, color: ColorId, rows: &[S]) -> Result<Self, GameError> {
        let invalid = |reason| GameError::InvalidShape {
            name: name.to_string(),
            reason,
        };

        if rows.is_empty() {
            return Err(invalid("shape has no rows"));
        }
        // Spawn is centred at the top, so a shape that fits the grid spawns inside it.
        if rows.len() > BOARD_WIDTH || rows.len() > BOARD_HEIGHT {
            return Err(invalid("shape is larger than the board"));
        }

        let mut shape = Vec::with_capacity(rows.len());
        for row in rows {
            let row: &str = row.as_ref();
            let cells = row
                .chars()
                .map(|c| match c {
                    'X' | 'x' | '#' => Ok(true),
                    '.' | ' ' => Ok(false),
                    _ => Err(invalid("shape contains a character other than X, #, . or space")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if cells.len() != rows.len() {
                return Err(invalid("shape is not square"));
            }
            shape.push(cells);
        }

        if !shape.iter().flatten().any(|&cell| cell) {
            return Err(invalid("shape has no occupied cells"));
        }

        Ok(Self {
            name: name.to_string(),
            color,
            shape,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PieceCatalog {
    pieces: Vec<PieceDescriptor>,
}

impl PieceCatalog {
    pub fn new(pieces: Vec<PieceDescriptor>) -> Result<Self, GameError> {
        if pieces.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        Ok(Self { pieces })
    }

    /// The seven standard tetrominoes.
    pub fn classic() -> Result<Self, GameError> {
        Self::from_json_str(CLASSIC_PIECES)
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let pieces = raw
            .pieces
            .iter()
            .map(|p| PieceDescriptor::parse(&p.name, p.color, p.shape.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pieces)
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let json = fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Uniformly random descriptor.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &PieceDescriptor {
        &self.pieces[rng.gen_range(0..self.pieces.len())]
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceDescriptor> {
        self.pieces.iter()
    }
}
