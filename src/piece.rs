//! Active falling piece

use crate::tetromino::{Rotation, TetrominoType, SPAWN_COL, SPAWN_ROW};

/// A piece on the board: type, rotation, and anchor of its 4x4 shape box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current rotation state
    pub rotation: Rotation,
    /// Anchor (row, col) of the shape box. Row 0 is the top of the grid.
    pub row: i32,
    pub col: i32,
}

impl Piece {
    /// Create a new piece at the canonical spawn anchor, rotation 0
    pub fn new(piece_type: TetrominoType) -> Self {
        Self {
            piece_type,
            rotation: Rotation::North,
            row: SPAWN_ROW,
            col: SPAWN_COL,
        }
    }

    /// Shape offsets for the current rotation
    pub fn cells(&self) -> &'static [(i32, i32); 4] {
        self.piece_type.shape(self.rotation)
    }

    /// Absolute (row, col) of all 4 blocks
    pub fn block_positions(&self) -> [(i32, i32); 4] {
        self.cells().map(|(dr, dc)| (self.row + dr, self.col + dc))
    }

    /// Copy of this piece moved by the given offsets
    pub fn shifted(&self, row_offset: i32, col_offset: i32) -> Self {
        Self {
            row: self.row + row_offset,
            col: self.col + col_offset,
            ..*self
        }
    }
}
