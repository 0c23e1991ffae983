//! Read-only per-frame view of the engine for renderers

use crate::board::Board;
use crate::game::Phase;
use crate::piece::Piece;
use crate::tetromino::TetrominoType;

/// Rows currently held for the line-clear animation
#[derive(Debug, Clone, PartialEq)]
pub struct ClearingRows<'a> {
    pub rows: &'a [usize],
    /// Elapsed fraction of the clear hold, in [0, 1)
    pub progress: f32,
}

/// Everything a renderer needs for one frame.
/// Borrows the engine, so nothing can mutate it while a snapshot is alive.
#[derive(Debug, Clone)]
pub struct GameSnapshot<'a> {
    pub phase: Phase,
    pub board: &'a Board,
    pub piece: Option<Piece>,
    /// Landing row of the active piece
    pub ghost_row: Option<i32>,
    pub hold: Option<TetrominoType>,
    pub hold_used: bool,
    pub next_queue: Vec<TetrominoType>,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    pub clearing: Option<ClearingRows<'a>>,
}

impl GameSnapshot<'_> {
    /// The active piece moved to its landing row
    pub fn ghost_piece(&self) -> Option<Piece> {
        let piece = self.piece?;
        let row = self.ghost_row?;
        Some(Piece { row, ..piece })
    }
}
