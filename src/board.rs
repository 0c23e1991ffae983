//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::TetrominoType;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const VISIBLE_HEIGHT: usize = 20;
/// Hidden rows above the visible board for spawning
pub const BUFFER_HEIGHT: usize = 2;
pub const TOTAL_HEIGHT: usize = VISIBLE_HEIGHT + BUFFER_HEIGHT;

/// A cell on the board - either empty or filled by a piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// One row of the grid
pub type Row = [Cell; BOARD_WIDTH];

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top of the hidden buffer
    cells: [Row; TOTAL_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; TOTAL_HEIGHT],
        }
    }

    /// Empty every cell
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; BOARD_WIDTH]; TOTAL_HEIGHT];
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        let (row, col) = Self::index(row, col)?;
        Some(self.cells[row][col])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        match Self::index(row, col) {
            Some((row, col)) => {
                self.cells[row][col] = cell;
                true
            }
            None => false,
        }
    }

    fn index(row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < TOTAL_HEIGHT && col < BOARD_WIDTH).then_some((row, col))
    }

    /// Read-only view of all rows, top to bottom
    pub fn rows(&self) -> &[Row; TOTAL_HEIGHT] {
        &self.cells
    }

    /// Check a single absolute cell: within bounds and empty
    fn is_free(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some_and(|cell| cell.is_empty())
    }

    /// Check the piece shifted by the given offsets
    pub fn is_valid_position(&self, piece: &Piece, row_offset: i32, col_offset: i32) -> bool {
        self.check_position(piece.cells(), piece.row + row_offset, piece.col + col_offset)
    }

    /// Check arbitrary shape offsets against an absolute anchor
    pub fn check_position(&self, cells: &[(i32, i32)], row: i32, col: i32) -> bool {
        cells
            .iter()
            .all(|&(dr, dc)| self.is_free(row + dr, col + dc))
    }

    /// Write the piece into the grid; blocks outside the grid are dropped
    pub fn place_piece(&mut self, piece: &Piece) {
        for (row, col) in piece.block_positions() {
            self.set(row, col, Cell::Filled(piece.piece_type));
        }
    }

    /// Indices of every completely filled row, ascending
    pub fn full_rows(&self) -> Vec<usize> {
        (0..TOTAL_HEIGHT)
            .filter(|&row| self.is_line_full(row))
            .collect()
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Remove the given rows and drop everything above them.
    /// Row order does not matter; out-of-range indices are ignored.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        let mut write_row = TOTAL_HEIGHT;

        for read_row in (0..TOTAL_HEIGHT).rev() {
            if rows.contains(&read_row) {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }

        // Fill the top with empty rows
        for row in &mut self.cells[..write_row] {
            *row = [Cell::Empty; BOARD_WIDTH];
        }
    }

    /// Row the piece would rest on if dropped straight down
    pub fn ghost_row(&self, piece: &Piece) -> i32 {
        piece.row + self.drop_distance(piece)
    }

    /// Number of rows the piece can fall before it collides
    pub fn drop_distance(&self, piece: &Piece) -> i32 {
        let mut offset = 0;
        while self.is_valid_position(piece, offset + 1, 0) {
            offset += 1;
        }
        offset
    }

    /// Number of filled cells on the whole grid
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_filled())
            .count()
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }
}
