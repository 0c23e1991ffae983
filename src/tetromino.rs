//! Tetromino definitions and shapes
//!
//! All 7 standard tetrominoes with their four rotation states. Offsets are
//! `(row, col)` inside a 4x4 box; row grows downward, matching the board.

use serde::{Deserialize, Serialize};

/// Row of the spawn anchor (top of the hidden buffer)
pub const SPAWN_ROW: i32 = 0;
/// Column of the spawn anchor
pub const SPAWN_COL: i32 = 3;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    /// Number of distinct piece types
    pub const COUNT: usize = 7;

    /// Get all tetromino types in canonical order, used to fill the bag
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Single-letter name
    pub fn name(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::O => 'O',
            TetrominoType::T => 'T',
            TetrominoType::S => 'S',
            TetrominoType::Z => 'Z',
            TetrominoType::J => 'J',
            TetrominoType::L => 'L',
        }
    }

    /// Get the cell offsets for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> &'static [(i32, i32); 4] {
        &SHAPES[*self as usize][rotation.index()]
    }
}

// Indexed by [type][rotation]. The O piece is identical in every state.
static SHAPES: [[[(i32, i32); 4]; 4]; 7] = [
    // I
    [
        [(1, 0), (1, 1), (1, 2), (1, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 1), (1, 1), (2, 1), (3, 1)],
    ],
    // O
    [
        [(0, 1), (0, 2), (1, 1), (1, 2)],
        [(0, 1), (0, 2), (1, 1), (1, 2)],
        [(0, 1), (0, 2), (1, 1), (1, 2)],
        [(0, 1), (0, 2), (1, 1), (1, 2)],
    ],
    // T
    [
        [(0, 1), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 1)],
        [(0, 1), (1, 0), (1, 1), (2, 1)],
    ],
    // S
    [
        [(0, 1), (0, 2), (1, 0), (1, 1)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 1), (1, 2), (2, 0), (2, 1)],
        [(0, 0), (1, 0), (1, 1), (2, 1)],
    ],
    // Z
    [
        [(0, 0), (0, 1), (1, 1), (1, 2)],
        [(0, 2), (1, 1), (1, 2), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(0, 1), (1, 0), (1, 1), (2, 0)],
    ],
    // J
    [
        [(0, 0), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (0, 2), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 0), (2, 1)],
    ],
    // L
    [
        [(0, 2), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (1, 2), (2, 0)],
        [(0, 0), (0, 1), (1, 1), (2, 1)],
    ],
];

/// Rotation states (using SRS naming convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    /// Rotation index, 0 = spawn, clockwise increments
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Build from an index, wrapping modulo 4
    pub fn from_index(index: usize) -> Rotation {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        Rotation::from_index(self.index() + 1)
    }

    /// Rotate counter-clockwise: North → West → South → East → North
    pub fn ccw(&self) -> Rotation {
        Rotation::from_index(self.index() + 3)
    }

    /// Target rotation for a turn in the given direction
    pub fn turned(&self, direction: RotationDirection) -> Rotation {
        match direction {
            RotationDirection::Clockwise => self.cw(),
            RotationDirection::CounterClockwise => self.ccw(),
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rotation_cycle() {
        let mut rotation = Rotation::North;
        for _ in 0..4 {
            rotation = rotation.cw();
        }
        assert_eq!(rotation, Rotation::North);
        assert_eq!(Rotation::North.ccw(), Rotation::West);
        assert_eq!(Rotation::West.cw(), Rotation::North);
    }

    #[test]
    fn test_shapes_have_four_distinct_cells_in_box() {
        for piece in TetrominoType::all() {
            for index in 0..4 {
                let cells = piece.shape(Rotation::from_index(index));
                let unique: HashSet<_> = cells.iter().collect();
                assert_eq!(unique.len(), 4, "{:?} rotation {}", piece, index);
                assert!(cells.iter().all(|&(r, c)| (0..4).contains(&r) && (0..4).contains(&c)));
            }
        }
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let north = TetrominoType::O.shape(Rotation::North);
        for index in 1..4 {
            assert_eq!(TetrominoType::O.shape(Rotation::from_index(index)), north);
        }
    }

    #[test]
    fn test_t_spawn_points_up() {
        // .T.
        // TTT
        assert_eq!(
            TetrominoType::T.shape(Rotation::North),
            &[(0, 1), (1, 0), (1, 1), (1, 2)]
        );
    }
}
