//! Super Rotation System (SRS) wall kick data
//!
//! SRS defines the wall kicks attempted when rotating a piece.
//! If a rotation would cause collision, these offsets are tried in order.

use crate::tetromino::{Rotation, TetrominoType};

/// Get wall kick offsets for a rotation attempt
/// Returns 5 (row_offset, col_offset) pairs to try, row+ is down
///
/// Only adjacent transitions exist; any other pair yields no kicks.
pub fn get_wall_kicks(
    piece_type: TetrominoType,
    from: Rotation,
    to: Rotation,
) -> Option<&'static [(i32, i32); 5]> {
    match piece_type {
        // O piece never rotates
        TetrominoType::O => None,
        TetrominoType::I => i_piece_kicks(from, to),
        _ => jlstz_kicks(from, to),
    }
}

/// Wall kicks for J, L, S, T, Z pieces
fn jlstz_kicks(from: Rotation, to: Rotation) -> Option<&'static [(i32, i32); 5]> {
    use Rotation::*;

    let kicks = match (from, to) {
        // 0→R
        (North, East) => &[(0, 0), (0, -1), (-1, -1), (2, 0), (2, -1)],
        // R→0
        (East, North) => &[(0, 0), (0, 1), (1, 1), (-2, 0), (-2, 1)],
        // R→2
        (East, South) => &[(0, 0), (0, 1), (1, 1), (-2, 0), (-2, 1)],
        // 2→R
        (South, East) => &[(0, 0), (0, -1), (-1, -1), (2, 0), (2, -1)],
        // 2→L
        (South, West) => &[(0, 0), (0, 1), (-1, 1), (2, 0), (2, 1)],
        // L→2
        (West, South) => &[(0, 0), (0, -1), (1, -1), (-2, 0), (-2, -1)],
        // L→0
        (West, North) => &[(0, 0), (0, -1), (1, -1), (-2, 0), (-2, -1)],
        // 0→L
        (North, West) => &[(0, 0), (0, 1), (-1, 1), (2, 0), (2, 1)],
        _ => return None,
    };
    Some(kicks)
}

/// Wall kicks for I piece (different from other pieces)
fn i_piece_kicks(from: Rotation, to: Rotation) -> Option<&'static [(i32, i32); 5]> {
    use Rotation::*;

    let kicks = match (from, to) {
        (North, East) => &[(0, 0), (0, -2), (0, 1), (-1, -2), (2, 1)],
        (East, North) => &[(0, 0), (0, 2), (0, -1), (1, 2), (-2, -1)],
        (East, South) => &[(0, 0), (0, -1), (0, 2), (2, -1), (-1, 2)],
        (South, East) => &[(0, 0), (0, 1), (0, -2), (-2, 1), (1, -2)],
        (South, West) => &[(0, 0), (0, 2), (0, -1), (1, 2), (-2, -1)],
        (West, South) => &[(0, 0), (0, -2), (0, 1), (-1, -2), (2, 1)],
        (West, North) => &[(0, 0), (0, 1), (0, -2), (-2, 1), (1, -2)],
        (North, West) => &[(0, 0), (0, -1), (0, 2), (2, -1), (-1, 2)],
        _ => return None,
    };
    Some(kicks)
}
