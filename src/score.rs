//! Scoring, leveling, and gravity speed

use std::time::Duration;

/// Points per cell for a soft drop
pub const SOFT_DROP_SCORE: u64 = 1;
/// Points per cell for a hard drop
pub const HARD_DROP_SCORE: u64 = 2;
/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Milliseconds per one-cell descent, indexed by level - 1
const GRAVITY_TABLE_MS: [u64; 20] = [
    1000, 793, 618, 473, 355, 262, 190, 135, 94, 64, 43, 28, 18, 11, 7, 4, 3, 2, 1, 1,
];

/// Base value for clearing `lines` rows at once, before the level multiplier.
/// Counts outside 1..=4 are worth nothing.
pub fn line_clear_base(lines: usize) -> u64 {
    match lines {
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => 0,
    }
}

/// Time between gravity steps at a level; levels past the table reuse the fastest speed
pub fn gravity_interval(level: u32) -> Duration {
    let index = (level.max(1) as usize - 1).min(GRAVITY_TABLE_MS.len() - 1);
    Duration::from_millis(GRAVITY_TABLE_MS[index])
}

/// Running totals for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Add score for soft drop
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64 * SOFT_DROP_SCORE;
    }

    /// Add score for hard drop
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * HARD_DROP_SCORE;
    }

    /// Score a simultaneous clear at the current level, then update lines and level.
    /// Returns the points awarded.
    pub fn add_clear(&mut self, lines: usize) -> u64 {
        let awarded = line_clear_base(lines) * self.level as u64;
        self.points += awarded;
        self.lines += lines as u32;

        let level = self.lines / LINES_PER_LEVEL + 1;
        // never regress
        self.level = self.level.max(level);
        awarded
    }

    /// Time between gravity steps at the current level
    pub fn fall_interval(&self) -> Duration {
        gravity_interval(self.level)
    }
}
