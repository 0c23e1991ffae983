//! Core game state and logic
//!
//! The engine is frame driven: the caller forwards discrete [`Action`]s and
//! calls [`Game::update`] once per frame with the elapsed time. Nothing here
//! reads a clock, so pausing simply stops the calls.

use crate::bag::Bag;
use crate::board::Board;
use crate::events::{EventBus, GameEvent, GameOverInfo};
use crate::piece::Piece;
use crate::score::Score;
use crate::snapshot::{ClearingRows, GameSnapshot};
use crate::srs::get_wall_kicks;
use crate::tetromino::{RotationDirection, TetrominoType};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};

/// Lock delay settings
pub const LOCK_DELAY: Duration = Duration::from_millis(500);
pub const MAX_LOCK_RESETS: u8 = 15;
/// How long full rows stay on the board before they are removed
pub const LINE_CLEAR_DURATION: Duration = Duration::from_millis(200);
/// Number of upcoming pieces shown
pub const NEXT_QUEUE_SIZE: usize = 3;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Hold,
    Pause,
}

/// The main game struct
#[derive(Debug)]
pub struct Game {
    board: Board,
    bag: Bag,
    events: EventBus,
    phase: Phase,
    /// Current falling piece
    current_piece: Option<Piece>,
    /// Held piece (can swap once per piece)
    hold_piece: Option<TetrominoType>,
    /// Whether hold has been used this piece
    hold_used: bool,
    next_queue: VecDeque<TetrominoType>,
    score: Score,
    gravity_timer: Duration,
    /// Set while the piece rests on the stack
    lock_active: bool,
    lock_timer: Duration,
    /// Number of lock resets used
    lock_resets: u8,
    /// Full rows waiting for the clear animation to finish
    clearing_rows: Option<Vec<usize>>,
    clear_timer: Duration,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create an engine sitting in the menu
    pub fn new() -> Self {
        Self::with_bag(Bag::new())
    }

    /// Create an engine whose piece sequence comes from a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_bag(Bag::with_seed(seed))
    }

    fn with_bag(bag: Bag) -> Self {
        Self {
            board: Board::new(),
            bag,
            events: EventBus::new(),
            phase: Phase::Menu,
            current_piece: None,
            hold_piece: None,
            hold_used: false,
            next_queue: VecDeque::with_capacity(NEXT_QUEUE_SIZE + 1),
            score: Score::new(),
            gravity_timer: Duration::ZERO,
            lock_active: false,
            lock_timer: Duration::ZERO,
            lock_resets: 0,
            clearing_rows: None,
            clear_timer: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current_piece
    }

    pub fn hold_piece(&self) -> Option<TetrominoType> {
        self.hold_piece
    }

    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    pub fn next_queue(&self) -> Vec<TetrominoType> {
        self.next_queue.iter().copied().collect()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing_rows.is_some()
    }

    /// Subscribe consumers here
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.publish(&event);
    }

    /// Reset every per-game field back to its menu state
    fn reset_state(&mut self) {
        self.phase = Phase::Menu;
        self.current_piece = None;
        self.hold_piece = None;
        self.hold_used = false;
        self.next_queue.clear();
        self.score = Score::new();
        self.reset_timers();
        self.clearing_rows = None;
        self.clear_timer = Duration::ZERO;
    }

    fn reset_timers(&mut self) {
        self.gravity_timer = Duration::ZERO;
        self.lock_active = false;
        self.lock_timer = Duration::ZERO;
        self.lock_resets = 0;
    }

    /// Begin a fresh game from any phase
    pub fn start_game(&mut self) {
        self.board.reset();
        self.bag.reset();
        self.reset_state();
        self.phase = Phase::Playing;
        info!("game started");
        self.fill_next_queue();
        self.spawn_piece();
        self.emit(GameEvent::StateChanged(self.phase));
        self.emit(GameEvent::GameStarted);
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.emit(GameEvent::StateChanged(self.phase));
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            self.emit(GameEvent::StateChanged(self.phase));
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Menu | Phase::GameOver => {}
        }
    }

    /// Abandon the current game and go back to the menu
    pub fn return_to_menu(&mut self) {
        self.reset_state();
        self.board.reset();
        self.emit(GameEvent::StateChanged(self.phase));
    }

    /// Process an action token; returns whether it changed anything
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::SoftDrop => self.soft_drop(),
            Action::HardDrop => self.hard_drop(),
            Action::RotateCW => self.rotate_cw(),
            Action::RotateCCW => self.rotate_ccw(),
            Action::Hold => self.hold(),
            Action::Pause => {
                let before = self.phase;
                self.toggle_pause();
                before != self.phase
            }
        }
    }

    /// Advance timers by one frame. `dt` must already be capped by the caller.
    pub fn update(&mut self, dt: Duration) {
        if self.phase != Phase::Playing {
            return;
        }

        // Gravity and lock delay are suspended while rows are clearing
        if self.clearing_rows.is_some() {
            self.clear_timer += dt;
            if self.clear_timer >= LINE_CLEAR_DURATION {
                self.finish_line_clear();
            }
            return;
        }

        if self.current_piece.is_none() {
            return;
        }

        // Several steps can fire in one frame at high levels
        let interval = self.score.fall_interval();
        self.gravity_timer += dt;
        while self.gravity_timer >= interval && self.current_piece.is_some() && !self.lock_active {
            self.gravity_timer -= interval;
            self.apply_gravity();
        }

        if self.lock_active {
            self.lock_timer += dt;
            if self.lock_timer >= LOCK_DELAY {
                self.lock_piece();
            }
        }
    }

    /// Active piece, if actions are accepted right now
    fn controllable(&self) -> Option<Piece> {
        if self.phase != Phase::Playing || self.clearing_rows.is_some() {
            return None;
        }
        self.current_piece
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, col_offset: i32) -> bool {
        let Some(piece) = self.controllable() else {
            return false;
        };
        if !self.board.is_valid_position(&piece, 0, col_offset) {
            return false;
        }
        self.current_piece = Some(piece.shifted(0, col_offset));
        self.on_successful_move();
        true
    }

    pub fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.controllable() else {
            return false;
        };
        if !self.board.is_valid_position(&piece, 1, 0) {
            return false;
        }
        self.current_piece = Some(piece.shifted(1, 0));
        self.score.add_soft_drop(1);
        self.gravity_timer = Duration::ZERO;
        self.on_successful_move();
        self.emit(GameEvent::ScoreUpdated(self.score.points));
        true
    }

    pub fn hard_drop(&mut self) -> bool {
        let Some(piece) = self.controllable() else {
            return false;
        };
        let distance = self.board.drop_distance(&piece);
        self.current_piece = Some(piece.shifted(distance, 0));
        self.score.add_hard_drop(distance as u32);
        self.emit(GameEvent::ScoreUpdated(self.score.points));
        self.lock_piece();
        true
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.rotate(RotationDirection::Clockwise)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.rotate(RotationDirection::CounterClockwise)
    }

    /// Try each kick for the transition in order; commit the first that fits
    fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = self.controllable() else {
            return false;
        };
        let to = piece.rotation.turned(direction);
        let Some(kicks) = get_wall_kicks(piece.piece_type, piece.rotation, to) else {
            return false;
        };
        let cells = piece.piece_type.shape(to);

        let fit = kicks.iter().find(|&&(kick_row, kick_col)| {
            self.board
                .check_position(cells, piece.row + kick_row, piece.col + kick_col)
        });
        let Some(&(kick_row, kick_col)) = fit else {
            return false;
        };

        self.current_piece = Some(Piece {
            rotation: to,
            row: piece.row + kick_row,
            col: piece.col + kick_col,
            ..piece
        });
        self.on_successful_move();
        true
    }

    /// Swap the active piece into the hold slot
    pub fn hold(&mut self) -> bool {
        if self.hold_used {
            return false;
        }
        let Some(current) = self.controllable() else {
            return false;
        };

        if let Some(held) = self.hold_piece {
            // A blocked swap leaves everything as it was
            let Some(piece) = self.fit_spawn(held) else {
                return false;
            };
            self.current_piece = Some(piece);
        } else {
            let next = self.advance_queue();
            match self.fit_spawn(next) {
                Some(piece) => self.current_piece = Some(piece),
                None => {
                    self.game_over();
                    return false;
                }
            }
        }

        self.hold_piece = Some(current.piece_type);
        self.hold_used = true;
        self.reset_timers();
        debug!(held = ?current.piece_type, "hold");
        self.emit(GameEvent::HoldChanged(current.piece_type));
        true
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> GameSnapshot<'_> {
        GameSnapshot {
            phase: self.phase,
            board: &self.board,
            piece: self.current_piece,
            ghost_row: self.current_piece.map(|piece| self.board.ghost_row(&piece)),
            hold: self.hold_piece,
            hold_used: self.hold_used,
            next_queue: self.next_queue(),
            score: self.score.points,
            lines: self.score.lines,
            level: self.score.level,
            clearing: self.clearing_rows.as_deref().map(|rows| ClearingRows {
                rows,
                progress: (self.clear_timer.as_secs_f32() / LINE_CLEAR_DURATION.as_secs_f32())
                    .min(1.0),
            }),
        }
    }

    fn fill_next_queue(&mut self) {
        while self.next_queue.len() < NEXT_QUEUE_SIZE {
            self.next_queue.push_back(self.bag.next());
        }
    }

    /// Take the head of the queue and top it back up
    fn advance_queue(&mut self) -> TetrominoType {
        self.fill_next_queue();
        let next = self.next_queue.pop_front().unwrap_or_else(|| self.bag.next());
        self.next_queue.push_back(self.bag.next());
        self.emit(GameEvent::NextUpdated(self.next_queue()));
        next
    }

    /// Spawn position for a type, nudged one row up if the canonical one is blocked
    fn fit_spawn(&self, piece_type: TetrominoType) -> Option<Piece> {
        let piece = Piece::new(piece_type);
        [piece, piece.shifted(-1, 0)]
            .into_iter()
            .find(|candidate| self.board.is_valid_position(candidate, 0, 0))
    }

    fn spawn_piece(&mut self) {
        let next = self.advance_queue();
        self.reset_timers();
        self.hold_used = false;

        match self.fit_spawn(next) {
            Some(piece) => {
                debug!(piece = ?next, row = piece.row, "spawn");
                self.current_piece = Some(piece);
            }
            None => self.game_over(),
        }
    }

    fn apply_gravity(&mut self) {
        let Some(piece) = self.current_piece else {
            return;
        };
        if self.board.is_valid_position(&piece, 1, 0) {
            self.current_piece = Some(piece.shifted(1, 0));
            self.check_landing();
        } else if !self.lock_active {
            self.lock_active = true;
            self.lock_timer = Duration::ZERO;
        }
    }

    /// Arm lock delay when grounded, cancel it when airborne
    fn check_landing(&mut self) {
        let Some(piece) = self.current_piece else {
            return;
        };
        if self.board.is_valid_position(&piece, 1, 0) {
            self.lock_active = false;
            self.lock_timer = Duration::ZERO;
        } else if !self.lock_active {
            self.lock_active = true;
            self.lock_timer = Duration::ZERO;
        }
    }

    fn on_successful_move(&mut self) {
        if self.lock_active && self.lock_resets < MAX_LOCK_RESETS {
            self.lock_timer = Duration::ZERO;
            self.lock_resets += 1;
        }
        self.check_landing();
    }

    /// Lock the current piece, then either hold for a clear or spawn next
    fn lock_piece(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        self.board.place_piece(&piece);
        self.lock_active = false;
        debug!(piece = ?piece.piece_type, row = piece.row, col = piece.col, "locked");
        self.emit(GameEvent::PieceLocked(piece));

        let full_rows = self.board.full_rows();
        if full_rows.is_empty() {
            self.spawn_piece();
        } else {
            debug!(rows = ?full_rows, "clearing");
            self.clearing_rows = Some(full_rows.clone());
            self.clear_timer = Duration::ZERO;
            self.emit(GameEvent::LinesClearing(full_rows));
        }
    }

    fn finish_line_clear(&mut self) {
        let Some(rows) = self.clearing_rows.take() else {
            return;
        };
        self.clear_timer = Duration::ZERO;
        self.board.clear_rows(&rows);

        let count = rows.len();
        let awarded = self.score.add_clear(count);
        debug!(count, awarded, level = self.score.level, "lines cleared");

        self.emit(GameEvent::LinesCleared(count));
        self.emit(GameEvent::ScoreUpdated(self.score.points));
        self.spawn_piece();
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.current_piece = None;
        let info = GameOverInfo {
            score: self.score.points,
            lines: self.score.lines,
            level: self.score.level,
        };
        info!(score = info.score, lines = info.lines, level = info.level, "game over");
        self.emit(GameEvent::GameOver(info));
        self.emit(GameEvent::StateChanged(self.phase));
    }
}
