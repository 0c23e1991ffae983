//! Blockfall - a falling-block puzzle engine
//!
//! The engine ([`game::Game`]) is frame driven and has no I/O. Input timing,
//! persistence, loop scheduling and terminal rendering sit around it and talk
//! to it through actions, events and snapshots.

pub mod bag;
pub mod board;
pub mod error;
pub mod events;
pub mod game;
pub mod highscores;
pub mod input;
pub mod menu;
pub mod piece;
pub mod scheduler;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod srs;
pub mod tetromino;
pub mod ui;

pub use events::{EventBus, EventKind, GameEvent, GameOverInfo, ListenerId};
pub use game::{Action, Game, Phase};
pub use snapshot::GameSnapshot;
