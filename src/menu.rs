//! Main menu screens and the falling-piece backdrop behind them

use crate::settings::Settings;
use crate::tetromino::{Rotation, TetrominoType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    HighScores,
    Settings,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: &'static str,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle { key: SettingKey, options: &'static [&'static str], current: usize },
    /// Numeric value with increment/decrement
    Number { key: SettingKey, value: u64, min: u64, max: u64, step: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    GoToScreen(MenuScreen),
    Back,
    SaveSettings,
    Quit,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ShowGhost,
    BlockStyle,
    DasMs,
    ArrMs,
    SoftDropMs,
}

const BLOCK_STYLES: &[&str] = &["solid", "bracket", "round"];

fn button(label: &'static str, action: MenuAction) -> MenuItem {
    MenuItem {
        label,
        item_type: MenuItemType::Button(action),
    }
}

fn number(label: &'static str, key: SettingKey, value: u64, max: u64, step: u64) -> MenuItem {
    MenuItem {
        label,
        item_type: MenuItemType::Number { key, value, min: 0, max, step },
    }
}

impl Menu {
    pub fn new() -> Self {
        Self::main_menu()
    }

    pub fn main_menu() -> Self {
        Self {
            screen: MenuScreen::Main,
            selected: 0,
            items: vec![
                button("Play", MenuAction::StartGame),
                button("High Scores", MenuAction::GoToScreen(MenuScreen::HighScores)),
                button("Settings", MenuAction::GoToScreen(MenuScreen::Settings)),
                button("Quit", MenuAction::Quit),
            ],
        }
    }

    pub fn high_scores() -> Self {
        Self {
            screen: MenuScreen::HighScores,
            selected: 0,
            items: vec![button("Back", MenuAction::Back)],
        }
    }

    pub fn settings_menu(settings: &Settings) -> Self {
        let current_style = BLOCK_STYLES
            .iter()
            .position(|s| *s == settings.visual.block_style)
            .unwrap_or(0);
        let gameplay = &settings.gameplay;

        Self {
            screen: MenuScreen::Settings,
            selected: 0,
            items: vec![
                MenuItem {
                    label: "Ghost Piece",
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::ShowGhost,
                        value: settings.visual.show_ghost,
                    },
                },
                MenuItem {
                    label: "Block Style",
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::BlockStyle,
                        options: BLOCK_STYLES,
                        current: current_style,
                    },
                },
                number("DAS (ms)", SettingKey::DasMs, gameplay.das_ms, 500, 10),
                number("ARR (ms)", SettingKey::ArrMs, gameplay.arr_ms, 100, 5),
                number("Soft Drop (ms)", SettingKey::SoftDropMs, gameplay.soft_drop_ms, 200, 5),
                button("Save", MenuAction::SaveSettings),
                button("Back", MenuAction::Back),
            ],
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    /// Handle left/right for cycling options and numbers
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        self.adjust(settings, false);
    }

    pub fn adjust_right(&mut self, settings: &mut Settings) {
        self.adjust(settings, true);
    }

    fn adjust(&mut self, settings: &mut Settings, forward: bool) {
        let Some(item) = self.items.get_mut(self.selected) else {
            return;
        };
        match &mut item.item_type {
            MenuItemType::Toggle { key, value } => {
                *value = !*value;
                apply_setting(settings, *key, SettingValue::Bool(*value));
            }
            MenuItemType::Cycle { key, options, current } => {
                let len = options.len();
                *current = if forward { (*current + 1) % len } else { (*current + len - 1) % len };
                apply_setting(settings, *key, SettingValue::Str(options[*current]));
            }
            MenuItemType::Number { key, value, min, max, step } => {
                *value = if forward {
                    (*value + *step).min(*max)
                } else {
                    value.saturating_sub(*step).max(*min)
                };
                apply_setting(settings, *key, SettingValue::Number(*value));
            }
            MenuItemType::Button(_) => {}
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<MenuAction> {
        match self.items.get(self.selected)?.item_type {
            MenuItemType::Button(action) => Some(action),
            _ => None,
        }
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings) {
        *self = match screen {
            MenuScreen::Main => Self::main_menu(),
            MenuScreen::HighScores => Self::high_scores(),
            MenuScreen::Settings => Self::settings_menu(settings),
        };
    }

    /// Go back to previous screen
    pub fn go_back(&mut self, settings: &Settings) {
        self.go_to(MenuScreen::Main, settings);
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper enum for setting values
enum SettingValue {
    Bool(bool),
    Str(&'static str),
    Number(u64),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: SettingKey, value: SettingValue) {
    match (key, value) {
        (SettingKey::ShowGhost, SettingValue::Bool(v)) => settings.visual.show_ghost = v,
        (SettingKey::BlockStyle, SettingValue::Str(v)) => settings.visual.block_style = v.to_string(),
        (SettingKey::DasMs, SettingValue::Number(v)) => settings.gameplay.das_ms = v,
        (SettingKey::ArrMs, SettingValue::Number(v)) => settings.gameplay.arr_ms = v,
        (SettingKey::SoftDropMs, SettingValue::Number(v)) => settings.gameplay.soft_drop_ms = v,
        _ => {}
    }
}

const BACKDROP_PIECES: usize = 12;
/// Fall speed range in rows per second
const MIN_SPEED: f32 = 1.5;
const MAX_SPEED: f32 = 4.0;

/// A decorative piece drifting down behind the menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingPiece {
    pub piece_type: TetrominoType,
    pub rotation: Rotation,
    /// Left edge, in board columns
    pub x: f32,
    /// Top edge, in rows; negative while still above the screen
    pub y: f32,
    speed: f32,
}

impl FallingPiece {
    /// Screen cells covered by this piece as (row, col)
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (top, left) = (self.y.floor() as i32, self.x.floor() as i32);
        self.piece_type
            .shape(self.rotation)
            .iter()
            .map(move |&(r, c)| (top + r, left + c))
    }
}

/// Background animation for the menu loop
#[derive(Debug, Clone)]
pub struct MenuBackdrop {
    pieces: Vec<FallingPiece>,
    width: u16,
    height: u16,
    rng: ChaCha8Rng,
}

impl MenuBackdrop {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_seed(width, height, rand::random())
    }

    pub fn with_seed(width: u16, height: u16, seed: u64) -> Self {
        let mut backdrop = Self {
            pieces: Vec::with_capacity(BACKDROP_PIECES),
            width,
            height,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        for _ in 0..BACKDROP_PIECES {
            let mut piece = backdrop.spawn();
            // spread over the whole screen at first
            piece.y = backdrop.rng.gen_range(-8.0..f32::from(height.max(1)));
            backdrop.pieces.push(piece);
        }
        backdrop
    }

    fn spawn(&mut self) -> FallingPiece {
        let types = TetrominoType::all();
        FallingPiece {
            piece_type: types[self.rng.gen_range(0..types.len())],
            rotation: Rotation::from_index(self.rng.gen_range(0..4)),
            x: self.rng.gen_range(0.0..f32::from(self.width.max(1))),
            y: self.rng.gen_range(-8.0..-1.0),
            speed: self.rng.gen_range(MIN_SPEED..MAX_SPEED),
        }
    }

    /// Follow a change in the drawable area
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn update(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        let bottom = f32::from(self.height) + 4.0;
        for i in 0..self.pieces.len() {
            self.pieces[i].y += self.pieces[i].speed * secs;
            if self.pieces[i].y > bottom {
                self.pieces[i] = self.spawn();
            }
        }
    }

    pub fn pieces(&self) -> &[FallingPiece] {
        &self.pieces
    }
}
