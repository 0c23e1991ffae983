//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Held keys are advanced by the frame delta rather than wall-clock reads, so
//! the same timer drives every repeatable action. Terminals that never report
//! key releases are handled by treating a key as released once its repeat
//! events stop arriving.

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use std::time::Duration;
use tracing::warn;

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Repeat cadence for one held key.
///
/// `press` yields one token immediately, then `tick` yields a token once
/// `delay` has elapsed and one more every `interval` after that.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    delay: Duration,
    interval: Duration,
    held: bool,
    repeating: bool,
    elapsed: Duration,
}

impl RepeatTimer {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            delay,
            // a zero interval would repeat forever within one tick
            interval: interval.max(Duration::from_millis(1)),
            held: false,
            repeating: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Start holding; returns 1 for a fresh press and 0 if already held
    pub fn press(&mut self) -> u32 {
        if self.held {
            return 0;
        }
        self.held = true;
        self.repeating = false;
        self.elapsed = Duration::ZERO;
        1
    }

    pub fn release(&mut self) {
        self.held = false;
        self.repeating = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Advance by `dt`, returning the number of repeat tokens that fell due
    pub fn tick(&mut self, dt: Duration) -> u32 {
        if !self.held {
            return 0;
        }
        self.elapsed += dt;

        let mut tokens = 0;
        if !self.repeating {
            if self.elapsed < self.delay {
                return 0;
            }
            self.elapsed -= self.delay;
            self.repeating = true;
            tokens += 1;
        }
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            tokens += 1;
        }
        tokens
    }
}

/// Key bindings resolved to key codes - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub hold: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key name such as "Left", "Space" or "x"
    pub fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    warn!("ignoring unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            hold: Self::parse_keys(&keys.hold),
            pause: Self::parse_keys(&keys.pause),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// Single-shot action bound to `code`
    fn instant_action(&self, code: &KeyCode) -> Option<Action> {
        if self.hard_drop.contains(code) {
            Some(Action::HardDrop)
        } else if self.rotate_cw.contains(code) {
            Some(Action::RotateCW)
        } else if self.rotate_ccw.contains(code) {
            Some(Action::RotateCCW)
        } else if self.hold.contains(code) {
            Some(Action::Hold)
        } else if self.pause.contains(code) {
            Some(Action::Pause)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// A repeatable key and how long since the terminal last reported it
#[derive(Debug, Clone)]
struct HeldKey {
    timer: RepeatTimer,
    since_seen: Duration,
}

impl HeldKey {
    fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            timer: RepeatTimer::new(delay, interval),
            since_seen: Duration::ZERO,
        }
    }

    fn press(&mut self) -> u32 {
        self.since_seen = Duration::ZERO;
        self.timer.press()
    }

    fn release(&mut self) {
        self.timer.release();
    }

    fn update(&mut self, dt: Duration, timeout: Option<Duration>) -> u32 {
        if !self.timer.is_held() {
            return 0;
        }
        self.since_seen += dt;
        if timeout.is_some_and(|t| self.since_seen > t) {
            self.timer.release();
            return 0;
        }
        self.timer.tick(dt)
    }
}

/// Input handler with DAS/ARR support
#[derive(Debug, Clone)]
pub struct InputHandler {
    left: HeldKey,
    right: HeldKey,
    down: HeldKey,
    bindings: KeyBindings,
    /// Set once the terminal reports a release; timeouts are disabled from then on
    release_events: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let gameplay = &settings.gameplay;
        Self {
            left: HeldKey::new(gameplay.das(), gameplay.arr()),
            right: HeldKey::new(gameplay.das(), gameplay.arr()),
            down: HeldKey::new(gameplay.soft_drop(), gameplay.soft_drop()),
            bindings: KeyBindings::from_settings(settings),
            release_events: false,
        }
    }

    /// Trust release events from the first key on, e.g. when the terminal
    /// was asked to report them
    pub fn with_release_events(mut self, release_events: bool) -> Self {
        self.release_events = release_events;
        self
    }

    /// Whether held keys wait for a release instead of timing out
    pub fn reports_releases(&self) -> bool {
        self.release_events
    }

    /// Whether `key` asks to leave the program
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.bindings.quit.contains(&normalize_key(key.code))
    }

    /// Route any crossterm key event; returns the actions it produces
    pub fn handle(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.kind {
            KeyEventKind::Release => {
                self.key_up(key);
                Vec::new()
            }
            KeyEventKind::Press | KeyEventKind::Repeat => self.key_down(key),
        }
    }

    /// Handle a key press event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Action> {
        let code = normalize_key(key.code);
        let bindings = &self.bindings;

        let (action, count) = if bindings.move_left.contains(&code) {
            self.right.release();
            (Action::MoveLeft, self.left.press())
        } else if bindings.move_right.contains(&code) {
            self.left.release();
            (Action::MoveRight, self.right.press())
        } else if bindings.soft_drop.contains(&code) {
            (Action::SoftDrop, self.down.press())
        } else if key.kind == KeyEventKind::Repeat {
            return Vec::new();
        } else if let Some(action) = bindings.instant_action(&code) {
            (action, 1)
        } else {
            return Vec::new();
        };
        vec![action; count as usize]
    }

    /// Handle a key release event (may not be delivered by every terminal)
    pub fn key_up(&mut self, key: KeyEvent) {
        self.release_events = true;
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left.release();
        } else if self.bindings.move_right.contains(&code) {
            self.right.release();
        } else if self.bindings.soft_drop.contains(&code) {
            self.down.release();
        }
    }

    /// Advance held keys by `dt` and return repeat actions (call every frame)
    pub fn update(&mut self, dt: Duration) -> Vec<Action> {
        let timeout = (!self.release_events).then_some(KEY_TIMEOUT);
        let mut actions = Vec::new();

        for (held, action) in [
            (&mut self.left, Action::MoveLeft),
            (&mut self.right, Action::MoveRight),
            (&mut self.down, Action::SoftDrop),
        ] {
            let count = held.update(dt, timeout);
            actions.extend(std::iter::repeat_n(action, count as usize));
        }
        actions
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left.release();
        self.right.release();
        self.down.release();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_timer_press_is_immediate_once() {
        let mut timer = RepeatTimer::new(ms(170), ms(50));
        assert_eq!(timer.press(), 1);
        assert_eq!(timer.press(), 0);
        assert!(timer.is_held());
    }

    #[test]
    fn test_timer_delay_then_interval() {
        let mut timer = RepeatTimer::new(ms(170), ms(50));
        timer.press();
        assert_eq!(timer.tick(ms(169)), 0);
        assert_eq!(timer.tick(ms(1)), 1);
        assert_eq!(timer.tick(ms(49)), 0);
        assert_eq!(timer.tick(ms(1)), 1);
        // a long frame catches up on every interval it spans
        assert_eq!(timer.tick(ms(150)), 3);
    }

    #[test]
    fn test_timer_large_first_tick() {
        let mut timer = RepeatTimer::new(ms(170), ms(50));
        timer.press();
        // delay token plus two intervals
        assert_eq!(timer.tick(ms(270)), 3);
    }

    #[test]
    fn test_timer_release_stops_tokens() {
        let mut timer = RepeatTimer::new(ms(100), ms(50));
        timer.press();
        timer.tick(ms(90));
        timer.release();
        assert_eq!(timer.tick(ms(500)), 0);
        assert_eq!(timer.press(), 1);
        assert_eq!(timer.tick(ms(99)), 0);
    }

    #[test]
    fn test_timer_zero_interval_is_bounded() {
        let mut timer = RepeatTimer::new(Duration::ZERO, Duration::ZERO);
        timer.press();
        assert_eq!(timer.tick(ms(5)), 6);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(KeyBindings::parse_key("Left"), Some(KeyCode::Left));
        assert_eq!(KeyBindings::parse_key("SPACE"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("X"), Some(KeyCode::Char('x')));
        assert_eq!(
            KeyBindings::parse_key("shift"),
            Some(KeyCode::Modifier(ModifierKeyCode::LeftShift))
        );
        assert_eq!(KeyBindings::parse_key("F13ish"), None);
    }

    #[test]
    fn test_unknown_bindings_are_skipped() {
        let mut settings = Settings::default();
        settings.keys.hold = vec!["nonsense".to_string(), "h".to_string()];
        let bindings = KeyBindings::from_settings(&settings);
        assert_eq!(bindings.hold, vec![KeyCode::Char('h')]);
    }

    #[test]
    fn test_instant_actions() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(press(KeyCode::Char(' '))), vec![Action::HardDrop]);
        assert_eq!(input.key_down(press(KeyCode::Up)), vec![Action::RotateCW]);
        assert_eq!(input.key_down(press(KeyCode::Char('Z'))), vec![Action::RotateCCW]);
        assert_eq!(input.key_down(press(KeyCode::Char('c'))), vec![Action::Hold]);
        assert_eq!(input.key_down(press(KeyCode::Esc)), vec![Action::Pause]);
        assert!(input.key_down(press(KeyCode::Char('k'))).is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let input = InputHandler::new();
        assert!(input.is_quit(&press(KeyCode::Char('q'))));
        assert!(input.is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!input.is_quit(&press(KeyCode::Char('c'))));
    }

    #[test]
    fn test_held_left_repeats_with_release_events() {
        let mut input = InputHandler::new();
        input.key_up(release(KeyCode::Char('k')));

        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
        assert!(input.update(ms(150)).is_empty());
        assert_eq!(input.update(ms(20)), vec![Action::MoveLeft]);
        assert_eq!(input.update(ms(100)), vec![Action::MoveLeft, Action::MoveLeft]);

        input.key_up(release(KeyCode::Left));
        assert!(input.update(ms(500)).is_empty());
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = InputHandler::new();
        input.key_up(release(KeyCode::Char('k')));

        input.key_down(press(KeyCode::Left));
        input.update(ms(100));
        assert_eq!(input.key_down(press(KeyCode::Right)), vec![Action::MoveRight]);
        // only the right key is still held
        assert_eq!(input.update(ms(170)), vec![Action::MoveRight]);
    }

    #[test]
    fn test_soft_drop_repeats_at_its_own_rate() {
        let mut input = InputHandler::new();
        input.key_up(release(KeyCode::Char('k')));

        assert_eq!(input.key_down(press(KeyCode::Down)), vec![Action::SoftDrop]);
        assert_eq!(input.update(ms(50)), vec![Action::SoftDrop]);
        assert_eq!(input.update(ms(100)), vec![Action::SoftDrop, Action::SoftDrop]);
    }

    #[test]
    fn test_key_times_out_without_release_events() {
        let mut input = InputHandler::new();
        input.key_down(press(KeyCode::Left));
        assert!(input.update(ms(60)).is_empty());
        // the terminal's auto-repeat keeps the key alive
        assert!(input.key_down(press(KeyCode::Left)).is_empty());
        assert!(input.update(ms(60)).is_empty());
        // no further events: released before DAS could fire
        assert!(input.update(ms(60)).is_empty());
        assert!(input.update(ms(200)).is_empty());
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
    }

    #[test]
    fn test_announced_release_events_disable_timeout() {
        let mut input = InputHandler::new().with_release_events(true);
        assert!(input.reports_releases());

        // held from the very first key without any auto-repeat events
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
        assert!(input.update(ms(150)).is_empty());
        assert_eq!(input.update(ms(20)), vec![Action::MoveLeft]);
        assert_eq!(input.update(ms(50)), vec![Action::MoveLeft]);

        input.key_up(release(KeyCode::Left));
        assert!(input.update(ms(500)).is_empty());
    }

    #[test]
    fn test_handle_routes_by_kind() {
        let mut input = InputHandler::new();
        assert_eq!(input.handle(press(KeyCode::Right)), vec![Action::MoveRight]);
        assert!(input.handle(release(KeyCode::Right)).is_empty());
        assert!(input.update(ms(500)).is_empty());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputHandler::new();
        input.key_up(release(KeyCode::Char('k')));
        input.key_down(press(KeyCode::Left));
        input.key_down(press(KeyCode::Down));
        input.clear();
        assert!(input.update(ms(1000)).is_empty());
    }
}
