//! Frame timing and selection of the active loop
//!
//! The menu backdrop and the game each have their own frame loop. Only one
//! runs at a time; the [`Scheduler`] switches between them when the phase
//! changes and restarts the clock so a switch never produces a large delta.

use crate::game::Phase;
use std::time::{Duration, Instant};
use tracing::debug;

/// Longest delta handed to a loop; a stalled frame is not replayed in full
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(50);

/// Measures the time between consecutive frames
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self { last: now }
    }

    /// Forget the time elapsed so far
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    /// Capped time since the previous tick
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        dt.min(MAX_FRAME_DELTA)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Which frame loop drives the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// Falling-piece backdrop behind the menu
    Menu,
    /// Game simulation and board rendering
    Game,
}

impl LoopKind {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Menu => LoopKind::Menu,
            Phase::Playing | Phase::Paused | Phase::GameOver => LoopKind::Game,
        }
    }
}

/// Owns the frame clock and the currently running loop
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    active: Option<LoopKind>,
    clock: FrameClock,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<LoopKind> {
        self.active
    }

    /// Make `kind` the running loop, stopping any other.
    /// Returns false if it was already running.
    pub fn start(&mut self, kind: LoopKind) -> bool {
        self.start_at(kind, Instant::now())
    }

    pub fn start_at(&mut self, kind: LoopKind, now: Instant) -> bool {
        if self.active == Some(kind) {
            return false;
        }
        self.stop();
        debug!(?kind, "starting loop");
        self.active = Some(kind);
        self.clock.reset_at(now);
        true
    }

    pub fn stop(&mut self) {
        if let Some(kind) = self.active.take() {
            debug!(?kind, "stopping loop");
        }
    }

    /// Run the loop matching `phase`
    pub fn follow(&mut self, phase: Phase) -> bool {
        self.start(LoopKind::for_phase(phase))
    }

    /// Delta for the running loop, or None when nothing is running
    pub fn frame(&mut self) -> Option<(LoopKind, Duration)> {
        self.frame_at(Instant::now())
    }

    pub fn frame_at(&mut self, now: Instant) -> Option<(LoopKind, Duration)> {
        let kind = self.active?;
        Some((kind, self.clock.tick_at(now)))
    }

    /// Whether the game loop should advance the simulation in `phase`.
    /// A paused game is still drawn but not updated.
    pub fn simulates(phase: Phase) -> bool {
        phase == Phase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_clock_measures_and_caps() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        assert_eq!(clock.tick_at(t0 + ms(16)), ms(16));
        assert_eq!(clock.tick_at(t0 + ms(32)), ms(16));
        assert_eq!(clock.tick_at(t0 + ms(2032)), MAX_FRAME_DELTA);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0 + ms(10));
        assert_eq!(clock.tick_at(t0), Duration::ZERO);
    }

    #[test]
    fn test_loop_for_phase() {
        assert_eq!(LoopKind::for_phase(Phase::Menu), LoopKind::Menu);
        assert_eq!(LoopKind::for_phase(Phase::Playing), LoopKind::Game);
        assert_eq!(LoopKind::for_phase(Phase::Paused), LoopKind::Game);
        assert_eq!(LoopKind::for_phase(Phase::GameOver), LoopKind::Game);
    }

    #[test]
    fn test_one_loop_at_a_time() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.frame_at(t0), None);

        assert!(scheduler.start_at(LoopKind::Menu, t0));
        assert!(!scheduler.start_at(LoopKind::Menu, t0));
        assert_eq!(scheduler.active(), Some(LoopKind::Menu));

        assert!(scheduler.start_at(LoopKind::Game, t0));
        assert_eq!(scheduler.active(), Some(LoopKind::Game));

        scheduler.stop();
        assert_eq!(scheduler.active(), None);
        assert_eq!(scheduler.frame_at(t0 + ms(10)), None);
    }

    #[test]
    fn test_switch_restarts_clock() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start_at(LoopKind::Menu, t0);
        assert_eq!(scheduler.frame_at(t0 + ms(20)), Some((LoopKind::Menu, ms(20))));

        // time spent before the switch is not handed to the new loop
        scheduler.start_at(LoopKind::Game, t0 + ms(40));
        assert_eq!(scheduler.frame_at(t0 + ms(45)), Some((LoopKind::Game, ms(5))));
    }

    #[test]
    fn test_follow_phase() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.follow(Phase::Menu));
        assert!(scheduler.follow(Phase::Playing));
        // pausing keeps the game loop running
        assert!(!scheduler.follow(Phase::Paused));
        assert_eq!(scheduler.active(), Some(LoopKind::Game));
        assert!(!Scheduler::simulates(Phase::Paused));
        assert!(Scheduler::simulates(Phase::Playing));
    }
}
