//! Notification bus between the engine and its consumers
//!
//! The engine publishes [`GameEvent`]s; renderers and persistence
//! subscribe without the engine knowing about them.

use crate::game::Phase;
use crate::piece::Piece;
use crate::tetromino::TetrominoType;

/// Final totals reported when a game ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverInfo {
    pub score: u64,
    pub lines: u32,
    pub level: u32,
}

/// Lifecycle notifications emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    StateChanged(Phase),
    GameStarted,
    ScoreUpdated(u64),
    NextUpdated(Vec<TetrominoType>),
    HoldChanged(TetrominoType),
    PieceLocked(Piece),
    LinesClearing(Vec<usize>),
    LinesCleared(usize),
    GameOver(GameOverInfo),
}

/// Discriminant of a [`GameEvent`], used to filter subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StateChanged,
    GameStarted,
    ScoreUpdated,
    NextUpdated,
    HoldChanged,
    PieceLocked,
    LinesClearing,
    LinesCleared,
    GameOver,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::StateChanged(_) => EventKind::StateChanged,
            GameEvent::GameStarted => EventKind::GameStarted,
            GameEvent::ScoreUpdated(_) => EventKind::ScoreUpdated,
            GameEvent::NextUpdated(_) => EventKind::NextUpdated,
            GameEvent::HoldChanged(_) => EventKind::HoldChanged,
            GameEvent::PieceLocked(_) => EventKind::PieceLocked,
            GameEvent::LinesClearing(_) => EventKind::LinesClearing,
            GameEvent::LinesCleared(_) => EventKind::LinesCleared,
            GameEvent::GameOver(_) => EventKind::GameOver,
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: ListenerId,
    /// None listens to every event
    kind: Option<EventKind>,
    listener: Listener,
}

/// Publish/subscribe registry. Listeners run synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.register(Some(kind), Box::new(listener))
    }

    /// Listen for every event
    pub fn subscribe_all<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.register(None, Box::new(listener))
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver an event to every matching listener
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.listener)(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_filtered_subscription() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::LinesCleared, move |event| {
            sink.borrow_mut().push(event.clone());
        });

        bus.publish(&GameEvent::ScoreUpdated(10));
        bus.publish(&GameEvent::LinesCleared(2));

        assert_eq!(*seen.borrow(), vec![GameEvent::LinesCleared(2)]);
    }

    #[test]
    fn test_subscribe_all_preserves_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&seen);
        let second = Rc::clone(&seen);
        bus.subscribe_all(move |_| first.borrow_mut().push("first"));
        bus.subscribe_all(move |_| second.borrow_mut().push("second"));

        bus.publish(&GameEvent::GameStarted);

        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = bus.subscribe_all(move |_| *sink.borrow_mut() += 1);

        bus.publish(&GameEvent::GameStarted);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&GameEvent::GameStarted);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
