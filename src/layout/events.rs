//! # Dungeon Events
//!
//! Notifications raised by a [`DungeonLayout`](super::DungeonLayout) as the
//! player explores, and the listener registry that delivers them.

use super::{CorridorId, RoomId};
use serde::{Deserialize, Serialize};

/// Something that happened to the dungeon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DungeonEvent {
    /// The layout is ready; replayed to every new listener
    LayoutInitialized { rooms: usize, corridors: usize },
    /// The player entered a room
    RoomEntered(RoomId),
    /// The player entered a room for the first time
    RoomDiscovered(RoomId),
    /// The player left a room
    RoomExited(RoomId),
    /// A visited room was cleared
    RoomCleared(RoomId),
    /// The completion percentage moved
    CompletionChanged { previous: f64, current: f64 },
    /// The boss room was cleared
    DungeonCompleted,
    /// A corridor was blocked or unblocked
    CorridorToggled { corridor: CorridorId, active: bool },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&DungeonEvent) + Send>;

/// Fire-and-forget fan-out to any number of listeners.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DungeonEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Delivers an event to every listener, in subscription order.
    pub fn emit(&mut self, event: &DungeonEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Delivers an event to one listener only.
    pub fn emit_to(&mut self, id: SubscriptionId, event: &DungeonEvent) {
        if let Some((_, listener)) = self.listeners.iter_mut().find(|(existing, _)| *existing == id) {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
