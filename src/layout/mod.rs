//! # Layout Module
//!
//! The generated dungeon: rooms and corridors held in arenas and addressed by
//! [`RoomId`] / [`CorridorId`], plus the indices and progression state
//! gameplay code queries while the player explores.
//!
//! [`DungeonLayout`] is the only writer of room progression state. Gameplay
//! code reports what happened through [`DungeonLayout::room_entered`],
//! [`DungeonLayout::room_cleared`] and [`DungeonLayout::room_exited`], and
//! listens for the consequences through [`DungeonLayout::subscribe`].

pub mod events;
pub mod export;

pub use events::*;
pub use export::*;

use crate::config::{CLEARED_WEIGHT, VISITED_WEIGHT};
use crate::{Footprint, Grid, Position, RoomPlacement, RoomType, WorldPoint};
use log::{debug, info, warn};
use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a room in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Index of a corridor in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorridorId(pub usize);

impl std::fmt::Display for CorridorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "corridor#{}", self.0)
    }
}

/// One end of a corridor, as seen from a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConnection {
    /// Room on the other end
    pub room: RoomId,
    /// Corridor linking the two rooms
    pub corridor: CorridorId,
    /// Cell where the corridor leaves the path origin
    pub connection_point: Position,
}

/// A room committed to the dungeon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRoom {
    pub id: RoomId,
    pub placement: RoomPlacement,
    /// World-space position of the top-left cell
    pub world_position: WorldPoint,
    pub is_visited: bool,
    pub is_cleared: bool,
    /// Corridors leading out of this room, in creation order
    pub connections: Vec<RoomConnection>,
}

impl PlacedRoom {
    /// Wraps a placement, deriving its world position from the grid.
    pub fn new(id: RoomId, placement: RoomPlacement, grid: &Grid) -> Self {
        let world_position = grid.grid_to_world(placement.grid_position);
        Self {
            id,
            placement,
            world_position,
            is_visited: false,
            is_cleared: false,
            connections: Vec::new(),
        }
    }

    pub fn room_type(&self) -> RoomType {
        self.placement.room_type()
    }

    pub fn name(&self) -> &str {
        &self.placement.archetype.name
    }

    pub fn grid_position(&self) -> Position {
        self.placement.grid_position
    }

    pub fn footprint(&self) -> Footprint {
        self.placement.footprint()
    }

    /// Rooms directly linked to this one.
    pub fn connected_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.connections.iter().map(|c| c.room)
    }

    /// Corridors touching this room.
    pub fn corridors(&self) -> impl Iterator<Item = CorridorId> + '_ {
        self.connections.iter().map(|c| c.corridor)
    }

    pub fn is_connected_to(&self, other: RoomId) -> bool {
        self.connections.iter().any(|c| c.room == other)
    }

    /// Records a corridor to another room. Duplicate rooms are ignored.
    pub(crate) fn add_connection(&mut self, connection: RoomConnection) {
        if !self.is_connected_to(connection.room) {
            self.connections.push(connection);
        }
    }
}

/// A walkable cell sequence between two rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: CorridorId,
    pub room_a: RoomId,
    pub room_b: RoomId,
    /// Cells from a boundary cell of `room_a` to a boundary cell of `room_b`
    pub path: Vec<Position>,
    /// Second cell of the path, or its only cell
    pub connection_point: Position,
    /// Blocked corridors are skipped by room-to-room pathing
    pub is_active: bool,
    /// Whether A* failed and the path is the L-shaped fallback
    pub used_fallback: bool,
}

impl Corridor {
    /// The room on the other end from `room`, if `room` is an end at all.
    pub fn other_end(&self, room: RoomId) -> Option<RoomId> {
        if room == self.room_a {
            Some(self.room_b)
        } else if room == self.room_b {
            Some(self.room_a)
        } else {
            None
        }
    }

    /// Number of steps along the path.
    pub fn length(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// The generated dungeon and its exploration state.
#[derive(Debug)]
pub struct DungeonLayout {
    grid: Grid,
    rooms: Vec<PlacedRoom>,
    corridors: Vec<Corridor>,
    grid_position_to_room: HashMap<Position, RoomId>,
    room_connections: HashMap<RoomId, Vec<RoomId>>,
    start_room: Option<RoomId>,
    boss_room: Option<RoomId>,
    treasure_rooms: Vec<RoomId>,
    shop_rooms: Vec<RoomId>,
    secret_rooms: Vec<RoomId>,
    visited_rooms: Vec<RoomId>,
    cleared_rooms: Vec<RoomId>,
    current_room: Option<RoomId>,
    completion_percentage: f64,
    is_completed: bool,
    events: EventBus,
}

impl DungeonLayout {
    /// Builds the layout and its lookup indices.
    ///
    /// Room ids must equal their index in `rooms`, and corridor ids their
    /// index in `corridors`, as produced by the generator.
    pub fn new(grid: Grid, rooms: Vec<PlacedRoom>, corridors: Vec<Corridor>) -> Self {
        let mut layout = Self {
            grid,
            rooms,
            corridors,
            grid_position_to_room: HashMap::new(),
            room_connections: HashMap::new(),
            start_room: None,
            boss_room: None,
            treasure_rooms: Vec::new(),
            shop_rooms: Vec::new(),
            secret_rooms: Vec::new(),
            visited_rooms: Vec::new(),
            cleared_rooms: Vec::new(),
            current_room: None,
            completion_percentage: 0.0,
            is_completed: false,
            events: EventBus::new(),
        };

        layout.classify_rooms();
        layout.build_indices();

        info!(
            "Dungeon layout initialized with {} rooms and {} corridors",
            layout.rooms.len(),
            layout.corridors.len()
        );

        layout
    }

    fn classify_rooms(&mut self) {
        for room in &self.rooms {
            match room.room_type() {
                RoomType::Start if self.start_room.is_none() => self.start_room = Some(room.id),
                RoomType::Boss if self.boss_room.is_none() => self.boss_room = Some(room.id),
                RoomType::Treasure => self.treasure_rooms.push(room.id),
                RoomType::Shop => self.shop_rooms.push(room.id),
                RoomType::Secret => self.secret_rooms.push(room.id),
                _ => {}
            }
        }
    }

    fn build_indices(&mut self) {
        for room in &self.rooms {
            self.room_connections
                .insert(room.id, room.connected_rooms().collect());

            for cell in room.footprint().cells() {
                self.grid_position_to_room.insert(cell, room.id);
            }
        }
    }

    // Structure

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All rooms, indexed by `RoomId`.
    pub fn rooms(&self) -> &[PlacedRoom] {
        &self.rooms
    }

    /// All corridors, indexed by `CorridorId`.
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    pub fn room(&self, id: RoomId) -> Option<&PlacedRoom> {
        self.rooms.get(id.0)
    }

    pub fn corridor(&self, id: CorridorId) -> Option<&Corridor> {
        self.corridors.get(id.0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn start_room(&self) -> Option<&PlacedRoom> {
        self.start_room.and_then(|id| self.room(id))
    }

    pub fn boss_room(&self) -> Option<&PlacedRoom> {
        self.boss_room.and_then(|id| self.room(id))
    }

    pub fn treasure_rooms(&self) -> Vec<&PlacedRoom> {
        self.rooms_by_id(&self.treasure_rooms)
    }

    pub fn shop_rooms(&self) -> Vec<&PlacedRoom> {
        self.rooms_by_id(&self.shop_rooms)
    }

    pub fn secret_rooms(&self) -> Vec<&PlacedRoom> {
        self.rooms_by_id(&self.secret_rooms)
    }

    fn rooms_by_id(&self, ids: &[RoomId]) -> Vec<&PlacedRoom> {
        ids.iter().filter_map(|&id| self.room(id)).collect()
    }

    /// Rooms of one type, in placement order.
    pub fn rooms_of_type(&self, room_type: RoomType) -> Vec<&PlacedRoom> {
        self.rooms.iter().filter(|r| r.room_type() == room_type).collect()
    }

    /// The room covering a grid cell.
    pub fn room_at(&self, pos: Position) -> Option<&PlacedRoom> {
        self.grid_position_to_room.get(&pos).and_then(|&id| self.room(id))
    }

    /// Rooms directly linked to `id`. Unknown ids yield an empty list.
    pub fn connected_rooms(&self, id: RoomId) -> Vec<RoomId> {
        match self.room_connections.get(&id) {
            Some(connected) => connected.clone(),
            None => {
                warn!("connected_rooms: unknown {}", id);
                Vec::new()
            }
        }
    }

    /// The corridor joining two rooms, if any.
    pub fn corridor_between(&self, a: RoomId, b: RoomId) -> Option<&Corridor> {
        let room = self.room(a)?;
        room.connections
            .iter()
            .find(|c| c.room == b)
            .and_then(|c| self.corridor(c.corridor))
    }

    /// Corridors touching a room. Unknown ids yield an empty list.
    pub fn corridors_of(&self, id: RoomId) -> Vec<&Corridor> {
        match self.room(id) {
            Some(room) => room.corridors().filter_map(|c| self.corridor(c)).collect(),
            None => {
                warn!("corridors_of: unknown {}", id);
                Vec::new()
            }
        }
    }

    /// Shortest room sequence from `from` to `to` through active corridors.
    ///
    /// Returns an empty list when either room is unknown or `to` is unreachable.
    pub fn find_path(&self, from: RoomId, to: RoomId) -> Vec<RoomId> {
        if self.room(from).is_none() || self.room(to).is_none() {
            warn!("find_path: unknown room in {} -> {}", from, to);
            return Vec::new();
        }

        bfs(
            &from,
            |&room| self.passable_neighbors(room),
            |&room| room == to,
        )
        .unwrap_or_default()
    }

    fn passable_neighbors(&self, room: RoomId) -> Vec<RoomId> {
        self.room_connections
            .get(&room)
            .map(|connected| {
                connected
                    .iter()
                    .copied()
                    .filter(|&other| self.corridor_between(room, other).map_or(false, |c| c.is_active))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of corridors between the start room and `id`, or -1 when unreachable.
    pub fn distance_from_start(&self, id: RoomId) -> i32 {
        let Some(start) = self.start_room else {
            return -1;
        };
        let path = self.find_path(start, id);
        if path.is_empty() {
            -1
        } else {
            path.len() as i32 - 1
        }
    }

    pub fn unvisited_rooms(&self) -> Vec<&PlacedRoom> {
        self.rooms.iter().filter(|r| !r.is_visited).collect()
    }

    /// Rooms entered at least once but not cleared yet.
    pub fn visited_uncleared_rooms(&self) -> Vec<&PlacedRoom> {
        self.rooms.iter().filter(|r| r.is_visited && !r.is_cleared).collect()
    }

    // Progression

    /// Rooms in the order they were first entered.
    pub fn visited_rooms(&self) -> &[RoomId] {
        &self.visited_rooms
    }

    /// Rooms in the order they were cleared.
    pub fn cleared_rooms(&self) -> &[RoomId] {
        &self.cleared_rooms
    }

    pub fn visited_count(&self) -> usize {
        self.visited_rooms.len()
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared_rooms.len()
    }

    /// The room the player is in, as last reported.
    pub fn current_room(&self) -> Option<RoomId> {
        self.current_room
    }

    pub fn completion_percentage(&self) -> f64 {
        self.completion_percentage
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Reports that the player entered a room.
    pub fn room_entered(&mut self, id: RoomId) {
        let Some(room) = self.rooms.get_mut(id.0) else {
            warn!("room_entered: unknown {}", id);
            return;
        };

        let first_visit = !room.is_visited;
        room.is_visited = true;
        self.current_room = Some(id);
        self.events.emit(&DungeonEvent::RoomEntered(id));

        if first_visit {
            self.visited_rooms.push(id);
            debug!("Discovered {}", id);
            self.events.emit(&DungeonEvent::RoomDiscovered(id));
            self.update_completion();
        }
    }

    /// Reports that a room was cleared.
    ///
    /// Only visited, not yet cleared rooms can be cleared; other calls are
    /// logged and ignored. Clearing the boss room completes the dungeon.
    pub fn room_cleared(&mut self, id: RoomId) {
        let Some(room) = self.rooms.get_mut(id.0) else {
            warn!("room_cleared: unknown {}", id);
            return;
        };
        if !room.is_visited {
            warn!("room_cleared: {} was never entered", id);
            return;
        }
        if room.is_cleared {
            debug!("room_cleared: {} already cleared", id);
            return;
        }

        room.is_cleared = true;
        self.cleared_rooms.push(id);
        self.events.emit(&DungeonEvent::RoomCleared(id));

        if Some(id) == self.boss_room {
            self.complete();
        } else {
            self.update_completion();
        }
    }

    /// Reports that the player left a room.
    pub fn room_exited(&mut self, id: RoomId) {
        if self.room(id).is_none() {
            warn!("room_exited: unknown {}", id);
            return;
        }
        if self.current_room == Some(id) {
            self.current_room = None;
        }
        self.events.emit(&DungeonEvent::RoomExited(id));
    }

    /// Blocks or unblocks a corridor. Returns false for unknown corridors.
    pub fn set_corridor_active(&mut self, id: CorridorId, active: bool) -> bool {
        let Some(corridor) = self.corridors.get_mut(id.0) else {
            warn!("set_corridor_active: unknown {}", id);
            return false;
        };
        if corridor.is_active != active {
            corridor.is_active = active;
            self.events.emit(&DungeonEvent::CorridorToggled { corridor: id, active });
        }
        true
    }

    fn update_completion(&mut self) {
        if self.is_completed || self.rooms.is_empty() {
            return;
        }

        let total = self.rooms.len() as f64;
        let visited = self.visited_rooms.len() as f64 / total;
        let cleared = self.cleared_rooms.len() as f64 / total;
        let percentage = ((VISITED_WEIGHT * visited + CLEARED_WEIGHT * cleared) * 100.0).min(100.0);

        self.set_completion(percentage);
    }

    fn complete(&mut self) {
        if self.is_completed {
            return;
        }
        self.is_completed = true;
        self.set_completion(100.0);
        info!("Dungeon completed");
        self.events.emit(&DungeonEvent::DungeonCompleted);
    }

    fn set_completion(&mut self, percentage: f64) {
        let previous = self.completion_percentage;
        if percentage != previous {
            self.completion_percentage = percentage;
            self.events.emit(&DungeonEvent::CompletionChanged {
                previous,
                current: percentage,
            });
        }
    }

    // Notifications

    /// Registers a listener for dungeon events.
    ///
    /// The new listener immediately receives [`DungeonEvent::LayoutInitialized`].
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DungeonEvent) + Send + 'static,
    {
        let id = self.events.subscribe(listener);
        let initialized = DungeonEvent::LayoutInitialized {
            rooms: self.rooms.len(),
            corridors: self.corridors.len(),
        };
        self.events.emit_to(id, &initialized);
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoomArchetype, Size};
    use std::sync::{Arc, Mutex};

    /// Three rooms in a line (start - normal - boss) plus an isolated treasure room.
    fn sample_layout() -> DungeonLayout {
        let grid = Grid::new(30, 10, 2.0);
        let specs = [
            ("start", RoomType::Start, Position::new(0, 0)),
            ("hall", RoomType::Normal, Position::new(5, 0)),
            ("boss", RoomType::Boss, Position::new(10, 0)),
            ("vault", RoomType::Treasure, Position::new(20, 5)),
        ];

        let mut rooms: Vec<PlacedRoom> = specs
            .iter()
            .enumerate()
            .map(|(i, (name, room_type, pos))| {
                let archetype = RoomArchetype::new(name, *room_type, 2, 2);
                PlacedRoom::new(RoomId(i), RoomPlacement::new(archetype, *pos), &grid)
            })
            .collect();

        let corridors = vec![
            corridor(0, 0, 1, vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0), Position::new(4, 0), Position::new(5, 0)]),
            corridor(1, 1, 2, vec![Position::new(6, 0), Position::new(7, 0), Position::new(8, 0), Position::new(9, 0), Position::new(10, 0)]),
        ];
        for c in &corridors {
            rooms[c.room_a.0].add_connection(RoomConnection { room: c.room_b, corridor: c.id, connection_point: c.connection_point });
            rooms[c.room_b.0].add_connection(RoomConnection { room: c.room_a, corridor: c.id, connection_point: c.connection_point });
        }

        DungeonLayout::new(grid, rooms, corridors)
    }

    fn corridor(id: usize, a: usize, b: usize, path: Vec<Position>) -> Corridor {
        Corridor {
            id: CorridorId(id),
            room_a: RoomId(a),
            room_b: RoomId(b),
            connection_point: path[1],
            path,
            is_active: true,
            used_fallback: false,
        }
    }

    fn recorded_events(layout: &mut DungeonLayout) -> Arc<Mutex<Vec<DungeonEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        layout.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_classification_and_indices() {
        let layout = sample_layout();
        assert_eq!(layout.room_count(), 4);
        assert_eq!(layout.start_room().unwrap().name(), "start");
        assert_eq!(layout.boss_room().unwrap().name(), "boss");
        assert_eq!(layout.treasure_rooms().len(), 1);
        assert!(layout.shop_rooms().is_empty());
        assert!(layout.secret_rooms().is_empty());
        assert_eq!(layout.rooms_of_type(RoomType::Normal).len(), 1);

        assert_eq!(layout.room_at(Position::new(11, 1)).map(|r| r.id), Some(RoomId(2)));
        assert!(layout.room_at(Position::new(3, 3)).is_none());

        assert_eq!(layout.connected_rooms(RoomId(1)), vec![RoomId(0), RoomId(2)]);
        assert!(layout.connected_rooms(RoomId(3)).is_empty());
        assert_eq!(layout.corridors_of(RoomId(1)).len(), 2);
        assert_eq!(layout.corridor_between(RoomId(2), RoomId(1)).map(|c| c.id), Some(CorridorId(1)));
        assert!(layout.corridor_between(RoomId(0), RoomId(2)).is_none());
    }

    #[test]
    fn test_world_positions() {
        let layout = sample_layout();
        let hall = layout.room(RoomId(1)).unwrap();
        assert_eq!(hall.world_position, WorldPoint::new(10.0, 0.0, 0.0));
        assert_eq!(hall.footprint().size, Size::new(2, 2));
    }

    #[test]
    fn test_room_paths_and_distances() {
        let layout = sample_layout();
        assert_eq!(layout.find_path(RoomId(0), RoomId(2)), vec![RoomId(0), RoomId(1), RoomId(2)]);
        assert_eq!(layout.find_path(RoomId(1), RoomId(1)), vec![RoomId(1)]);
        assert!(layout.find_path(RoomId(0), RoomId(3)).is_empty());

        assert_eq!(layout.distance_from_start(RoomId(0)), 0);
        assert_eq!(layout.distance_from_start(RoomId(2)), 2);
        assert_eq!(layout.distance_from_start(RoomId(3)), -1);
    }

    #[test]
    fn test_unknown_rooms_return_sentinels() {
        let mut layout = sample_layout();
        let ghost = RoomId(99);
        assert!(layout.room(ghost).is_none());
        assert!(layout.connected_rooms(ghost).is_empty());
        assert!(layout.corridors_of(ghost).is_empty());
        assert!(layout.find_path(ghost, RoomId(0)).is_empty());
        assert_eq!(layout.distance_from_start(ghost), -1);

        layout.room_entered(ghost);
        layout.room_cleared(ghost);
        layout.room_exited(ghost);
        assert!(!layout.set_corridor_active(CorridorId(42), false));
        assert_eq!(layout.visited_count(), 0);
        assert_eq!(layout.completion_percentage(), 0.0);
    }

    #[test]
    fn test_blocked_corridor_cuts_paths() {
        let mut layout = sample_layout();
        assert!(layout.set_corridor_active(CorridorId(1), false));
        assert!(layout.find_path(RoomId(0), RoomId(2)).is_empty());
        assert_eq!(layout.distance_from_start(RoomId(2)), -1);
        // The graph itself is unchanged
        assert_eq!(layout.connected_rooms(RoomId(1)).len(), 2);

        layout.set_corridor_active(CorridorId(1), true);
        assert_eq!(layout.distance_from_start(RoomId(2)), 2);
    }

    #[test]
    fn test_visit_and_clear_progression() {
        let mut layout = sample_layout();
        assert_eq!(layout.unvisited_rooms().len(), 4);

        layout.room_entered(RoomId(0));
        assert_eq!(layout.current_room(), Some(RoomId(0)));
        assert_eq!(layout.visited_uncleared_rooms().len(), 1);
        // 0.3 * 1/4
        assert!((layout.completion_percentage() - 7.5).abs() < 1e-9);

        layout.room_cleared(RoomId(0));
        // 0.3 * 1/4 + 0.7 * 1/4
        assert!((layout.completion_percentage() - 25.0).abs() < 1e-9);
        assert!(layout.visited_uncleared_rooms().is_empty());
        assert_eq!(layout.cleared_rooms(), &[RoomId(0)]);

        layout.room_exited(RoomId(0));
        assert_eq!(layout.current_room(), None);
        assert!(!layout.is_completed());
    }

    #[test]
    fn test_clear_requires_visit() {
        let mut layout = sample_layout();
        layout.room_cleared(RoomId(1));
        assert_eq!(layout.cleared_count(), 0);
        assert!(!layout.room(RoomId(1)).unwrap().is_cleared);
    }

    #[test]
    fn test_boss_clear_forces_completion() {
        let mut layout = sample_layout();
        layout.room_entered(RoomId(2));
        layout.room_cleared(RoomId(2));

        assert!(layout.is_completed());
        assert_eq!(layout.completion_percentage(), 100.0);

        // Further progress never moves the percentage off 100
        layout.room_entered(RoomId(1));
        layout.room_cleared(RoomId(1));
        assert_eq!(layout.completion_percentage(), 100.0);
    }

    #[test]
    fn test_events_are_emitted_in_order() {
        let mut layout = sample_layout();
        let events = recorded_events(&mut layout);

        layout.room_entered(RoomId(0));
        layout.room_entered(RoomId(0));
        layout.room_cleared(RoomId(0));
        layout.room_exited(RoomId(0));

        let events = events.lock().unwrap();
        assert_eq!(events[0], DungeonEvent::LayoutInitialized { rooms: 4, corridors: 2 });
        assert_eq!(events[1], DungeonEvent::RoomEntered(RoomId(0)));
        assert_eq!(events[2], DungeonEvent::RoomDiscovered(RoomId(0)));
        assert!(matches!(events[3], DungeonEvent::CompletionChanged { previous, .. } if previous == 0.0));
        // Re-entering does not rediscover or change completion
        assert_eq!(events[4], DungeonEvent::RoomEntered(RoomId(0)));
        assert_eq!(events[5], DungeonEvent::RoomCleared(RoomId(0)));
        assert!(matches!(events[6], DungeonEvent::CompletionChanged { .. }));
        assert_eq!(events[7], DungeonEvent::RoomExited(RoomId(0)));
        assert_eq!(events.len(), 8);
    }

    #[test]
    fn test_boss_clear_emits_completion() {
        let mut layout = sample_layout();
        layout.room_entered(RoomId(2));
        let events = recorded_events(&mut layout);
        layout.room_cleared(RoomId(2));

        let events = events.lock().unwrap();
        assert!(events.contains(&DungeonEvent::DungeonCompleted));
        assert!(events.iter().any(|event| matches!(
            event,
            DungeonEvent::CompletionChanged { previous, current }
                if (previous - 7.5).abs() < 1e-9 && *current == 100.0
        )));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut layout = sample_layout();
        let events = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&events);
        let id = layout.subscribe(move |_| *counter.lock().unwrap() += 1);
        assert_eq!(layout.subscriber_count(), 1);

        assert!(layout.unsubscribe(id));
        assert!(!layout.unsubscribe(id));
        layout.room_entered(RoomId(0));

        // Only the LayoutInitialized replay was delivered
        assert_eq!(*events.lock().unwrap(), 1);
    }
}
