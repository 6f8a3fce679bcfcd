//! # Layout Export
//!
//! Plain-data views of a layout: a serializable snapshot for save systems and
//! tooling, and an ASCII map for eyeballing generator output.

use super::{CorridorId, DungeonLayout, RoomId};
use crate::{DelveResult, Position, RoomType, Size, WorldPoint};
use serde::{Deserialize, Serialize};

/// Serializable copy of a room's data fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub prefab: String,
    pub grid_position: Position,
    pub size: Size,
    pub world_position: WorldPoint,
    pub is_visited: bool,
    pub is_cleared: bool,
    pub connected_rooms: Vec<RoomId>,
}

/// Serializable copy of a corridor's data fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorSnapshot {
    pub id: CorridorId,
    pub room_a: RoomId,
    pub room_b: RoomId,
    pub path: Vec<Position>,
    pub is_active: bool,
}

/// Serializable copy of a whole layout and its progression state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
    pub rooms: Vec<RoomSnapshot>,
    pub corridors: Vec<CorridorSnapshot>,
    pub visited_rooms: Vec<RoomId>,
    pub cleared_rooms: Vec<RoomId>,
    pub completion_percentage: f64,
    pub is_completed: bool,
}

impl LayoutSnapshot {
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> DelveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl DungeonLayout {
    /// Copies the layout's data fields into a [`LayoutSnapshot`].
    pub fn snapshot(&self) -> LayoutSnapshot {
        let grid = self.grid();

        LayoutSnapshot {
            width: grid.width,
            height: grid.height,
            cell_size: grid.cell_size,
            rooms: self
                .rooms()
                .iter()
                .map(|room| RoomSnapshot {
                    id: room.id,
                    name: room.name().to_string(),
                    room_type: room.room_type(),
                    prefab: room.placement.archetype.prefab.clone(),
                    grid_position: room.grid_position(),
                    size: room.placement.size,
                    world_position: room.world_position,
                    is_visited: room.is_visited,
                    is_cleared: room.is_cleared,
                    connected_rooms: room.connected_rooms().collect(),
                })
                .collect(),
            corridors: self
                .corridors()
                .iter()
                .map(|corridor| CorridorSnapshot {
                    id: corridor.id,
                    room_a: corridor.room_a,
                    room_b: corridor.room_b,
                    path: corridor.path.clone(),
                    is_active: corridor.is_active,
                })
                .collect(),
            visited_rooms: self.visited_rooms().to_vec(),
            cleared_rooms: self.cleared_rooms().to_vec(),
            completion_percentage: self.completion_percentage(),
            is_completed: self.is_completed(),
        }
    }

    /// Renders the layout as text, one line per grid row.
    ///
    /// Room cells show their type glyph, corridor cells outside rooms show
    /// `#` (or `x` when blocked), empty cells show `.`.
    pub fn ascii_map(&self) -> String {
        let grid = self.grid();
        let mut canvas = vec![vec!['.'; grid.width as usize]; grid.height as usize];

        for corridor in self.corridors() {
            let mark = if corridor.is_active { '#' } else { 'x' };
            for &cell in &corridor.path {
                if grid.is_valid_position(cell) {
                    canvas[cell.y as usize][cell.x as usize] = mark;
                }
            }
        }

        for room in self.rooms() {
            let glyph = room.room_type().glyph();
            for cell in room.footprint().cells() {
                if grid.is_valid_position(cell) {
                    canvas[cell.y as usize][cell.x as usize] = glyph;
                }
            }
        }

        canvas
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
