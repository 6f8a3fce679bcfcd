//! # Level Module
//!
//! Declarative input to the generator: room archetypes and the level
//! description that says how many rooms of what kind to lay out.
//!
//! Level descriptions are plain serde data so hosts can ship them as JSON
//! next to their other content. Nothing in here is mutated by generation.

pub mod catalog;

pub use catalog::*;

use crate::{DelveError, DelveResult, Position, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Different types of rooms a dungeon can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomType {
    /// Entry room, placed first near the grid center
    Start,
    /// Standard room with no special properties
    Normal,
    /// Final room, placed as far from the start as possible
    Boss,
    /// Room containing treasure, prefers dead ends
    Treasure,
    /// Merchant room, prefers well-connected spots
    Shop,
    /// Hidden room, prefers the outer edge of the map
    Secret,
    /// Room with a stronger enemy group
    Elite,
    /// Room granting a reward after a fight
    Reward,
    /// Safe rest area
    Rest,
    /// Scripted event room
    Event,
}

impl RoomType {
    /// Whether rooms of this type are drawn during the normal-room phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::RoomType;
    ///
    /// assert!(RoomType::Elite.is_filler());
    /// assert!(!RoomType::Boss.is_filler());
    /// ```
    pub fn is_filler(self) -> bool {
        matches!(
            self,
            RoomType::Normal | RoomType::Elite | RoomType::Reward | RoomType::Rest | RoomType::Event
        )
    }

    /// Single character used by the ASCII map.
    pub fn glyph(self) -> char {
        match self {
            RoomType::Start => 'S',
            RoomType::Normal => 'n',
            RoomType::Boss => 'B',
            RoomType::Treasure => 'T',
            RoomType::Shop => '$',
            RoomType::Secret => '?',
            RoomType::Elite => 'E',
            RoomType::Reward => 'R',
            RoomType::Rest => 'r',
            RoomType::Event => '!',
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A spot inside a room where something may spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Offset from the room's top-left cell
    pub offset: Position,
    /// Chance this point is used when the room is populated (0.0 to 1.0)
    pub probability: f64,
}

impl SpawnPoint {
    pub fn new(offset: Position, probability: f64) -> Self {
        Self { offset, probability }
    }
}

/// A declarative room template.
///
/// The `prefab` string is an opaque handle for whoever instantiates visuals;
/// the generator only carries it through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomArchetype {
    /// Unique name within a level
    pub name: String,
    /// Type/purpose of rooms built from this archetype
    pub room_type: RoomType,
    /// Footprint size in cells
    pub size: Size,
    /// Opaque visual handle
    #[serde(default)]
    pub prefab: String,
    #[serde(default)]
    pub enemy_spawn_points: Vec<SpawnPoint>,
    #[serde(default)]
    pub item_spawn_points: Vec<SpawnPoint>,
}

impl RoomArchetype {
    /// Creates an archetype with no spawn points.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{RoomArchetype, RoomType};
    ///
    /// let boss = RoomArchetype::new("throne", RoomType::Boss, 3, 3);
    /// assert_eq!(boss.size.width, 3);
    /// assert!(boss.enemy_spawn_points.is_empty());
    /// ```
    pub fn new(name: &str, room_type: RoomType, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            room_type,
            size: Size::new(width, height),
            prefab: String::new(),
            enemy_spawn_points: Vec::new(),
            item_spawn_points: Vec::new(),
        }
    }

    /// Builder-style prefab handle.
    pub fn with_prefab(mut self, prefab: &str) -> Self {
        self.prefab = prefab.to_string();
        self
    }

    /// Builder-style enemy spawn point.
    pub fn with_enemy_spawn(mut self, spawn: SpawnPoint) -> Self {
        self.enemy_spawn_points.push(spawn);
        self
    }

    /// Builder-style item spawn point.
    pub fn with_item_spawn(mut self, spawn: SpawnPoint) -> Self {
        self.item_spawn_points.push(spawn);
        self
    }

    fn validate(&self) -> DelveResult<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(DelveError::InvalidLevel(format!(
                "archetype '{}' has an empty footprint",
                self.name
            )));
        }

        for spawn in self.enemy_spawn_points.iter().chain(&self.item_spawn_points) {
            let inside = spawn.offset.x >= 0
                && spawn.offset.y >= 0
                && i64::from(spawn.offset.x) < i64::from(self.size.width)
                && i64::from(spawn.offset.y) < i64::from(self.size.height);
            if !inside {
                return Err(DelveError::InvalidLevel(format!(
                    "archetype '{}' has a spawn point outside its footprint at {}",
                    self.name, spawn.offset
                )));
            }
            if !(0.0..=1.0).contains(&spawn.probability) {
                return Err(DelveError::InvalidLevel(format!(
                    "archetype '{}' has a spawn probability of {}",
                    self.name, spawn.probability
                )));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Everything the generator needs to know about one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Level name for logging
    pub name: String,
    /// Map width in cells
    pub width: u32,
    /// Map height in cells
    pub height: u32,
    /// World units per cell
    pub cell_size: f32,
    /// Minimum number of normal rooms
    pub min_rooms: u32,
    /// Maximum number of normal rooms
    pub max_rooms: u32,
    /// Available room templates
    pub archetypes: Vec<RoomArchetype>,
    /// Preferred boss archetype name
    #[serde(default)]
    pub boss_archetype: Option<String>,
    /// Preferred treasure archetype name
    #[serde(default)]
    pub treasure_archetype: Option<String>,
    #[serde(default = "default_true")]
    pub include_treasure: bool,
    #[serde(default = "default_true")]
    pub include_shop: bool,
    #[serde(default = "default_true")]
    pub include_secret: bool,
}

impl LevelDescription {
    /// Creates a level with no archetypes and no optional special rooms.
    pub fn new(name: &str, width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            cell_size,
            min_rooms: crate::config::DEFAULT_MIN_ROOMS,
            max_rooms: crate::config::DEFAULT_MAX_ROOMS,
            archetypes: Vec::new(),
            boss_archetype: None,
            treasure_archetype: None,
            include_treasure: false,
            include_shop: false,
            include_secret: false,
        }
    }

    /// Builder-style normal room count bounds.
    pub fn with_room_count(mut self, min_rooms: u32, max_rooms: u32) -> Self {
        self.min_rooms = min_rooms;
        self.max_rooms = max_rooms;
        self
    }

    /// Builder-style archetype.
    pub fn with_archetype(mut self, archetype: RoomArchetype) -> Self {
        self.archetypes.push(archetype);
        self
    }

    /// The level used by the CLI when no file is given.
    pub fn demo() -> Self {
        let mut level = Self::new(
            "demo",
            crate::config::DEFAULT_MAP_WIDTH,
            crate::config::DEFAULT_MAP_HEIGHT,
            crate::config::DEFAULT_CELL_SIZE,
        )
        .with_room_count(8, 12)
        .with_archetype(RoomArchetype::new("entrance", RoomType::Start, 3, 3).with_prefab("rooms/entrance"))
        .with_archetype(
            RoomArchetype::new("hall", RoomType::Normal, 4, 3)
                .with_prefab("rooms/hall")
                .with_enemy_spawn(SpawnPoint::new(Position::new(1, 1), 0.6)),
        )
        .with_archetype(RoomArchetype::new("cell", RoomType::Normal, 2, 2).with_prefab("rooms/cell"))
        .with_archetype(
            RoomArchetype::new("guardroom", RoomType::Elite, 3, 3)
                .with_prefab("rooms/guardroom")
                .with_enemy_spawn(SpawnPoint::new(Position::new(1, 1), 1.0)),
        )
        .with_archetype(RoomArchetype::new("camp", RoomType::Rest, 2, 2).with_prefab("rooms/camp"))
        .with_archetype(RoomArchetype::new("throne", RoomType::Boss, 5, 4).with_prefab("rooms/throne"))
        .with_archetype(
            RoomArchetype::new("vault", RoomType::Treasure, 2, 2)
                .with_prefab("rooms/vault")
                .with_item_spawn(SpawnPoint::new(Position::new(0, 0), 0.8)),
        )
        .with_archetype(RoomArchetype::new("merchant", RoomType::Shop, 3, 2).with_prefab("rooms/merchant"))
        .with_archetype(RoomArchetype::new("cache", RoomType::Secret, 2, 2).with_prefab("rooms/cache"));
        level.boss_archetype = Some("throne".to_string());
        level.treasure_archetype = Some("vault".to_string());
        level.include_treasure = true;
        level.include_shop = true;
        level.include_secret = true;
        level
    }

    /// Parses and validates a level from JSON.
    pub fn from_json(json: &str) -> DelveResult<Self> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Reads, parses and validates a level file.
    pub fn load(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the level to pretty JSON.
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the description for values generation cannot work with.
    ///
    /// Missing Start/Boss archetypes are not checked here; they are reported
    /// by the planner as fatal generation errors.
    pub fn validate(&self) -> DelveResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DelveError::InvalidLevel(format!(
                "level '{}' has an empty grid ({}x{})",
                self.name, self.width, self.height
            )));
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(DelveError::InvalidLevel(format!(
                "level '{}' has a non-positive cell size",
                self.name
            )));
        }
        if self.min_rooms > self.max_rooms {
            return Err(DelveError::InvalidLevel(format!(
                "level '{}' has min_rooms {} > max_rooms {}",
                self.name, self.min_rooms, self.max_rooms
            )));
        }

        for archetype in &self.archetypes {
            archetype.validate()?;
            if archetype.size.width > self.width || archetype.size.height > self.height {
                return Err(DelveError::InvalidLevel(format!(
                    "archetype '{}' ({}x{}) is larger than level '{}' ({}x{})",
                    archetype.name,
                    archetype.size.width,
                    archetype.size.height,
                    self.name,
                    self.width,
                    self.height
                )));
            }
        }

        for designated in [&self.boss_archetype, &self.treasure_archetype].into_iter().flatten() {
            if !self.archetypes.iter().any(|a| &a.name == designated) {
                return Err(DelveError::InvalidLevel(format!(
                    "level '{}' designates unknown archetype '{}'",
                    self.name, designated
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_level_is_valid() {
        let level = LevelDescription::demo();
        assert!(level.validate().is_ok());
        assert!(level.archetypes.iter().any(|a| a.room_type == RoomType::Start));
        assert!(level.archetypes.iter().any(|a| a.room_type == RoomType::Boss));
    }

    #[test]
    fn test_json_round_trip_keeps_defaults() {
        let json = r#"{
            "name": "crypt",
            "width": 30,
            "height": 20,
            "cell_size": 4.0,
            "min_rooms": 2,
            "max_rooms": 4,
            "archetypes": [
                { "name": "door", "room_type": "Start", "size": { "width": 2, "height": 2 } },
                { "name": "lair", "room_type": "Boss", "size": { "width": 3, "height": 3 } }
            ]
        }"#;

        let level = LevelDescription::from_json(json).unwrap();
        assert_eq!(level.archetypes.len(), 2);
        assert!(level.include_treasure);
        assert!(level.include_shop);
        assert!(level.include_secret);
        assert!(level.archetypes[0].prefab.is_empty());

        let reparsed = LevelDescription::from_json(&level.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, level);
    }

    #[test]
    fn test_invalid_levels_are_rejected() {
        let mut level = LevelDescription::demo();
        level.min_rooms = 10;
        level.max_rooms = 2;
        assert!(matches!(level.validate(), Err(DelveError::InvalidLevel(_))));

        let mut level = LevelDescription::demo();
        level.boss_archetype = Some("missing".to_string());
        assert!(level.validate().is_err());

        let level = LevelDescription::new("flat", 0, 10, 1.0);
        assert!(level.validate().is_err());

        let level = LevelDescription::new("bad spawn", 10, 10, 1.0).with_archetype(
            RoomArchetype::new("hall", RoomType::Normal, 2, 2)
                .with_enemy_spawn(SpawnPoint::new(Position::new(5, 0), 0.5)),
        );
        assert!(level.validate().is_err());

        let level = LevelDescription::new("bad chance", 10, 10, 1.0).with_archetype(
            RoomArchetype::new("hall", RoomType::Normal, 2, 2)
                .with_item_spawn(SpawnPoint::new(Position::new(0, 0), 1.5)),
        );
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_archetype_larger_than_level_is_rejected() {
        let level = LevelDescription::new("cramped", 20, 20, 1.0)
            .with_archetype(RoomArchetype::new("start", RoomType::Start, 2, 2))
            .with_archetype(RoomArchetype::new("colossus", RoomType::Boss, u32::MAX, 1));
        assert!(matches!(level.validate(), Err(DelveError::InvalidLevel(_))));

        let level = LevelDescription::new("tall", 20, 20, 1.0)
            .with_archetype(RoomArchetype::new("tower", RoomType::Normal, 2, 21));
        assert!(matches!(level.validate(), Err(DelveError::InvalidLevel(_))));

        // Exactly the size of the level still fits
        let level = LevelDescription::new("snug", 20, 20, 1.0)
            .with_archetype(RoomArchetype::new("hall", RoomType::Normal, 20, 20));
        assert!(level.validate().is_ok());

        let level = LevelDescription::new("wide spawn", 20, 20, 1.0).with_archetype(
            RoomArchetype::new("hall", RoomType::Normal, u32::MAX, 1)
                .with_enemy_spawn(SpawnPoint::new(Position::new(3, 0), 0.5)),
        );
        assert!(matches!(level.validate(), Err(DelveError::InvalidLevel(_))));
    }

    #[test]
    fn test_malformed_json_is_serde_error() {
        let result = LevelDescription::from_json("{ not json");
        assert!(matches!(result, Err(DelveError::Serde(_))));
    }

    #[test]
    fn test_filler_types() {
        let fillers: Vec<_> = [
            RoomType::Start,
            RoomType::Normal,
            RoomType::Boss,
            RoomType::Treasure,
            RoomType::Shop,
            RoomType::Secret,
            RoomType::Elite,
            RoomType::Reward,
            RoomType::Rest,
            RoomType::Event,
        ]
        .into_iter()
        .filter(|t| t.is_filler())
        .collect();
        assert_eq!(fillers.len(), 5);
    }
}
