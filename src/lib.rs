//! # Delve
//!
//! Procedural dungeon layout generation: turns a declarative level description
//! into a fully connected graph of placed rooms and corridors.
//!
//! ## Architecture Overview
//!
//! Generation is a single synchronous pipeline over one occupancy grid:
//!
//! - **Grid**: occupancy grid and grid/world coordinate conversion
//! - **Room Placement**: places start, normal, boss and special rooms under spacing constraints
//! - **Graph Connector**: greedy spanning connection plus supplemental loop edges
//! - **Corridor Pathfinder**: A* corridors between rooms with an L-shaped fallback
//! - **Dungeon Layout**: the queryable result, which also tracks exploration progress
//!
//! ```
//! use delve::{DungeonGenerator, GenerationConfig, LevelDescription};
//!
//! let level = LevelDescription::demo();
//! let config = GenerationConfig::new(7);
//! let layout = DungeonGenerator::new().generate_level(&level, &config).unwrap();
//! assert!(layout.start_room().is_some());
//! assert!(layout.boss_room().is_some());
//! ```

pub mod generation;
pub mod grid;
pub mod layout;
pub mod level;

pub use generation::*;
pub use grid::*;
pub use layout::*;
pub use level::*;

/// Core error type for dungeon generation.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Level description cannot be generated from
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// A required archetype is missing from the catalog
    #[error("No room archetype of type {0} available")]
    MissingArchetype(RoomType),

    /// The start room could not be placed
    #[error("Start room placement failed")]
    StartRoomPlacement,

    /// No valid position was left for the boss room
    #[error("Boss room placement failed")]
    BossRoomPlacement,

    /// Generation produced a layout that failed validation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The host cancelled generation between phases
    #[error("Generation cancelled")]
    Cancelled,
}

/// Result type used throughout the crate.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation defaults.
pub mod config {
    /// Default map width in cells
    pub const DEFAULT_MAP_WIDTH: u32 = 48;

    /// Default map height in cells
    pub const DEFAULT_MAP_HEIGHT: u32 = 32;

    /// Default world units per cell
    pub const DEFAULT_CELL_SIZE: f32 = 10.0;

    /// Default minimum number of normal rooms
    pub const DEFAULT_MIN_ROOMS: u32 = 5;

    /// Default maximum number of normal rooms
    pub const DEFAULT_MAX_ROOMS: u32 = 10;

    /// Placement attempts per room category before giving up
    pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 100;

    /// Empty cells required between two rooms
    pub const DEFAULT_ROOM_SPACING: u32 = 1;

    /// Chance a secret room is included at all
    pub const DEFAULT_SECRET_ROOM_CHANCE: f64 = 0.3;

    /// Loop edges added, as a fraction of the room count
    pub const DEFAULT_LOOP_EDGE_RATIO: f64 = 0.3;

    /// Preferred loop edge length, in grid units
    pub const DEFAULT_LOOP_DISTANCE_BAND: (f64, f64) = (2.0, 8.0);

    /// Shortest loop candidates a loop edge is drawn from
    pub const DEFAULT_LOOP_CANDIDATE_POOL: usize = 3;

    /// Weight of the visited fraction in the completion percentage
    pub const VISITED_WEIGHT: f64 = 0.3;

    /// Weight of the cleared fraction in the completion percentage
    pub const CLEARED_WEIGHT: f64 = 0.7;
}
