//! # Generation Module
//!
//! The procedural generation pipeline: room placement, room graph connection
//! and corridor pathfinding.
//!
//! Each phase is its own type so it can be exercised alone; [`DungeonGenerator`]
//! runs them in order and hands the result to [`DungeonLayout`].

pub mod connector;
pub mod corridors;
pub mod dungeon;
pub mod placement;

pub use connector::*;
pub use corridors::*;
pub use dungeon::*;
pub use placement::*;

use crate::{DelveResult, Footprint, LevelDescription, Position, RoomArchetype, RoomType, Size};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls randomness and the tunable constants of each phase. The level
/// description says *what* to build; this says *how hard to try*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Attempts per placement phase before giving up
    pub max_placement_attempts: u32,
    /// Empty cells required between any two rooms
    pub room_spacing: u32,
    /// Whether the start room is randomly nudged away from the exact center
    pub jitter_start_room: bool,
    /// Probability of including a secret room (0.0 to 1.0)
    pub secret_room_chance: f64,
    /// Loop edges to add, as a fraction of the room count
    pub loop_edge_ratio: f64,
    /// Preferred (min, max) distance for loop edges
    pub loop_distance_band: (f64, f64),
    /// Number of shortest loop candidates to choose among
    pub loop_candidate_pool: usize,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.seed, 12345);
    /// assert_eq!(config.max_placement_attempts, 100);
    /// assert_eq!(config.room_spacing, 1);
    /// ```
    pub fn new(seed: u64) -> Self {
        use crate::config::*;

        Self {
            seed,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            room_spacing: DEFAULT_ROOM_SPACING,
            jitter_start_room: true,
            secret_room_chance: DEFAULT_SECRET_ROOM_CHANCE,
            loop_edge_ratio: DEFAULT_LOOP_EDGE_RATIO,
            loop_distance_band: DEFAULT_LOOP_DISTANCE_BAND,
            loop_candidate_pool: DEFAULT_LOOP_CANDIDATE_POOL,
        }
    }

    /// Creates a configuration for tests: start room exactly centered, no secret rooms.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            jitter_start_room: false,
            secret_room_chance: 0.0,
            ..Self::new(seed)
        }
    }

    /// Builder-style secret room chance.
    pub fn with_secret_room_chance(mut self, chance: f64) -> Self {
        self.secret_room_chance = chance;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A room archetype committed to a grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPlacement {
    /// Template the room was built from
    pub archetype: RoomArchetype,
    /// Top-left cell
    pub grid_position: Position,
    /// Copied from the archetype
    pub size: Size,
}

impl RoomPlacement {
    pub fn new(archetype: RoomArchetype, grid_position: Position) -> Self {
        let size = archetype.size;
        Self {
            archetype,
            grid_position,
            size,
        }
    }

    pub fn room_type(&self) -> RoomType {
        self.archetype.room_type
    }

    /// The cells this placement covers.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.grid_position, self.size)
    }
}

/// Trait for procedural generators.
///
/// Every phase that produces a standalone artifact implements this trait, so
/// phases can be run, checked and logged the same way.
pub trait Generator<T> {
    /// Generates content for a level using the provided configuration and random number generator.
    fn generate(&self, level: &LevelDescription, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions shared by the generation phases.
pub mod utils {
    use super::*;
    use crate::DelveError;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Whether `pos` lies in the footprint or is 4-adjacent to it.
    pub fn touches_footprint(footprint: &Footprint, pos: Position) -> bool {
        footprint.contains(pos) || pos.cardinal_adjacent_positions().into_iter().any(|n| footprint.contains(n))
    }

    /// Whether every consecutive pair of cells is one cardinal step apart.
    pub fn is_contiguous_path(path: &[Position]) -> bool {
        path.windows(2).all(|pair| pair[0].is_cardinal_neighbor(pair[1]))
    }

    /// Checks that footprints lie inside a `width` x `height` grid and keep `spacing` apart.
    pub fn validate_footprints(
        footprints: &[Footprint],
        width: u32,
        height: u32,
        spacing: u32,
    ) -> DelveResult<()> {
        for (i, footprint) in footprints.iter().enumerate() {
            let in_bounds = footprint.top_left.x >= 0
                && footprint.top_left.y >= 0
                && footprint.right() <= width as i32
                && footprint.bottom() <= height as i32;
            if !in_bounds {
                return Err(DelveError::GenerationFailed(format!(
                    "room {} at {} leaves the {}x{} grid",
                    i, footprint.top_left, width, height
                )));
            }

            for (j, other) in footprints.iter().enumerate().skip(i + 1) {
                if other.expand(spacing).intersects(footprint) {
                    return Err(DelveError::GenerationFailed(format!(
                        "rooms {} and {} are closer than {} cells",
                        i, j, spacing
                    )));
                }
            }
        }

        Ok(())
    }
}
