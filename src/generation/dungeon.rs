//! # Dungeon Generation
//!
//! The full room-and-corridor pipeline.
//!
//! A layout is produced in three phases:
//! 1. Rooms are placed on an occupancy grid by the [`RoomPlanner`]
//! 2. Rooms are linked by the [`GraphConnector`], which carves corridors with
//!    the [`CorridorPathfinder`](crate::CorridorPathfinder)
//! 3. The result is wrapped in a [`DungeonLayout`] and validated
//!
//! Every run builds a fresh grid, so one generator can be shared and reused.

use super::connector::{GraphConnector, RoomGraph};
use super::placement::{PlacementPlan, RoomPlanner};
use super::{utils, GenerationConfig, Generator};
use crate::{ArchetypeCatalog, DelveError, DelveResult, DungeonLayout, LevelDescription, RoomId, RoomType};
use log::{debug, info};
use pathfinding::prelude::bfs_reach;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};

/// Room-and-corridor dungeon generator.
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator {
    planner: RoomPlanner,
    connector: GraphConnector,
}

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonGenerator, GenerationConfig, LevelDescription};
    ///
    /// let generator = DungeonGenerator::new();
    /// let layout = generator
    ///     .generate_level(&LevelDescription::demo(), &GenerationConfig::new(7))
    ///     .unwrap();
    /// assert!(layout.start_room().is_some());
    /// ```
    pub fn new() -> Self {
        Self {
            planner: RoomPlanner::new(),
            connector: GraphConnector::new(),
        }
    }

    /// Generates a layout with an RNG seeded from `config`.
    pub fn generate_level(&self, level: &LevelDescription, config: &GenerationConfig) -> DelveResult<DungeonLayout> {
        let mut rng = utils::create_rng(config);
        self.generate(level, config, &mut rng)
    }

    /// Same pipeline as [`generate_level`](Self::generate_level), yielding to
    /// the runtime between phases.
    ///
    /// `cancel` is checked only at phase boundaries; a phase that has started
    /// always runs to completion.
    pub async fn generate_async(
        &self,
        level: &LevelDescription,
        config: &GenerationConfig,
        cancel: &AtomicBool,
    ) -> DelveResult<DungeonLayout> {
        let mut rng = utils::create_rng(config);

        check_cancelled(cancel)?;
        let plan = self.place_rooms(level, config, &mut rng)?;
        tokio::task::yield_now().await;

        check_cancelled(cancel)?;
        let graph = self.connect_rooms(&plan, config, &mut rng);
        tokio::task::yield_now().await;

        check_cancelled(cancel)?;
        self.finish(graph, config)
    }

    fn place_rooms(
        &self,
        level: &LevelDescription,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<PlacementPlan> {
        level.validate()?;
        let catalog = ArchetypeCatalog::from_level(level);
        let plan = self.planner.plan(level, &catalog, config, rng)?;
        self.planner.validate(&plan, config)?;
        debug!("{} finished placement phase", self.planner.generator_type());
        Ok(plan)
    }

    fn connect_rooms(&self, plan: &PlacementPlan, config: &GenerationConfig, rng: &mut StdRng) -> RoomGraph {
        let mut graph = RoomGraph::from_plan(plan);
        self.connector.connect(&mut graph, config, rng);
        graph
    }

    fn finish(&self, graph: RoomGraph, config: &GenerationConfig) -> DelveResult<DungeonLayout> {
        let layout = graph.into_layout();
        self.validate(&layout, config)?;
        info!(
            "Generated dungeon with {} rooms and {} corridors (seed {})",
            layout.room_count(),
            layout.corridors().len(),
            config.seed
        );
        Ok(layout)
    }

    fn validate_rooms(&self, layout: &DungeonLayout, config: &GenerationConfig) -> DelveResult<()> {
        let grid = layout.grid();
        let footprints: Vec<_> = layout.rooms().iter().map(|room| room.footprint()).collect();
        utils::validate_footprints(&footprints, grid.width, grid.height, config.room_spacing)?;

        for required in [RoomType::Start, RoomType::Boss] {
            let count = layout.rooms_of_type(required).len();
            if count != 1 {
                return Err(DelveError::GenerationFailed(format!(
                    "expected exactly one {} room, found {}",
                    required, count
                )));
            }
        }

        Ok(())
    }

    fn validate_connectivity(&self, layout: &DungeonLayout) -> DelveResult<()> {
        if layout.room_count() == 0 {
            return Ok(());
        }

        let reached = bfs_reach(RoomId(0), |&id| layout.connected_rooms(id)).count();
        if reached != layout.room_count() {
            return Err(DelveError::GenerationFailed(format!(
                "only {} of {} rooms are reachable",
                reached,
                layout.room_count()
            )));
        }

        Ok(())
    }

    fn validate_corridors(&self, layout: &DungeonLayout) -> DelveResult<()> {
        for corridor in layout.corridors() {
            let (Some(a), Some(b)) = (layout.room(corridor.room_a), layout.room(corridor.room_b)) else {
                return Err(DelveError::GenerationFailed(format!(
                    "{} references an unknown room",
                    corridor.id
                )));
            };

            let (Some(&first), Some(&last)) = (corridor.path.first(), corridor.path.last()) else {
                return Err(DelveError::GenerationFailed(format!("{} has an empty path", corridor.id)));
            };

            if !utils::is_contiguous_path(&corridor.path) {
                return Err(DelveError::GenerationFailed(format!(
                    "{} path is not contiguous",
                    corridor.id
                )));
            }

            if !utils::touches_footprint(&a.footprint(), first) || !utils::touches_footprint(&b.footprint(), last) {
                return Err(DelveError::GenerationFailed(format!(
                    "{} does not reach both {} and {}",
                    corridor.id, a.id, b.id
                )));
            }
        }

        Ok(())
    }
}

fn check_cancelled(cancel: &AtomicBool) -> DelveResult<()> {
    if cancel.load(Ordering::Relaxed) {
        info!("Dungeon generation cancelled");
        return Err(DelveError::Cancelled);
    }
    Ok(())
}

impl Generator<DungeonLayout> for DungeonGenerator {
    fn generate(
        &self,
        level: &LevelDescription,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<DungeonLayout> {
        let plan = self.place_rooms(level, config, rng)?;
        let graph = self.connect_rooms(&plan, config, rng);
        self.finish(graph, config)
    }

    fn validate(&self, layout: &DungeonLayout, config: &GenerationConfig) -> DelveResult<()> {
        self.validate_rooms(layout, config)?;
        self.validate_connectivity(layout)?;
        self.validate_corridors(layout)
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, PlacedRoom, Position, RoomArchetype, RoomPlacement};

    fn small_level() -> LevelDescription {
        LevelDescription::new("small", 20, 20, 1.0)
            .with_room_count(3, 3)
            .with_archetype(RoomArchetype::new("start", RoomType::Start, 2, 2))
            .with_archetype(RoomArchetype::new("room", RoomType::Normal, 2, 2))
            .with_archetype(RoomArchetype::new("boss", RoomType::Boss, 3, 3))
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let generator = DungeonGenerator::new();
        let level = LevelDescription::demo();

        let first = generator.generate_level(&level, &GenerationConfig::new(11)).unwrap();
        let second = generator.generate_level(&level, &GenerationConfig::new(11)).unwrap();
        let other = generator.generate_level(&level, &GenerationConfig::new(12)).unwrap();

        assert_eq!(first.snapshot(), second.snapshot());
        assert_ne!(first.snapshot(), other.snapshot());
    }

    #[test]
    fn test_generated_layout_passes_validation() {
        let generator = DungeonGenerator::new();
        let config = GenerationConfig::new(3);
        let layout = generator.generate_level(&LevelDescription::demo(), &config).unwrap();

        assert!(generator.validate(&layout, &config).is_ok());
        assert_eq!(layout.rooms_of_type(RoomType::Start).len(), 1);
        assert_eq!(layout.rooms_of_type(RoomType::Boss).len(), 1);
        assert!(layout.corridors().len() >= layout.room_count() - 1);
        assert_eq!(generator.generator_type(), "DungeonGenerator");
    }

    #[test]
    fn test_missing_start_archetype_is_fatal() {
        let level = LevelDescription::new("no start", 20, 20, 1.0)
            .with_room_count(1, 1)
            .with_archetype(RoomArchetype::new("room", RoomType::Normal, 2, 2))
            .with_archetype(RoomArchetype::new("boss", RoomType::Boss, 2, 2));

        let result = DungeonGenerator::new().generate_level(&level, &GenerationConfig::for_testing(1));
        assert!(matches!(result, Err(DelveError::MissingArchetype(RoomType::Start))));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let level = small_level().with_room_count(5, 2);
        let result = DungeonGenerator::new().generate_level(&level, &GenerationConfig::for_testing(1));
        assert!(matches!(result, Err(DelveError::InvalidLevel(_))));
    }

    #[test]
    fn test_archetype_wider_than_level_is_invalid() {
        let level = LevelDescription::new("small", 20, 20, 1.0)
            .with_archetype(RoomArchetype::new("start", RoomType::Start, 2, 2))
            .with_archetype(RoomArchetype::new("boss", RoomType::Boss, u32::MAX, 1));
        let result = DungeonGenerator::new().generate_level(&level, &GenerationConfig::for_testing(1));
        assert!(matches!(result, Err(DelveError::InvalidLevel(_))));
    }

    #[test]
    fn test_validate_rejects_disconnected_rooms() {
        let grid = Grid::new(20, 20, 1.0);
        let rooms = vec![
            PlacedRoom::new(
                RoomId(0),
                RoomPlacement::new(RoomArchetype::new("start", RoomType::Start, 2, 2), Position::new(0, 0)),
                &grid,
            ),
            PlacedRoom::new(
                RoomId(1),
                RoomPlacement::new(RoomArchetype::new("boss", RoomType::Boss, 2, 2), Position::new(10, 10)),
                &grid,
            ),
        ];
        let layout = DungeonLayout::new(grid, rooms, Vec::new());

        let result = DungeonGenerator::new().validate(&layout, &GenerationConfig::for_testing(1));
        assert!(matches!(result, Err(DelveError::GenerationFailed(_))));
    }

    #[test]
    fn test_generator_is_reusable() {
        let generator = DungeonGenerator::new();
        let level = small_level();

        for seed in 0..5 {
            let layout = generator.generate_level(&level, &GenerationConfig::for_testing(seed)).unwrap();
            assert_eq!(layout.room_count(), 5);
            assert_eq!(layout.grid().occupied_count(), 2 * 2 * 4 + 3 * 3);
        }
    }

    #[tokio::test]
    async fn test_async_generation_matches_sync() {
        let generator = DungeonGenerator::new();
        let level = LevelDescription::demo();
        let config = GenerationConfig::new(21);
        let cancel = AtomicBool::new(false);

        let async_layout = generator.generate_async(&level, &config, &cancel).await.unwrap();
        let sync_layout = generator.generate_level(&level, &config).unwrap();

        assert_eq!(async_layout.snapshot(), sync_layout.snapshot());
    }

    #[test]
    fn test_cancelled_generation_returns_error() {
        let generator = DungeonGenerator::new();
        let cancel = AtomicBool::new(true);

        let result = tokio_test::block_on(generator.generate_async(
            &LevelDescription::demo(),
            &GenerationConfig::new(1),
            &cancel,
        ));
        assert!(matches!(result, Err(DelveError::Cancelled)));
    }
}
