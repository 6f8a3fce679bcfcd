//! # Room Placement
//!
//! Places non-overlapping rooms on the occupancy grid.
//!
//! Categories are placed in a fixed order so later ones see the grid left by
//! earlier ones:
//! 1. Start room near the grid center
//! 2. Normal rooms at random positions
//! 3. Boss room as far from the start as possible
//! 4. Treasure, shop and secret rooms at positions matching their site preference
//!
//! Failing to place the start or boss room aborts generation. Every other
//! shortfall is logged and generation continues with fewer rooms.

use crate::{
    ArchetypeCatalog, DelveError, DelveResult, Direction, Footprint, GenerationConfig, Generator, Grid,
    LevelDescription, Position, RoomArchetype, RoomPlacement, RoomType, Size, utils,
};
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};

/// Where a special room would like to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePreference {
    /// Exactly one open side
    DeadEnd,
    /// Two or three open sides
    Accessible,
    /// Touching the outer border of the grid
    Edge,
}

impl SitePreference {
    fn for_room_type(room_type: RoomType) -> Option<Self> {
        match room_type {
            RoomType::Treasure => Some(SitePreference::DeadEnd),
            RoomType::Shop => Some(SitePreference::Accessible),
            RoomType::Secret => Some(SitePreference::Edge),
            _ => None,
        }
    }
}

/// What the planner managed to do, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Normal room count drawn from the level bounds
    pub requested_normal_rooms: u32,
    /// Normal rooms actually placed
    pub placed_normal_rooms: u32,
    /// Optional categories that were skipped
    pub skipped: Vec<RoomType>,
}

/// Room placements on a grid, built up phase by phase.
#[derive(Debug, Clone)]
pub struct PlacementPlan {
    /// Occupancy grid with every placed footprint marked
    pub grid: Grid,
    /// Placements in placement order; the start room comes first
    pub placements: Vec<RoomPlacement>,
    /// Spacing every placement respects
    pub spacing: u32,
    pub report: PlacementReport,
}

impl PlacementPlan {
    /// Creates an empty plan over a fresh grid.
    pub fn new(grid: Grid, spacing: u32) -> Self {
        Self {
            grid,
            placements: Vec::new(),
            spacing,
            report: PlacementReport::default(),
        }
    }

    /// Whether a footprint fits the grid and keeps its distance from every placed room.
    pub fn can_place(&self, footprint: &Footprint) -> bool {
        self.grid.fits(footprint)
            && self
                .placements
                .iter()
                .all(|placed| !placed.footprint().expand(self.spacing).intersects(footprint))
    }

    /// Every top-left position where a room of `size` can go, row by row.
    pub fn valid_positions(&self, size: Size) -> Vec<Position> {
        let mut positions = Vec::new();
        let (Some(max_x), Some(max_y)) = (
            self.grid.width.checked_sub(size.width),
            self.grid.height.checked_sub(size.height),
        ) else {
            return positions;
        };

        for y in 0..=max_y as i32 {
            for x in 0..=max_x as i32 {
                let pos = Position::new(x, y);
                if self.can_place(&Footprint::new(pos, size)) {
                    positions.push(pos);
                }
            }
        }

        positions
    }

    /// Commits a placement and marks its cells occupied.
    pub fn commit(&mut self, archetype: &RoomArchetype, position: Position) {
        let placement = RoomPlacement::new(archetype.clone(), position);
        self.grid.occupy(&placement.footprint());
        debug!(
            "Placed {} room '{}' at {}",
            placement.room_type(),
            archetype.name,
            position
        );
        self.placements.push(placement);
    }

    /// Number of sides a corridor could leave a footprint from.
    ///
    /// A side is open when the band of `spacing + 1` cells beyond it is
    /// entirely inside the grid and unoccupied.
    pub fn open_directions(&self, footprint: &Footprint) -> usize {
        Direction::all()
            .into_iter()
            .filter(|&direction| {
                let band = footprint.band_beyond(direction, self.spacing + 1);
                self.grid.is_area_free(&band)
            })
            .count()
    }

    fn accepts(&self, preference: SitePreference, footprint: &Footprint) -> bool {
        match preference {
            SitePreference::DeadEnd => self.open_directions(footprint) == 1,
            SitePreference::Accessible => (2..=3).contains(&self.open_directions(footprint)),
            SitePreference::Edge => footprint.touches_border(self.grid.width, self.grid.height),
        }
    }

    /// The first placement of a type.
    pub fn first_of_type(&self, room_type: RoomType) -> Option<&RoomPlacement> {
        self.placements.iter().find(|p| p.room_type() == room_type)
    }

    pub fn count_of_type(&self, room_type: RoomType) -> usize {
        self.placements.iter().filter(|p| p.room_type() == room_type).count()
    }

    pub fn footprints(&self) -> Vec<Footprint> {
        self.placements.iter().map(RoomPlacement::footprint).collect()
    }
}

/// Places rooms for a level.
#[derive(Debug, Clone, Default)]
pub struct RoomPlanner;

impl RoomPlanner {
    /// Creates a new room planner.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, Generator, LevelDescription, RoomPlanner, RoomType, utils};
    ///
    /// let level = LevelDescription::demo();
    /// let config = GenerationConfig::new(1);
    /// let mut rng = utils::create_rng(&config);
    ///
    /// let plan = RoomPlanner::new().generate(&level, &config, &mut rng).unwrap();
    /// assert_eq!(plan.count_of_type(RoomType::Start), 1);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Runs every placement phase against a catalog.
    pub fn plan(
        &self,
        level: &LevelDescription,
        catalog: &ArchetypeCatalog,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<PlacementPlan> {
        let grid = Grid::new(level.width, level.height, level.cell_size);
        let mut plan = PlacementPlan::new(grid, config.room_spacing);

        let start = self.place_start_room(&mut plan, catalog, config, rng)?;
        self.place_normal_rooms(&mut plan, level, catalog, config, rng);
        self.place_boss_room(&mut plan, level, catalog, start, rng)?;

        if level.include_treasure {
            self.place_special_room(&mut plan, catalog, RoomType::Treasure, level.treasure_archetype.as_deref(), rng);
        }
        if level.include_shop {
            self.place_special_room(&mut plan, catalog, RoomType::Shop, None, rng);
        }
        if level.include_secret {
            let chance = if config.secret_room_chance.is_finite() {
                config.secret_room_chance.clamp(0.0, 1.0)
            } else {
                warn!(
                    "Secret room chance {} is not finite, treating it as 0",
                    config.secret_room_chance
                );
                0.0
            };
            if rng.gen_bool(chance) {
                self.place_special_room(&mut plan, catalog, RoomType::Secret, None, rng);
            } else {
                debug!("Secret room not rolled for level '{}'", level.name);
            }
        }

        info!(
            "Placed {} rooms on level '{}' ({} of {} normal rooms)",
            plan.placements.len(),
            level.name,
            plan.report.placed_normal_rooms,
            plan.report.requested_normal_rooms
        );

        Ok(plan)
    }

    /// Places the start room near the grid center and returns its position.
    fn place_start_room(
        &self,
        plan: &mut PlacementPlan,
        catalog: &ArchetypeCatalog,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Position> {
        let archetype = catalog
            .pick(RoomType::Start, None, rng)
            .ok_or(DelveError::MissingArchetype(RoomType::Start))?;
        let size = archetype.size;
        let (width, height) = (plan.grid.width, plan.grid.height);

        let center = Position::new(
            ((i64::from(width) - i64::from(size.width)) / 2) as i32,
            ((i64::from(height) - i64::from(size.height)) / 2) as i32,
        );
        let radius = (width.min(height) / 4) as i32;

        if config.jitter_start_room && radius > 0 {
            for _ in 0..config.max_placement_attempts {
                let offset = Position::new(rng.gen_range(-radius..=radius), rng.gen_range(-radius..=radius));
                let candidate = center + offset;
                if plan.can_place(&Footprint::new(candidate, size)) {
                    plan.commit(archetype, candidate);
                    return Ok(candidate);
                }
            }
        }

        if plan.can_place(&Footprint::new(center, size)) {
            plan.commit(archetype, center);
            return Ok(center);
        }

        Err(DelveError::StartRoomPlacement)
    }

    /// Places filler rooms at random positions until the target count or the attempt budget runs out.
    fn place_normal_rooms(
        &self,
        plan: &mut PlacementPlan,
        level: &LevelDescription,
        catalog: &ArchetypeCatalog,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let fillers = catalog.fillers();
        if fillers.is_empty() {
            warn!("No normal room archetypes for level '{}', skipping normal rooms", level.name);
            plan.report.skipped.push(RoomType::Normal);
            return;
        }

        let target = rng.gen_range(level.min_rooms..=level.max_rooms);
        plan.report.requested_normal_rooms = target;

        let mut placed = 0;
        for _ in 0..config.max_placement_attempts {
            if placed >= target {
                break;
            }

            let Some(&archetype) = fillers.choose(rng) else {
                break;
            };
            let Some(candidate) = random_position(&plan.grid, archetype.size, rng) else {
                continue;
            };

            if plan.can_place(&Footprint::new(candidate, archetype.size)) {
                plan.commit(archetype, candidate);
                placed += 1;
            }
        }

        plan.report.placed_normal_rooms = placed;
        if placed < target {
            warn!(
                "Only placed {} of {} normal rooms after {} attempts",
                placed, target, config.max_placement_attempts
            );
        }
    }

    /// Places the boss room at the valid position farthest from the start room.
    fn place_boss_room(
        &self,
        plan: &mut PlacementPlan,
        level: &LevelDescription,
        catalog: &ArchetypeCatalog,
        start: Position,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        let archetype = catalog
            .pick(RoomType::Boss, level.boss_archetype.as_deref(), rng)
            .ok_or(DelveError::MissingArchetype(RoomType::Boss))?;

        let mut best: Option<(Position, f64)> = None;
        for candidate in plan.valid_positions(archetype.size) {
            let distance = candidate.euclidean_distance(start);
            if best.map_or(true, |(_, best_distance)| distance > best_distance) {
                best = Some((candidate, distance));
            }
        }

        let (position, distance) = best.ok_or(DelveError::BossRoomPlacement)?;
        debug!("Boss room is {:.1} cells from the start room", distance);
        plan.commit(archetype, position);
        Ok(())
    }

    /// Places an optional special room, preferring sites that suit its type.
    fn place_special_room(
        &self,
        plan: &mut PlacementPlan,
        catalog: &ArchetypeCatalog,
        room_type: RoomType,
        designated: Option<&str>,
        rng: &mut StdRng,
    ) {
        let Some(archetype) = catalog.pick(room_type, designated, rng) else {
            warn!("No {} room archetype available, skipping", room_type);
            plan.report.skipped.push(room_type);
            return;
        };

        let candidates = plan.valid_positions(archetype.size);
        if candidates.is_empty() {
            warn!("No room left for a {} room, skipping", room_type);
            plan.report.skipped.push(room_type);
            return;
        }

        let preferred: Vec<Position> = match SitePreference::for_room_type(room_type) {
            Some(preference) => candidates
                .iter()
                .copied()
                .filter(|&pos| plan.accepts(preference, &Footprint::new(pos, archetype.size)))
                .collect(),
            None => Vec::new(),
        };

        let pool = if preferred.is_empty() {
            debug!("No preferred site for {} room, using any valid position", room_type);
            &candidates
        } else {
            &preferred
        };

        if let Some(&position) = pool.choose(rng) {
            plan.commit(archetype, position);
        }
    }
}

/// A random top-left position that keeps a room of `size` inside the grid.
fn random_position(grid: &Grid, size: Size, rng: &mut StdRng) -> Option<Position> {
    let max_x = grid.width.checked_sub(size.width)? as i32;
    let max_y = grid.height.checked_sub(size.height)? as i32;
    Some(Position::new(rng.gen_range(0..=max_x), rng.gen_range(0..=max_y)))
}

impl Generator<PlacementPlan> for RoomPlanner {
    fn generate(
        &self,
        level: &LevelDescription,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<PlacementPlan> {
        level.validate()?;
        let catalog = ArchetypeCatalog::from_level(level);
        self.plan(level, &catalog, config, rng)
    }

    fn validate(&self, plan: &PlacementPlan, config: &GenerationConfig) -> DelveResult<()> {
        utils::validate_footprints(&plan.footprints(), plan.grid.width, plan.grid.height, config.room_spacing)?;

        for required in [RoomType::Start, RoomType::Boss] {
            let count = plan.count_of_type(required);
            if count != 1 {
                return Err(DelveError::GenerationFailed(format!(
                    "expected exactly one {} room, found {}",
                    required, count
                )));
            }
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomPlanner"
    }
}
