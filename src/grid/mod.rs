//! # Grid Module
//!
//! Integer grid geometry and the occupancy grid rooms are placed on.
//!
//! Everything the generator does happens in grid space: rooms are axis-aligned
//! footprints of whole cells, corridors are sequences of cells. Conversion to
//! continuous world space only happens at the edges, through [`Grid`].

pub mod occupancy;

pub use occupancy::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the dungeon grid.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let neighbors = pos.cardinal_adjacent_positions();
/// assert_eq!(neighbors.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Whether `other` is one cardinal step away.
    pub fn is_cardinal_neighbor(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four axis directions corridors and placement checks move along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Returns all 4 directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// Width and height of a room, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    pub fn area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

/// A point in continuous world space.
///
/// The dungeon lies on the `y = 0` plane; grid `y` maps onto world `z`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// The axis-aligned rectangle of cells a room occupies: `[top_left, top_left + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub top_left: Position,
    pub size: Size,
}

impl Footprint {
    /// Creates a new footprint.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Footprint, Position, Size};
    ///
    /// let room = Footprint::new(Position::new(5, 5), Size::new(10, 8));
    /// assert!(room.contains(Position::new(7, 7)));
    /// assert!(!room.contains(Position::new(20, 20)));
    /// ```
    pub fn new(top_left: Position, size: Size) -> Self {
        Self { top_left, size }
    }

    /// Exclusive right bound. Saturates at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.top_left.x.saturating_add(span(self.size.width))
    }

    /// Exclusive bottom bound. Saturates at `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        self.top_left.y.saturating_add(span(self.size.height))
    }

    /// Gets the bottom-right cell of the footprint.
    pub fn bottom_right(&self) -> Position {
        Position::new(self.right() - 1, self.bottom() - 1)
    }

    /// Gets the center cell of the footprint.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x.saturating_add(span(self.size.width / 2)),
            self.top_left.y.saturating_add(span(self.size.height / 2)),
        )
    }

    /// Checks if a position is inside this footprint.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x && pos.y >= self.top_left.y && pos.x < self.right() && pos.y < self.bottom()
    }

    /// Checks if a position is on the boundary ring of this footprint.
    pub fn is_edge(&self, pos: Position) -> bool {
        if !self.contains(pos) {
            return false;
        }

        pos.x == self.top_left.x
            || pos.y == self.top_left.y
            || pos.x == self.right() - 1
            || pos.y == self.bottom() - 1
    }

    /// Checks if this footprint shares at least one cell with another.
    pub fn intersects(&self, other: &Footprint) -> bool {
        !(self.top_left.x >= other.right()
            || other.top_left.x >= self.right()
            || self.top_left.y >= other.bottom()
            || other.top_left.y >= self.bottom())
    }

    /// Grows the footprint by `margin` cells on every side.
    pub fn expand(&self, margin: u32) -> Footprint {
        let m = span(margin);
        let grow = margin.saturating_mul(2);
        Footprint::new(
            Position::new(self.top_left.x.saturating_sub(m), self.top_left.y.saturating_sub(m)),
            Size::new(self.size.width.saturating_add(grow), self.size.height.saturating_add(grow)),
        )
    }

    /// Whether the footprint touches the outer border of a `width` x `height` grid.
    pub fn touches_border(&self, width: u32, height: u32) -> bool {
        self.top_left.x == 0
            || self.top_left.y == 0
            || self.right() >= span(width)
            || self.bottom() >= span(height)
    }

    /// Gets all cells covered by the footprint, row by row.
    pub fn cells(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in self.top_left.y..self.bottom() {
            for x in self.top_left.x..self.right() {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }

    /// Gets the boundary ring of the footprint, row by row.
    pub fn edge_cells(&self) -> Vec<Position> {
        self.cells().into_iter().filter(|&pos| self.is_edge(pos)).collect()
    }

    /// The band of `depth` cells directly beyond one side of the footprint.
    pub fn band_beyond(&self, direction: Direction, depth: u32) -> Footprint {
        let d = span(depth);
        match direction {
            Direction::North => Footprint::new(
                Position::new(self.top_left.x, self.top_left.y.saturating_sub(d)),
                Size::new(self.size.width, depth),
            ),
            Direction::South => Footprint::new(
                Position::new(self.top_left.x, self.bottom()),
                Size::new(self.size.width, depth),
            ),
            Direction::West => Footprint::new(
                Position::new(self.top_left.x.saturating_sub(d), self.top_left.y),
                Size::new(depth, self.size.height),
            ),
            Direction::East => Footprint::new(
                Position::new(self.right(), self.top_left.y),
                Size::new(depth, self.size.height),
            ),
        }
    }
}

/// A cell count as a coordinate offset.
fn span(len: u32) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
