//! # Occupancy Grid
//!
//! Fixed-size boolean grid tracking which cells are taken by room footprints.

use super::{Footprint, Position, WorldPoint};
use serde::{Deserialize, Serialize};

/// Occupancy grid for one generation run.
///
/// Out-of-bounds cells are reported as occupied, so callers can look around
/// the map border without bounds checks of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// World units per cell
    pub cell_size: f32,
    /// Occupancy, indexed `cells[y][x]`
    cells: Vec<Vec<bool>>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Position};
    ///
    /// let grid = Grid::new(20, 10, 2.0);
    /// assert!(grid.is_valid_position(Position::new(19, 9)));
    /// assert!(!grid.is_occupied(Position::new(3, 3)));
    /// assert!(grid.is_occupied(Position::new(20, 0)));
    /// ```
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![vec![false; width as usize]; height as usize],
        }
    }

    /// Checks whether a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Checks whether a cell is taken. Out-of-bounds cells count as taken.
    pub fn is_occupied(&self, pos: Position) -> bool {
        if !self.is_valid_position(pos) {
            return true;
        }
        self.cells[pos.y as usize][pos.x as usize]
    }

    /// Marks a cell taken or free. Invalid positions are ignored.
    pub fn set_occupied(&mut self, pos: Position, occupied: bool) {
        if self.is_valid_position(pos) {
            self.cells[pos.y as usize][pos.x as usize] = occupied;
        }
    }

    /// Converts a grid cell to its world-space point on the ground plane.
    pub fn grid_to_world(&self, pos: Position) -> WorldPoint {
        WorldPoint::new(pos.x as f32 * self.cell_size, 0.0, pos.y as f32 * self.cell_size)
    }

    /// Converts a world-space point to the nearest grid cell.
    pub fn world_to_grid(&self, point: WorldPoint) -> Position {
        Position::new(
            (point.x / self.cell_size).round() as i32,
            (point.z / self.cell_size).round() as i32,
        )
    }

    /// Whether a footprint lies entirely inside the grid.
    pub fn fits(&self, footprint: &Footprint) -> bool {
        footprint.top_left.x >= 0
            && footprint.top_left.y >= 0
            && footprint.right() <= self.width as i32
            && footprint.bottom() <= self.height as i32
    }

    /// Whether every cell of a footprint is in bounds and free.
    pub fn is_area_free(&self, footprint: &Footprint) -> bool {
        self.fits(footprint) && footprint.cells().into_iter().all(|pos| !self.is_occupied(pos))
    }

    /// Marks every in-bounds cell of a footprint as taken.
    pub fn occupy(&mut self, footprint: &Footprint) {
        for pos in footprint.cells() {
            self.set_occupied(pos, true);
        }
    }

    /// Number of taken cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&taken| taken).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;

    #[test]
    fn test_bounds() {
        let grid = Grid::new(10, 5, 1.0);
        assert!(grid.is_valid_position(Position::new(0, 0)));
        assert!(grid.is_valid_position(Position::new(9, 4)));
        assert!(!grid.is_valid_position(Position::new(10, 4)));
        assert!(!grid.is_valid_position(Position::new(-1, 0)));
        assert!(!grid.is_valid_position(Position::new(0, 5)));
    }

    #[test]
    fn test_out_of_bounds_is_occupied_and_set_is_noop() {
        let mut grid = Grid::new(4, 4, 1.0);
        assert!(grid.is_occupied(Position::new(-1, 2)));

        grid.set_occupied(Position::new(7, 7), true);
        assert_eq!(grid.occupied_count(), 0);

        grid.set_occupied(Position::new(1, 2), true);
        assert!(grid.is_occupied(Position::new(1, 2)));
        grid.set_occupied(Position::new(1, 2), false);
        assert!(!grid.is_occupied(Position::new(1, 2)));
    }

    #[test]
    fn test_world_conversion() {
        let grid = Grid::new(20, 20, 10.0);
        let world = grid.grid_to_world(Position::new(3, 7));
        assert_eq!(world, WorldPoint::new(30.0, 0.0, 70.0));
        assert_eq!(grid.world_to_grid(world), Position::new(3, 7));

        // Rounds to the nearest cell
        assert_eq!(grid.world_to_grid(WorldPoint::new(34.0, 5.0, 66.0)), Position::new(3, 7));
    }

    #[test]
    fn test_footprint_occupancy() {
        let mut grid = Grid::new(10, 10, 1.0);
        let room = Footprint::new(Position::new(2, 2), Size::new(3, 2));

        assert!(grid.fits(&room));
        assert!(grid.is_area_free(&room));
        grid.occupy(&room);
        assert_eq!(grid.occupied_count(), 6);
        assert!(!grid.is_area_free(&room));

        let overflowing = Footprint::new(Position::new(8, 8), Size::new(3, 3));
        assert!(!grid.fits(&overflowing));
    }
}
