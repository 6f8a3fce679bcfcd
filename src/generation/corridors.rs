//! # Corridor Pathfinding
//!
//! Computes the cell sequence a corridor follows between two rooms.
//!
//! Corridors run from the closest pair of boundary cells of the two rooms.
//! The search is A* over the four axis directions: free cells and room
//! boundary cells are walkable, room interiors are not. When A* cannot reach
//! the goal, an L-shaped path is used instead, so corridor creation never
//! fails.

use crate::{Footprint, Grid, Position};
use log::warn;
use pathfinding::prelude::astar;
use std::collections::HashMap;

/// Cost of one step, in milli-cells. The Euclidean heuristic is expressed in
/// the same unit and rounded down, which keeps it admissible.
const STEP_COST: u32 = 1000;

/// A computed corridor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorridorRoute {
    /// Cells from start to goal, both included
    pub path: Vec<Position>,
    pub start: Position,
    pub goal: Position,
    /// Whether A* failed and the L-shaped fallback was used
    pub used_fallback: bool,
}

impl CorridorRoute {
    /// The second cell of the path, or the goal for a single-cell path.
    pub fn connection_point(&self) -> Position {
        self.path.get(1).copied().unwrap_or(self.goal)
    }
}

/// Grid pathfinder that knows where rooms are.
#[derive(Debug, Clone)]
pub struct CorridorPathfinder {
    width: u32,
    height: u32,
    footprints: Vec<Footprint>,
    /// Footprint index covering each room cell
    cell_owner: HashMap<Position, usize>,
}

impl CorridorPathfinder {
    /// Creates a pathfinder for rooms on a grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{CorridorPathfinder, Footprint, Grid, Position, Size};
    ///
    /// let grid = Grid::new(10, 10, 1.0);
    /// let a = Footprint::new(Position::new(0, 0), Size::new(2, 2));
    /// let b = Footprint::new(Position::new(5, 5), Size::new(2, 2));
    /// let pathfinder = CorridorPathfinder::new(&grid, vec![a, b]);
    ///
    /// let route = pathfinder.route(&a, &b);
    /// assert_eq!(route.path.first(), Some(&Position::new(1, 1)));
    /// assert_eq!(route.path.last(), Some(&Position::new(5, 5)));
    /// ```
    pub fn new(grid: &Grid, footprints: Vec<Footprint>) -> Self {
        let mut cell_owner = HashMap::new();
        for (index, footprint) in footprints.iter().enumerate() {
            for cell in footprint.cells() {
                cell_owner.insert(cell, index);
            }
        }

        Self {
            width: grid.width,
            height: grid.height,
            footprints,
            cell_owner,
        }
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Whether a corridor may pass through a cell.
    pub fn is_walkable(&self, pos: Position) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        match self.cell_owner.get(&pos) {
            Some(&index) => self.footprints[index].is_edge(pos),
            None => true,
        }
    }

    fn successors(&self, pos: Position) -> Vec<(Position, u32)> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| self.is_walkable(next))
            .map(|next| (next, STEP_COST))
            .collect()
    }

    /// A* search between two cells. Returns None when the goal is unreachable.
    pub fn find_path(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        astar(
            &start,
            |&pos| self.successors(pos),
            |&pos| heuristic(pos, goal),
            |&pos| pos == goal,
        )
        .map(|(path, _cost)| path)
    }

    /// Horizontal run along `start.y` to `goal.x`, then vertical to `goal.y`.
    pub fn l_shaped_path(start: Position, goal: Position) -> Vec<Position> {
        let mut path = vec![start];
        let mut current = start;

        while current.x != goal.x {
            current.x += (goal.x - current.x).signum();
            path.push(current);
        }
        while current.y != goal.y {
            current.y += (goal.y - current.y).signum();
            path.push(current);
        }

        path
    }

    /// The closest pair of boundary cells between two rooms.
    ///
    /// Ties keep the first pair in row-major order of `a`, then `b`.
    pub fn connection_cells(a: &Footprint, b: &Footprint) -> (Position, Position) {
        let mut best = (a.top_left, b.top_left);
        let mut best_distance = f64::INFINITY;

        let b_edges = b.edge_cells();
        for from in a.edge_cells() {
            for &to in &b_edges {
                let distance = from.euclidean_distance(to);
                if distance < best_distance {
                    best_distance = distance;
                    best = (from, to);
                }
            }
        }

        best
    }

    /// Computes a corridor between two rooms.
    pub fn route(&self, a: &Footprint, b: &Footprint) -> CorridorRoute {
        let (start, goal) = Self::connection_cells(a, b);

        match self.find_path(start, goal) {
            Some(path) => CorridorRoute {
                path,
                start,
                goal,
                used_fallback: false,
            },
            None => {
                warn!("No A* route from {} to {}, using an L-shaped corridor", start, goal);
                CorridorRoute {
                    path: Self::l_shaped_path(start, goal),
                    start,
                    goal,
                    used_fallback: true,
                }
            }
        }
    }
}

fn heuristic(from: Position, to: Position) -> u32 {
    (from.euclidean_distance(to) * STEP_COST as f64).floor() as u32
}
