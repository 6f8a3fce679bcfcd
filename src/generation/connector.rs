//! # Room Graph Connection
//!
//! Links placed rooms with corridors.
//!
//! Connection runs in two phases. A spanning phase grows a single fragment
//! outward from the start room, always linking the closest unconnected room,
//! so every room ends up reachable. A loop phase then adds extra corridors
//! between nearby rooms that are not yet linked, so the dungeon is not a tree.

use super::placement::PlacementPlan;
use super::GenerationConfig;
use crate::{
    Corridor, CorridorId, CorridorPathfinder, DungeonLayout, Grid, PlacedRoom, RoomConnection, RoomId,
    RoomType,
};
use log::{debug, info, warn};
use pathfinding::prelude::bfs_reach;
use rand::{rngs::StdRng, Rng};

/// Rooms and corridors under construction.
#[derive(Debug, Clone)]
pub struct RoomGraph {
    grid: Grid,
    rooms: Vec<PlacedRoom>,
    corridors: Vec<Corridor>,
}

impl RoomGraph {
    /// Wraps every placement of a plan as an unconnected room.
    pub fn from_plan(plan: &PlacementPlan) -> Self {
        let rooms = plan
            .placements
            .iter()
            .enumerate()
            .map(|(index, placement)| PlacedRoom::new(RoomId(index), placement.clone(), &plan.grid))
            .collect();

        Self {
            grid: plan.grid.clone(),
            rooms,
            corridors: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &[PlacedRoom] {
        &self.rooms
    }

    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    /// A pathfinder that knows every room footprint in the graph.
    pub fn pathfinder(&self) -> CorridorPathfinder {
        CorridorPathfinder::new(&self.grid, self.rooms.iter().map(PlacedRoom::footprint).collect())
    }

    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.rooms.get(a.0).is_some_and(|room| room.is_connected_to(b))
    }

    /// Creates a corridor between two rooms.
    ///
    /// Returns None without changing anything if the rooms are the same,
    /// unknown, or already linked.
    pub fn connect(&mut self, a: RoomId, b: RoomId, pathfinder: &CorridorPathfinder) -> Option<CorridorId> {
        if a == b || self.are_connected(a, b) {
            debug!("Skipping corridor between {} and {}", a, b);
            return None;
        }
        let from = self.rooms.get(a.0)?.footprint();
        let to = self.rooms.get(b.0)?.footprint();

        let route = pathfinder.route(&from, &to);
        let id = CorridorId(self.corridors.len());
        let connection_point = route.connection_point();

        self.rooms[a.0].add_connection(RoomConnection {
            room: b,
            corridor: id,
            connection_point,
        });
        self.rooms[b.0].add_connection(RoomConnection {
            room: a,
            corridor: id,
            connection_point,
        });

        debug!("{} links {} and {} over {} cells", id, a, b, route.path.len());

        self.corridors.push(Corridor {
            id,
            room_a: a,
            room_b: b,
            path: route.path,
            connection_point,
            is_active: true,
            used_fallback: route.used_fallback,
        });

        Some(id)
    }

    /// Whether every room can reach every other room.
    pub fn is_fully_connected(&self) -> bool {
        if self.rooms.is_empty() {
            return true;
        }
        let reached = bfs_reach(RoomId(0), |&id| {
            self.rooms[id.0].connected_rooms().collect::<Vec<_>>()
        })
        .count();
        reached == self.rooms.len()
    }

    fn distance(&self, a: RoomId, b: RoomId) -> f64 {
        self.rooms[a.0]
            .grid_position()
            .euclidean_distance(self.rooms[b.0].grid_position())
    }

    pub fn into_layout(self) -> DungeonLayout {
        DungeonLayout::new(self.grid, self.rooms, self.corridors)
    }
}

/// What the connector did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionReport {
    pub spanning_edges: usize,
    pub loop_edges: usize,
    /// Corridors that had to use the L-shaped fallback
    pub fallback_corridors: usize,
}

/// Connects the rooms of a [`RoomGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphConnector;

impl GraphConnector {
    pub fn new() -> Self {
        Self
    }

    /// Runs the spanning and loop phases.
    pub fn connect(&self, graph: &mut RoomGraph, config: &GenerationConfig, rng: &mut StdRng) -> ConnectionReport {
        let pathfinder = graph.pathfinder();

        let spanning_edges = self.connect_spanning(graph, &pathfinder);
        let loop_edges = self.add_loop_edges(graph, &pathfinder, config, rng);
        let fallback_corridors = graph.corridors().iter().filter(|c| c.used_fallback).count();

        info!(
            "Connected {} rooms with {} corridors ({} loops, {} fallbacks)",
            graph.rooms().len(),
            graph.corridors().len(),
            loop_edges,
            fallback_corridors
        );

        ConnectionReport {
            spanning_edges,
            loop_edges,
            fallback_corridors,
        }
    }

    /// Grows one fragment from the start room until it holds every room.
    fn connect_spanning(&self, graph: &mut RoomGraph, pathfinder: &CorridorPathfinder) -> usize {
        let count = graph.rooms().len();
        if count < 2 {
            return 0;
        }

        let root = graph
            .rooms()
            .iter()
            .find(|room| room.room_type() == RoomType::Start)
            .map(|room| room.id)
            .unwrap_or(RoomId(0));

        let mut connected = vec![root];
        let mut unconnected: Vec<RoomId> = (0..count).map(RoomId).filter(|&id| id != root).collect();
        let mut edges = 0;

        while !unconnected.is_empty() {
            let (from, to) = match closest_pair(graph, &connected, &unconnected) {
                Some(pair) => pair,
                None => {
                    warn!("No closest pair found, forcing a connection from {}", connected[0]);
                    (connected[0], unconnected[0])
                }
            };

            if graph.connect(from, to, pathfinder).is_some() {
                edges += 1;
            }
            unconnected.retain(|&id| id != to);
            connected.push(to);
        }

        edges
    }

    /// Adds corridors between unlinked rooms, preferring pairs inside the
    /// configured distance band.
    fn add_loop_edges(
        &self,
        graph: &mut RoomGraph,
        pathfinder: &CorridorPathfinder,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> usize {
        let count = graph.rooms().len();
        let wanted = (count as f64 * config.loop_edge_ratio.max(0.0)).round() as usize;
        let (near, far) = config.loop_distance_band;
        let mut added = 0;

        for _ in 0..wanted {
            let mut candidates: Vec<(RoomId, RoomId, f64)> = Vec::new();
            for i in 0..count {
                for j in (i + 1)..count {
                    let (a, b) = (RoomId(i), RoomId(j));
                    if !graph.are_connected(a, b) {
                        candidates.push((a, b, graph.distance(a, b)));
                    }
                }
            }

            if candidates.is_empty() {
                debug!("Every room pair is already linked, stopping after {} loops", added);
                break;
            }

            candidates.sort_by(|x, y| x.2.total_cmp(&y.2));

            let preferred: Vec<&(RoomId, RoomId, f64)> =
                candidates.iter().filter(|c| c.2 >= near && c.2 <= far).collect();

            let (a, b, _) = if preferred.is_empty() {
                candidates[0]
            } else {
                let pool = preferred.len().min(config.loop_candidate_pool.max(1));
                *preferred[rng.gen_range(0..pool)]
            };

            if graph.connect(a, b, pathfinder).is_some() {
                added += 1;
            }
        }

        added
    }
}

/// The closest (connected, unconnected) pair. Ties keep the first found.
fn closest_pair(graph: &RoomGraph, connected: &[RoomId], unconnected: &[RoomId]) -> Option<(RoomId, RoomId)> {
    let mut best = None;
    let mut best_distance = f64::INFINITY;

    for &from in connected {
        for &to in unconnected {
            let distance = graph.distance(from, to);
            if distance < best_distance {
                best_distance = distance;
                best = Some((from, to));
            }
        }
    }

    best
}
