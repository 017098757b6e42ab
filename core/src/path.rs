//! Ordered waypoint list consumed by enemy movement.

use glam::Vec2;

use crate::TileCoord;

/// Ordered list of world-space waypoints that enemies walk along.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
    tiles: Vec<TileCoord>,
}

impl Path {
    /// Creates a path from raw world-space waypoints. No tiles are blocked.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            tiles: Vec::new(),
        }
    }

    /// Creates a path through the centres of the provided tiles.
    ///
    /// The tiles are remembered so tower placement can refuse them.
    #[must_use]
    pub fn from_tiles(tiles: Vec<TileCoord>, tile_size: f32) -> Self {
        let waypoints = tiles.iter().map(|tile| tile.center(tile_size)).collect();
        Self { waypoints, tiles }
    }

    /// Waypoint at the provided index, if any.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// First waypoint of the path.
    #[must_use]
    pub fn start(&self) -> Option<Vec2> {
        self.waypoint(0)
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Reports whether the tile is part of the path.
    #[must_use]
    pub fn contains_tile(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }
}
