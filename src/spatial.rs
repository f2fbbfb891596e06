//! Spatial index boundary
//!
//! The engine never inspects region geometry. It consumes a pure lookup
//! from coordinates to territory ids; adjacency arrives pre-computed on the
//! territories themselves when the world is loaded.

use ahash::AHashMap;

use crate::core::types::{Coord, TerritoryId};

/// Pure coordinate lookup provided by the surrounding system
pub trait SpatialIndex {
    fn territory_containing(&self, coord: Coord) -> Option<TerritoryId>;
}

/// Simple cell-per-coordinate index, enough for tests and the demo binary
#[derive(Debug, Default)]
pub struct GridIndex {
    cells: AHashMap<Coord, TerritoryId>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, coord: Coord, territory: TerritoryId) {
        self.cells.insert(coord, territory);
    }
}

impl SpatialIndex for GridIndex {
    fn territory_containing(&self, coord: Coord) -> Option<TerritoryId> {
        self.cells.get(&coord).copied()
    }
}
