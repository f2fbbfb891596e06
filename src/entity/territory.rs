//! Territory - atomic unit of claimable space

use serde::{Deserialize, Serialize};

use crate::core::types::{TerritoryId, TownId};

/// A territory node. The bounding region itself is opaque to the engine;
/// only the adjacency list and the claim cost matter here. Both are
/// supplied by the external spatial index when the world is loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,

    /// Claim power consumed while this territory is held
    pub cost: u32,

    /// Adjacent territory ids
    pub neighbors: Vec<TerritoryId>,

    /// Owning town (None = unclaimed)
    pub owner: Option<TownId>,

    /// Town holding battlefield control during an active war capture
    pub occupier: Option<TownId>,
}

impl Territory {
    pub fn new(id: TerritoryId, cost: u32, neighbors: Vec<TerritoryId>) -> Self {
        Self {
            id,
            cost,
            neighbors,
            owner: None,
            occupier: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_adjacent_to(&self, other: TerritoryId) -> bool {
        self.neighbors.contains(&other)
    }
}
