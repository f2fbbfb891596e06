//! Nation - federation of towns under one capital town

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, TownId};

/// A nation. Diplomacy at nation level is always enacted through the
/// capital town's ally/enemy sets; the nation itself stores none.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,

    /// The capital town. Always a member; its ally/enemy sets carry the
    /// nation's diplomacy.
    pub capital: TownId,
    pub towns: AHashSet<TownId>,

    /// Display color for the map layer (opaque to the engine)
    pub color: (u8, u8, u8),
}

impl Nation {
    pub fn new(id: NationId, name: impl Into<String>, capital: TownId) -> Self {
        let mut towns = AHashSet::new();
        towns.insert(capital);

        Self {
            id,
            name: name.into(),
            capital,
            towns,
            color: (255, 255, 255),
        }
    }

    pub fn is_member(&self, town: TownId) -> bool {
        self.towns.contains(&town)
    }
}
