//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for residents (stable player id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResidentId(pub Uuid);

impl ResidentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResidentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for towns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TownId(pub u32);

/// Unique identifier for nations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NationId(pub u32);

/// Unique identifier for territories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

/// Engine time in milliseconds since world creation
pub type Millis = u64;

/// Chunk-scale coordinate used by the external spatial index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub z: i32,
}

impl Coord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Role a resident holds within their town
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownRole {
    Leader,
    Officer,
    Member,
}

/// Unordered pair of towns, stored with the smaller id first.
///
/// Used as the key for truces and diplomatic offers so that (A, B) and
/// (B, A) always address the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TownPair(pub TownId, pub TownId);

impl TownPair {
    pub fn new(a: TownId, b: TownId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, town: TownId) -> bool {
        self.0 == town || self.1 == town
    }

    /// The member of the pair that is not `town`
    pub fn other(&self, town: TownId) -> TownId {
        if self.0 == town {
            self.1
        } else {
            self.0
        }
    }
}
