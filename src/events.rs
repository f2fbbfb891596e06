//! Domain events and the event log
//!
//! Every structural change emits an event for the external command/chat
//! layer to render. The engine never calls back into that layer; it only
//! appends here and lets the consumer drain.

use serde::{Deserialize, Serialize};

use crate::core::types::{Millis, NationId, ResidentId, TerritoryId, TownId};

/// A logged domain event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    /// Engine clock when the event occurred
    pub at_ms: Millis,
    pub event: Event,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // Towns and nations
    TownCreated { town: TownId, name: String },
    TownDestroyed { town: TownId, name: String },
    NationCreated { nation: NationId, name: String },
    NationDeleted { nation: NationId, name: String },
    TownJoinedNation { town: TownId, nation: NationId },
    TownLeftNation { town: TownId, nation: NationId },

    // Membership
    ResidentJoinedTown { resident: ResidentId, town: TownId },
    ResidentLeftTown { resident: ResidentId, town: TownId },
    LeadershipTransferred { town: TownId, from: ResidentId, to: ResidentId },

    // Territory
    TerritoryClaimed { town: TownId, territory: TerritoryId },
    TerritoryUnclaimed { town: TownId, territory: TerritoryId },
    HomeMoved { town: TownId, home: TerritoryId },

    // War
    WarDeclared { attacker: TownId, defender: TownId },
    TerritoryOccupied { territory: TerritoryId, occupier: TownId },
    OccupationLifted { territory: TerritoryId },
    TerritoryAnnexed { territory: TerritoryId, from: TownId, to: TownId },

    // Diplomacy
    PeaceOffered { from: TownId, to: TownId },
    PeaceAccepted { a: TownId, b: TownId },
    AllianceOffered { from: TownId, to: TownId },
    AllianceFormed { a: TownId, b: TownId },
    AllianceBroken { a: TownId, b: TownId },
    TruceStarted { a: TownId, b: TownId, expires_ms: Millis },
    TruceExpired { a: TownId, b: TownId },

    // Scheduling races resolved as informational no-ops
    InviteExpired { resident: ResidentId, town: TownId },
    ApplicationExpired { resident: ResidentId, town: TownId },
    NationInviteExpired { town: TownId, nation: NationId },

    // Economy
    OverMaxClaims { town: TownId, over: u32 },
    IncomeCollected,
    BackupCompleted,
}

/// Append-only event log with monotonic ids
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EventRecord>,
    next_event_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at_ms: Millis, event: Event) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(EventRecord { id, at_ms, event });
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return all pending records, oldest first
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    /// Whether any logged event matches the predicate
    pub fn contains<F: Fn(&Event) -> bool>(&self, pred: F) -> bool {
        self.events.iter().any(|r| pred(&r.event))
    }
}
