//! Typed failure results for every mutation entry point.
//!
//! Precondition violations are returned, never thrown; no variant here
//! corresponds to partially applied state.

use thiserror::Error;

use crate::core::types::{NationId, ResidentId, TerritoryId, TownId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("territory {0:?} does not exist")]
    UnknownTerritory(TerritoryId),

    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("no territory at that location")]
    NoTerritoryHere,

    #[error("territory is already claimed by a town")]
    AlreadyClaimed,

    #[error("territory is not adjacent to the town's claims")]
    NotAdjacent,

    #[error("town does not have enough claim power")]
    InsufficientPower,

    #[error("only the leader or an officer may manage claims")]
    NotOfficer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnclaimError {
    #[error("territory {0:?} does not exist")]
    UnknownTerritory(TerritoryId),

    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("territory is not owned by the town")]
    NotOwned,

    #[error("territory is the town's home")]
    IsHomeTerritory,

    #[error("unclaiming would disconnect the town's territory")]
    WouldDisconnect,

    #[error("territory is occupied by an enemy")]
    Occupied,

    #[error("only the leader or an officer may manage claims")]
    NotOfficer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiplomacyError {
    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("a town cannot change relations with itself")]
    SameTown,

    #[error("towns belong to the same nation")]
    SameNation,

    #[error("war is disabled")]
    WarDisabled,

    #[error("towns are already enemies")]
    AlreadyEnemies,

    #[error("towns are already allies")]
    AlreadyAllies,

    #[error("cannot declare war on an ally or during a truce")]
    AllyOrTruce,

    #[error("a truce is already active between the towns")]
    AlreadyTruce,

    #[error("towns are not allies")]
    NotAllies,

    #[error("towns are not enemies")]
    NotEnemies,

    #[error("an offer from this side is already open")]
    AlreadyProposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WarError {
    #[error("territory {0:?} does not exist")]
    UnknownTerritory(TerritoryId),

    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("war is disabled")]
    WarDisabled,

    #[error("annexation is disabled")]
    AnnexationDisabled,

    #[error("territory has no owner")]
    Unowned,

    #[error("territory is not owned by an enemy")]
    NotEnemy,

    #[error("territory is not occupied by the town")]
    NotOccupier,

    #[error("a town cannot annex its own territory")]
    OwnTerritory,

    #[error("the owning town cannot be attacked (blacklisted)")]
    TownBlacklisted,

    #[error("the owning town cannot be attacked (not whitelisted)")]
    TownNotWhitelisted,

    #[error("home territory can only be annexed once it is the last one")]
    HomeNotLast,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TownError {
    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("resident {0:?} does not exist")]
    UnknownResident(ResidentId),

    #[error("territory {0:?} does not exist")]
    UnknownTerritory(TerritoryId),

    #[error("a town named \"{0}\" already exists")]
    NameTaken(String),

    #[error("resident already belongs to a town")]
    ResidentHasTown,

    #[error("resident does not belong to the town")]
    NotResident,

    #[error("resident is still on town creation cooldown")]
    CreateCooldown,

    #[error("town home was moved too recently")]
    MoveHomeCooldown,

    #[error("territory is already claimed by a town")]
    TerritoryOwned,

    #[error("territory is not owned by the town")]
    TerritoryNotOwned,

    #[error("only the leader may do this")]
    NotLeader,

    #[error("only the leader or an officer may do this")]
    NotOfficer,

    #[error("the leader must transfer leadership before leaving")]
    LeaderMustTransfer,

    #[error("resident has no pending invitation from the town")]
    NoInvite,

    #[error("resident has no pending application to the town")]
    NoApplication,

    #[error("an outpost named \"{0}\" already exists")]
    OutpostExists(String),

    #[error("no outpost named \"{0}\"")]
    UnknownOutpost(String),

    #[error("outposts cannot be placed on the home territory")]
    OutpostOnHome,

    #[error("insufficient funds in ledger entry \"{0}\"")]
    InsufficientFunds(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NationError {
    #[error("nation {0:?} does not exist")]
    UnknownNation(NationId),

    #[error("town {0:?} does not exist")]
    UnknownTown(TownId),

    #[error("a nation named \"{0}\" already exists")]
    NameTaken(String),

    #[error("town already belongs to a nation")]
    TownHasNation,

    #[error("town does not belong to the nation")]
    NotMember,

    #[error("only the capital's leader or officers may do this")]
    NotOfficer,

    #[error("town has no pending invitation from the nation")]
    NoInvite,
}
