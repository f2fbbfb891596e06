//! Resident - a player tracked by the engine

use serde::{Deserialize, Serialize};

use crate::core::types::{Millis, ResidentId, TownId};
use crate::timer::TimerToken;

/// A resident (player). Created on first join, persists across sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub name: String,

    /// Town membership (None = townless)
    pub town: Option<TownId>,

    /// Pending town invitation, if any
    pub pending_invite: Option<TownInvite>,

    /// Trust flag granted by town leadership
    pub trusted: bool,

    /// Remaining cooldown before this resident may found a town (ms)
    pub town_create_cooldown_ms: Millis,
}

/// A pending invitation into a town.
///
/// Cleared on accept, on any town change of the resident, or by the expiry
/// timer. The token identifies the expiry timer so a superseding mutation
/// can cancel it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TownInvite {
    pub town: TownId,
    pub inviter: ResidentId,
    pub expires_ms: Millis,
    #[serde(skip)]
    pub timer: TimerToken,
}

impl Resident {
    pub fn new(id: ResidentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            town: None,
            pending_invite: None,
            trusted: false,
            town_create_cooldown_ms: 0,
        }
    }

    pub fn is_townless(&self) -> bool {
        self.town.is_none()
    }
}
