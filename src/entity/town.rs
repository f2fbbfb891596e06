//! Town - basic ownership unit of residents and territory

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{Millis, NationId, ResidentId, TerritoryId, TownId, TownRole};
use crate::timer::TimerToken;

/// A town: one leader, a set of residents, and a connected claim of
/// territories around a home territory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Town {
    pub id: TownId,
    pub name: String,

    // Membership
    pub leader: ResidentId,
    pub officers: AHashSet<ResidentId>,
    pub residents: AHashSet<ResidentId>,

    // Territory. `claimed` always contains `home`; `annexed` marks the
    // exclaves acquired through war, which are exempt from the
    // connectivity invariant.
    pub home: TerritoryId,
    pub claimed: AHashSet<TerritoryId>,
    pub annexed: AHashSet<TerritoryId>,
    pub outposts: AHashMap<String, TerritoryId>,

    // Claim economy
    pub claim_power_max: f32,
    pub claims_used: u32,
    pub claims_penalty: f32,

    // Diplomacy. For nation members these sets live on the capital.
    pub allies: AHashSet<TownId>,
    pub enemies: AHashSet<TownId>,
    pub nation: Option<NationId>,
    pub pending_nation_invite: Option<NationInvite>,

    // Join requests from townless residents
    pub applications: AHashMap<ResidentId, Application>,

    // Access control and economy surface
    pub permissions: PermissionMatrix,
    pub income: AHashMap<String, i64>,

    /// Remaining cooldown before the home territory may move again (ms)
    pub move_home_cooldown_ms: Millis,
}

/// A pending invitation of this town into a nation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NationInvite {
    pub nation: NationId,
    pub expires_ms: Millis,
    #[serde(skip)]
    pub timer: TimerToken,
}

/// A pending join request from a townless resident
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
    pub expires_ms: Millis,
    #[serde(skip)]
    pub timer: TimerToken,
}

/// Actions gated by the town permission matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TownPermission {
    Build,
    Destroy,
    Interact,
    Chests,
    Income,
}

/// Groups a visitor can fall into, from the visited town's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionGroup {
    Town,
    Nation,
    Ally,
    Outsider,
    Trusted,
}

/// action x group -> allow. Absent entries deny.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PermissionMatrix {
    allowed: AHashSet<(TownPermission, PermissionGroup)>,
}

impl PermissionMatrix {
    /// Default town policy: residents (trusted or not) can do everything,
    /// nation members and allies can interact.
    pub fn town_default() -> Self {
        let mut matrix = Self::default();
        for perm in [
            TownPermission::Build,
            TownPermission::Destroy,
            TownPermission::Interact,
            TownPermission::Chests,
            TownPermission::Income,
        ] {
            matrix.allow(perm, PermissionGroup::Town);
            matrix.allow(perm, PermissionGroup::Trusted);
        }
        matrix.allow(TownPermission::Interact, PermissionGroup::Nation);
        matrix.allow(TownPermission::Interact, PermissionGroup::Ally);
        matrix
    }

    pub fn allow(&mut self, perm: TownPermission, group: PermissionGroup) {
        self.allowed.insert((perm, group));
    }

    pub fn deny(&mut self, perm: TownPermission, group: PermissionGroup) {
        self.allowed.remove(&(perm, group));
    }

    pub fn allows(&self, perm: TownPermission, group: PermissionGroup) -> bool {
        self.allowed.contains(&(perm, group))
    }
}

impl Town {
    pub fn new(id: TownId, name: impl Into<String>, leader: ResidentId, home: TerritoryId) -> Self {
        let mut residents = AHashSet::new();
        residents.insert(leader);

        let mut claimed = AHashSet::new();
        claimed.insert(home);

        Self {
            id,
            name: name.into(),
            leader,
            officers: AHashSet::new(),
            residents,
            home,
            claimed,
            annexed: AHashSet::new(),
            outposts: AHashMap::new(),
            claim_power_max: 0.0,
            claims_used: 0,
            claims_penalty: 0.0,
            allies: AHashSet::new(),
            enemies: AHashSet::new(),
            nation: None,
            pending_nation_invite: None,
            applications: AHashMap::new(),
            permissions: PermissionMatrix::town_default(),
            income: AHashMap::new(),
            move_home_cooldown_ms: 0,
        }
    }

    pub fn role_of(&self, resident: ResidentId) -> Option<TownRole> {
        if !self.residents.contains(&resident) {
            return None;
        }
        if resident == self.leader {
            Some(TownRole::Leader)
        } else if self.officers.contains(&resident) {
            Some(TownRole::Officer)
        } else {
            Some(TownRole::Member)
        }
    }

    /// Leader and officers hold management rights
    pub fn is_officer(&self, resident: ResidentId) -> bool {
        resident == self.leader || self.officers.contains(&resident)
    }

    /// Claim power left for new claims: max - used - penalty.
    ///
    /// Negative after forced acquisitions push a town over budget.
    pub fn claim_power_available(&self) -> f32 {
        self.claim_power_max - self.claims_used as f32 - self.claims_penalty
    }

    /// Whether the town currently holds more claims than its power covers
    pub fn is_over_max_claims(&self) -> bool {
        (self.claims_used as f32 + self.claims_penalty) > self.claim_power_max
    }

    /// Add to an income ledger entry (opaque key)
    pub fn deposit_income(&mut self, key: impl Into<String>, amount: i64) {
        *self.income.entry(key.into()).or_insert(0) += amount;
    }
}
