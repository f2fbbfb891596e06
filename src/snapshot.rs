//! Full-state snapshots for persistence
//!
//! A snapshot is plain serde data: sorted vectors instead of hash maps so
//! exports are byte-stable, and no timer tokens (those are process-local
//! handles). On import the timer queue is rebuilt from the `expires_ms`
//! fields still present on pending invitations and applications, with
//! fresh tokens.

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{Millis, TownId, TownPair};
use crate::entity::{Nation, Resident, Territory, Town};
use crate::timer::DeferredAction;
use crate::world::{Offer, World};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub clock_ms: Millis,

    pub residents: Vec<Resident>,
    pub towns: Vec<Town>,
    pub nations: Vec<Nation>,
    pub territories: Vec<Territory>,

    pub truces: Vec<TruceEntry>,
    pub offers: Vec<OfferEntry>,

    pub next_town_id: u32,
    pub next_nation_id: u32,

    pub last_income_ms: Millis,
    pub last_backup_ms: Millis,
    pub last_over_max_ms: Millis,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TruceEntry {
    pub a: TownId,
    pub b: TownId,
    pub expires_ms: Millis,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OfferEntry {
    pub a: TownId,
    pub b: TownId,
    pub offer: Offer,
}

/// Export the world into a serializable snapshot.
pub fn export(world: &World) -> Snapshot {
    let mut residents: Vec<Resident> = world.residents.values().cloned().collect();
    residents.sort_by_key(|r| r.id);
    let mut towns: Vec<Town> = world.towns.values().cloned().collect();
    towns.sort_by_key(|t| t.id);
    let mut nations: Vec<Nation> = world.nations.values().cloned().collect();
    nations.sort_by_key(|n| n.id);
    let mut territories: Vec<Territory> = world.territories.values().cloned().collect();
    territories.sort_by_key(|t| t.id);

    let mut truces: Vec<TruceEntry> = world
        .truces
        .iter()
        .map(|(pair, expires_ms)| TruceEntry {
            a: pair.0,
            b: pair.1,
            expires_ms: *expires_ms,
        })
        .collect();
    truces.sort_by_key(|entry| (entry.a, entry.b));

    let mut offers: Vec<OfferEntry> = world
        .offers
        .iter()
        .map(|(pair, offer)| OfferEntry {
            a: pair.0,
            b: pair.1,
            offer: *offer,
        })
        .collect();
    offers.sort_by_key(|entry| (entry.a, entry.b));

    Snapshot {
        clock_ms: world.clock_ms,
        residents,
        towns,
        nations,
        territories,
        truces,
        offers,
        next_town_id: world.next_town_id,
        next_nation_id: world.next_nation_id,
        last_income_ms: world.last_income_ms,
        last_backup_ms: world.last_backup_ms,
        last_over_max_ms: world.last_over_max_ms,
    }
}

/// Rebuild a world from a snapshot.
///
/// Name indexes and the timer queue are derived state and are
/// reconstructed here rather than stored.
pub fn import(snapshot: Snapshot, config: EngineConfig) -> World {
    let mut world = World::new(config);
    world.clock_ms = snapshot.clock_ms;
    world.next_town_id = snapshot.next_town_id;
    world.next_nation_id = snapshot.next_nation_id;
    world.last_income_ms = snapshot.last_income_ms;
    world.last_backup_ms = snapshot.last_backup_ms;
    world.last_over_max_ms = snapshot.last_over_max_ms;

    for territory in snapshot.territories {
        world.territories.insert(territory.id, territory);
    }

    for mut resident in snapshot.residents {
        if let Some(invite) = &mut resident.pending_invite {
            invite.timer = world.timers.schedule(
                invite.expires_ms,
                DeferredAction::TownInviteExpiry {
                    resident: resident.id,
                },
            );
        }
        world.residents.insert(resident.id, resident);
    }

    for mut town in snapshot.towns {
        if let Some(invite) = &mut town.pending_nation_invite {
            invite.timer = world.timers.schedule(
                invite.expires_ms,
                DeferredAction::NationInviteExpiry { town: town.id },
            );
        }
        for (resident_id, application) in town.applications.iter_mut() {
            application.timer = world.timers.schedule(
                application.expires_ms,
                DeferredAction::ApplicationExpiry {
                    town: town.id,
                    resident: *resident_id,
                },
            );
        }
        world.town_names.insert(town.name.to_lowercase(), town.id);
        world.towns.insert(town.id, town);
    }

    for nation in snapshot.nations {
        world
            .nation_names
            .insert(nation.name.to_lowercase(), nation.id);
        world.nations.insert(nation.id, nation);
    }

    for entry in snapshot.truces {
        world
            .truces
            .insert(TownPair::new(entry.a, entry.b), entry.expires_ms);
    }
    for entry in snapshot.offers {
        world
            .offers
            .insert(TownPair::new(entry.a, entry.b), entry.offer);
    }

    world
}
