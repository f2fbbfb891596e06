//! Occupation and annexation
//!
//! Occupation is a marker on the territory: ownership, connectivity, and
//! claim budgets are untouched, but the owner cannot release the territory
//! while it is held. Annexation transfers ownership outright and is the
//! only path to a disconnected exclave.

use tracing::info;

use crate::core::error::WarError;
use crate::core::types::{TerritoryId, TownId};
use crate::events::Event;
use crate::systems::diplomacy::{self, DiplomaticRelationship};
use crate::world::World;

/// Mark a territory as occupied by `occupier`, or lift the occupation
/// with `None`.
///
/// The occupier must be at war with the owner. Lifting never requires a
/// relationship check; peace treaties clear occupations regardless.
pub fn set_occupier(
    world: &mut World,
    territory_id: TerritoryId,
    occupier: Option<TownId>,
) -> Result<(), WarError> {
    let territory = world
        .territories
        .get(&territory_id)
        .ok_or(WarError::UnknownTerritory(territory_id))?;
    let owner = territory.owner.ok_or(WarError::Unowned)?;

    match occupier {
        Some(occupier_id) => {
            if !world.config.war_enabled {
                return Err(WarError::WarDisabled);
            }
            if world.town(occupier_id).is_none() {
                return Err(WarError::UnknownTown(occupier_id));
            }
            if occupier_id == owner {
                return Err(WarError::OwnTerritory);
            }
            if diplomacy::relationship(world, occupier_id, owner) != DiplomaticRelationship::Enemy {
                return Err(WarError::NotEnemy);
            }

            world
                .territories
                .get_mut(&territory_id)
                .expect("territory validated above")
                .occupier = Some(occupier_id);
            info!(?territory_id, ?occupier_id, "territory occupied");
            world.emit(Event::TerritoryOccupied {
                territory: territory_id,
                occupier: occupier_id,
            });
        }
        None => {
            let territory = world
                .territories
                .get_mut(&territory_id)
                .expect("territory validated above");
            if territory.occupier.take().is_some() {
                world.emit(Event::OccupationLifted {
                    territory: territory_id,
                });
            }
        }
    }
    Ok(())
}

/// Transfer an occupied enemy territory to the occupying town.
///
/// The annexed territory keeps no connectivity obligation on the new
/// owner's side; it joins the annexer's claims as an exclave and adds its
/// cost to the annexer's used claims. The home territory of a town can
/// only be taken once it is that town's last territory, which destroys
/// the town.
pub fn annex(
    world: &mut World,
    annexer_id: TownId,
    territory_id: TerritoryId,
) -> Result<(), WarError> {
    if !world.config.war_enabled {
        return Err(WarError::WarDisabled);
    }
    if !world.config.annexation_enabled {
        return Err(WarError::AnnexationDisabled);
    }
    if world.town(annexer_id).is_none() {
        return Err(WarError::UnknownTown(annexer_id));
    }

    let territory = world
        .territories
        .get(&territory_id)
        .ok_or(WarError::UnknownTerritory(territory_id))?;
    let owner_id = territory.owner.ok_or(WarError::Unowned)?;
    if owner_id == annexer_id {
        return Err(WarError::OwnTerritory);
    }
    // The occupation may predate a peace treaty or a nation change;
    // annexation requires the war to still be on.
    if diplomacy::relationship(world, annexer_id, owner_id) != DiplomaticRelationship::Enemy {
        return Err(WarError::NotEnemy);
    }
    if territory.occupier != Some(annexer_id) {
        return Err(WarError::NotOccupier);
    }
    let cost = territory.cost;

    let owner = world.town(owner_id).expect("owner indexed by territory");
    if world.config.war_blacklist.contains(&owner.name) {
        return Err(WarError::TownBlacklisted);
    }
    if world.config.war_whitelist_enabled && !world.config.war_whitelist.contains(&owner.name) {
        return Err(WarError::TownNotWhitelisted);
    }
    if territory_id == owner.home && owner.claimed.len() > 1 {
        return Err(WarError::HomeNotLast);
    }
    let owner_emptied = owner.claimed.len() == 1;

    let owner = world.towns.get_mut(&owner_id).expect("owner validated above");
    owner.claimed.remove(&territory_id);
    owner.annexed.remove(&territory_id);
    owner.claims_used = owner.claims_used.saturating_sub(cost);
    owner.outposts.retain(|_, t| *t != territory_id);

    let territory = world
        .territories
        .get_mut(&territory_id)
        .expect("territory validated above");
    territory.owner = Some(annexer_id);
    territory.occupier = None;

    let annexer = world
        .towns
        .get_mut(&annexer_id)
        .expect("annexer validated above");
    annexer.claimed.insert(territory_id);
    annexer.annexed.insert(territory_id);
    annexer.claims_used += cost;

    info!(?territory_id, from = ?owner_id, to = ?annexer_id, "territory annexed");
    world.emit(Event::TerritoryAnnexed {
        territory: territory_id,
        from: owner_id,
        to: annexer_id,
    });

    // Losing the last territory means losing the home, and a town cannot
    // exist without one.
    if owner_emptied {
        world.destroy_town(owner_id).ok();
    }
    Ok(())
}

/// Lift every occupation between the two sides. Runs when a peace treaty
/// ends their war.
pub(crate) fn clear_occupations_between(world: &mut World, a: TownId, b: TownId) {
    let mut lifted: Vec<TerritoryId> = world
        .territories
        .values()
        .filter(|territory| {
            let (Some(owner), Some(occupier)) = (territory.owner, territory.occupier) else {
                return false;
            };
            let owner_side = diplomacy::effective_town(world, owner);
            let occupier_side = diplomacy::effective_town(world, occupier);
            (owner_side == a && occupier_side == b) || (owner_side == b && occupier_side == a)
        })
        .map(|territory| territory.id)
        .collect();
    // Deterministic event order regardless of hash iteration
    lifted.sort();

    for territory_id in lifted {
        world
            .territories
            .get_mut(&territory_id)
            .expect("collected above")
            .occupier = None;
        info!(?territory_id, "occupation lifted by peace");
        world.emit(Event::OccupationLifted {
            territory: territory_id,
        });
    }
}
