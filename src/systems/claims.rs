//! Territory claiming and unclaiming
//!
//! A town's claimed territories always form one connected component of the
//! adjacency graph containing its home. The single exception is territory
//! acquired through annexation, which may sit as a disconnected exclave;
//! the disconnect check below therefore compares component counts instead
//! of demanding a single component.

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::core::error::{ClaimError, UnclaimError};
use crate::core::types::{Coord, ResidentId, TerritoryId, TownId};
use crate::entity::Territory;
use crate::events::Event;
use crate::spatial::SpatialIndex;
use crate::world::World;

/// Claim an unowned territory adjacent to the town's existing claims.
///
/// Atomic: either every effect applies (claim set, power, owner) or none.
pub fn claim(
    world: &mut World,
    town_id: TownId,
    territory_id: TerritoryId,
    requester: ResidentId,
) -> Result<(), ClaimError> {
    let town = world
        .towns
        .get(&town_id)
        .ok_or(ClaimError::UnknownTown(town_id))?;
    if !town.is_officer(requester) {
        return Err(ClaimError::NotOfficer);
    }

    let territory = world
        .territories
        .get(&territory_id)
        .ok_or(ClaimError::UnknownTerritory(territory_id))?;
    if territory.owner.is_some() {
        return Err(ClaimError::AlreadyClaimed);
    }

    // Founding claim (empty set) skips the adjacency requirement
    let adjacent = town.claimed.is_empty()
        || territory
            .neighbors
            .iter()
            .any(|n| town.claimed.contains(n));
    if !adjacent {
        return Err(ClaimError::NotAdjacent);
    }

    let cost = territory.cost;
    if town.claim_power_available() < cost as f32 {
        return Err(ClaimError::InsufficientPower);
    }

    let town = world.towns.get_mut(&town_id).expect("town validated above");
    town.claimed.insert(territory_id);
    town.claims_used += cost;
    world
        .territories
        .get_mut(&territory_id)
        .expect("territory validated above")
        .owner = Some(town_id);

    debug!(?town_id, ?territory_id, cost, "territory claimed");
    world.emit(Event::TerritoryClaimed {
        town: town_id,
        territory: territory_id,
    });
    Ok(())
}

/// Claim the territory containing a coordinate, via the spatial index
pub fn claim_at(
    world: &mut World,
    index: &dyn SpatialIndex,
    town_id: TownId,
    coord: Coord,
    requester: ResidentId,
) -> Result<TerritoryId, ClaimError> {
    let territory_id = index
        .territory_containing(coord)
        .ok_or(ClaimError::NoTerritoryHere)?;
    claim(world, town_id, territory_id, requester)?;
    Ok(territory_id)
}

/// Release an owned territory, returning its cost to the power budget.
///
/// The home territory can never be unclaimed, and removal must not split
/// the remaining claims into more components than before.
pub fn unclaim(
    world: &mut World,
    town_id: TownId,
    territory_id: TerritoryId,
    requester: ResidentId,
) -> Result<(), UnclaimError> {
    let town = world
        .towns
        .get(&town_id)
        .ok_or(UnclaimError::UnknownTown(town_id))?;
    if !town.is_officer(requester) {
        return Err(UnclaimError::NotOfficer);
    }

    let territory = world
        .territories
        .get(&territory_id)
        .ok_or(UnclaimError::UnknownTerritory(territory_id))?;
    if territory.owner != Some(town_id) {
        return Err(UnclaimError::NotOwned);
    }
    if territory.occupier.is_some() {
        return Err(UnclaimError::Occupied);
    }
    if territory_id == town.home {
        return Err(UnclaimError::IsHomeTerritory);
    }

    let before = component_count(&world.territories, &town.claimed);
    let mut remaining = town.claimed.clone();
    remaining.remove(&territory_id);
    if component_count(&world.territories, &remaining) > before {
        return Err(UnclaimError::WouldDisconnect);
    }

    let cost = territory.cost;
    let town = world.towns.get_mut(&town_id).expect("town validated above");
    town.claimed.remove(&territory_id);
    town.annexed.remove(&territory_id);
    town.claims_used = town.claims_used.saturating_sub(cost);
    town.outposts.retain(|_, t| *t != territory_id);
    world
        .territories
        .get_mut(&territory_id)
        .expect("territory validated above")
        .owner = None;

    debug!(?town_id, ?territory_id, cost, "territory unclaimed");
    world.emit(Event::TerritoryUnclaimed {
        town: town_id,
        territory: territory_id,
    });
    Ok(())
}

/// Number of connected components the given territory set forms under the
/// adjacency relation.
pub(crate) fn component_count(
    territories: &AHashMap<TerritoryId, Territory>,
    set: &AHashSet<TerritoryId>,
) -> usize {
    let mut unvisited: AHashSet<TerritoryId> = set.clone();
    let mut components = 0;

    while let Some(&start) = unvisited.iter().next() {
        components += 1;
        let mut frontier = vec![start];
        unvisited.remove(&start);

        while let Some(current) = frontier.pop() {
            let Some(territory) = territories.get(&current) else {
                continue;
            };
            for neighbor in &territory.neighbors {
                if unvisited.remove(neighbor) {
                    frontier.push(*neighbor);
                }
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_map(n: u32) -> AHashMap<TerritoryId, Territory> {
        // 0 - 1 - 2 - ... - (n-1)
        let mut map = AHashMap::new();
        for i in 0..n {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(TerritoryId(i - 1));
            }
            if i + 1 < n {
                neighbors.push(TerritoryId(i + 1));
            }
            map.insert(TerritoryId(i), Territory::new(TerritoryId(i), 1, neighbors));
        }
        map
    }

    #[test]
    fn test_component_count_connected_line() {
        let map = linear_map(4);
        let set: AHashSet<_> = (0..4).map(TerritoryId).collect();
        assert_eq!(component_count(&map, &set), 1);
    }

    #[test]
    fn test_component_count_with_gap() {
        let map = linear_map(5);
        // 0-1 and 3-4 with territory 2 missing
        let set: AHashSet<_> = [0, 1, 3, 4].into_iter().map(TerritoryId).collect();
        assert_eq!(component_count(&map, &set), 2);
    }

    #[test]
    fn test_component_count_empty() {
        let map = linear_map(3);
        assert_eq!(component_count(&map, &AHashSet::new()), 0);
    }
}
