//! Diplomacy engine
//!
//! Relationships are never stored; they are recomputed from ally/enemy
//! sets and nation membership on every query. Nation-level diplomacy is
//! always enacted through the nation's capital town, so every transition
//! here first resolves both sides to their effective town.
//!
//! Peace and alliance are two-party negotiations: the first call records
//! an open offer, the matching call from the other side finalizes it.

use tracing::info;

use crate::core::error::DiplomacyError;
use crate::core::types::{ResidentId, TownId, TownPair};
use crate::entity::town::{PermissionGroup, TownPermission};
use crate::events::Event;
use crate::world::{Offer, OfferKind, World};

/// Derived relationship between two towns. Computed, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiplomaticRelationship {
    /// Same town
    Town,
    /// Same nation
    Nation,
    Ally,
    Enemy,
    Neutral,
}

/// Four-way pair status for diplomacy-facing checks: exactly one holds
/// for any distinct pair. Same-town and same-nation pairs report Neutral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairStatus {
    Neutral,
    Ally,
    Enemy,
    Truce,
}

/// The town that actually carries diplomacy for `town`: its nation's
/// capital when it has one, otherwise itself.
pub fn effective_town(world: &World, town: TownId) -> TownId {
    world
        .town(town)
        .and_then(|t| t.nation)
        .and_then(|n| world.nation(n))
        .map(|n| n.capital)
        .unwrap_or(town)
}

/// Compute the relationship between two towns.
///
/// Symmetric by construction: ally/enemy sets are maintained pairwise on
/// the effective towns.
pub fn relationship(world: &World, a: TownId, b: TownId) -> DiplomaticRelationship {
    if a == b {
        return DiplomaticRelationship::Town;
    }

    let (Some(town_a), Some(town_b)) = (world.town(a), world.town(b)) else {
        return DiplomaticRelationship::Neutral;
    };
    if town_a.nation.is_some() && town_a.nation == town_b.nation {
        return DiplomaticRelationship::Nation;
    }

    let ea = effective_town(world, a);
    let eb = effective_town(world, b);
    if ea == eb {
        return DiplomaticRelationship::Nation;
    }

    let Some(effective_a) = world.town(ea) else {
        return DiplomaticRelationship::Neutral;
    };
    if effective_a.enemies.contains(&eb) {
        DiplomaticRelationship::Enemy
    } else if effective_a.allies.contains(&eb) {
        DiplomaticRelationship::Ally
    } else {
        DiplomaticRelationship::Neutral
    }
}

/// Exactly one of Neutral/Ally/Enemy/Truce for a pair
pub fn pair_status(world: &World, a: TownId, b: TownId) -> PairStatus {
    let ea = effective_town(world, a);
    let eb = effective_town(world, b);
    if world.has_truce(ea, eb) {
        return PairStatus::Truce;
    }
    match relationship(world, a, b) {
        DiplomaticRelationship::Ally => PairStatus::Ally,
        DiplomaticRelationship::Enemy => PairStatus::Enemy,
        _ => PairStatus::Neutral,
    }
}

/// Permission group a resident falls into from `town`'s point of view.
///
/// Members resolve to Town (Trusted with the trust flag); everyone else is
/// classified by the relationship between their town and `town`. Townless
/// residents and enemies are outsiders.
pub fn visitor_group(world: &World, resident: ResidentId, town: TownId) -> PermissionGroup {
    let Some(visitor) = world.resident(resident) else {
        return PermissionGroup::Outsider;
    };
    match visitor.town {
        Some(own) if own == town => {
            if visitor.trusted {
                PermissionGroup::Trusted
            } else {
                PermissionGroup::Town
            }
        }
        Some(own) => match relationship(world, own, town) {
            DiplomaticRelationship::Nation => PermissionGroup::Nation,
            DiplomaticRelationship::Ally => PermissionGroup::Ally,
            _ => PermissionGroup::Outsider,
        },
        None => PermissionGroup::Outsider,
    }
}

/// Whether a resident may perform `perm` inside `town`'s territory,
/// per that town's permission matrix.
pub fn visitor_allowed(
    world: &World,
    resident: ResidentId,
    town: TownId,
    perm: TownPermission,
) -> bool {
    let group = visitor_group(world, resident, town);
    world
        .town(town)
        .is_some_and(|t| t.permissions.allows(perm, group))
}

/// Resolve both sides to effective towns and validate they are distinct
/// existing towns outside a shared nation.
fn resolve_pair(world: &World, a: TownId, b: TownId) -> Result<(TownId, TownId), DiplomacyError> {
    if world.town(a).is_none() {
        return Err(DiplomacyError::UnknownTown(a));
    }
    if world.town(b).is_none() {
        return Err(DiplomacyError::UnknownTown(b));
    }
    if a == b {
        return Err(DiplomacyError::SameTown);
    }

    let ea = effective_town(world, a);
    let eb = effective_town(world, b);
    if ea == eb {
        return Err(DiplomacyError::SameNation);
    }
    Ok((ea, eb))
}

/// Declare war: both effective towns become enemies of each other.
pub fn declare_war(world: &mut World, a: TownId, b: TownId) -> Result<(), DiplomacyError> {
    if !world.config.war_enabled {
        return Err(DiplomacyError::WarDisabled);
    }
    let (ea, eb) = resolve_pair(world, a, b)?;

    match relationship(world, ea, eb) {
        DiplomaticRelationship::Enemy => return Err(DiplomacyError::AlreadyEnemies),
        DiplomaticRelationship::Ally => return Err(DiplomacyError::AllyOrTruce),
        _ => {}
    }
    if world.has_truce(ea, eb) {
        return Err(DiplomacyError::AllyOrTruce);
    }

    world
        .towns
        .get_mut(&ea)
        .expect("resolved above")
        .enemies
        .insert(eb);
    world
        .towns
        .get_mut(&eb)
        .expect("resolved above")
        .enemies
        .insert(ea);
    // A declaration wipes any open negotiation between the pair
    world.offers.remove(&TownPair::new(ea, eb));

    info!(attacker = ?ea, defender = ?eb, "war declared");
    world.emit(Event::WarDeclared {
        attacker: ea,
        defender: eb,
    });
    Ok(())
}

/// Offer peace, or accept an open peace offer from the other side.
///
/// Acceptance reverts the pair to neutral and opens a truce so war cannot
/// be redeclared immediately.
pub fn offer_peace(world: &mut World, a: TownId, b: TownId) -> Result<(), DiplomacyError> {
    let (ea, eb) = resolve_pair(world, a, b)?;
    if relationship(world, ea, eb) != DiplomaticRelationship::Enemy {
        return Err(DiplomacyError::NotEnemies);
    }

    let pair = TownPair::new(ea, eb);
    match world.offers.get(&pair).copied() {
        Some(offer) if offer.kind == OfferKind::Peace && offer.proposer != ea => {
            world.offers.remove(&pair);
            world
                .towns
                .get_mut(&ea)
                .expect("resolved above")
                .enemies
                .remove(&eb);
            world
                .towns
                .get_mut(&eb)
                .expect("resolved above")
                .enemies
                .remove(&ea);
            crate::systems::war::clear_occupations_between(world, ea, eb);
            start_truce(world, ea, eb);

            info!(?ea, ?eb, "peace accepted");
            world.emit(Event::PeaceAccepted { a: ea, b: eb });
        }
        Some(_) => return Err(DiplomacyError::AlreadyProposed),
        None => {
            world.offers.insert(
                pair,
                Offer {
                    kind: OfferKind::Peace,
                    proposer: ea,
                    opened_ms: world.clock_ms,
                },
            );
            world.emit(Event::PeaceOffered { from: ea, to: eb });
        }
    }
    Ok(())
}

/// Offer an alliance, or accept an open offer from the other side.
pub fn offer_alliance(world: &mut World, a: TownId, b: TownId) -> Result<(), DiplomacyError> {
    let (ea, eb) = resolve_pair(world, a, b)?;

    match relationship(world, ea, eb) {
        DiplomaticRelationship::Enemy => return Err(DiplomacyError::AlreadyEnemies),
        DiplomaticRelationship::Ally => return Err(DiplomacyError::AlreadyAllies),
        _ => {}
    }
    if world.has_truce(ea, eb) {
        return Err(DiplomacyError::AlreadyTruce);
    }

    let pair = TownPair::new(ea, eb);
    match world.offers.get(&pair).copied() {
        Some(offer) if offer.kind == OfferKind::Alliance && offer.proposer != ea => {
            world.offers.remove(&pair);
            world
                .towns
                .get_mut(&ea)
                .expect("resolved above")
                .allies
                .insert(eb);
            world
                .towns
                .get_mut(&eb)
                .expect("resolved above")
                .allies
                .insert(ea);

            info!(?ea, ?eb, "alliance formed");
            world.emit(Event::AllianceFormed { a: ea, b: eb });
        }
        Some(_) => return Err(DiplomacyError::AlreadyProposed),
        None => {
            world.offers.insert(
                pair,
                Offer {
                    kind: OfferKind::Alliance,
                    proposer: ea,
                    opened_ms: world.clock_ms,
                },
            );
            world.emit(Event::AllianceOffered { from: ea, to: eb });
        }
    }
    Ok(())
}

/// Break an alliance. Immediately opens a truce between the pair so war
/// cannot follow the breakup instantly.
pub fn break_alliance(world: &mut World, a: TownId, b: TownId) -> Result<(), DiplomacyError> {
    let (ea, eb) = resolve_pair(world, a, b)?;
    if relationship(world, ea, eb) != DiplomaticRelationship::Ally {
        return Err(DiplomacyError::NotAllies);
    }

    world
        .towns
        .get_mut(&ea)
        .expect("resolved above")
        .allies
        .remove(&eb);
    world
        .towns
        .get_mut(&eb)
        .expect("resolved above")
        .allies
        .remove(&ea);
    world.offers.remove(&TownPair::new(ea, eb));
    start_truce(world, ea, eb);

    info!(?ea, ?eb, "alliance broken");
    world.emit(Event::AllianceBroken { a: ea, b: eb });
    Ok(())
}

/// Open a truce between two towns for the configured duration.
pub fn declare_truce(world: &mut World, a: TownId, b: TownId) -> Result<(), DiplomacyError> {
    let (ea, eb) = resolve_pair(world, a, b)?;
    if world.has_truce(ea, eb) {
        return Err(DiplomacyError::AlreadyTruce);
    }
    start_truce(world, ea, eb);
    Ok(())
}

fn start_truce(world: &mut World, a: TownId, b: TownId) {
    let expires_ms = world.clock_ms + world.config.truce_duration_ms;
    world.truces.insert(TownPair::new(a, b), expires_ms);
    world.emit(Event::TruceStarted { a, b, expires_ms });
}

/// Tick phase: remove truces past expiry, reverting each pair to neutral.
pub(crate) fn expire_truces(world: &mut World) {
    let now = world.clock_ms;
    let mut expired: Vec<TownPair> = world
        .truces
        .iter()
        .filter(|(_, expiry)| **expiry <= now)
        .map(|(pair, _)| *pair)
        .collect();
    // Deterministic event order regardless of hash iteration
    expired.sort();

    for pair in expired {
        world.truces.remove(&pair);
        world.emit(Event::TruceExpired {
            a: pair.0,
            b: pair.1,
        });
    }
}
