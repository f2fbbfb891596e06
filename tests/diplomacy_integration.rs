//! Diplomacy engine integration tests

use demesne::core::error::DiplomacyError;
use demesne::core::types::{ResidentId, TerritoryId, TownId};
use demesne::entity::town::{PermissionGroup, TownPermission};
use demesne::entity::Territory;
use demesne::events::Event;
use demesne::systems::diplomacy::{self, DiplomaticRelationship, PairStatus};
use demesne::world::{NoHooks, OfferKind};
use demesne::{EngineConfig, World};

fn war_config() -> EngineConfig {
    EngineConfig {
        war_enabled: true,
        ..EngineConfig::default()
    }
}

/// World with isolated single-territory towns A, B, C
fn three_towns(config: EngineConfig) -> (World, TownId, TownId, TownId) {
    let mut world = World::new(config);
    for i in 0..3 {
        world.add_territory(Territory::new(TerritoryId(i), 1, vec![]));
    }
    let mut towns = Vec::new();
    for (i, name) in ["Rivermill", "Ashford", "Thornvale"].iter().enumerate() {
        let leader = ResidentId::new();
        world.create_resident(leader, *name);
        towns.push(world.create_town(name, leader, TerritoryId(i as u32)).unwrap());
    }
    (world, towns[0], towns[1], towns[2])
}

#[test]
fn test_war_declaration_is_symmetric() {
    let (mut world, a, b, c) = three_towns(war_config());

    diplomacy::declare_war(&mut world, a, b).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Enemy
    );
    assert_eq!(
        diplomacy::relationship(&world, b, a),
        DiplomaticRelationship::Enemy
    );
    // No transitive war
    assert_eq!(
        diplomacy::relationship(&world, a, c),
        DiplomaticRelationship::Neutral
    );

    assert_eq!(
        diplomacy::declare_war(&mut world, b, a),
        Err(DiplomacyError::AlreadyEnemies)
    );
}

#[test]
fn test_war_does_not_spread_to_defender_allies() {
    let (mut world, a, b, c) = three_towns(war_config());
    diplomacy::offer_alliance(&mut world, b, c).unwrap();
    diplomacy::offer_alliance(&mut world, c, b).unwrap();

    diplomacy::declare_war(&mut world, a, b).unwrap();

    // The defender's ally is untouched: still neutral toward the
    // attacker, alliance intact
    assert_eq!(
        diplomacy::relationship(&world, a, c),
        DiplomaticRelationship::Neutral
    );
    assert_eq!(diplomacy::pair_status(&world, a, c), PairStatus::Neutral);
    let ally = world.town(c).unwrap();
    assert!(ally.enemies.is_empty());
    assert!(ally.allies.contains(&b));
}

#[test]
fn test_war_respects_master_switch() {
    let (mut world, a, b, _) = three_towns(EngineConfig::default());
    assert_eq!(
        diplomacy::declare_war(&mut world, a, b),
        Err(DiplomacyError::WarDisabled)
    );
}

#[test]
fn test_war_blocked_by_alliance_and_truce() {
    let (mut world, a, b, c) = three_towns(war_config());

    diplomacy::offer_alliance(&mut world, a, b).unwrap();
    diplomacy::offer_alliance(&mut world, b, a).unwrap();
    assert_eq!(
        diplomacy::declare_war(&mut world, a, b),
        Err(DiplomacyError::AllyOrTruce)
    );

    diplomacy::declare_truce(&mut world, a, c).unwrap();
    assert_eq!(
        diplomacy::declare_war(&mut world, a, c),
        Err(DiplomacyError::AllyOrTruce)
    );
}

#[test]
fn test_alliance_requires_both_sides() {
    let (mut world, a, b, _) = three_towns(war_config());

    diplomacy::offer_alliance(&mut world, a, b).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Neutral
    );
    assert_eq!(world.open_offer(a, b).unwrap().kind, OfferKind::Alliance);

    // Repeating from the same side is rejected
    assert_eq!(
        diplomacy::offer_alliance(&mut world, a, b),
        Err(DiplomacyError::AlreadyProposed)
    );

    diplomacy::offer_alliance(&mut world, b, a).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Ally
    );
    assert!(world.open_offer(a, b).is_none());
}

#[test]
fn test_peace_requires_both_sides_and_opens_truce() {
    let (mut world, a, b, _) = three_towns(war_config());
    diplomacy::declare_war(&mut world, a, b).unwrap();

    diplomacy::offer_peace(&mut world, a, b).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Enemy
    );

    diplomacy::offer_peace(&mut world, b, a).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Neutral
    );
    assert_eq!(diplomacy::pair_status(&world, a, b), PairStatus::Truce);
    assert!(world
        .events
        .contains(|e| matches!(e, Event::PeaceAccepted { .. })));

    // The truce now blocks an immediate redeclaration
    assert_eq!(
        diplomacy::declare_war(&mut world, a, b),
        Err(DiplomacyError::AllyOrTruce)
    );
}

#[test]
fn test_break_alliance_opens_truce() {
    let (mut world, a, b, _) = three_towns(war_config());
    diplomacy::offer_alliance(&mut world, a, b).unwrap();
    diplomacy::offer_alliance(&mut world, b, a).unwrap();

    diplomacy::break_alliance(&mut world, a, b).unwrap();
    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Neutral
    );
    assert_eq!(diplomacy::pair_status(&world, a, b), PairStatus::Truce);

    assert_eq!(
        diplomacy::break_alliance(&mut world, a, b),
        Err(DiplomacyError::NotAllies)
    );
}

#[test]
fn test_truce_expires_through_ticks() {
    let config = EngineConfig {
        war_enabled: true,
        truce_duration_ms: 10_000,
        ..EngineConfig::default()
    };
    let (mut world, a, b, _) = three_towns(config);
    diplomacy::declare_truce(&mut world, a, b).unwrap();

    let mut hooks = NoHooks;
    world.tick(9_999, &mut hooks);
    assert!(world.has_truce(a, b));

    world.tick(1, &mut hooks);
    assert!(!world.has_truce(a, b));
    assert!(world
        .events
        .contains(|e| matches!(e, Event::TruceExpired { .. })));

    // Pair is back to neutral and war is possible again
    diplomacy::declare_war(&mut world, a, b).unwrap();
}

#[test]
fn test_nation_diplomacy_proxies_through_capital() {
    let (mut world, a, b, c) = three_towns(war_config());

    // a is capital, b a member
    let nation = world.create_nation("Realm", a).unwrap();
    let capital_leader = world.town(a).unwrap().leader;
    world.invite_to_nation(nation, capital_leader, b).unwrap();
    world.accept_nation_invite(b).unwrap();

    assert_eq!(
        diplomacy::relationship(&world, a, b),
        DiplomaticRelationship::Nation
    );
    assert_eq!(
        diplomacy::declare_war(&mut world, a, b),
        Err(DiplomacyError::SameNation)
    );

    // Declaring through the member lands on the capital's sets
    diplomacy::declare_war(&mut world, b, c).unwrap();
    assert!(world.town(a).unwrap().enemies.contains(&c));
    assert!(world.town(b).unwrap().enemies.is_empty());
    assert_eq!(
        diplomacy::relationship(&world, b, c),
        DiplomaticRelationship::Enemy
    );
}

#[test]
fn test_visitor_groups_follow_relationships() {
    let (mut world, a, b, c) = three_towns(war_config());
    let a_leader = world.town(a).unwrap().leader;
    let b_leader = world.town(b).unwrap().leader;
    let c_leader = world.town(c).unwrap().leader;

    // Members resolve to Town, trusted members to Trusted; both keep
    // full rights under the default matrix
    assert_eq!(
        diplomacy::visitor_group(&world, a_leader, a),
        PermissionGroup::Town
    );
    world.set_trusted(a, a_leader, a_leader, true).unwrap();
    assert_eq!(
        diplomacy::visitor_group(&world, a_leader, a),
        PermissionGroup::Trusted
    );
    assert!(diplomacy::visitor_allowed(
        &world,
        a_leader,
        a,
        TownPermission::Build
    ));

    // Allies may interact but not build
    diplomacy::offer_alliance(&mut world, a, b).unwrap();
    diplomacy::offer_alliance(&mut world, b, a).unwrap();
    assert_eq!(
        diplomacy::visitor_group(&world, b_leader, a),
        PermissionGroup::Ally
    );
    assert!(diplomacy::visitor_allowed(
        &world,
        b_leader,
        a,
        TownPermission::Interact
    ));
    assert!(!diplomacy::visitor_allowed(
        &world,
        b_leader,
        a,
        TownPermission::Build
    ));

    // Unrelated towns and townless residents are outsiders
    assert_eq!(
        diplomacy::visitor_group(&world, c_leader, a),
        PermissionGroup::Outsider
    );
    let stranger = ResidentId::new();
    world.create_resident(stranger, "Stranger");
    assert_eq!(
        diplomacy::visitor_group(&world, stranger, a),
        PermissionGroup::Outsider
    );
    assert!(!diplomacy::visitor_allowed(
        &world,
        stranger,
        a,
        TownPermission::Interact
    ));

    // Shared nation resolves to Nation
    let nation = world.create_nation("Realm", a).unwrap();
    world.invite_to_nation(nation, a_leader, c).unwrap();
    world.accept_nation_invite(c).unwrap();
    assert_eq!(
        diplomacy::visitor_group(&world, c_leader, a),
        PermissionGroup::Nation
    );
    assert!(diplomacy::visitor_allowed(
        &world,
        c_leader,
        a,
        TownPermission::Interact
    ));
}

#[test]
fn test_member_leaving_keeps_only_own_relationships() {
    let (mut world, a, b, c) = three_towns(war_config());
    let nation = world.create_nation("Realm", a).unwrap();
    let capital_leader = world.town(a).unwrap().leader;
    world.invite_to_nation(nation, capital_leader, b).unwrap();
    world.accept_nation_invite(b).unwrap();

    diplomacy::declare_war(&mut world, b, c).unwrap();
    world.leave_nation(b).unwrap();

    // The war lived on the capital; the departed member reverts to neutral
    assert_eq!(
        diplomacy::relationship(&world, a, c),
        DiplomaticRelationship::Enemy
    );
    assert_eq!(
        diplomacy::relationship(&world, b, c),
        DiplomaticRelationship::Neutral
    );
}
