//! Town and nation lifecycle integration tests

use demesne::core::error::{NationError, TownError};
use demesne::core::types::{ResidentId, TerritoryId, TownId, TownRole};
use demesne::entity::Territory;
use demesne::events::Event;
use demesne::{EngineConfig, World};

fn world_with_territories(n: u32) -> World {
    let mut world = World::new(EngineConfig::default());
    for i in 0..n {
        world.add_territory(Territory::new(TerritoryId(i), 1, vec![]));
    }
    world
}

fn resident(world: &mut World, name: &str) -> ResidentId {
    let id = ResidentId::new();
    world.create_resident(id, name);
    id
}

fn town(world: &mut World, name: &str, home: u32) -> (TownId, ResidentId) {
    let leader = resident(world, &format!("{name} leader"));
    let id = world.create_town(name, leader, TerritoryId(home)).unwrap();
    (id, leader)
}

#[test]
fn test_town_names_are_unique_case_insensitive() {
    let mut world = world_with_territories(2);
    let (_, _) = town(&mut world, "Rivermill", 0);

    let other = resident(&mut world, "Bob");
    assert!(matches!(
        world.create_town("RIVERMILL", other, TerritoryId(1)),
        Err(TownError::NameTaken(_))
    ));
    assert!(world.town_by_name("rivermill").is_some());
}

#[test]
fn test_resident_belongs_to_at_most_one_town() {
    let mut world = world_with_territories(2);
    let (a, leader_a) = town(&mut world, "Rivermill", 0);
    let (_b, leader_b) = town(&mut world, "Ashford", 1);

    assert_eq!(
        world.invite_to_town(a, leader_a, leader_b),
        Err(TownError::ResidentHasTown)
    );

    let bob = resident(&mut world, "Bob");
    world.invite_to_town(a, leader_a, bob).unwrap();
    world.accept_invite(bob).unwrap();
    assert_eq!(world.resident(bob).unwrap().town, Some(a));
    assert_eq!(world.town(a).unwrap().role_of(bob), Some(TownRole::Member));
}

#[test]
fn test_accepting_invite_withdraws_applications() {
    let mut world = world_with_territories(2);
    let (a, leader_a) = town(&mut world, "Rivermill", 0);
    let (b, _) = town(&mut world, "Ashford", 1);

    let bob = resident(&mut world, "Bob");
    world.apply_to_town(bob, b).unwrap();
    world.invite_to_town(a, leader_a, bob).unwrap();
    world.accept_invite(bob).unwrap();

    assert!(!world.town(b).unwrap().applications.contains_key(&bob));
}

#[test]
fn test_leader_must_transfer_before_leaving() {
    let mut world = world_with_territories(1);
    let (a, leader) = town(&mut world, "Rivermill", 0);
    let bob = resident(&mut world, "Bob");
    world.invite_to_town(a, leader, bob).unwrap();
    world.accept_invite(bob).unwrap();

    assert_eq!(world.leave_town(leader), Err(TownError::LeaderMustTransfer));

    world.transfer_leadership(a, leader, bob).unwrap();
    world.leave_town(leader).unwrap();
    assert_eq!(world.town(a).unwrap().leader, bob);
    assert!(world.resident(leader).unwrap().town.is_none());
}

#[test]
fn test_sole_leader_leaving_dissolves_town() {
    let mut world = world_with_territories(1);
    let (a, leader) = town(&mut world, "Rivermill", 0);

    world.leave_town(leader).unwrap();
    assert!(world.town(a).is_none());
    assert!(world.territory(TerritoryId(0)).unwrap().owner.is_none());
    assert!(world
        .events
        .contains(|e| matches!(e, Event::TownDestroyed { .. })));
}

#[test]
fn test_officer_promotion_and_kick() {
    let mut world = world_with_territories(1);
    let (a, leader) = town(&mut world, "Rivermill", 0);
    let bob = resident(&mut world, "Bob");
    let carol = resident(&mut world, "Carol");
    world.invite_to_town(a, leader, bob).unwrap();
    world.accept_invite(bob).unwrap();
    world.invite_to_town(a, leader, carol).unwrap();
    world.accept_invite(carol).unwrap();

    // Only the leader promotes
    assert_eq!(world.add_officer(a, bob, carol), Err(TownError::NotLeader));
    world.add_officer(a, leader, bob).unwrap();
    assert_eq!(world.town(a).unwrap().role_of(bob), Some(TownRole::Officer));

    // Officers can kick members but not the leader
    world.kick_resident(a, bob, carol).unwrap();
    assert!(world.resident(carol).unwrap().town.is_none());
    assert_eq!(world.kick_resident(a, bob, leader), Err(TownError::NotLeader));
}

#[test]
fn test_move_home_respects_cooldown() {
    let mut world = World::new(EngineConfig::default());
    world.add_territory(Territory::new(TerritoryId(0), 1, vec![TerritoryId(1)]));
    world.add_territory(Territory::new(TerritoryId(1), 1, vec![TerritoryId(0)]));
    let (a, leader) = town(&mut world, "Rivermill", 0);
    demesne::systems::claims::claim(&mut world, a, TerritoryId(1), leader).unwrap();

    world.move_home(a, leader, TerritoryId(1)).unwrap();
    assert_eq!(world.town(a).unwrap().home, TerritoryId(1));
    assert_eq!(
        world.move_home(a, leader, TerritoryId(0)),
        Err(TownError::MoveHomeCooldown)
    );
}

#[test]
fn test_outposts_never_sit_on_home() {
    let mut world = World::new(EngineConfig::default());
    world.add_territory(Territory::new(TerritoryId(0), 1, vec![TerritoryId(1)]));
    world.add_territory(Territory::new(TerritoryId(1), 1, vec![TerritoryId(0)]));
    let (a, leader) = town(&mut world, "Rivermill", 0);
    demesne::systems::claims::claim(&mut world, a, TerritoryId(1), leader).unwrap();

    assert_eq!(
        world.create_outpost(a, leader, "mine", TerritoryId(0)),
        Err(TownError::OutpostOnHome)
    );
    world.create_outpost(a, leader, "mine", TerritoryId(1)).unwrap();

    // Moving the home onto the outpost clears it
    world.move_home(a, leader, TerritoryId(1)).unwrap();
    assert!(world.town(a).unwrap().outposts.is_empty());
}

#[test]
fn test_income_ledger_withdrawals() {
    let mut world = world_with_territories(1);
    let (a, leader) = town(&mut world, "Rivermill", 0);

    assert_eq!(
        world.withdraw_income(a, leader, "gold", 1),
        Err(TownError::InsufficientFunds("gold".to_string()))
    );
}

#[test]
fn test_nation_lifecycle() {
    let mut world = world_with_territories(3);
    let (a, leader_a) = town(&mut world, "Rivermill", 0);
    let (b, _) = town(&mut world, "Ashford", 1);
    let (c, _) = town(&mut world, "Thornvale", 2);

    let nation = world.create_nation("Realm", a).unwrap();
    assert_eq!(world.nation(nation).unwrap().capital, a);

    world.invite_to_nation(nation, leader_a, b).unwrap();
    world.accept_nation_invite(b).unwrap();
    assert_eq!(world.town(b).unwrap().nation, Some(nation));

    // A member town cannot found or join another nation
    assert_eq!(
        world.create_nation("Second Realm", b),
        Err(NationError::TownHasNation)
    );

    world.invite_to_nation(nation, leader_a, c).unwrap();
    world.accept_nation_invite(c).unwrap();

    // Ordinary member detaches cleanly
    world.leave_nation(b).unwrap();
    assert!(world.town(b).unwrap().nation.is_none());
    assert!(world.nation(nation).unwrap().is_member(c));

    // Capital leaving dissolves the whole nation
    world.leave_nation(a).unwrap();
    assert!(world.nation(nation).is_none());
    assert!(world.town(c).unwrap().nation.is_none());
    assert!(world
        .events
        .contains(|e| matches!(e, Event::NationDeleted { .. })));
}

#[test]
fn test_capital_destroyed_promotes_lowest_member() {
    let mut world = world_with_territories(3);
    let (a, leader_a) = town(&mut world, "Rivermill", 0);
    let (b, _) = town(&mut world, "Ashford", 1);
    let (c, _) = town(&mut world, "Thornvale", 2);

    let nation = world.create_nation("Realm", a).unwrap();
    world.invite_to_nation(nation, leader_a, b).unwrap();
    world.accept_nation_invite(b).unwrap();
    world.invite_to_nation(nation, leader_a, c).unwrap();
    world.accept_nation_invite(c).unwrap();

    world.destroy_town(a).unwrap();
    let nation = world.nation(nation).unwrap();
    assert_eq!(nation.capital, b.min(c));
    assert!(!nation.is_member(a));
}
