//! Scripted world simulation
//!
//! Generates a random territory grid, founds a handful of towns, walks them
//! through claims, nation-building, and a short war, then prints the event
//! log. Useful for eyeballing engine behavior end to end.

use clap::Parser;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use demesne::core::types::{Coord, ResidentId, TerritoryId};
use demesne::entity::Territory;
use demesne::spatial::GridIndex;
use demesne::systems::{claims, diplomacy, war};
use demesne::world::NoHooks;
use demesne::{EngineConfig, World};

/// Run a scripted simulation against a generated map
#[derive(Parser, Debug)]
#[command(name = "worldsim")]
#[command(about = "Scripted territorial simulation for inspecting engine behavior")]
struct Args {
    /// Random seed for reproducible maps
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Grid side length (map has side*side territories)
    #[arg(long, default_value_t = 8)]
    side: u32,

    /// Number of ticks to run after the scripted phase
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 60_000)]
    tick_ms: u64,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demesne=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    // The scripted phase exercises war regardless of the default, and
    // needs enough base power to cover the generated claim costs
    config.war_enabled = true;
    config.claim_power_base = config.claim_power_base.max(12.0);
    config.validate()?;

    let mut world = World::new(config);
    let index = generate_grid(&mut world, args.side, args.seed);

    run_script(&mut world, &index)?;

    let mut hooks = NoHooks;
    for _ in 0..args.ticks {
        world.tick(args.tick_ms, &mut hooks);
    }

    println!("=== Event log ===");
    for record in world.events.iter() {
        println!(
            "{:>4}  t={:>10}ms  {:?}",
            record.id, record.at_ms, record.event
        );
    }
    println!();
    println!(
        "{} towns, {} nations, clock {}ms",
        world.town_count(),
        world.nations().count(),
        world.clock_ms
    );
    Ok(())
}

/// Build a side x side grid of territories with randomized costs and
/// 4-neighbor adjacency, registering each cell in the spatial index.
fn generate_grid(world: &mut World, side: u32, seed: u64) -> GridIndex {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut index = GridIndex::new();

    let id_at = |x: u32, z: u32| TerritoryId(z * side + x);
    for z in 0..side {
        for x in 0..side {
            let mut neighbors = Vec::new();
            if x > 0 {
                neighbors.push(id_at(x - 1, z));
            }
            if x + 1 < side {
                neighbors.push(id_at(x + 1, z));
            }
            if z > 0 {
                neighbors.push(id_at(x, z - 1));
            }
            if z + 1 < side {
                neighbors.push(id_at(x, z + 1));
            }
            let cost = rng.gen_range(1..=3);
            world.add_territory(Territory::new(id_at(x, z), cost, neighbors));
            index.assign(Coord::new(x as i32, z as i32), id_at(x, z));
        }
    }
    index
}

fn run_script(world: &mut World, index: &GridIndex) -> Result<(), Box<dyn std::error::Error>> {
    let alice = ResidentId::new();
    let bob = ResidentId::new();
    let carol = ResidentId::new();
    world.create_resident(alice, "Alice");
    world.create_resident(bob, "Bob");
    world.create_resident(carol, "Carol");

    let rivermill = world.create_town("Rivermill", alice, TerritoryId(0))?;
    let ashford = world.create_town("Ashford", bob, TerritoryId(10))?;
    let thornvale = world.create_town("Thornvale", carol, TerritoryId(30))?;

    // Expand Rivermill eastward along the first row
    claims::claim(world, rivermill, TerritoryId(1), alice)?;
    claims::claim_at(world, index, rivermill, Coord::new(2, 0), alice)?;

    let realm = world.create_nation("Realm of the River", rivermill)?;
    world.invite_to_nation(realm, alice, ashford)?;
    world.accept_nation_invite(ashford)?;

    diplomacy::declare_war(world, rivermill, thornvale)?;
    war::set_occupier(world, TerritoryId(30), Some(rivermill))?;
    war::annex(world, rivermill, TerritoryId(30))?;

    Ok(())
}
