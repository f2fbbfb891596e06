//! Tick scheduler
//!
//! A single entry point advances the engine clock by a captured delta and
//! runs every periodic phase in fixed order against that same delta. The
//! ordering is part of the observable contract: power ramps before penalty
//! decay, timers fire before truce expiry, and the cycle anchors are
//! updated before their hooks run so a panicking hook cannot re-trigger.

use tracing::{debug, warn};

use crate::core::types::Millis;
use crate::events::Event;
use crate::snapshot;
use crate::systems::{diplomacy, power};
use crate::timer::DeferredAction;
use crate::world::{TickHooks, World};

/// Advance the world by `dt_ms`.
pub(crate) fn advance(world: &mut World, dt_ms: Millis, hooks: &mut dyn TickHooks) {
    world.clock_ms += dt_ms;
    debug!(clock_ms = world.clock_ms, dt_ms, "tick");

    power::ramp_claim_power(world, dt_ms);
    power::decay_claim_penalty(world, dt_ms);
    tick_cooldowns(world, dt_ms);
    fire_due_timers(world);
    diplomacy::expire_truces(world);
    remind_over_max_claims(world);
    run_income_cycle(world, hooks);
    run_backup_cycle(world, hooks);
}

/// Count down the per-resident town-creation cooldown and the per-town
/// home-move cooldown.
fn tick_cooldowns(world: &mut World, dt_ms: Millis) {
    for resident in world.residents.values_mut() {
        resident.town_create_cooldown_ms = resident.town_create_cooldown_ms.saturating_sub(dt_ms);
    }
    for town in world.towns.values_mut() {
        town.move_home_cooldown_ms = town.move_home_cooldown_ms.saturating_sub(dt_ms);
    }
}

/// Pop every due timer and dispatch it. Handlers re-validate their own
/// preconditions against current state; a stale timer is a no-op.
fn fire_due_timers(world: &mut World) {
    for (token, action) in world.timers.pop_due(world.clock_ms) {
        match action {
            DeferredAction::TownInviteExpiry { resident } => {
                world.handle_invite_expiry(token, resident);
            }
            DeferredAction::ApplicationExpiry { town, resident } => {
                world.handle_application_expiry(token, town, resident);
            }
            DeferredAction::NationInviteExpiry { town } => {
                world.handle_nation_invite_expiry(token, town);
            }
        }
    }
}

/// Periodic reminder for towns whose claims exceed their power budget.
/// The overage does not block anything by itself; existing claims are
/// kept, only new claims are gated.
fn remind_over_max_claims(world: &mut World) {
    let now = world.clock_ms;
    if now < world.last_over_max_ms + world.config.over_max_reminder_ms {
        return;
    }
    world.last_over_max_ms = now;

    let mut over_budget: Vec<_> = world
        .towns
        .values()
        .filter(|town| town.is_over_max_claims())
        .map(|town| {
            let over = (town.claims_used as f32 + town.claims_penalty - town.claim_power_max)
                .ceil() as u32;
            (town.id, over)
        })
        .collect();
    over_budget.sort_by_key(|(id, _)| *id);

    for (town, over) in over_budget {
        warn!(?town, over, "town exceeds its claim power budget");
        world.emit(Event::OverMaxClaims { town, over });
    }
}

fn run_income_cycle(world: &mut World, hooks: &mut dyn TickHooks) {
    let now = world.clock_ms;
    if now < world.last_income_ms + world.config.income_period_ms {
        return;
    }
    world.last_income_ms = now;
    hooks.collect_income(world);
    world.emit(Event::IncomeCollected);
}

fn run_backup_cycle(world: &mut World, hooks: &mut dyn TickHooks) {
    let now = world.clock_ms;
    if now < world.last_backup_ms + world.config.backup_period_ms {
        return;
    }
    world.last_backup_ms = now;
    hooks.save(snapshot::export(world));
    world.emit(Event::BackupCompleted);
}
