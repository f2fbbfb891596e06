//! Claim power economy
//!
//! `claim_power_max` never jumps to its resident-derived target; it ramps
//! linearly once per tick so membership churn cannot spike a town's budget.
//! Penalty decays the same way. Both updates are monotonic, clamp at their
//! target, and are no-ops once reached.

use rayon::prelude::*;

use crate::core::config::EngineConfig;
use crate::core::types::Millis;
use crate::entity::Town;
use crate::world::World;

const MS_PER_HOUR: f32 = 3_600_000.0;

/// Resident-derived claim power target for a town
pub fn target_power(config: &EngineConfig, resident_count: usize) -> f32 {
    config.claim_power_base + config.claim_power_per_resident * resident_count as f32
}

fn ramp_town(town: &mut Town, base: f32, per_resident: f32, step: f32) {
    let target = base + per_resident * town.residents.len() as f32;
    let max = town.claim_power_max;
    if max < target {
        town.claim_power_max = (max + step).min(target);
    } else if max > target {
        town.claim_power_max = (max - step).max(target);
    }
}

fn decay_town(town: &mut Town, step: f32) {
    if town.claims_penalty > 0.0 {
        town.claims_penalty = (town.claims_penalty - step).max(0.0);
    }
}

/// Tick phase 1: move every town's max claim power toward its target
pub(crate) fn ramp_claim_power(world: &mut World, dt_ms: Millis) {
    let base = world.config.claim_power_base;
    let per_resident = world.config.claim_power_per_resident;
    let step = world.config.claim_power_ramp_per_hour * dt_ms as f32 / MS_PER_HOUR;
    let threshold = world.config.parallel_threshold;

    let mut towns: Vec<&mut Town> = world.towns.values_mut().collect();
    if towns.len() >= threshold {
        towns
            .par_iter_mut()
            .for_each(|town| ramp_town(town, base, per_resident, step));
    } else {
        for town in &mut towns {
            ramp_town(town, base, per_resident, step);
        }
    }
}

/// Tick phase 2: decay over-claim penalties toward zero
pub(crate) fn decay_claim_penalty(world: &mut World, dt_ms: Millis) {
    let step = world.config.claim_penalty_decay_per_hour * dt_ms as f32 / MS_PER_HOUR;
    let threshold = world.config.parallel_threshold;

    let mut towns: Vec<&mut Town> = world.towns.values_mut().collect();
    if towns.len() >= threshold {
        towns.par_iter_mut().for_each(|town| decay_town(town, step));
    } else {
        for town in &mut towns {
            decay_town(town, step);
        }
    }
}
