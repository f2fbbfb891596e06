//! Engine configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other. The config is loaded once, passed
//! into the `World`, and never mutated afterwards.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Configuration for the territorial and diplomatic engine
///
/// Rates are expressed per hour of engine time and scaled by the tick
/// delta, so changing the tick period does not change pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === CLAIM ECONOMY ===
    /// Claim power every town has regardless of resident count
    pub claim_power_base: f32,

    /// Additional claim power target per resident
    ///
    /// The max does not jump when residents join or leave; it ramps
    /// toward `base + per_resident * residents` at `claim_power_ramp_per_hour`.
    pub claim_power_per_resident: f32,

    /// How fast `claim_power_max` moves toward its resident-derived target
    pub claim_power_ramp_per_hour: f32,

    /// How fast an over-claim penalty decays toward zero
    pub claim_penalty_decay_per_hour: f32,

    /// Claim cost a new town may carry without accruing a penalty
    ///
    /// Founding a town on a territory more expensive than this adds the
    /// excess as penalty.
    pub initial_claim_allowance: u32,

    // === DIPLOMACY ===
    /// How long a truce lasts once opened (ms)
    ///
    /// Truces open when an alliance is broken or peace is accepted, and
    /// block war declarations until the tick sweep removes them.
    pub truce_duration_ms: u64,

    // === TIMED RESTRICTIONS ===
    /// How long a town invitation stays valid (ms)
    pub invite_timeout_ms: u64,

    /// How long a join application stays valid (ms)
    pub application_timeout_ms: u64,

    /// How long a nation invitation to a town stays valid (ms)
    pub nation_invite_timeout_ms: u64,

    /// Cooldown before a resident may found another town (ms)
    pub town_create_cooldown_ms: u64,

    /// Cooldown between home territory moves (ms)
    pub home_move_cooldown_ms: u64,

    // === PERIODIC CYCLES ===
    /// Period between income collection callbacks (ms)
    pub income_period_ms: u64,

    /// Period between full-state backup callbacks (ms)
    pub backup_period_ms: u64,

    /// Period between reminder events for towns over their claim budget (ms)
    pub over_max_reminder_ms: u64,

    // === WAR ===
    /// Master switch for war declarations and occupation
    pub war_enabled: bool,

    /// Whether occupied territory may be permanently annexed
    pub annexation_enabled: bool,

    /// Town names that can never be annexed
    pub war_blacklist: AHashSet<String>,

    /// When enabled, only towns named here can be annexed
    pub war_whitelist_enabled: bool,
    pub war_whitelist: AHashSet<String>,

    // === PARALLELIZATION ===
    /// Minimum town count before tick sweeps use parallel processing
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Claim economy
            claim_power_base: 5.0,
            claim_power_per_resident: 5.0,
            claim_power_ramp_per_hour: 2.0,
            claim_penalty_decay_per_hour: 1.0,
            initial_claim_allowance: 10,

            // Diplomacy
            truce_duration_ms: 72 * 60 * 60 * 1000,

            // Timed restrictions
            invite_timeout_ms: 60 * 1000,
            application_timeout_ms: 5 * 60 * 1000,
            nation_invite_timeout_ms: 5 * 60 * 1000,
            town_create_cooldown_ms: 24 * 60 * 60 * 1000,
            home_move_cooldown_ms: 24 * 60 * 60 * 1000,

            // Periodic cycles
            income_period_ms: 60 * 60 * 1000,
            backup_period_ms: 10 * 60 * 1000,
            over_max_reminder_ms: 60 * 60 * 1000,

            // War
            war_enabled: false,
            annexation_enabled: true,
            war_blacklist: AHashSet::new(),
            war_whitelist_enabled: false,
            war_whitelist: AHashSet::new(),

            // Parallelization
            parallel_threshold: 1024,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, falling back to defaults for absent keys
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.claim_power_base < 0.0 || self.claim_power_per_resident < 0.0 {
            return Err("claim power values must be non-negative".into());
        }

        if self.claim_power_ramp_per_hour <= 0.0 {
            return Err("claim_power_ramp_per_hour must be positive".into());
        }

        if self.claim_penalty_decay_per_hour <= 0.0 {
            return Err("claim_penalty_decay_per_hour must be positive".into());
        }

        if self.truce_duration_ms == 0 {
            return Err("truce_duration_ms must be positive".into());
        }

        if self.income_period_ms == 0 || self.backup_period_ms == 0 {
            return Err("periodic cycle periods must be positive".into());
        }

        if self.war_whitelist_enabled && self.war_whitelist.is_empty() {
            return Err("war whitelist enabled but empty".into());
        }

        Ok(())
    }
}
