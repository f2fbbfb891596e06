//! World - the authoritative state container
//!
//! Owns every registry (residents, towns, nations, territories), the truce
//! and offer tables, the deferred-timer queue, and the event log. All
//! structural mutations go through the entry points in `world::store` and
//! `systems::*`; external code reads through the getters here.
//!
//! Concurrency model: single logical writer. The `World` itself is plain
//! data with no interior locking; `runtime::SharedWorld` serializes access.

pub mod store;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{Millis, NationId, ResidentId, TerritoryId, TownId, TownPair};
use crate::entity::{Nation, Resident, Territory, Town};
use crate::events::{Event, EventLog};
use crate::systems;
use crate::timer::TimerQueue;

/// An open two-party negotiation for a town pair.
///
/// The first call from one side records the proposal; the matching call
/// from the other side finalizes it. Only one open offer per pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub kind: OfferKind,
    pub proposer: TownId,
    pub opened_ms: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferKind {
    Peace,
    Alliance,
}

/// Callbacks for the independently scheduled economy actions driven by the
/// tick loop. Implementations must not block.
pub trait TickHooks {
    /// Income cycle: fill town ledgers from whatever the surrounding
    /// system considers income sources.
    fn collect_income(&mut self, _world: &mut World) {}

    /// Backup cycle: receive a full-state snapshot for persistence.
    fn save(&mut self, _snapshot: crate::snapshot::Snapshot) {}
}

/// Hooks that do nothing; useful for tests and manual ticking
pub struct NoHooks;

impl TickHooks for NoHooks {}

pub struct World {
    pub config: EngineConfig,

    /// Engine clock in ms, advanced only by `tick`
    pub clock_ms: Millis,

    // Registries
    pub(crate) residents: AHashMap<ResidentId, Resident>,
    pub(crate) towns: AHashMap<TownId, Town>,
    pub(crate) nations: AHashMap<NationId, Nation>,
    pub(crate) territories: AHashMap<TerritoryId, Territory>,

    // Case-insensitive name indexes (keys lowercased)
    pub(crate) town_names: AHashMap<String, TownId>,
    pub(crate) nation_names: AHashMap<String, NationId>,

    // Diplomacy tables keyed by unordered pair
    pub(crate) truces: AHashMap<TownPair, Millis>,
    pub(crate) offers: AHashMap<TownPair, Offer>,

    pub events: EventLog,
    pub(crate) timers: TimerQueue,

    // Id allocation
    pub(crate) next_town_id: u32,
    pub(crate) next_nation_id: u32,

    // Periodic cycle anchors
    pub(crate) last_income_ms: Millis,
    pub(crate) last_backup_ms: Millis,
    pub(crate) last_over_max_ms: Millis,
}

impl World {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock_ms: 0,
            residents: AHashMap::new(),
            towns: AHashMap::new(),
            nations: AHashMap::new(),
            territories: AHashMap::new(),
            town_names: AHashMap::new(),
            nation_names: AHashMap::new(),
            truces: AHashMap::new(),
            offers: AHashMap::new(),
            events: EventLog::new(),
            timers: TimerQueue::new(),
            next_town_id: 1,
            next_nation_id: 1,
            last_income_ms: 0,
            last_backup_ms: 0,
            last_over_max_ms: 0,
        }
    }

    /// Register a territory supplied by the external spatial index.
    /// Replaces any previous territory with the same id.
    pub fn add_territory(&mut self, territory: Territory) {
        self.territories.insert(territory.id, territory);
    }

    // === Id allocation ===

    pub(crate) fn alloc_town_id(&mut self) -> TownId {
        let id = TownId(self.next_town_id);
        self.next_town_id += 1;
        id
    }

    pub(crate) fn alloc_nation_id(&mut self) -> NationId {
        let id = NationId(self.next_nation_id);
        self.next_nation_id += 1;
        id
    }

    // === Getters ===

    pub fn resident(&self, id: ResidentId) -> Option<&Resident> {
        self.residents.get(&id)
    }

    pub fn town(&self, id: TownId) -> Option<&Town> {
        self.towns.get(&id)
    }

    pub fn nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.get(&id)
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    pub fn town_by_name(&self, name: &str) -> Option<&Town> {
        self.town_names
            .get(&name.to_lowercase())
            .and_then(|id| self.towns.get(id))
    }

    pub fn nation_by_name(&self, name: &str) -> Option<&Nation> {
        self.nation_names
            .get(&name.to_lowercase())
            .and_then(|id| self.nations.get(id))
    }

    pub fn towns(&self) -> impl Iterator<Item = &Town> {
        self.towns.values()
    }

    pub fn nations(&self) -> impl Iterator<Item = &Nation> {
        self.nations.values()
    }

    pub fn residents(&self) -> impl Iterator<Item = &Resident> {
        self.residents.values()
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    /// Active truce expiry for a pair, if any
    pub fn truce_expiry(&self, a: TownId, b: TownId) -> Option<Millis> {
        self.truces.get(&TownPair::new(a, b)).copied()
    }

    pub fn has_truce(&self, a: TownId, b: TownId) -> bool {
        self.truces.contains_key(&TownPair::new(a, b))
    }

    /// Open negotiation for a pair, if any
    pub fn open_offer(&self, a: TownId, b: TownId) -> Option<Offer> {
        self.offers.get(&TownPair::new(a, b)).copied()
    }

    /// Derived nation of a resident, via their town
    pub fn resident_nation(&self, id: ResidentId) -> Option<NationId> {
        self.residents
            .get(&id)
            .and_then(|r| r.town)
            .and_then(|t| self.towns.get(&t))
            .and_then(|t| t.nation)
    }

    // === Internals shared by the mutation modules ===

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(self.clock_ms, event);
    }

    /// Drop every truce and open offer involving `town`
    pub(crate) fn purge_pair_tables(&mut self, town: TownId) {
        self.truces.retain(|pair, _| !pair.contains(town));
        self.offers.retain(|pair, _| !pair.contains(town));
    }

    /// Advance the engine by `dt_ms`, running every tick phase in fixed
    /// order against this captured delta.
    pub fn tick(&mut self, dt_ms: Millis, hooks: &mut dyn TickHooks) {
        systems::tick::advance(self, dt_ms, hooks);
    }

    // === Persistence boundary ===

    pub fn export(&self) -> crate::snapshot::Snapshot {
        crate::snapshot::export(self)
    }

    pub fn from_snapshot(snapshot: crate::snapshot::Snapshot, config: EngineConfig) -> Self {
        crate::snapshot::import(snapshot, config)
    }
}
