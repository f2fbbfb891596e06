//! Entity lifecycle and membership mutations
//!
//! Exclusive owner of creation/destruction for residents, towns and
//! nations, and of every cross-reference between them. Each operation
//! validates completely before writing anything; failures never leave
//! partial state behind.

use tracing::{debug, info};

use crate::core::error::{NationError, TownError};
use crate::core::types::{NationId, ResidentId, TerritoryId, TownId};
use crate::entity::resident::TownInvite;
use crate::entity::town::{Application, NationInvite};
use crate::entity::{Nation, Resident, Town};
use crate::events::Event;
use crate::timer::{DeferredAction, TimerToken};
use crate::world::World;

impl World {
    // =====================================================================
    // Residents
    // =====================================================================

    /// Register a resident on first join. Idempotent for a known id.
    pub fn create_resident(&mut self, id: ResidentId, name: impl Into<String>) -> ResidentId {
        self.residents
            .entry(id)
            .or_insert_with(|| Resident::new(id, name));
        id
    }

    // =====================================================================
    // Towns
    // =====================================================================

    /// Found a town on an unclaimed territory.
    ///
    /// The founding claim is always allowed regardless of adjacency; cost
    /// beyond the configured free allowance accrues as claim penalty.
    pub fn create_town(
        &mut self,
        name: &str,
        leader: ResidentId,
        home: TerritoryId,
    ) -> Result<TownId, TownError> {
        let key = name.to_lowercase();
        if self.town_names.contains_key(&key) {
            return Err(TownError::NameTaken(name.to_string()));
        }

        let resident = self
            .residents
            .get(&leader)
            .ok_or(TownError::UnknownResident(leader))?;
        if resident.town.is_some() {
            return Err(TownError::ResidentHasTown);
        }
        if resident.town_create_cooldown_ms > 0 {
            return Err(TownError::CreateCooldown);
        }

        let cost = {
            let territory = self
                .territories
                .get(&home)
                .ok_or(TownError::UnknownTerritory(home))?;
            if territory.owner.is_some() {
                return Err(TownError::TerritoryOwned);
            }
            territory.cost
        };

        let id = self.alloc_town_id();
        let mut town = Town::new(id, name, leader, home);
        town.claim_power_max = self.config.claim_power_base;
        town.claims_used = cost;
        town.claims_penalty = cost.saturating_sub(self.config.initial_claim_allowance) as f32;
        self.towns.insert(id, town);
        self.town_names.insert(key, id);

        self.territories
            .get_mut(&home)
            .expect("territory validated above")
            .owner = Some(id);

        let cooldown = self.config.town_create_cooldown_ms;
        let resident = self
            .residents
            .get_mut(&leader)
            .expect("resident validated above");
        resident.town = Some(id);
        resident.town_create_cooldown_ms = cooldown;
        if let Some(invite) = resident.pending_invite.take() {
            self.timers.cancel(invite.timer);
        }
        self.withdraw_applications_of(leader);

        info!(town = name, ?id, "town created");
        self.emit(Event::TownCreated {
            town: id,
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Dissolve a town: release its territory, detach every resident, fix
    /// up its nation, and drop all diplomacy involving it.
    pub fn destroy_town(&mut self, id: TownId) -> Result<(), TownError> {
        let town = self.towns.remove(&id).ok_or(TownError::UnknownTown(id))?;
        self.town_names.remove(&town.name.to_lowercase());

        for territory_id in &town.claimed {
            if let Some(territory) = self.territories.get_mut(territory_id) {
                territory.owner = None;
                territory.occupier = None;
            }
        }
        // Lift this town's occupations elsewhere
        for territory in self.territories.values_mut() {
            if territory.occupier == Some(id) {
                territory.occupier = None;
            }
        }

        for resident_id in &town.residents {
            if let Some(resident) = self.residents.get_mut(resident_id) {
                resident.town = None;
                resident.trusted = false;
            }
        }

        // Invitations into the destroyed town become stale
        for resident in self.residents.values_mut() {
            if resident
                .pending_invite
                .as_ref()
                .is_some_and(|invite| invite.town == id)
            {
                let invite = resident.pending_invite.take().expect("checked above");
                self.timers.cancel(invite.timer);
            }
        }
        for application in town.applications.values() {
            self.timers.cancel(application.timer);
        }
        if let Some(invite) = &town.pending_nation_invite {
            self.timers.cancel(invite.timer);
        }

        for other in self.towns.values_mut() {
            other.allies.remove(&id);
            other.enemies.remove(&id);
        }
        self.purge_pair_tables(id);

        if let Some(nation_id) = town.nation {
            self.detach_member_after_destroy(nation_id, id);
        }

        info!(town = %town.name, ?id, "town destroyed");
        self.emit(Event::TownDestroyed {
            town: id,
            name: town.name,
        });
        Ok(())
    }

    fn detach_member_after_destroy(&mut self, nation_id: NationId, town_id: TownId) {
        let Some(nation) = self.nations.get_mut(&nation_id) else {
            return;
        };
        nation.towns.remove(&town_id);

        if nation.capital != town_id {
            return;
        }
        // Promote the lowest-id member so the choice is deterministic;
        // delete the nation when no member remains.
        match nation.towns.iter().min().copied() {
            Some(successor) => nation.capital = successor,
            None => {
                let nation = self
                    .nations
                    .remove(&nation_id)
                    .expect("nation fetched above");
                self.nation_names.remove(&nation.name.to_lowercase());
                self.emit(Event::NationDeleted {
                    nation: nation_id,
                    name: nation.name,
                });
            }
        }
    }

    // =====================================================================
    // Town membership
    // =====================================================================

    /// Invite a townless resident into a town. Replaces any previous
    /// invitation held by the resident.
    pub fn invite_to_town(
        &mut self,
        town_id: TownId,
        inviter: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(inviter) {
            return Err(TownError::NotOfficer);
        }

        let resident = self
            .residents
            .get(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?;
        if resident.town.is_some() {
            return Err(TownError::ResidentHasTown);
        }

        let expires_ms = self.clock_ms + self.config.invite_timeout_ms;
        let timer = self.timers.schedule(
            expires_ms,
            DeferredAction::TownInviteExpiry {
                resident: resident_id,
            },
        );

        let resident = self
            .residents
            .get_mut(&resident_id)
            .expect("resident validated above");
        if let Some(previous) = resident.pending_invite.take() {
            self.timers.cancel(previous.timer);
        }
        resident.pending_invite = Some(TownInvite {
            town: town_id,
            inviter,
            expires_ms,
            timer,
        });
        Ok(())
    }

    pub fn accept_invite(&mut self, resident_id: ResidentId) -> Result<TownId, TownError> {
        let invite = self
            .residents
            .get(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?
            .pending_invite
            .clone()
            .ok_or(TownError::NoInvite)?;

        // The inviting town may have vanished since scheduling
        if !self.towns.contains_key(&invite.town) {
            let resident = self
                .residents
                .get_mut(&resident_id)
                .expect("resident fetched above");
            resident.pending_invite = None;
            self.timers.cancel(invite.timer);
            return Err(TownError::UnknownTown(invite.town));
        }

        self.timers.cancel(invite.timer);
        self.join_town(resident_id, invite.town);
        Ok(invite.town)
    }

    pub fn decline_invite(&mut self, resident_id: ResidentId) -> Result<(), TownError> {
        let resident = self
            .residents
            .get_mut(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?;
        let invite = resident.pending_invite.take().ok_or(TownError::NoInvite)?;
        self.timers.cancel(invite.timer);
        Ok(())
    }

    /// Request membership in a town. One application per town; a resident
    /// may apply to several towns at once.
    pub fn apply_to_town(
        &mut self,
        resident_id: ResidentId,
        town_id: TownId,
    ) -> Result<(), TownError> {
        let resident = self
            .residents
            .get(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?;
        if resident.town.is_some() {
            return Err(TownError::ResidentHasTown);
        }
        if !self.towns.contains_key(&town_id) {
            return Err(TownError::UnknownTown(town_id));
        }

        let expires_ms = self.clock_ms + self.config.application_timeout_ms;
        let timer = self.timers.schedule(
            expires_ms,
            DeferredAction::ApplicationExpiry {
                town: town_id,
                resident: resident_id,
            },
        );

        let town = self.towns.get_mut(&town_id).expect("checked above");
        if let Some(previous) = town
            .applications
            .insert(resident_id, Application { expires_ms, timer })
        {
            self.timers.cancel(previous.timer);
        }
        Ok(())
    }

    pub fn accept_application(
        &mut self,
        town_id: TownId,
        officer: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(officer) {
            return Err(TownError::NotOfficer);
        }
        if !town.applications.contains_key(&resident_id) {
            return Err(TownError::NoApplication);
        }
        // The applicant may have joined elsewhere since applying
        let resident = self
            .residents
            .get(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?;
        if resident.town.is_some() {
            let town = self.towns.get_mut(&town_id).expect("checked above");
            let application = town
                .applications
                .remove(&resident_id)
                .expect("checked above");
            self.timers.cancel(application.timer);
            return Err(TownError::ResidentHasTown);
        }

        self.join_town(resident_id, town_id);
        Ok(())
    }

    pub fn deny_application(
        &mut self,
        town_id: TownId,
        officer: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(officer) {
            return Err(TownError::NotOfficer);
        }
        let application = town
            .applications
            .remove(&resident_id)
            .ok_or(TownError::NoApplication)?;
        self.timers.cancel(application.timer);
        Ok(())
    }

    /// Shared join path: clears the resident's pending invite and open
    /// applications everywhere, then links both sides.
    fn join_town(&mut self, resident_id: ResidentId, town_id: TownId) {
        let resident = self
            .residents
            .get_mut(&resident_id)
            .expect("caller validated resident");
        if let Some(invite) = resident.pending_invite.take() {
            self.timers.cancel(invite.timer);
        }
        self.withdraw_applications_of(resident_id);

        let resident = self
            .residents
            .get_mut(&resident_id)
            .expect("caller validated resident");
        resident.town = Some(town_id);

        let town = self
            .towns
            .get_mut(&town_id)
            .expect("caller validated town");
        town.residents.insert(resident_id);

        debug!(?resident_id, ?town_id, "resident joined town");
        self.emit(Event::ResidentJoinedTown {
            resident: resident_id,
            town: town_id,
        });
    }

    fn withdraw_applications_of(&mut self, resident_id: ResidentId) {
        let mut cancelled = Vec::new();
        for town in self.towns.values_mut() {
            if let Some(application) = town.applications.remove(&resident_id) {
                cancelled.push(application.timer);
            }
        }
        for timer in cancelled {
            self.timers.cancel(timer);
        }
    }

    /// Leave the current town. A leader with co-residents must transfer
    /// leadership first; a sole leader leaving dissolves the town.
    pub fn leave_town(&mut self, resident_id: ResidentId) -> Result<(), TownError> {
        let resident = self
            .residents
            .get(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?;
        let town_id = resident.town.ok_or(TownError::NotResident)?;
        let town = self
            .towns
            .get(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;

        if town.leader == resident_id {
            if town.residents.len() > 1 {
                return Err(TownError::LeaderMustTransfer);
            }
            return self.destroy_town(town_id);
        }

        self.remove_resident_from_town(resident_id, town_id);
        Ok(())
    }

    pub fn kick_resident(
        &mut self,
        town_id: TownId,
        officer: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(officer) {
            return Err(TownError::NotOfficer);
        }
        if !town.residents.contains(&resident_id) {
            return Err(TownError::NotResident);
        }
        if resident_id == town.leader {
            return Err(TownError::NotLeader);
        }

        self.remove_resident_from_town(resident_id, town_id);
        Ok(())
    }

    fn remove_resident_from_town(&mut self, resident_id: ResidentId, town_id: TownId) {
        let town = self
            .towns
            .get_mut(&town_id)
            .expect("caller validated town");
        town.residents.remove(&resident_id);
        town.officers.remove(&resident_id);

        if let Some(resident) = self.residents.get_mut(&resident_id) {
            resident.town = None;
            resident.trusted = false;
        }

        self.emit(Event::ResidentLeftTown {
            resident: resident_id,
            town: town_id,
        });
    }

    // =====================================================================
    // Roles and trust
    // =====================================================================

    pub fn add_officer(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if actor != town.leader {
            return Err(TownError::NotLeader);
        }
        if !town.residents.contains(&resident_id) {
            return Err(TownError::NotResident);
        }
        if resident_id != town.leader {
            town.officers.insert(resident_id);
        }
        Ok(())
    }

    pub fn remove_officer(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        resident_id: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if actor != town.leader {
            return Err(TownError::NotLeader);
        }
        town.officers.remove(&resident_id);
        Ok(())
    }

    pub fn transfer_leadership(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        to: ResidentId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if actor != town.leader {
            return Err(TownError::NotLeader);
        }
        if !town.residents.contains(&to) {
            return Err(TownError::NotResident);
        }
        let from = town.leader;
        town.leader = to;
        town.officers.remove(&to);

        self.emit(Event::LeadershipTransferred {
            town: town_id,
            from,
            to,
        });
        Ok(())
    }

    pub fn set_trusted(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        resident_id: ResidentId,
        trusted: bool,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(actor) {
            return Err(TownError::NotOfficer);
        }
        if !town.residents.contains(&resident_id) {
            return Err(TownError::NotResident);
        }
        self.residents
            .get_mut(&resident_id)
            .ok_or(TownError::UnknownResident(resident_id))?
            .trusted = trusted;
        Ok(())
    }

    // =====================================================================
    // Home and outposts
    // =====================================================================

    pub fn move_home(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        territory_id: TerritoryId,
    ) -> Result<(), TownError> {
        let cooldown = self.config.home_move_cooldown_ms;
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(actor) {
            return Err(TownError::NotOfficer);
        }
        if !town.claimed.contains(&territory_id) {
            return Err(TownError::TerritoryNotOwned);
        }
        if town.move_home_cooldown_ms > 0 {
            return Err(TownError::MoveHomeCooldown);
        }

        town.home = territory_id;
        town.move_home_cooldown_ms = cooldown;
        // The home can no longer host an outpost
        town.outposts.retain(|_, t| *t != territory_id);

        self.emit(Event::HomeMoved {
            town: town_id,
            home: territory_id,
        });
        Ok(())
    }

    pub fn create_outpost(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        name: &str,
        territory_id: TerritoryId,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(actor) {
            return Err(TownError::NotOfficer);
        }
        if !town.claimed.contains(&territory_id) {
            return Err(TownError::TerritoryNotOwned);
        }
        if territory_id == town.home {
            return Err(TownError::OutpostOnHome);
        }
        if town.outposts.contains_key(name) {
            return Err(TownError::OutpostExists(name.to_string()));
        }
        town.outposts.insert(name.to_string(), territory_id);
        Ok(())
    }

    pub fn remove_outpost(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        name: &str,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(actor) {
            return Err(TownError::NotOfficer);
        }
        town.outposts
            .remove(name)
            .ok_or(TownError::UnknownOutpost(name.to_string()))?;
        Ok(())
    }

    // =====================================================================
    // Income ledger
    // =====================================================================

    /// Take from an opaque ledger entry; the caller renders/dispenses it.
    pub fn withdraw_income(
        &mut self,
        town_id: TownId,
        actor: ResidentId,
        key: &str,
        amount: i64,
    ) -> Result<(), TownError> {
        let town = self
            .towns
            .get_mut(&town_id)
            .ok_or(TownError::UnknownTown(town_id))?;
        if !town.is_officer(actor) {
            return Err(TownError::NotOfficer);
        }
        let balance = town.income.get(key).copied().unwrap_or(0);
        if balance < amount {
            return Err(TownError::InsufficientFunds(key.to_string()));
        }
        if balance == amount {
            town.income.remove(key);
        } else {
            town.income.insert(key.to_string(), balance - amount);
        }
        Ok(())
    }

    // =====================================================================
    // Nations
    // =====================================================================

    pub fn create_nation(&mut self, name: &str, capital: TownId) -> Result<NationId, NationError> {
        let key = name.to_lowercase();
        if self.nation_names.contains_key(&key) {
            return Err(NationError::NameTaken(name.to_string()));
        }
        let town = self
            .towns
            .get(&capital)
            .ok_or(NationError::UnknownTown(capital))?;
        if town.nation.is_some() {
            return Err(NationError::TownHasNation);
        }

        let id = self.alloc_nation_id();
        self.nations.insert(id, Nation::new(id, name, capital));
        self.nation_names.insert(key, id);
        self.towns
            .get_mut(&capital)
            .expect("town validated above")
            .nation = Some(id);

        info!(nation = name, ?id, "nation created");
        self.emit(Event::NationCreated {
            nation: id,
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Invite a nationless town into a nation. Only officers of the
    /// capital may extend invitations.
    pub fn invite_to_nation(
        &mut self,
        nation_id: NationId,
        actor: ResidentId,
        town_id: TownId,
    ) -> Result<(), NationError> {
        let nation = self
            .nations
            .get(&nation_id)
            .ok_or(NationError::UnknownNation(nation_id))?;
        let capital = self
            .towns
            .get(&nation.capital)
            .ok_or(NationError::UnknownTown(nation.capital))?;
        if !capital.is_officer(actor) {
            return Err(NationError::NotOfficer);
        }
        let town = self
            .towns
            .get(&town_id)
            .ok_or(NationError::UnknownTown(town_id))?;
        if town.nation.is_some() {
            return Err(NationError::TownHasNation);
        }

        let expires_ms = self.clock_ms + self.config.nation_invite_timeout_ms;
        let timer = self
            .timers
            .schedule(expires_ms, DeferredAction::NationInviteExpiry { town: town_id });

        let town = self.towns.get_mut(&town_id).expect("town validated above");
        if let Some(previous) = town.pending_nation_invite.take() {
            self.timers.cancel(previous.timer);
        }
        town.pending_nation_invite = Some(NationInvite {
            nation: nation_id,
            expires_ms,
            timer,
        });
        Ok(())
    }

    pub fn accept_nation_invite(&mut self, town_id: TownId) -> Result<NationId, NationError> {
        let invite = self
            .towns
            .get(&town_id)
            .ok_or(NationError::UnknownTown(town_id))?
            .pending_nation_invite
            .clone()
            .ok_or(NationError::NoInvite)?;

        // The nation may have dissolved since the invitation
        if !self.nations.contains_key(&invite.nation) {
            let town = self.towns.get_mut(&town_id).expect("town fetched above");
            town.pending_nation_invite = None;
            self.timers.cancel(invite.timer);
            return Err(NationError::UnknownNation(invite.nation));
        }

        self.timers.cancel(invite.timer);
        let town = self.towns.get_mut(&town_id).expect("town fetched above");
        town.pending_nation_invite = None;
        town.nation = Some(invite.nation);
        self.nations
            .get_mut(&invite.nation)
            .expect("nation checked above")
            .towns
            .insert(town_id);

        self.emit(Event::TownJoinedNation {
            town: town_id,
            nation: invite.nation,
        });
        Ok(invite.nation)
    }

    /// Leave the nation. A departing capital dissolves the whole nation;
    /// an ordinary member just detaches. Relationships the member itself
    /// holds are untouched; the capital's simply stop applying to it.
    pub fn leave_nation(&mut self, town_id: TownId) -> Result<(), NationError> {
        let town = self
            .towns
            .get(&town_id)
            .ok_or(NationError::UnknownTown(town_id))?;
        let nation_id = town.nation.ok_or(NationError::NotMember)?;
        let nation = self
            .nations
            .get(&nation_id)
            .ok_or(NationError::UnknownNation(nation_id))?;

        if nation.capital == town_id {
            return self.delete_nation(nation_id);
        }

        self.nations
            .get_mut(&nation_id)
            .expect("nation fetched above")
            .towns
            .remove(&town_id);
        self.towns
            .get_mut(&town_id)
            .expect("town fetched above")
            .nation = None;

        self.emit(Event::TownLeftNation {
            town: town_id,
            nation: nation_id,
        });
        Ok(())
    }

    pub fn delete_nation(&mut self, nation_id: NationId) -> Result<(), NationError> {
        let nation = self
            .nations
            .remove(&nation_id)
            .ok_or(NationError::UnknownNation(nation_id))?;
        self.nation_names.remove(&nation.name.to_lowercase());

        for town_id in &nation.towns {
            if let Some(town) = self.towns.get_mut(town_id) {
                town.nation = None;
            }
        }
        // Stale invitations into the deleted nation
        let mut cancelled = Vec::new();
        for town in self.towns.values_mut() {
            if town
                .pending_nation_invite
                .as_ref()
                .is_some_and(|invite| invite.nation == nation_id)
            {
                let invite = town.pending_nation_invite.take().expect("checked above");
                cancelled.push(invite.timer);
            }
        }
        for timer in cancelled {
            self.timers.cancel(timer);
        }

        info!(nation = %nation.name, ?nation_id, "nation deleted");
        self.emit(Event::NationDeleted {
            nation: nation_id,
            name: nation.name,
        });
        Ok(())
    }

    // =====================================================================
    // Deferred-action handlers (run inside the tick context)
    // =====================================================================

    /// An invitation timer fired. Preconditions are re-validated: the
    /// invite must still be the one the timer was scheduled for.
    pub(crate) fn handle_invite_expiry(&mut self, token: TimerToken, resident_id: ResidentId) {
        let Some(resident) = self.residents.get_mut(&resident_id) else {
            return;
        };
        let Some(invite) = &resident.pending_invite else {
            return;
        };
        if invite.timer != token {
            return; // superseded by a newer invitation
        }
        let town = invite.town;
        resident.pending_invite = None;
        self.emit(Event::InviteExpired {
            resident: resident_id,
            town,
        });
    }

    pub(crate) fn handle_application_expiry(
        &mut self,
        token: TimerToken,
        town_id: TownId,
        resident_id: ResidentId,
    ) {
        let Some(town) = self.towns.get_mut(&town_id) else {
            return;
        };
        let matches = town
            .applications
            .get(&resident_id)
            .is_some_and(|application| application.timer == token);
        if !matches {
            return;
        }
        town.applications.remove(&resident_id);
        self.emit(Event::ApplicationExpired {
            resident: resident_id,
            town: town_id,
        });
    }

    pub(crate) fn handle_nation_invite_expiry(&mut self, token: TimerToken, town_id: TownId) {
        let Some(town) = self.towns.get_mut(&town_id) else {
            return;
        };
        let Some(invite) = &town.pending_nation_invite else {
            return;
        };
        if invite.timer != token {
            return;
        }
        let nation = invite.nation;
        town.pending_nation_invite = None;
        self.emit(Event::NationInviteExpired {
            town: town_id,
            nation,
        });
    }
}
