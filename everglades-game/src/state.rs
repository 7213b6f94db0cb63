use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::constants::{
    FOOD_CONSUMED_PER_MEMBER, HUNGER_RESTORED_PER_FOOD, MSG_CANOE_WRECKED_WARNING, MSG_GAME_OVER,
    MSG_OUT_OF_TIME, MSG_PARTY_PERISHED, MSG_SETUP_ERROR,
};
use crate::events::EventTable;
use crate::hazards::HazardTable;
use crate::messages::MessageLog;
use crate::party::PartyMember;
use crate::world::{Location, LocationTable};

/// Supplies and equipment the party carries.
///
/// Deserialized values clamp `canoe_health` to `canoe_max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredResources")]
pub struct Resources {
    pub food: u32,
    /// Canoe integrity in `[0, canoe_max]`.
    pub canoe_health: u32,
    pub canoe_max: u32,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub herbs: u32,
    #[serde(default)]
    pub repair_materials: u32,
}

#[derive(Deserialize)]
struct StoredResources {
    food: u32,
    canoe_health: u32,
    canoe_max: u32,
    #[serde(default)]
    wood: u32,
    #[serde(default)]
    herbs: u32,
    #[serde(default)]
    repair_materials: u32,
}

impl From<StoredResources> for Resources {
    fn from(stored: StoredResources) -> Self {
        Self {
            food: stored.food,
            canoe_health: stored.canoe_health.min(stored.canoe_max),
            canoe_max: stored.canoe_max,
            wood: stored.wood,
            herbs: stored.herbs,
            repair_materials: stored.repair_materials,
        }
    }
}

impl Default for Resources {
    fn default() -> Self {
        let cfg = GameConfig::default();
        Self::new(cfg.initial_food, cfg.initial_canoe_health)
    }
}

impl Resources {
    #[must_use]
    pub const fn new(food: u32, canoe_health: u32) -> Self {
        Self {
            food,
            canoe_health,
            canoe_max: canoe_health,
            wood: 0,
            herbs: 0,
            repair_materials: 0,
        }
    }

    #[must_use]
    pub const fn canoe_functional(&self) -> bool {
        self.canoe_health > 0
    }

    #[must_use]
    pub const fn canoe_damaged(&self) -> bool {
        self.canoe_health < self.canoe_max
    }

    /// Apply canoe damage, clamping at zero. Returns the remaining health.
    pub const fn damage_canoe(&mut self, amount: u32) -> u32 {
        self.canoe_health = self.canoe_health.saturating_sub(amount);
        self.canoe_health
    }

    /// Restore canoe integrity up to the maximum. Returns the amount restored.
    pub fn repair_canoe(&mut self, amount: u32) -> u32 {
        let before = self.canoe_health;
        self.canoe_health = self.canoe_health.saturating_add(amount).min(self.canoe_max);
        self.canoe_health - before
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resources: Food: {}, Canoe health: {}, Wood: {}, Herbs: {}, Repair materials: {}",
            self.food, self.canoe_health, self.wood, self.herbs, self.repair_materials
        )
    }
}

/// How the journey ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingKind {
    Arrived,
    OutOfTime,
    PartyPerished,
    SetupError,
}

impl EndingKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Arrived => "arrived",
            Self::OutOfTime => "out_of_time",
            Self::PartyPerished => "party_perished",
            Self::SetupError => "setup_error",
        }
    }

    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Arrived)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    pub kind: EndingKind,
    pub reason: String,
}

/// Central state of one journey.
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub current_day: u32,
    /// Days left before the disaster; the journey is lost at zero.
    pub time_remaining: i32,
    pub resources: Resources,
    pub party_members: Vec<PartyMember>,
    pub(crate) current_location: Option<String>,
    pub(crate) locations: LocationTable,
    pub(crate) events: EventTable,
    pub(crate) hazard_table: HazardTable,
    pub(crate) repair_amount: u32,
    ending: Option<Ending>,
    canoe_warning_issued: bool,
    pub(crate) messages: MessageLog,
    pub(crate) rng: ChaCha20Rng,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default(), 0)
    }
}

impl GameState {
    #[must_use]
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            seed,
            current_day: 1,
            time_remaining: config.time_limit,
            resources: Resources::new(config.initial_food, config.initial_canoe_health),
            party_members: Vec::new(),
            current_location: None,
            locations: LocationTable::new(),
            events: EventTable::new(),
            hazard_table: HazardTable::standard(),
            repair_amount: config.repair_amount,
            ending: None,
            canoe_warning_issued: false,
            messages: MessageLog::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Install the party and world tables and place the party at the start.
    ///
    /// An unknown start id ends the game immediately as a setup loss.
    pub fn setup_game(
        &mut self,
        party: Vec<PartyMember>,
        locations: LocationTable,
        events: EventTable,
        start_location_id: &str,
    ) {
        self.party_members = party;
        self.locations = locations;
        self.events = events;

        if let Some(start) = self.locations.get(start_location_id) {
            let arrival = format!("Game started. Party arrives at {}.", start.name);
            self.current_location = Some(start_location_id.to_string());
            self.log_message(arrival);
        } else {
            warn!("start location `{start_location_id}` missing from location table");
            self.log_message(format!(
                "Error: Start location ID '{start_location_id}' not found in loaded locations."
            ));
            self.set_game_over(EndingKind::SetupError, MSG_SETUP_ERROR);
        }
    }

    pub fn set_hazard_table(&mut self, table: HazardTable) {
        self.hazard_table = table;
    }

    #[must_use]
    pub const fn hazard_table(&self) -> &HazardTable {
        &self.hazard_table
    }

    pub fn log_message(&mut self, message: impl Into<String>) {
        self.messages.push(message);
    }

    /// Snapshot of pending messages; the queue is empty afterwards.
    pub fn get_and_clear_messages(&mut self) -> Vec<String> {
        self.messages.drain()
    }

    #[must_use]
    pub const fn messages(&self) -> &MessageLog {
        &self.messages
    }

    #[must_use]
    pub fn current_location(&self) -> Option<&Location> {
        self.current_location
            .as_deref()
            .and_then(|id| self.locations.get(id))
    }

    #[must_use]
    pub fn current_location_id(&self) -> Option<&str> {
        self.current_location.as_deref()
    }

    #[must_use]
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    #[must_use]
    pub const fn locations(&self) -> &LocationTable {
        &self.locations
    }

    #[must_use]
    pub const fn events(&self) -> &EventTable {
        &self.events
    }

    /// Move the party; unknown ids are ignored and reported as `false`.
    pub fn move_to(&mut self, location_id: &str) -> bool {
        if !self.locations.contains_key(location_id) {
            return false;
        }
        self.current_location = Some(location_id.to_string());
        true
    }

    /// Shared random source; controllers draw from it to keep replays exact.
    pub const fn rng_mut(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }

    #[must_use]
    pub fn living_members(&self) -> usize {
        self.party_members.iter().filter(|m| m.is_alive()).count()
    }

    #[must_use]
    pub fn has_living_members(&self) -> bool {
        self.party_members.iter().any(PartyMember::is_alive)
    }

    /// Index of a uniformly chosen living member.
    pub fn random_living_member(&mut self) -> Option<usize> {
        let living: Vec<usize> = self
            .party_members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_alive())
            .map(|(idx, _)| idx)
            .collect();
        if living.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..living.len());
        Some(living[pick])
    }

    /// Trigger an event from the table by id, returning its outcome.
    pub fn trigger_event(&mut self, event_id: &str) -> Option<String> {
        let event = self.events.get(event_id)?.clone();
        Some(event.trigger(self))
    }

    /// Advance one day: consumption, member effects, then the ending check.
    pub fn advance_day(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.current_day += 1;
        self.time_remaining -= 1;
        debug!(
            "day {} begins, {} days remaining",
            self.current_day, self.time_remaining
        );

        self.consume_daily_food();
        self.apply_daily_party_effects();
        self.check_game_over_conditions();
    }

    /// Feed living members, hungriest first, one ration each while food lasts.
    pub fn consume_daily_food(&mut self) {
        let mut order: Vec<usize> = self
            .party_members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_alive())
            .map(|(idx, _)| idx)
            .collect();
        if order.is_empty() {
            return;
        }
        order.sort_by_key(|&idx| self.party_members[idx].hunger());

        let mut fed = 0_u32;
        let mut unfed = 0_u32;
        for idx in order {
            if self.resources.food >= FOOD_CONSUMED_PER_MEMBER {
                self.resources.food -= FOOD_CONSUMED_PER_MEMBER;
                fed += 1;
                self.party_members[idx].change_hunger(HUNGER_RESTORED_PER_FOOD, &mut self.messages);
            } else {
                unfed += 1;
            }
        }

        if fed > 0 {
            self.log_message(format!(
                "Consumed {} food for {fed} members.",
                fed * FOOD_CONSUMED_PER_MEMBER
            ));
        }
        if unfed > 0 {
            self.log_message(format!(
                "{unfed} members could not eat due to lack of food."
            ));
        }
    }

    pub fn apply_daily_party_effects(&mut self) {
        for member in &mut self.party_members {
            member.apply_daily_effects(&mut self.messages);
        }
    }

    /// Evaluate endings in priority order: arrival, time, party wipe.
    pub fn check_game_over_conditions(&mut self) {
        if self.is_game_over() {
            return;
        }

        if let Some(location) = self.current_location()
            && location.is_destination
        {
            let reason = format!(
                "Congratulations! The party reached {} safely.",
                location.name
            );
            self.set_game_over(EndingKind::Arrived, reason);
            return;
        }

        if self.time_remaining <= 0 {
            self.set_game_over(EndingKind::OutOfTime, MSG_OUT_OF_TIME);
            return;
        }

        if !self.has_living_members() {
            self.set_game_over(EndingKind::PartyPerished, MSG_PARTY_PERISHED);
            return;
        }

        if !self.resources.canoe_functional() && !self.canoe_warning_issued {
            self.canoe_warning_issued = true;
            self.log_message(MSG_CANOE_WRECKED_WARNING);
        }
    }

    /// Record the ending; only the first call has any effect.
    pub fn set_game_over(&mut self, kind: EndingKind, reason: impl Into<String>) {
        if self.ending.is_some() {
            return;
        }
        let reason = reason.into();
        info!(
            "journey ended on day {}: {} ({reason})",
            self.current_day,
            kind.key()
        );
        self.log_message(MSG_GAME_OVER);
        self.log_message(reason.clone());
        self.ending = Some(Ending { kind, reason });
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.ending.is_some()
    }

    #[must_use]
    pub fn win_condition_met(&self) -> bool {
        self.ending
            .as_ref()
            .is_some_and(|ending| ending.kind.is_victory())
    }

    /// Reason recorded with the ending, for victories and losses alike.
    #[must_use]
    pub fn end_reason(&self) -> Option<&str> {
        self.ending.as_ref().map(|ending| ending.reason.as_str())
    }

    #[must_use]
    pub const fn ending(&self) -> Option<&Ending> {
        self.ending.as_ref()
    }

    #[must_use]
    pub fn party_summary(&self) -> String {
        if self.party_members.is_empty() {
            return String::from("Party: None");
        }
        let mut lines = vec![String::from("Party Status:")];
        lines.extend(
            self.party_members
                .iter()
                .map(|member| format!("  - {member}")),
        );
        lines.join("\n")
    }

    #[must_use]
    pub fn resource_summary(&self) -> String {
        self.resources.to_string()
    }

    /// Read-only view handed to presentation layers and reports.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let location = self.current_location();
        StateSnapshot {
            day: self.current_day,
            time_remaining: self.time_remaining,
            location_id: self.current_location.clone(),
            location_name: location.map(|loc| loc.name.clone()),
            location_description: location.map(|loc| loc.description.clone()),
            resources: self.resources.clone(),
            party: self.party_members.iter().map(MemberSnapshot::from).collect(),
            game_over: self.is_game_over(),
            win: self.win_condition_met(),
            ending: self.ending.clone(),
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.current_location().map_or("Unknown", |loc| loc.name.as_str());
        writeln!(f, "--- Game State ---")?;
        writeln!(
            f,
            "Day: {}, Time Left: {} days",
            self.current_day, self.time_remaining
        )?;
        writeln!(f, "Location: {location}")?;
        writeln!(f, "{}", self.resource_summary())?;
        writeln!(f, "{}", self.party_summary())?;
        write!(f, "Game Over: {}", self.is_game_over())?;
        if let Some(ending) = &self.ending {
            write!(f, " (Win: {})", ending.kind.is_victory())?;
            write!(f, "\nReason: {}", ending.reason)?;
        }
        write!(f, "\n------------------")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    pub display: String,
    pub health: i32,
    pub max_health: i32,
    pub hunger: i32,
    pub max_hunger: i32,
    pub status: Vec<String>,
    pub alive: bool,
}

impl From<&PartyMember> for MemberSnapshot {
    fn from(member: &PartyMember) -> Self {
        Self {
            name: member.name.clone(),
            display: member.to_string(),
            health: member.health(),
            max_health: member.max_health(),
            hunger: member.hunger(),
            max_hunger: member.max_hunger(),
            status: member
                .status_effects()
                .sorted_names()
                .into_iter()
                .map(String::from)
                .collect(),
            alive: member.is_alive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub day: u32,
    pub time_remaining: i32,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub location_description: Option<String>,
    pub resources: Resources,
    pub party: Vec<MemberSnapshot>,
    pub game_over: bool,
    pub win: bool,
    pub ending: Option<Ending>,
}
