//! Party members, their vital stats and status effects.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    DAILY_HUNGER_COST, DEFAULT_MAX_HEALTH, DEFAULT_MAX_HUNGER, SICK_DAILY_DAMAGE,
    SNAKEBITTEN_DAILY_DAMAGE, STARVING_DAILY_DAMAGE, STARVING_RELIEF_THRESHOLD,
};
use crate::messages::MessageLog;

/// Known status effects a member can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusEffect {
    Starving,
    Sick,
    Snakebitten,
    Injured,
    Perished,
}

impl StatusEffect {
    /// Every effect, in the order recurring damage is applied.
    pub const ALL: [Self; 5] = [
        Self::Starving,
        Self::Sick,
        Self::Snakebitten,
        Self::Injured,
        Self::Perished,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starving => "starving",
            Self::Sick => "sick",
            Self::Snakebitten => "snakebitten",
            Self::Injured => "injured",
            Self::Perished => "perished",
        }
    }

    /// Damage dealt each day the effect stays active.
    #[must_use]
    pub const fn daily_damage(self) -> i32 {
        match self {
            Self::Starving => STARVING_DAILY_DAMAGE,
            Self::Sick => SICK_DAILY_DAMAGE,
            Self::Snakebitten => SNAKEBITTEN_DAILY_DAMAGE,
            Self::Injured | Self::Perished => 0,
        }
    }
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status effect `{0}`")]
pub struct UnknownStatusEffect(pub String);

impl FromStr for StatusEffect {
    type Err = UnknownStatusEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|effect| effect.as_str() == needle)
            .ok_or_else(|| UnknownStatusEffect(s.to_string()))
    }
}

/// Inline set of status effects; members rarely carry more than a few.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StatusSet(SmallVec<[StatusEffect; 4]>);

impl StatusSet {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    #[must_use]
    pub fn contains(&self, effect: StatusEffect) -> bool {
        self.0.contains(&effect)
    }

    /// Returns true when the effect was not already present.
    pub fn insert(&mut self, effect: StatusEffect) -> bool {
        if self.contains(effect) {
            return false;
        }
        self.0.push(effect);
        true
    }

    /// Returns true when the effect was present.
    pub fn remove(&mut self, effect: StatusEffect) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| *existing != effect);
        self.0.len() != before
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Effects sorted by name, for display.
    #[must_use]
    pub fn sorted_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.0.iter().map(|effect| effect.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = StatusEffect> + '_ {
        self.0.iter().copied()
    }
}

/// A single traveller in the party.
///
/// Deserialized members go through [`PartyMember::with_vitals`], so stored
/// vitals are clamped and a member at zero health is always `Perished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMember")]
pub struct PartyMember {
    pub name: String,
    max_health: i32,
    max_hunger: i32,
    health: i32,
    /// Fullness; zero means starving.
    hunger: i32,
    #[serde(default)]
    status_effects: StatusSet,
}

#[derive(Deserialize)]
struct StoredMember {
    name: String,
    max_health: i32,
    max_hunger: i32,
    health: i32,
    hunger: i32,
    #[serde(default)]
    status_effects: StatusSet,
}

impl From<StoredMember> for PartyMember {
    fn from(stored: StoredMember) -> Self {
        let mut member = Self::with_vitals(
            stored.name,
            stored.max_health,
            stored.max_hunger,
            Some(stored.health),
            Some(stored.hunger),
        );
        // `Perished` follows health alone.
        for effect in stored.status_effects.iter() {
            if effect != StatusEffect::Perished {
                member.status_effects.insert(effect);
            }
        }
        member
    }
}

impl PartyMember {
    /// Create a member at full health and fullness.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_vitals(name, DEFAULT_MAX_HEALTH, DEFAULT_MAX_HUNGER, None, None)
    }

    /// Create a member with explicit maxima and optional starting values,
    /// clamped into range.
    #[must_use]
    pub fn with_vitals(
        name: impl Into<String>,
        max_health: i32,
        max_hunger: i32,
        health: Option<i32>,
        hunger: Option<i32>,
    ) -> Self {
        let max_health = max_health.max(1);
        let max_hunger = max_hunger.max(1);
        let health = health.unwrap_or(max_health).clamp(0, max_health);
        let hunger = hunger.unwrap_or(max_hunger).clamp(0, max_hunger);
        let mut status_effects = StatusSet::new();
        if health == 0 {
            status_effects.insert(StatusEffect::Perished);
        }
        Self {
            name: name.into(),
            max_health,
            max_hunger,
            health,
            hunger,
            status_effects,
        }
    }

    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    #[must_use]
    pub const fn max_hunger(&self) -> i32 {
        self.max_hunger
    }

    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    #[must_use]
    pub const fn hunger(&self) -> i32 {
        self.hunger
    }

    #[must_use]
    pub const fn status_effects(&self) -> &StatusSet {
        &self.status_effects
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: i32, log: &mut MessageLog) {
        if amount <= 0 || !self.is_alive() {
            return;
        }
        self.health = (self.health - amount).max(0);
        log.push(format!(
            "{} takes {amount} damage. Health: {}/{}",
            self.name, self.health, self.max_health
        ));

        if !self.is_alive() && !self.has_status_effect(StatusEffect::Perished) {
            log.push(format!("{} has perished.", self.name));
            self.add_status_effect(StatusEffect::Perished, log);
        }
    }

    pub fn heal(&mut self, amount: i32, log: &mut MessageLog) {
        if amount <= 0 || !self.is_alive() {
            return;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        if self.health > before {
            log.push(format!(
                "{} heals {amount} HP. Health: {}/{}",
                self.name, self.health, self.max_health
            ));
        }
    }

    pub fn change_hunger(&mut self, delta: i32, log: &mut MessageLog) {
        if !self.is_alive() {
            return;
        }
        let was_starving = self.has_status_effect(StatusEffect::Starving);
        self.hunger = self.hunger.saturating_add(delta).clamp(0, self.max_hunger);

        if self.hunger <= 0 && !was_starving {
            self.add_status_effect(StatusEffect::Starving, log);
            log.push(format!("{} is starving!", self.name));
        } else if self.hunger > STARVING_RELIEF_THRESHOLD && was_starving {
            self.remove_status_effect(StatusEffect::Starving, log);
            log.push(format!("{} is no longer starving.", self.name));
        }
    }

    pub fn add_status_effect(&mut self, effect: StatusEffect, log: &mut MessageLog) {
        if !self.is_alive() && effect != StatusEffect::Perished {
            return;
        }
        if self.status_effects.insert(effect) {
            log.push(format!("{} gains status: {effect}", self.name));
        }
    }

    pub fn remove_status_effect(&mut self, effect: StatusEffect, log: &mut MessageLog) {
        if self.status_effects.remove(effect) {
            log.push(format!("{} loses status: {effect}", self.name));
        }
    }

    #[must_use]
    pub fn has_status_effect(&self, effect: StatusEffect) -> bool {
        self.status_effects.contains(effect)
    }

    /// Daily metabolism followed by recurring status damage.
    pub fn apply_daily_effects(&mut self, log: &mut MessageLog) {
        if !self.is_alive() {
            return;
        }
        self.change_hunger(-DAILY_HUNGER_COST, log);

        for effect in StatusEffect::ALL {
            let damage = effect.daily_damage();
            if damage > 0 && self.has_status_effect(effect) {
                self.take_damage(damage, log);
            }
        }
    }
}

impl fmt::Display for PartyMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_alive() {
            return write!(f, "{} (Perished)", self.name);
        }
        let status = if self.status_effects.is_empty() {
            String::from("Healthy")
        } else {
            self.status_effects.sorted_names().join(", ")
        };
        write!(
            f,
            "{} (HP: {}/{}, Hunger: {}/{}, Status: {status})",
            self.name, self.health, self.max_health, self.hunger, self.max_hunger
        )
    }
}
