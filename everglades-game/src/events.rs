//! Triggerable story events and their effects.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    BERRIES_FOOD_GAIN, BERRIES_SICKNESS_CHANCE, SNAKE_BITE_DAMAGE, STORM_CANOE_DAMAGE,
    STORM_INJURY_CHANCE, STORM_INJURY_DAMAGE,
};
use crate::party::StatusEffect;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Weather,
    Wildlife,
    Navigation,
    Resource,
}

impl EventCategory {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weather => "Weather",
            Self::Wildlife => "Wildlife",
            Self::Navigation => "Navigation",
            Self::Resource => "Resource",
        }
    }
}

/// Closed set of event effects. Every random draw comes from the state's RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventEffect {
    Storm,
    Berries,
    SnakeBite,
}

impl EventEffect {
    /// Mutate the state and describe what happened.
    pub fn apply(self, state: &mut GameState) -> String {
        match self {
            Self::Storm => sudden_storm(state),
            Self::Berries => found_berries(state),
            Self::SnakeBite => snake_bite(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: EventCategory,
    pub effect: EventEffect,
}

impl GameEvent {
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: EventCategory,
        effect: EventEffect,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            name: name.into(),
            description: description.into(),
            category,
            effect,
        }
    }

    /// Announce the event, apply its effect and log the outcome.
    pub fn trigger(&self, state: &mut GameState) -> String {
        state.log_message(format!("--- Event Triggered: {} ---", self.name));
        state.log_message(self.description.clone());
        let outcome = self.effect.apply(state);
        state.log_message(format!("Outcome: {outcome}"));
        outcome
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.name,
            self.category.label(),
            self.event_id
        )
    }
}

/// Event table keyed by id.
pub type EventTable = BTreeMap<String, GameEvent>;

fn sudden_storm(state: &mut GameState) -> String {
    let (min, max) = STORM_CANOE_DAMAGE;
    let canoe_damage = state.rng.gen_range(min..=max);
    let mut parts = Vec::new();

    if state.resources.canoe_functional() {
        let health = state.resources.damage_canoe(canoe_damage);
        parts.push(format!(
            "The canoe is battered, taking {canoe_damage} damage (Health: {health})."
        ));
        if health == 0 {
            parts.push(String::from("The canoe is destroyed!"));
        }
    } else {
        parts.push(String::from(
            "The storm rages, but the canoe is already broken.",
        ));
    }

    if state.has_living_members()
        && state.rng.gen_bool(STORM_INJURY_CHANCE)
        && let Some(idx) = state.random_living_member()
    {
        let (min, max) = STORM_INJURY_DAMAGE;
        let damage = state.rng.gen_range(min..=max);
        let member = &mut state.party_members[idx];
        member.take_damage(damage, &mut state.messages);
        member.add_status_effect(StatusEffect::Injured, &mut state.messages);
        parts.push(format!("{} is injured amidst the chaos!", member.name));
    }

    format!("A sudden thunderstorm hits! {}", parts.join(" "))
}

fn found_berries(state: &mut GameState) -> String {
    let (min, max) = BERRIES_FOOD_GAIN;
    let food_gain = state.rng.gen_range(min..=max);
    state.resources.food = state.resources.food.saturating_add(food_gain);
    let mut message =
        format!("You stumble upon a patch of ripe berries! Gained {food_gain} food.");

    if state.has_living_members()
        && state.rng.gen_bool(BERRIES_SICKNESS_CHANCE)
        && let Some(idx) = state.random_living_member()
    {
        let member = &mut state.party_members[idx];
        member.add_status_effect(StatusEffect::Sick, &mut state.messages);
        message.push_str(&format!(
            " Unfortunately, {} feels sick after eating them.",
            member.name
        ));
    }
    message
}

fn snake_bite(state: &mut GameState) -> String {
    let Some(idx) = state.random_living_member() else {
        return String::from("A venomous snake lunges, but there's no one left to bite.");
    };
    let (min, max) = SNAKE_BITE_DAMAGE;
    let damage = state.rng.gen_range(min..=max);
    let member = &mut state.party_members[idx];
    let message = format!(
        "Rustling in the undergrowth! A venomous snake bites {}!",
        member.name
    );
    member.take_damage(damage, &mut state.messages);
    member.add_status_effect(StatusEffect::Snakebitten, &mut state.messages);
    message
}

/// The three stock events of the swamp.
#[must_use]
pub fn standard_events() -> EventTable {
    [
        GameEvent::new(
            "storm_01",
            "Sudden Thunderstorm",
            "Dark clouds gather rapidly...",
            EventCategory::Weather,
            EventEffect::Storm,
        ),
        GameEvent::new(
            "find_berries_01",
            "Berry Patch",
            "You spot some edible-looking berries...",
            EventCategory::Resource,
            EventEffect::Berries,
        ),
        GameEvent::new(
            "snake_bite_01",
            "Snake Attack!",
            "Rustling in the undergrowth!",
            EventCategory::Wildlife,
            EventEffect::SnakeBite,
        ),
    ]
    .into_iter()
    .map(|event| (event.event_id.clone(), event))
    .collect()
}
