//! Hazard table and per-departure hazard resolution.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    ALLIGATOR_CHANCE, ALLIGATOR_DAMAGE, DIFFICULT_TERRAIN_CHANCE, HAZARD_ALLIGATOR,
    HAZARD_DIFFICULT_TERRAIN, HAZARD_SNAKES, HAZARD_SUBMERGED_LOGS, SNAKES_CHANCE, SNAKES_DAMAGE,
    SUBMERGED_LOGS_CHANCE, SUBMERGED_LOGS_DAMAGE,
};
use crate::party::StatusEffect;
use crate::state::GameState;

/// What a hazard does once it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HazardEffect {
    /// Damages the canoe by an amount sampled from `min..=max`.
    Vehicle { min: u32, max: u32 },
    /// Damages one living member and leaves them injured.
    Person { min: u32, max: u32 },
    /// Flavour only.
    Terrain { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardDef {
    /// Chance in `[0, 1]` that the hazard fires on a departure.
    pub probability: f32,
    pub effect: HazardEffect,
}

impl HazardDef {
    #[must_use]
    pub const fn vehicle(probability: f32, (min, max): (u32, u32)) -> Self {
        Self {
            probability,
            effect: HazardEffect::Vehicle { min, max },
        }
    }

    #[must_use]
    pub const fn person(probability: f32, (min, max): (u32, u32)) -> Self {
        Self {
            probability,
            effect: HazardEffect::Person { min, max },
        }
    }

    #[must_use]
    pub fn terrain(probability: f32, message: impl Into<String>) -> Self {
        Self {
            probability,
            effect: HazardEffect::Terrain {
                message: message.into(),
            },
        }
    }
}

/// Hazard definitions keyed by the tag locations carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HazardTable(BTreeMap<String, HazardDef>);

impl HazardTable {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The swamp's standard dangers.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(
                HAZARD_SUBMERGED_LOGS,
                HazardDef::vehicle(SUBMERGED_LOGS_CHANCE, SUBMERGED_LOGS_DAMAGE),
            )
            .with(
                HAZARD_ALLIGATOR,
                HazardDef::person(ALLIGATOR_CHANCE, ALLIGATOR_DAMAGE),
            )
            .with(HAZARD_SNAKES, HazardDef::person(SNAKES_CHANCE, SNAKES_DAMAGE))
            .with(
                HAZARD_DIFFICULT_TERRAIN,
                HazardDef::terrain(
                    DIFFICULT_TERRAIN_CHANCE,
                    "Travel through difficult terrain was strenuous.",
                ),
            )
    }

    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, def: HazardDef) -> Self {
        self.0.insert(tag.into(), def);
        self
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&HazardDef> {
        self.0.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HazardDef)> {
        self.0.iter().map(|(tag, def)| (tag.as_str(), def))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

fn sample<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    rng.gen_range(min.min(max)..=min.max(max))
}

/// Roll every hazard of the current location once, applying those that fire.
///
/// Each tag is rolled independently, so several may fire on the same
/// departure. Tags missing from the state's hazard table never fire.
pub fn resolve_travel_hazards(state: &mut GameState) {
    if !state.has_living_members() {
        return;
    }
    let Some(location) = state.current_location() else {
        return;
    };
    let location_id = location.location_id.clone();
    let hazards = location.hazards.clone();

    for tag in hazards {
        let Some(def) = state.hazard_table.get(&tag).cloned() else {
            debug!("hazard `{tag}` at {location_id} has no definition; skipping");
            continue;
        };
        let roll: f32 = state.rng.r#gen();
        debug!(
            "hazard roll {tag} at {location_id}: {roll:.3} vs {:.3}",
            def.probability
        );
        if roll >= def.probability {
            continue;
        }
        // An earlier hazard may have killed the last member.
        if matches!(def.effect, HazardEffect::Person { .. }) && !state.has_living_members() {
            continue;
        }
        state.log_message(format!("Hazard encountered: {}!", capitalize(&tag)));
        apply_hazard(state, &tag, &def.effect);
    }
}

fn apply_hazard(state: &mut GameState, tag: &str, effect: &HazardEffect) {
    match effect {
        HazardEffect::Vehicle { min, max } => {
            let damage = sample(&mut state.rng, *min, *max);
            if state.resources.canoe_health == 0 {
                return;
            }
            let health = state.resources.damage_canoe(damage);
            state.log_message(format!(
                "The canoe strikes {tag}, taking {damage} damage! Health: {health}"
            ));
            if health == 0 {
                state.log_message("The canoe is critically damaged and unusable!");
            }
        }
        HazardEffect::Person { min, max } => {
            let damage = i32::try_from(sample(&mut state.rng, *min, *max)).unwrap_or(i32::MAX);
            let Some(idx) = state.random_living_member() else {
                return;
            };
            state.log_message(format!("A {tag} attacks!"));
            let member = &mut state.party_members[idx];
            member.take_damage(damage, &mut state.messages);
            member.add_status_effect(StatusEffect::Injured, &mut state.messages);
        }
        HazardEffect::Terrain { message } => {
            state.log_message(message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::events::EventTable;
    use crate::messages::MessageLog;
    use crate::party::PartyMember;
    use crate::world::{Location, LocationTable};

    fn state_at(location: Location, table: HazardTable, seed: u64) -> GameState {
        let mut locations = LocationTable::new();
        let id = location.location_id.clone();
        locations.insert(id.clone(), location);
        let mut state = GameState::new(&GameConfig::default(), seed);
        state.set_hazard_table(table);
        state.setup_game(
            vec![PartyMember::new("Api"), PartyMember::new("Nokomis")],
            locations,
            EventTable::new(),
            &id,
        );
        state.get_and_clear_messages();
        state
    }

    #[test]
    fn certain_vehicle_hazard_damages_within_range() {
        for seed in 0..32 {
            let table = HazardTable::new().with("logs", HazardDef::vehicle(1.0, (5, 15)));
            let location = Location::new("slough", "Slough", "").with_hazard("logs");
            let mut state = state_at(location, table, seed);

            resolve_travel_hazards(&mut state);

            let lost = 100 - state.resources.canoe_health;
            assert!((5..=15).contains(&lost), "seed {seed} lost {lost}");
            let log = state.get_and_clear_messages();
            assert_eq!(log[0], "Hazard encountered: Logs!");
        }
    }

    #[test]
    fn vehicle_hazard_never_drops_below_zero() {
        let table = HazardTable::new().with("logs", HazardDef::vehicle(1.0, (40, 40)));
        let location = Location::new("slough", "Slough", "").with_hazard("logs");
        let mut state = state_at(location, table, 3);
        state.resources.canoe_health = 25;

        resolve_travel_hazards(&mut state);
        assert_eq!(state.resources.canoe_health, 0);
        assert!(state.messages.contains("critically damaged"));

        state.get_and_clear_messages();
        resolve_travel_hazards(&mut state);
        assert_eq!(state.resources.canoe_health, 0);
        assert_eq!(
            state.get_and_clear_messages(),
            vec!["Hazard encountered: Logs!".to_string()]
        );
    }

    #[test]
    fn person_hazard_injures_one_living_member() {
        let table = HazardTable::new().with("alligator", HazardDef::person(1.0, (15, 30)));
        let location = Location::new("fork", "Fork", "").with_hazard("alligator");
        let mut state = state_at(location, table, 11);

        resolve_travel_hazards(&mut state);

        let injured: Vec<_> = state
            .party_members
            .iter()
            .filter(|m| m.has_status_effect(StatusEffect::Injured))
            .collect();
        assert_eq!(injured.len(), 1);
        let lost = 100 - injured[0].health();
        assert!((15..=30).contains(&lost));
        assert!(state.messages.contains("A alligator attacks!"));
    }

    #[test]
    fn hazards_are_skipped_when_nobody_is_alive() {
        let table = HazardTable::new()
            .with("logs", HazardDef::vehicle(1.0, (5, 15)))
            .with("alligator", HazardDef::person(1.0, (15, 30)));
        let location = Location::new("fork", "Fork", "")
            .with_hazard("logs")
            .with_hazard("alligator");
        let mut state = state_at(location, table, 4);
        let mut log = MessageLog::new();
        for member in &mut state.party_members {
            member.take_damage(500, &mut log);
        }

        resolve_travel_hazards(&mut state);
        assert_eq!(state.resources.canoe_health, 100);
        assert!(state.get_and_clear_messages().is_empty());
    }

    #[test]
    fn person_hazard_after_the_last_death_stays_silent() {
        let table = HazardTable::new()
            .with("alligator", HazardDef::person(1.0, (200, 200)))
            .with("snakes", HazardDef::person(1.0, (10, 20)));
        let location = Location::new("fork", "Fork", "")
            .with_hazard("alligator")
            .with_hazard("snakes");
        let mut state = state_at(location, table, 9);
        state.party_members.truncate(1);

        resolve_travel_hazards(&mut state);
        assert!(!state.has_living_members());
        let log = state.get_and_clear_messages();
        assert!(log.contains(&"Hazard encountered: Alligator!".to_string()));
        assert!(!log.iter().any(|line| line.contains("Snakes")));
    }

    #[test]
    fn impossible_and_unknown_hazards_never_fire() {
        let table = HazardTable::new()
            .with("logs", HazardDef::vehicle(0.0, (5, 15)))
            .with("mist", HazardDef::terrain(0.0, "Fog rolls in."));
        let location = Location::new("marsh", "Marsh", "")
            .with_hazard("logs")
            .with_hazard("mist")
            .with_hazard("quicksand");
        let mut state = state_at(location, table, 5);

        resolve_travel_hazards(&mut state);
        assert_eq!(state.resources.canoe_health, 100);
        assert!(state.get_and_clear_messages().is_empty());
    }

    #[test]
    fn multiple_hazards_fire_independently() {
        let table = HazardTable::new()
            .with("logs", HazardDef::vehicle(1.0, (1, 1)))
            .with("mud", HazardDef::terrain(1.0, "The mud sucks at your boots."));
        let location = Location::new("marsh", "Marsh", "")
            .with_hazard("logs")
            .with_hazard("mud");
        let mut state = state_at(location, table, 8);

        resolve_travel_hazards(&mut state);
        let log = state.get_and_clear_messages();
        assert_eq!(state.resources.canoe_health, 99);
        assert!(log.contains(&"Hazard encountered: Mud!".to_string()));
        assert!(log.contains(&"The mud sucks at your boots.".to_string()));
    }

    #[test]
    fn standard_table_matches_tuning() {
        let table = HazardTable::standard();
        assert_eq!(table.len(), 4);
        let logs = table.get("submerged logs").unwrap();
        assert_eq!(logs.effect, HazardEffect::Vehicle { min: 5, max: 15 });
        assert!(matches!(
            table.get("difficult terrain").unwrap().effect,
            HazardEffect::Terrain { .. }
        ));
    }

    #[test]
    fn hazard_effects_parse_from_json() {
        let json = r#"{
            "sawgrass": { "probability": 0.3, "effect": { "kind": "person", "min": 2, "max": 4 } }
        }"#;
        let table: HazardTable = serde_json::from_str(json).unwrap();
        assert_eq!(
            table.get("sawgrass").unwrap().effect,
            HazardEffect::Person { min: 2, max: 4 }
        );
    }
}
