//! World data: locations, events, hazards and the starting party as JSON.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::DataLoader;
use crate::constants::{DEFAULT_MAX_HEALTH, DEFAULT_MAX_HUNGER};
use crate::events::{EventTable, GameEvent};
use crate::hazards::{HazardEffect, HazardTable};
use crate::party::PartyMember;
use crate::world::{Location, LocationTable};

const BUNDLED_WORLD: &str = include_str!("../assets/everglades.json");

/// Starting description of one party member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpec {
    pub name: String,
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    #[serde(default = "default_max_hunger")]
    pub max_hunger: i32,
    /// Starting health; defaults to `max_health`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    /// Starting hunger; defaults to `max_hunger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger: Option<i32>,
}

const fn default_max_health() -> i32 {
    DEFAULT_MAX_HEALTH
}

const fn default_max_hunger() -> i32 {
    DEFAULT_MAX_HUNGER
}

impl MemberSpec {
    #[must_use]
    pub fn into_member(self) -> PartyMember {
        PartyMember::with_vitals(
            self.name,
            self.max_health,
            self.max_hunger,
            self.health,
            self.hunger,
        )
    }
}

/// Everything needed to start a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    pub start_location: String,
    pub locations: Vec<Location>,
    #[serde(default)]
    pub events: Vec<GameEvent>,
    #[serde(default = "HazardTable::standard")]
    pub hazards: HazardTable,
    #[serde(default)]
    pub party: Vec<MemberSpec>,
}

impl WorldData {
    /// Parse world data from JSON without validating it.
    ///
    /// # Errors
    ///
    /// Returns `WorldDataError::Parse` if the JSON does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, WorldDataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The Everglades world shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled asset fails to parse or validate.
    pub fn bundled() -> Result<Self, WorldDataError> {
        let world = Self::from_json(BUNDLED_WORLD)?;
        world.validate()?;
        Ok(world)
    }

    /// Check referential integrity of the world graph.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: duplicate ids, dangling connections,
    /// an unknown start, a world without a destination, no party, or a
    /// malformed hazard definition.
    pub fn validate(&self) -> Result<(), WorldDataError> {
        let mut ids = BTreeSet::new();
        for location in &self.locations {
            if !ids.insert(location.location_id.as_str()) {
                return Err(WorldDataError::DuplicateLocation(
                    location.location_id.clone(),
                ));
            }
        }

        let mut event_ids = BTreeSet::new();
        for event in &self.events {
            if !event_ids.insert(event.event_id.as_str()) {
                return Err(WorldDataError::DuplicateEvent(event.event_id.clone()));
            }
        }

        for location in &self.locations {
            for connection in &location.connections {
                if !ids.contains(connection.to.as_str()) {
                    return Err(WorldDataError::UnknownDestination {
                        from: location.location_id.clone(),
                        action: connection.action.clone(),
                        to: connection.to.clone(),
                    });
                }
            }
        }

        if !ids.contains(self.start_location.as_str()) {
            return Err(WorldDataError::UnknownStartLocation(
                self.start_location.clone(),
            ));
        }
        if !self.locations.iter().any(|location| location.is_destination) {
            return Err(WorldDataError::NoDestination);
        }
        if self.party.is_empty() {
            return Err(WorldDataError::EmptyParty);
        }

        for (tag, def) in self.hazards.iter() {
            let malformed = !(0.0..=1.0).contains(&def.probability)
                || matches!(
                    def.effect,
                    HazardEffect::Vehicle { min, max } | HazardEffect::Person { min, max } if min > max
                );
            if malformed {
                return Err(WorldDataError::InvalidHazard(tag.to_string()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn location_table(&self) -> LocationTable {
        self.locations
            .iter()
            .map(|location| (location.location_id.clone(), location.clone()))
            .collect()
    }

    #[must_use]
    pub fn event_table(&self) -> EventTable {
        self.events
            .iter()
            .map(|event| (event.event_id.clone(), event.clone()))
            .collect()
    }

    #[must_use]
    pub fn build_party(&self) -> Vec<PartyMember> {
        self.party
            .iter()
            .cloned()
            .map(MemberSpec::into_member)
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum WorldDataError {
    #[error("world data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("location id `{0}` is defined more than once")]
    DuplicateLocation(String),
    #[error("event id `{0}` is defined more than once")]
    DuplicateEvent(String),
    #[error("connection `{action}` from `{from}` leads to unknown location `{to}`")]
    UnknownDestination {
        from: String,
        action: String,
        to: String,
    },
    #[error("start location `{0}` is not defined")]
    UnknownStartLocation(String),
    #[error("world has no destination location")]
    NoDestination,
    #[error("world defines no party members")]
    EmptyParty,
    #[error("hazard `{0}` has an invalid probability or damage range")]
    InvalidHazard(String),
}

/// Loads the world compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledWorld;

impl DataLoader for BundledWorld {
    type Error = WorldDataError;

    fn load_world(&self) -> Result<WorldData, Self::Error> {
        WorldData::bundled()
    }
}

/// Loads a world from a JSON string held in memory.
#[derive(Debug, Clone)]
pub struct JsonWorld(pub String);

impl DataLoader for JsonWorld {
    type Error = WorldDataError;

    fn load_world(&self) -> Result<WorldData, Self::Error> {
        let world = WorldData::from_json(&self.0)?;
        world.validate()?;
        Ok(world)
    }
}
