//! Tunable starting values for a journey.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_REPAIR_AMOUNT, INITIAL_CANOE_HEALTH, INITIAL_FOOD, INITIAL_TIME_LIMIT,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Days before the disaster strikes.
    #[serde(default = "GameConfig::default_time_limit")]
    pub time_limit: i32,
    #[serde(default = "GameConfig::default_initial_food")]
    pub initial_food: u32,
    /// Starting and maximum canoe integrity.
    #[serde(default = "GameConfig::default_initial_canoe_health")]
    pub initial_canoe_health: u32,
    /// Canoe health restored by one repair.
    #[serde(default = "GameConfig::default_repair_amount")]
    pub repair_amount: u32,
    /// Chance that a random event fires after each day that passes.
    #[serde(default)]
    pub random_event_chance: f64,
    /// Overrides the world's start location when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
}

impl GameConfig {
    #[must_use]
    pub const fn default_time_limit() -> i32 {
        INITIAL_TIME_LIMIT
    }

    #[must_use]
    pub const fn default_initial_food() -> u32 {
        INITIAL_FOOD
    }

    #[must_use]
    pub const fn default_initial_canoe_health() -> u32 {
        INITIAL_CANOE_HEALTH
    }

    #[must_use]
    pub const fn default_repair_amount() -> u32 {
        DEFAULT_REPAIR_AMOUNT
    }

    #[must_use]
    pub fn with_event_chance(mut self, chance: f64) -> Self {
        self.random_event_chance = chance;
        self
    }

    #[must_use]
    pub fn with_start_location(mut self, location_id: impl Into<String>) -> Self {
        self.start_location = Some(location_id.into());
        self
    }

    /// Parse a config from JSON, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any validation error
    /// for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges before a journey starts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit < 1 {
            return Err(ConfigError::MinViolation {
                field: "time_limit",
                min: 1,
                value: i64::from(self.time_limit),
            });
        }
        if self.initial_canoe_health < 1 {
            return Err(ConfigError::MinViolation {
                field: "initial_canoe_health",
                min: 1,
                value: i64::from(self.initial_canoe_health),
            });
        }
        if self.repair_amount < 1 {
            return Err(ConfigError::MinViolation {
                field: "repair_amount",
                min: 1,
                value: i64::from(self.repair_amount),
            });
        }
        if !(0.0..=1.0).contains(&self.random_event_chance) {
            return Err(ConfigError::ProbabilityRange {
                field: "random_event_chance",
                value: self.random_event_chance,
            });
        }
        if self
            .start_location
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(ConfigError::BlankStartLocation);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_limit: Self::default_time_limit(),
            initial_food: Self::default_initial_food(),
            initial_canoe_health: Self::default_initial_canoe_health(),
            repair_amount: Self::default_repair_amount(),
            random_event_chance: 0.0,
            start_location: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} must be between 0.00 and 1.00 (got {value:.2})")]
    ProbabilityRange { field: &'static str, value: f64 },
    #[error("start_location must not be blank")]
    BlankStartLocation,
}
