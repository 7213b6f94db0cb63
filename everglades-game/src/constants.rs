//! Centralized balance and tuning constants for Everglades Escape.
//!
//! These values define the deterministic math of the day cycle, the hazard
//! table and the standard events. Starting values that a front end may want
//! to tweak live in [`crate::config::GameConfig`] instead.

// Party members ------------------------------------------------------------
pub const DEFAULT_MAX_HEALTH: i32 = 100;
pub const DEFAULT_MAX_HUNGER: i32 = 100;
/// Fullness lost by every living member at the start of each day.
pub const DAILY_HUNGER_COST: i32 = 10;
/// Hunger must climb above this value before `starving` clears.
pub const STARVING_RELIEF_THRESHOLD: i32 = 10;
pub const STARVING_DAILY_DAMAGE: i32 = 12;
pub const SICK_DAILY_DAMAGE: i32 = 3;
pub const SNAKEBITTEN_DAILY_DAMAGE: i32 = 8;

// Daily consumption --------------------------------------------------------
pub const FOOD_CONSUMED_PER_MEMBER: u32 = 1;
pub const HUNGER_RESTORED_PER_FOOD: i32 = 10;

// Starting values ----------------------------------------------------------
pub const INITIAL_TIME_LIMIT: i32 = 30;
pub const INITIAL_FOOD: u32 = 20;
pub const INITIAL_CANOE_HEALTH: u32 = 100;
pub const DEFAULT_REPAIR_AMOUNT: u32 = 20;

// Camp actions -------------------------------------------------------------
pub const FORAGE_FOOD_MIN: u32 = 1;
pub const FORAGE_FOOD_MAX: u32 = 5;
pub const REPAIR_MATERIAL_COST: u32 = 1;

// Standard hazards ---------------------------------------------------------
pub const HAZARD_SUBMERGED_LOGS: &str = "submerged logs";
pub const HAZARD_ALLIGATOR: &str = "alligator";
pub const HAZARD_SNAKES: &str = "snakes";
pub const HAZARD_DIFFICULT_TERRAIN: &str = "difficult terrain";
pub const SUBMERGED_LOGS_CHANCE: f32 = 0.25;
pub const SUBMERGED_LOGS_DAMAGE: (u32, u32) = (5, 15);
pub const ALLIGATOR_CHANCE: f32 = 0.15;
pub const ALLIGATOR_DAMAGE: (u32, u32) = (15, 30);
pub const SNAKES_CHANCE: f32 = 0.20;
pub const SNAKES_DAMAGE: (u32, u32) = (10, 20);
pub const DIFFICULT_TERRAIN_CHANCE: f32 = 0.10;

// Standard events ----------------------------------------------------------
pub const STORM_CANOE_DAMAGE: (u32, u32) = (5, 25);
pub const STORM_INJURY_CHANCE: f64 = 0.3;
pub const STORM_INJURY_DAMAGE: (i32, i32) = (1, 10);
pub const BERRIES_FOOD_GAIN: (u32, u32) = (3, 8);
pub const BERRIES_SICKNESS_CHANCE: f64 = 0.05;
pub const SNAKE_BITE_DAMAGE: (i32, i32) = (10, 25);

// Messages -----------------------------------------------------------------
pub(crate) const MSG_GAME_OVER: &str = "--- GAME OVER ---";
pub(crate) const MSG_OUT_OF_TIME: &str = "The impending disaster arrived... you ran out of time.";
pub(crate) const MSG_PARTY_PERISHED: &str = "The entire party has perished in the Everglades.";
pub(crate) const MSG_SETUP_ERROR: &str = "Game setup error: Invalid start location.";
pub(crate) const MSG_CANOE_WRECKED_WARNING: &str = "Warning: The canoe is destroyed!";
