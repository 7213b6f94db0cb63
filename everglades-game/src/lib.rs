//! Everglades Escape Game Engine
//!
//! Platform-agnostic core logic for a turn-based survival journey through the
//! Everglades: a party, a canoe and a countdown to reach the coast.
//! Rendering and input are left to callers; everything here is pure state.

pub mod actions;
pub mod config;
pub mod constants;
pub mod data;
pub mod events;
pub mod hazards;
pub mod messages;
pub mod party;
pub mod session;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use actions::{ActionChoice, ActionOutcome, PlayerAction, available_actions, execute_action};
pub use config::{ConfigError, GameConfig};
pub use data::{BundledWorld, JsonWorld, MemberSpec, WorldData, WorldDataError};
pub use events::{EventCategory, EventEffect, EventTable, GameEvent, standard_events};
pub use hazards::{HazardDef, HazardEffect, HazardTable, resolve_travel_hazards};
pub use messages::MessageLog;
pub use party::{PartyMember, StatusEffect, StatusSet};
pub use session::JourneySession;
pub use state::{Ending, EndingKind, GameState, MemberSnapshot, Resources, StateSnapshot};
pub use world::{Connection, Location, LocationTable};

use thiserror::Error;

/// Source of world definitions (bundled asset, file, network, ...).
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and parse the world definition
    ///
    /// # Errors
    ///
    /// Returns an error if the world data cannot be loaded or parsed.
    fn load_world(&self) -> Result<WorldData, Self::Error>;
}

#[derive(Debug, Error)]
pub enum EngineError<E> {
    #[error("failed to load world data")]
    Load(#[source] E),
    #[error(transparent)]
    World(#[from] WorldDataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Main game engine for starting journeys
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
    config: GameConfig,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new engine with the default configuration
    pub fn new(data_loader: L) -> Self {
        Self::with_config(data_loader, GameConfig::default())
    }

    pub const fn with_config(data_loader: L, config: GameConfig) -> Self {
        Self {
            data_loader,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a new journey and return its bare state
    ///
    /// # Errors
    ///
    /// Returns an error if the world cannot be loaded or fails validation.
    pub fn create_game(&self, seed: u64) -> Result<GameState, EngineError<L::Error>> {
        self.create_session(seed).map(JourneySession::into_state)
    }

    /// Construct a new journey session over freshly loaded world data.
    ///
    /// # Errors
    ///
    /// Returns an error if the world cannot be loaded, the world fails
    /// validation, or the configuration is out of range.
    pub fn create_session(&self, seed: u64) -> Result<JourneySession, EngineError<L::Error>> {
        self.config.validate()?;
        let world = self.data_loader.load_world().map_err(EngineError::Load)?;
        world.validate()?;
        Ok(JourneySession::new(&world, self.config.clone(), seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_world(&self) -> Result<WorldData, Self::Error> {
            Ok(WorldData {
                start_location: "dock".into(),
                locations: vec![
                    Location::new("dock", "Dock", "").connect("trek out", "shore"),
                    Location::new("shore", "Shore", "").destination(),
                ],
                events: Vec::new(),
                hazards: HazardTable::new(),
                party: vec![MemberSpec {
                    name: "Kai".into(),
                    max_health: 100,
                    max_hunger: 100,
                    health: None,
                    hunger: None,
                }],
            })
        }
    }

    #[test]
    fn engine_creates_sessions_from_loader() {
        let engine = GameEngine::new(FixtureLoader);
        let mut session = engine.create_session(0xABCD).unwrap();
        session.command("travel trek out");
        assert!(session.state().win_condition_met());
        assert_eq!(session.state().seed, 0xABCD);
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let engine = GameEngine::with_config(
            FixtureLoader,
            GameConfig::default().with_event_chance(2.0),
        );
        assert!(matches!(
            engine.create_session(1),
            Err(EngineError::Config(ConfigError::ProbabilityRange { .. }))
        ));
    }

    #[test]
    fn bundled_engine_starts_at_the_hammock() {
        let engine = GameEngine::new(BundledWorld);
        let state = engine.create_game(7).unwrap();
        assert_eq!(state.current_location_id(), Some("start_hammock"));
        assert!(!state.is_game_over());
    }

    #[test]
    fn loader_errors_are_wrapped() {
        let engine = GameEngine::new(JsonWorld(String::from("not json")));
        let err = engine.create_game(1).unwrap_err();
        assert!(matches!(err, EngineError::Load(WorldDataError::Parse(_))));
        assert_eq!(err.to_string(), "failed to load world data");
    }
}
