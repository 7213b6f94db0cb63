use log::debug;
use rand::Rng;

use crate::actions::{ActionChoice, ActionOutcome, PlayerAction, available_actions, execute_action};
use crate::config::GameConfig;
use crate::data::WorldData;
use crate::state::{GameState, StateSnapshot};

/// High-level session wrapper binding a configured journey to its state.
#[derive(Debug, Clone)]
pub struct JourneySession {
    config: GameConfig,
    state: GameState,
    quit: bool,
}

impl JourneySession {
    /// Construct a fresh journey through `world`, seeded for exact replay.
    ///
    /// `config.start_location` overrides the world's start when set. A start
    /// id the world does not define ends the journey immediately.
    #[must_use]
    pub fn new(world: &WorldData, config: GameConfig, seed: u64) -> Self {
        let mut state = GameState::new(&config, seed);
        state.set_hazard_table(world.hazards.clone());
        let start = config
            .start_location
            .clone()
            .unwrap_or_else(|| world.start_location.clone());
        state.setup_game(
            world.build_party(),
            world.location_table(),
            world.event_table(),
            &start,
        );
        Self::from_state(state, config)
    }

    /// Build a session around an existing state.
    #[must_use]
    pub const fn from_state(state: GameState, config: GameConfig) -> Self {
        Self {
            config,
            state,
            quit: false,
        }
    }

    /// Execute one action, then roll for a random event if a day passed.
    pub fn perform(&mut self, action: &PlayerAction) -> ActionOutcome {
        let outcome = execute_action(&mut self.state, action);
        if outcome.quit {
            self.quit = true;
        }
        if outcome.advanced_day && !self.state.is_game_over() {
            self.roll_random_event();
        }
        outcome
    }

    /// Parse a text command and perform it.
    pub fn command(&mut self, input: &str) -> ActionOutcome {
        let Ok(action) = input.parse::<PlayerAction>();
        self.perform(&action)
    }

    fn roll_random_event(&mut self) {
        let chance = self.config.random_event_chance;
        if chance <= 0.0 || self.state.events.is_empty() {
            return;
        }
        let roll: f64 = self.state.rng.r#gen();
        if roll >= chance {
            return;
        }
        let pick = self.state.rng.gen_range(0..self.state.events.len());
        let Some(event_id) = self.state.events.keys().nth(pick).cloned() else {
            return;
        };
        debug!("random event {event_id} on day {}", self.state.current_day);
        self.state.trigger_event(&event_id);
        self.state.check_game_over_conditions();
    }

    #[must_use]
    pub fn available_actions(&self) -> Vec<ActionChoice> {
        if self.quit {
            return Vec::new();
        }
        available_actions(&self.state)
    }

    /// Messages produced since the last drain.
    pub fn drain_messages(&mut self) -> Vec<String> {
        self.state.get_and_clear_messages()
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// True once the game is over or the player quit.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.quit || self.state.is_game_over()
    }

    #[must_use]
    pub const fn has_quit(&self) -> bool {
        self.quit
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Borrow the underlying immutable game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the underlying mutable game state.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    /// Consume the session, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazards::HazardTable;
    use crate::state::EndingKind;

    fn world() -> WorldData {
        let mut world = WorldData::bundled().unwrap();
        world.hazards = HazardTable::new();
        world
    }

    #[test]
    fn session_starts_at_the_world_start() {
        let mut session = JourneySession::new(&world(), GameConfig::default(), 4242);
        assert_eq!(session.state().current_location_id(), Some("start_hammock"));
        assert_eq!(session.state().party_members.len(), 3);
        assert_eq!(
            session.drain_messages(),
            vec!["Game started. Party arrives at Shaded Hammock.".to_string()]
        );
        assert!(!session.is_finished());
    }

    #[test]
    fn config_start_override_and_bad_start() {
        let config = GameConfig::default().with_start_location("river_fork");
        let session = JourneySession::new(&world(), config, 1);
        assert_eq!(session.state().current_location_id(), Some("river_fork"));

        let config = GameConfig::default().with_start_location("atlantis");
        let session = JourneySession::new(&world(), config, 1);
        assert!(session.is_finished());
        assert_eq!(
            session.state().ending().unwrap().kind,
            EndingKind::SetupError
        );
    }

    #[test]
    fn calm_route_reaches_the_mound() {
        let mut session = JourneySession::new(&world(), GameConfig::default(), 9);
        for command in [
            "travel paddle east",
            "travel paddle north",
            "travel paddle downstream",
        ] {
            session.command(command);
        }
        assert!(session.is_finished());
        assert!(session.state().win_condition_met());
        assert_eq!(session.state().current_day, 4);
        assert!(session.available_actions().is_empty());
    }

    #[test]
    fn quitting_finishes_without_an_ending() {
        let mut session = JourneySession::new(&world(), GameConfig::default(), 3);
        let outcome = session.command("quit");
        assert!(outcome.quit);
        assert!(session.has_quit());
        assert!(session.is_finished());
        assert!(!session.state().is_game_over());
        assert!(session.available_actions().is_empty());
    }

    #[test]
    fn certain_event_chance_fires_every_day() {
        let config = GameConfig::default().with_event_chance(1.0);
        let mut session = JourneySession::new(&world(), config, 17);
        session.drain_messages();
        session.command("rest");
        let log = session.drain_messages();
        assert!(
            log.iter().any(|line| line.starts_with("--- Event Triggered:")),
            "{log:?}"
        );

        session.command("status");
        let log = session.drain_messages();
        assert!(!log.iter().any(|line| line.starts_with("--- Event Triggered:")));
    }

    #[test]
    fn zero_event_chance_never_fires() {
        let mut session = JourneySession::new(&world(), GameConfig::default(), 17);
        for _ in 0..5 {
            session.command("rest");
        }
        assert!(!session.state().messages().contains("Event Triggered"));
    }

    #[test]
    fn same_seed_same_journey() {
        let play = |seed| {
            let config = GameConfig::default().with_event_chance(0.5);
            let mut session = JourneySession::new(&WorldData::bundled().unwrap(), config, seed);
            let mut transcript = Vec::new();
            for command in ["forage", "travel paddle east", "rest", "travel paddle north"] {
                session.command(command);
                transcript.extend(session.drain_messages());
            }
            (transcript, session.snapshot())
        };
        assert_eq!(play(2024), play(2024));
    }

    #[test]
    fn with_state_mut_reaches_the_state() {
        let mut session = JourneySession::new(&world(), GameConfig::default(), 5);
        session.with_state_mut(|state| state.resources.food = 3);
        assert_eq!(session.state().resources.food, 3);
        let state = session.into_state();
        assert_eq!(state.seed, 5);
    }
}
