use anyhow::{Context, Result, bail};
use everglades_game::{GameConfig, JourneySession, WorldData};
use log::{debug, trace};
use serde::Serialize;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

/// Configuration for one automated playthrough.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_turns: u32,
    pub event_chance: f64,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_turns: 200,
            event_chance: 0.0,
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub const fn with_event_chance(mut self, event_chance: f64) -> Self {
        self.event_chance = event_chance;
        self
    }
}

/// Final facts about one playthrough.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: String,
    pub turns: u32,
    pub days: u32,
    /// Ending key, or `quit`.
    pub outcome: String,
    pub won: bool,
    pub survivors: usize,
    pub food_left: u32,
    pub canoe_health: u32,
    pub reason: Option<String>,
    pub final_location: Option<String>,
}

/// Play one journey to completion with the configured strategy.
///
/// # Errors
///
/// Fails when the configuration is invalid or the journey is still running
/// after `max_turns` actions.
pub fn run_simulation(world: &WorldData, config: SimulationConfig, verbose: bool) -> Result<RunRecord> {
    let game_config = GameConfig::default().with_event_chance(config.event_chance);
    game_config
        .validate()
        .context("invalid simulation configuration")?;

    let mut session = JourneySession::new(world, game_config, config.seed);
    let mut policy = config.strategy.create_policy(config.seed);
    let turns = play(&mut session, policy.as_mut(), config.max_turns, verbose);

    if !session.is_finished() {
        bail!(
            "{} seed {} still running after {} turns",
            config.strategy.key(),
            config.seed,
            config.max_turns
        );
    }

    let state = session.state();
    let outcome = state
        .ending()
        .map_or("quit", |ending| ending.kind.key())
        .to_string();
    debug!(
        "{} seed {} finished: {outcome} on day {}",
        config.strategy.key(),
        config.seed,
        state.current_day
    );
    Ok(RunRecord {
        seed: config.seed,
        strategy: config.strategy.key().to_string(),
        turns,
        days: state.current_day,
        outcome,
        won: state.win_condition_met(),
        survivors: state.living_members(),
        food_left: state.resources.food,
        canoe_health: state.resources.canoe_health,
        reason: state.end_reason().map(str::to_string),
        final_location: state.current_location_id().map(str::to_string),
    })
}

fn play(
    session: &mut JourneySession,
    policy: &mut dyn PlayerPolicy,
    max_turns: u32,
    verbose: bool,
) -> u32 {
    let mut turns = 0;
    while !session.is_finished() && turns < max_turns {
        turns += 1;
        let menu = session.available_actions();
        let decision = policy.pick_action(session.state(), &menu);
        trace!(
            "turn {turns} [{}]: {} ({})",
            policy.name(),
            decision.action,
            decision.rationale.as_deref().unwrap_or("-")
        );
        session.perform(&decision.action);
        let messages = session.drain_messages();
        if verbose {
            for line in messages {
                println!("    {line}");
            }
        }
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldData {
        WorldData::bundled().unwrap()
    }

    #[test]
    fn pathfinder_runs_finish_with_an_ending() {
        for seed in 0..8 {
            let record = run_simulation(
                &world(),
                SimulationConfig::new(GameplayStrategy::Pathfinder, seed),
                false,
            )
            .unwrap();
            assert_ne!(record.outcome, "quit");
            assert_eq!(record.won, record.outcome == "arrived");
            assert!(record.days >= 1);
        }
    }

    #[test]
    fn runs_are_reproducible() {
        let config = SimulationConfig::new(GameplayStrategy::Random, 77).with_event_chance(0.3);
        let first = run_simulation(&world(), config, false).unwrap();
        let second = run_simulation(&world(), config, false).unwrap();
        assert_eq!(
            serde_json::to_value(first).unwrap(),
            serde_json::to_value(second).unwrap()
        );
    }

    #[test]
    fn turn_limit_is_an_error() {
        let config = SimulationConfig::new(GameplayStrategy::Cautious, 1).with_max_turns(1);
        let err = run_simulation(&world(), config, false).unwrap_err();
        assert!(err.to_string().contains("still running after 1 turns"));
    }

    #[test]
    fn invalid_event_chance_is_rejected() {
        let config = SimulationConfig::new(GameplayStrategy::Random, 1).with_event_chance(3.0);
        let err = run_simulation(&world(), config, false).unwrap_err();
        assert!(format!("{err:#}").contains("random_event_chance"));
    }
}
