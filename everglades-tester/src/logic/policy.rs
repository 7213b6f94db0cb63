use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use everglades_game::{ActionChoice, GameState, PlayerAction};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PlayerAction,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(action: PlayerAction, rationale: impl Into<String>) -> Self {
        Self {
            action,
            rationale: Some(rationale.into()),
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select an action from the menu offered for the current state.
    fn pick_action(&mut self, state: &GameState, menu: &[ActionChoice]) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Cautious,
    Pathfinder,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 3] = [Self::Cautious, Self::Pathfinder, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Pathfinder => "pathfinder",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Pathfinder => "Pathfinder",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cautious => "keeps food and canoe topped up before heading for the coast",
            Self::Pathfinder => "always takes the shortest usable route to a destination",
            Self::Random => "picks uniformly among enabled actions",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Pathfinder => Box::new(PathfinderPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CautiousPolicy;
struct PathfinderPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Food the cautious policy wants on hand per living member.
const CAUTIOUS_FOOD_PER_MEMBER: u32 = 3;
/// Canoe health below which the cautious policy repairs when it can.
const CAUTIOUS_REPAIR_BELOW: u32 = 60;

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_action(&mut self, state: &GameState, menu: &[ActionChoice]) -> PolicyDecision {
        let repair_ready = menu
            .iter()
            .any(|choice| choice.enabled && choice.action == PlayerAction::Repair);
        if repair_ready && state.resources.canoe_health < CAUTIOUS_REPAIR_BELOW {
            return PolicyDecision::new(PlayerAction::Repair, "canoe needs patching");
        }

        let living = u32::try_from(state.living_members()).unwrap_or(u32::MAX);
        let days_left = u32::try_from(state.time_remaining).unwrap_or(0);
        let reserve = living.saturating_mul(CAUTIOUS_FOOD_PER_MEMBER);
        if state.resources.food < reserve && days_left > shortest_route_len(state).unwrap_or(0) + 1
        {
            return PolicyDecision::new(
                PlayerAction::Forage,
                format!("food {} below reserve {reserve}", state.resources.food),
            );
        }

        next_step(state).map_or_else(
            || PolicyDecision::new(PlayerAction::Forage, "no usable route; foraging"),
            |label| PolicyDecision::new(PlayerAction::travel(label.clone()), format!("route via {label}")),
        )
    }
}

impl PlayerPolicy for PathfinderPolicy {
    fn name(&self) -> &'static str {
        "Pathfinder"
    }

    fn pick_action(&mut self, state: &GameState, _menu: &[ActionChoice]) -> PolicyDecision {
        next_step(state).map_or_else(
            || PolicyDecision::new(PlayerAction::Forage, "no usable route; foraging"),
            |label| PolicyDecision::new(PlayerAction::travel(label.clone()), format!("route via {label}")),
        )
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_action(&mut self, _state: &GameState, menu: &[ActionChoice]) -> PolicyDecision {
        let candidates: Vec<&ActionChoice> = menu
            .iter()
            .filter(|choice| {
                choice.enabled
                    && !matches!(choice.action, PlayerAction::Quit | PlayerAction::Status)
            })
            .collect();
        if candidates.is_empty() {
            return PolicyDecision::new(PlayerAction::Rest, "nothing enabled");
        }
        let pick = self.rng.gen_range(0..candidates.len());
        let choice = candidates[pick];
        PolicyDecision::new(
            choice.action.clone(),
            format!("rolled {pick} of {}", candidates.len()),
        )
    }
}

/// Connections the party can take from `location_id` right now.
fn usable_edges<'a>(state: &'a GameState, location_id: &str) -> Vec<(&'a str, &'a str)> {
    let canoe_ok = state.resources.canoe_functional();
    state
        .location(location_id)
        .map(|location| {
            location
                .connections
                .iter()
                .filter(|connection| canoe_ok || !connection.requires_canoe())
                .filter(|connection| state.locations().contains_key(&connection.to))
                .map(|connection| (connection.action.as_str(), connection.to.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

/// Breadth-first search to the nearest destination. Returns the first label
/// of the route and its length in travel days.
fn shortest_route(state: &GameState) -> Option<(String, u32)> {
    let start = state.current_location_id()?;
    let mut seen = BTreeSet::from([start.to_string()]);
    let mut queue: VecDeque<(&str, Option<&str>, u32)> = VecDeque::from([(start, None, 0)]);

    while let Some((id, first_label, depth)) = queue.pop_front() {
        for (label, to) in usable_edges(state, id) {
            if !seen.insert(to.to_string()) {
                continue;
            }
            let first = first_label.unwrap_or(label);
            if state.location(to).is_some_and(|location| location.is_destination) {
                return Some((first.to_string(), depth + 1));
            }
            queue.push_back((to, Some(first), depth + 1));
        }
    }
    None
}

fn next_step(state: &GameState) -> Option<String> {
    shortest_route(state).map(|(label, _)| label)
}

fn shortest_route_len(state: &GameState) -> Option<u32> {
    shortest_route(state).map(|(_, len)| len)
}
