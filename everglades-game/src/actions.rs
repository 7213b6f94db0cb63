//! Player actions, their execution, and the menu offered each turn.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::constants::{FORAGE_FOOD_MAX, FORAGE_FOOD_MIN, REPAIR_MATERIAL_COST};
use crate::hazards::resolve_travel_hazards;
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Follow the connection with this label.
    Travel(String),
    Forage,
    Rest,
    Repair,
    Status,
    Quit,
    Unknown(String),
}

impl PlayerAction {
    #[must_use]
    pub fn travel(label: impl Into<String>) -> Self {
        Self::Travel(label.into())
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Travel(_) => "travel",
            Self::Forage => "forage",
            Self::Rest => "rest",
            Self::Repair => "repair",
            Self::Status => "status",
            Self::Quit => "quit",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Travel(label) => write!(f, "travel {label}"),
            Self::Unknown(text) => f.write_str(text),
            other => f.write_str(other.kind()),
        }
    }
}

impl FromStr for PlayerAction {
    type Err = Infallible;

    /// Text commands: `travel <label>`, `forage`, `rest`, `repair`,
    /// `status`, `quit` or `q`. Anything else becomes `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (head, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(head, rest)| (head, rest.trim()));
        let action = match head.to_ascii_lowercase().as_str() {
            "travel" => Self::Travel(rest.to_string()),
            "forage" if rest.is_empty() => Self::Forage,
            "rest" if rest.is_empty() => Self::Rest,
            "repair" if rest.is_empty() => Self::Repair,
            "status" if rest.is_empty() => Self::Status,
            "quit" | "q" if rest.is_empty() => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        };
        Ok(action)
    }
}

/// What an executed action did to the flow of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub advanced_day: bool,
    pub quit: bool,
}

impl ActionOutcome {
    const fn day_passed() -> Self {
        Self {
            advanced_day: true,
            quit: false,
        }
    }

    const fn no_time() -> Self {
        Self {
            advanced_day: false,
            quit: false,
        }
    }
}

/// Run one player action against the state.
///
/// Day-consuming actions finish with `advance_day` unless the action itself
/// ended the game. Actions on a finished game are logged and ignored.
pub fn execute_action(state: &mut GameState, action: &PlayerAction) -> ActionOutcome {
    if state.is_game_over() {
        state.log_message("The journey has already ended.");
        return ActionOutcome {
            advanced_day: false,
            quit: matches!(action, PlayerAction::Quit),
        };
    }
    debug!("day {}: executing {action}", state.current_day);

    let outcome = match action {
        PlayerAction::Travel(label) => travel(state, label),
        PlayerAction::Forage => forage(state),
        PlayerAction::Rest => {
            state.log_message("Party rests for the day.");
            ActionOutcome::day_passed()
        }
        PlayerAction::Repair => repair(state),
        PlayerAction::Status => {
            let party = state.party_summary();
            let resources = state.resource_summary();
            state.log_message(party);
            state.log_message(resources);
            ActionOutcome::no_time()
        }
        PlayerAction::Quit => ActionOutcome {
            advanced_day: false,
            quit: true,
        },
        PlayerAction::Unknown(text) => {
            state.log_message(format!("Unknown action type: {text}"));
            ActionOutcome::no_time()
        }
    };

    if outcome.advanced_day && !state.is_game_over() {
        state.advance_day();
    }
    outcome
}

fn travel(state: &mut GameState, label: &str) -> ActionOutcome {
    if label.is_empty() {
        state.log_message("Invalid travel details.");
        return ActionOutcome::no_time();
    }
    let Some(connection) = state
        .current_location()
        .and_then(|location| location.connection(label))
        .filter(|connection| state.locations.contains_key(&connection.to))
        .cloned()
    else {
        state.log_message(format!("Cannot travel via '{label}'."));
        return ActionOutcome::no_time();
    };

    state.log_message(format!("Party begins to travel via '{label}'..."));
    resolve_travel_hazards(state);

    if connection.requires_canoe() && !state.resources.canoe_functional() {
        state.log_message("Travel aborted! The canoe is too damaged.");
        return ActionOutcome::no_time();
    }

    state.move_to(&connection.to);
    if let Some(arrival) = state.current_location().map(|location| location.name.clone()) {
        state.log_message(format!("Party arrives at {arrival}."));
    }
    ActionOutcome::day_passed()
}

/// Counter a location resource feeds when gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gathered {
    Wood,
    Herbs,
    RepairMaterials,
    Food,
}

impl Gathered {
    fn for_resource(resource: &str) -> Option<Self> {
        match resource {
            "wood" => Some(Self::Wood),
            "herbs" => Some(Self::Herbs),
            "reeds" => Some(Self::RepairMaterials),
            "fish" | "small_game" => Some(Self::Food),
            _ => None,
        }
    }
}

fn forage(state: &mut GameState) -> ActionOutcome {
    let found = state.rng.gen_range(FORAGE_FOOD_MIN..=FORAGE_FOOD_MAX);
    state.resources.food = state.resources.food.saturating_add(found);
    state.log_message(format!("Party forages. Found {found} food."));

    let available: Vec<(String, f32)> = state
        .current_location()
        .map(|location| {
            location
                .resource_availability
                .iter()
                .map(|(name, weight)| (name.clone(), *weight))
                .collect()
        })
        .unwrap_or_default();

    for (resource, weight) in available {
        let Some(kind) = Gathered::for_resource(&resource) else {
            continue;
        };
        let roll: f32 = state.rng.r#gen();
        if roll >= weight {
            continue;
        }
        let resources = &mut state.resources;
        let message = match kind {
            Gathered::Wood => {
                resources.wood += 1;
                String::from("Gathered 1 wood.")
            }
            Gathered::Herbs => {
                resources.herbs += 1;
                String::from("Gathered 1 herbs.")
            }
            Gathered::RepairMaterials => {
                resources.repair_materials += 1;
                format!("Cut {resource} for 1 repair material.")
            }
            Gathered::Food => {
                resources.food = resources.food.saturating_add(1);
                format!("Caught some {}. Gained 1 food.", resource.replace('_', " "))
            }
        };
        state.log_message(message);
    }
    ActionOutcome::day_passed()
}

fn repair(state: &mut GameState) -> ActionOutcome {
    if !state.resources.canoe_damaged() {
        state.log_message("The canoe is in no need of repair.");
        return ActionOutcome::no_time();
    }
    if state.resources.repair_materials < REPAIR_MATERIAL_COST {
        state.log_message("No repair materials to mend the canoe.");
        return ActionOutcome::no_time();
    }
    state.resources.repair_materials -= REPAIR_MATERIAL_COST;
    let restored = state.resources.repair_canoe(state.repair_amount);
    let health = state.resources.canoe_health;
    state.log_message(format!(
        "Party repairs the canoe, restoring {restored} health. Health: {health}"
    ));
    ActionOutcome::day_passed()
}

/// One entry of the per-turn action menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChoice {
    pub action: PlayerAction,
    pub label: String,
    /// False when the choice is listed but cannot currently succeed.
    pub enabled: bool,
}

impl ActionChoice {
    fn enabled(action: PlayerAction, label: impl Into<String>) -> Self {
        Self {
            action,
            label: label.into(),
            enabled: true,
        }
    }
}

/// The actions a presentation layer should offer for the current state.
#[must_use]
pub fn available_actions(state: &GameState) -> Vec<ActionChoice> {
    if state.is_game_over() {
        return Vec::new();
    }
    let mut choices = Vec::new();
    if let Some(location) = state.current_location() {
        for connection in &location.connections {
            let blocked = connection.requires_canoe() && !state.resources.canoe_functional();
            let label = if blocked {
                format!("Travel: {} (canoe wrecked)", connection.action)
            } else {
                format!("Travel: {}", connection.action)
            };
            choices.push(ActionChoice {
                action: PlayerAction::travel(connection.action.clone()),
                label,
                enabled: !blocked,
            });
        }
    }
    choices.push(ActionChoice::enabled(PlayerAction::Forage, "Forage for food"));
    choices.push(ActionChoice::enabled(PlayerAction::Rest, "Rest"));
    if state.resources.canoe_damaged() {
        choices.push(ActionChoice {
            action: PlayerAction::Repair,
            label: String::from("Repair canoe"),
            enabled: state.resources.repair_materials >= REPAIR_MATERIAL_COST,
        });
    }
    choices.push(ActionChoice::enabled(PlayerAction::Status, "Check status"));
    choices.push(ActionChoice::enabled(PlayerAction::Quit, "Quit"));
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::events::EventTable;
    use crate::hazards::HazardTable;
    use crate::party::PartyMember;
    use crate::world::{Location, LocationTable};

    fn world() -> LocationTable {
        [
            Location::new("hammock", "Shaded Hammock", "")
                .connect("paddle east", "slough")
                .connect("trek south", "marsh")
                .connect("swim west", "atlantis")
                .with_resource("wood", 1.0)
                .with_resource("reeds", 1.0)
                .with_resource("water", 1.0),
            Location::new("slough", "Murky Slough", "").connect("paddle north", "mound"),
            Location::new("marsh", "Shallow Marsh", ""),
            Location::new("mound", "Coastal Mound", "").destination(),
        ]
        .into_iter()
        .map(|location| (location.location_id.clone(), location))
        .collect()
    }

    fn calm_state(seed: u64) -> GameState {
        let mut state = GameState::new(&GameConfig::default(), seed);
        state.set_hazard_table(HazardTable::new());
        state.setup_game(
            vec![PartyMember::new("Api"), PartyMember::new("Nokomis")],
            world(),
            EventTable::new(),
            "hammock",
        );
        state.get_and_clear_messages();
        state
    }

    fn act(state: &mut GameState, command: &str) -> ActionOutcome {
        let action: PlayerAction = command.parse().unwrap();
        execute_action(state, &action)
    }

    #[test]
    fn parses_text_commands() {
        assert_eq!(
            "travel paddle east".parse::<PlayerAction>().unwrap(),
            PlayerAction::travel("paddle east")
        );
        assert_eq!(" Forage ".parse::<PlayerAction>().unwrap(), PlayerAction::Forage);
        assert_eq!("q".parse::<PlayerAction>().unwrap(), PlayerAction::Quit);
        assert_eq!(
            "dance".parse::<PlayerAction>().unwrap(),
            PlayerAction::Unknown("dance".into())
        );
        assert_eq!(PlayerAction::travel("trek south").to_string(), "travel trek south");
    }

    #[test]
    fn travel_moves_and_advances_the_day() {
        let mut state = calm_state(1);
        let outcome = act(&mut state, "travel paddle east");
        assert!(outcome.advanced_day);
        assert_eq!(state.current_location_id(), Some("slough"));
        assert_eq!(state.current_day, 2);
        let log = state.get_and_clear_messages();
        assert_eq!(log[0], "Party begins to travel via 'paddle east'...");
        assert_eq!(log[1], "Party arrives at Murky Slough.");
    }

    #[test]
    fn unknown_or_dangling_labels_cost_nothing() {
        let mut state = calm_state(1);
        for command in ["travel fly away", "travel swim west"] {
            let outcome = act(&mut state, command);
            assert!(!outcome.advanced_day);
        }
        assert_eq!(state.current_day, 1);
        assert_eq!(state.current_location_id(), Some("hammock"));
        assert_eq!(
            state.get_and_clear_messages(),
            vec![
                "Cannot travel via 'fly away'.".to_string(),
                "Cannot travel via 'swim west'.".to_string()
            ]
        );
    }

    #[test]
    fn wrecked_canoe_blocks_paddling_but_not_trekking() {
        let mut state = calm_state(2);
        state.resources.canoe_health = 0;

        let outcome = act(&mut state, "travel paddle east");
        assert!(!outcome.advanced_day);
        assert_eq!(state.current_location_id(), Some("hammock"));
        assert!(state.messages().contains("Travel aborted! The canoe is too damaged."));

        let outcome = act(&mut state, "travel trek south");
        assert!(outcome.advanced_day);
        assert_eq!(state.current_location_id(), Some("marsh"));
    }

    #[test]
    fn forage_finds_food_and_location_resources() {
        let mut state = calm_state(3);
        let outcome = act(&mut state, "forage");
        assert!(outcome.advanced_day);
        assert_eq!(state.resources.wood, 1);
        assert_eq!(state.resources.repair_materials, 1);

        let log = state.get_and_clear_messages();
        let found: u32 = log[0]
            .trim_start_matches("Party forages. Found ")
            .trim_end_matches(" food.")
            .parse()
            .unwrap();
        assert!((1..=5).contains(&found));
        // Two members ate one ration each during the day tick.
        assert_eq!(state.resources.food, 20 + found - 2);
    }

    #[test]
    fn rest_and_status_differ_in_time_cost() {
        let mut state = calm_state(4);
        assert!(!act(&mut state, "status").advanced_day);
        let log = state.get_and_clear_messages();
        assert!(log[0].starts_with("Party Status:"));
        assert!(log[1].starts_with("Resources: Food: 20"));

        assert!(act(&mut state, "rest").advanced_day);
        assert_eq!(state.current_day, 2);
        assert!(state.messages().contains("Party rests for the day."));
    }

    #[test]
    fn repair_requires_damage_and_materials() {
        let mut state = calm_state(5);
        assert!(!act(&mut state, "repair").advanced_day);
        assert!(state.messages().contains("no need of repair"));

        state.resources.canoe_health = 50;
        assert!(!act(&mut state, "repair").advanced_day);
        assert!(state.messages().contains("No repair materials"));

        state.resources.repair_materials = 2;
        assert!(act(&mut state, "repair").advanced_day);
        assert_eq!(state.resources.canoe_health, 70);
        assert_eq!(state.resources.repair_materials, 1);

        state.resources.canoe_health = 95;
        act(&mut state, "repair");
        assert_eq!(state.resources.canoe_health, 100);
    }

    #[test]
    fn quit_and_unknown_never_advance() {
        let mut state = calm_state(6);
        let quit = act(&mut state, "quit");
        assert!(quit.quit && !quit.advanced_day);
        assert!(!act(&mut state, "sing").advanced_day);
        assert!(state.messages().contains("Unknown action type: sing"));
        assert_eq!(state.current_day, 1);
    }

    #[test]
    fn arriving_at_destination_wins_and_freezes_the_game() {
        let mut state = calm_state(7);
        act(&mut state, "travel paddle east");
        let food = state.resources.food;
        act(&mut state, "travel paddle north");
        assert!(state.win_condition_met());
        assert_eq!(state.current_day, 3);
        assert_eq!(state.resources.food, food - 2);

        let outcome = act(&mut state, "rest");
        assert!(!outcome.advanced_day);
        assert!(state.messages().contains("already ended"));
    }

    #[test]
    fn menu_flags_blocked_travel_and_offers_repair_when_damaged() {
        let mut state = calm_state(8);
        let labels: Vec<_> = available_actions(&state)
            .into_iter()
            .map(|choice| choice.label)
            .collect();
        assert_eq!(labels[0], "Travel: paddle east");
        assert!(!labels.iter().any(|label| label == "Repair canoe"));

        state.resources.canoe_health = 0;
        let menu = available_actions(&state);
        let paddle = &menu[0];
        assert!(!paddle.enabled);
        assert!(menu[1].enabled, "trekking stays available");
        let repair = menu
            .iter()
            .find(|choice| choice.action == PlayerAction::Repair)
            .unwrap();
        assert!(!repair.enabled);
        assert_eq!(menu.last().unwrap().action, PlayerAction::Quit);
    }
}
