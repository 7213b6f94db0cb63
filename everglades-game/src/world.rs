//! Locations and the travel graph between them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label fragment that marks a connection as needing the canoe.
const PADDLE_KEYWORD: &str = "paddle";

/// A directed travel edge out of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Action label shown to the player, e.g. `paddle east`.
    pub action: String,
    /// Destination location id.
    pub to: String,
    /// Explicit canoe requirement; falls back to the label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_canoe: Option<bool>,
}

impl Connection {
    #[must_use]
    pub fn new(action: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            to: to.into(),
            requires_canoe: None,
        }
    }

    #[must_use]
    pub fn requires_canoe(&self) -> bool {
        self.requires_canoe
            .unwrap_or_else(|| self.action.to_ascii_lowercase().contains(PADDLE_KEYWORD))
    }
}

/// A distinct area of the swamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Outgoing edges in listing order.
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Hazard tags rolled on every departure from here.
    #[serde(default)]
    pub hazards: Vec<String>,
    /// Resource name to availability weight in `[0, 1]`.
    #[serde(default)]
    pub resource_availability: BTreeMap<String, f32>,
    #[serde(default)]
    pub is_destination: bool,
}

impl Location {
    #[must_use]
    pub fn new(
        location_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            location_id: location_id.into(),
            name: name.into(),
            description: description.into(),
            connections: Vec::new(),
            hazards: Vec::new(),
            resource_availability: BTreeMap::new(),
            is_destination: false,
        }
    }

    #[must_use]
    pub fn connect(mut self, action: impl Into<String>, to: impl Into<String>) -> Self {
        self.connections.push(Connection::new(action, to));
        self
    }

    #[must_use]
    pub fn with_hazard(mut self, hazard: impl Into<String>) -> Self {
        self.hazards.push(hazard.into());
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>, weight: f32) -> Self {
        self.resource_availability.insert(resource.into(), weight);
        self
    }

    #[must_use]
    pub fn destination(mut self) -> Self {
        self.is_destination = true;
        self
    }

    #[must_use]
    pub fn get_possible_travel_actions(&self) -> Vec<&str> {
        self.connections
            .iter()
            .map(|connection| connection.action.as_str())
            .collect()
    }

    #[must_use]
    pub fn get_destination_id(&self, action: &str) -> Option<&str> {
        self.connection(action).map(|connection| connection.to.as_str())
    }

    #[must_use]
    pub fn connection(&self, action: &str) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.action == action)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connections = self.get_possible_travel_actions().join(", ");
        let hazards = self.hazards.join(", ");
        writeln!(f, "{} ({})", self.name, self.location_id)?;
        writeln!(f, "  Description: {}", self.description)?;
        writeln!(
            f,
            "  Connections: {}",
            if connections.is_empty() { "None" } else { connections.as_str() }
        )?;
        writeln!(
            f,
            "  Hazards: {}",
            if hazards.is_empty() { "None" } else { hazards.as_str() }
        )?;
        write!(f, "  Is Destination: {}", self.is_destination)
    }
}

/// Location table keyed by id.
pub type LocationTable = BTreeMap<String, Location>;
