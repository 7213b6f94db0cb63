//! Append-only narration queue drained by the presentation layer.

use serde::{Deserialize, Serialize};

/// Player-facing messages produced by the engine between two drains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MessageLog {
    entries: Vec<String>,
}

impl MessageLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    /// Take every pending message, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|line| line.contains(needle))
    }
}
