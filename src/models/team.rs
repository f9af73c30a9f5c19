//! Team and Sport data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Sport a team plays and a bracket is held for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Basketball,
    Volleyball,
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sport::Basketball => write!(f, "basketball"),
            Sport::Volleyball => write!(f, "volleyball"),
        }
    }
}

/// A registered team. Immutable once matches in a bracket reference it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub sport: Sport,
}

impl Team {
    /// Create a new team with a fresh id.
    pub fn new(name: impl Into<String>, sport: Sport) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport,
        }
    }
}
