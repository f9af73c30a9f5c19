//! Match (game), Round addressing, and match status.

use crate::models::bracket::BracketId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which sub-bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Winner,
    Loser,
    Championship,
}

/// Position of a round in the match graph.
///
/// Persisted and sent over the wire as `(bracket_type, round_number)` using the
/// banding `1..W` (winner), `101..100+L` (loser), `200` (grand final) and `201`
/// (reset final).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Round {
    /// Winner-bracket round, 1-based.
    Winner(u32),
    /// Loser-bracket round, 1-based.
    Loser(u32),
    Championship,
    /// Never generated; the grand final is always decisive.
    ResetChampionship,
}

impl Round {
    pub const LOSER_OFFSET: u32 = 100;
    pub const CHAMPIONSHIP_NUMBER: u32 = 200;
    pub const RESET_CHAMPIONSHIP_NUMBER: u32 = 201;

    /// Banded round number.
    pub fn number(self) -> u32 {
        match self {
            Round::Winner(r) => r,
            Round::Loser(r) => Self::LOSER_OFFSET + r,
            Round::Championship => Self::CHAMPIONSHIP_NUMBER,
            Round::ResetChampionship => Self::RESET_CHAMPIONSHIP_NUMBER,
        }
    }

    pub fn bracket_type(self) -> BracketType {
        match self {
            Round::Winner(_) => BracketType::Winner,
            Round::Loser(_) => BracketType::Loser,
            Round::Championship | Round::ResetChampionship => BracketType::Championship,
        }
    }

    /// Decode a persisted `(bracket_type, round_number)` pair. Returns None when
    /// the number falls outside the band of its bracket type.
    pub fn from_parts(bracket_type: BracketType, number: u32) -> Option<Round> {
        match bracket_type {
            BracketType::Winner if (1..Self::LOSER_OFFSET).contains(&number) => {
                Some(Round::Winner(number))
            }
            BracketType::Loser
                if number > Self::LOSER_OFFSET && number < Self::CHAMPIONSHIP_NUMBER =>
            {
                Some(Round::Loser(number - Self::LOSER_OFFSET))
            }
            BracketType::Championship if number == Self::CHAMPIONSHIP_NUMBER => {
                Some(Round::Championship)
            }
            BracketType::Championship if number == Self::RESET_CHAMPIONSHIP_NUMBER => {
                Some(Round::ResetChampionship)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Round::Winner(r) => write!(f, "winner round {}", r),
            Round::Loser(r) => write!(f, "loser round {}", r),
            Round::Championship => write!(f, "grand final"),
            Round::ResetChampionship => write!(f, "reset final"),
        }
    }
}

/// Wire form of [`Round`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RoundRepr {
    bracket_type: BracketType,
    round_number: u32,
}

impl Serialize for Round {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RoundRepr {
            bracket_type: self.bracket_type(),
            round_number: self.number(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Round {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = RoundRepr::deserialize(deserializer)?;
        Round::from_parts(repr.bracket_type, repr.round_number).ok_or_else(|| {
            D::Error::custom(format!(
                "round number {} is not valid for a {:?} match",
                repr.round_number, repr.bracket_type
            ))
        })
    }
}

/// Lifecycle of a match. "Ongoing" is a presentation concern and not tracked here.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Team1,
    Team2,
}

/// Final score of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub team1: u32,
    pub team2: u32,
}

/// A single match in a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub bracket_id: BracketId,
    #[serde(flatten)]
    pub round: Round,
    /// Position within its round.
    pub match_order: u32,
    /// None while the slot is not yet filled.
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    /// None until completed.
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
    pub score_team1: Option<u32>,
    pub score_team2: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn slot(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::Team1 => self.team1_id,
            Side::Team2 => self.team2_id,
        }
    }

    /// First empty slot, team1 before team2.
    pub fn open_slot(&self) -> Option<Side> {
        if self.team1_id.is_none() {
            Some(Side::Team1)
        } else if self.team2_id.is_none() {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn has_open_slot(&self) -> bool {
        self.open_slot().is_some()
    }

    /// Still scheduled with an empty slot, so a team can be placed into it.
    pub fn can_receive(&self) -> bool {
        !self.is_completed() && self.has_open_slot()
    }

    /// Both teams are known and no result has been recorded.
    pub fn is_ready(&self) -> bool {
        !self.is_completed() && self.team1_id.is_some() && self.team2_id.is_some()
    }

    /// Completed without an opponent: a round-1 bye, or a loser match that
    /// no second team could reach.
    pub fn is_bye(&self) -> bool {
        self.is_completed() && (self.team1_id.is_none() || self.team2_id.is_none())
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team1_id == Some(team_id) || self.team2_id == Some(team_id)
    }

    /// The other team in this match, if `team_id` plays in it and the other slot is filled.
    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        if self.team1_id == Some(team_id) {
            self.team2_id
        } else if self.team2_id == Some(team_id) {
            self.team1_id
        } else {
            None
        }
    }
}
