//! Bracket, elimination format, round layout, and BracketError.

use crate::models::game::MatchId;
use crate::models::team::{Sport, TeamId};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during bracket operations.
#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    #[error("Bracket not found")]
    BracketNotFound(BracketId),
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    /// Fewer than 2 teams assigned when generating.
    #[error("Need at least 2 teams to generate matches (found {found})")]
    NotEnoughTeams { found: usize },
    #[error("Match has already been completed")]
    MatchAlreadyCompleted(MatchId),
    /// A slot is empty and an unplayed match can still fill it.
    #[error("Match is still waiting for a team")]
    MatchNotReady(MatchId),
    /// The reported winner is not one of the teams assigned to the match.
    #[error("Winner is not a team in this match")]
    WinnerNotInMatch { match_id: MatchId, winner_id: TeamId },
    #[error("Team plays {team} but the bracket is for {bracket}")]
    SportMismatch { team: Sport, bracket: Sport },
    #[error("Team is already assigned to this bracket")]
    TeamAlreadyAssigned(TeamId),
    /// Team names are unique per sport (case-insensitive).
    #[error("A {sport} team named '{name}' already exists")]
    DuplicateTeamName { name: String, sport: Sport },
    #[error("Name must not be empty")]
    InvalidName,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Unique identifier for a bracket.
pub type BracketId = Uuid;

/// Elimination format of a bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationType {
    #[default]
    Single,
    Double,
}

/// Round counts of a generated bracket, fixed at generation time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketLayout {
    /// Real teams seeded into the bracket.
    pub team_count: u32,
    /// `W = ceil(log2(team_count))`.
    pub winner_rounds: u32,
    /// `L`, zero for single elimination.
    pub loser_rounds: u32,
}

impl BracketLayout {
    pub fn new(team_count: usize, elimination: EliminationType) -> Self {
        let winner_rounds = Self::winner_rounds_for(team_count);
        let loser_rounds = match elimination {
            EliminationType::Single => 0,
            EliminationType::Double => Self::loser_rounds_for(team_count, winner_rounds),
        };
        Self {
            team_count: team_count as u32,
            winner_rounds,
            loser_rounds,
        }
    }

    /// `ceil(log2(n))`; 0 for n <= 1.
    pub fn winner_rounds_for(team_count: usize) -> u32 {
        team_count.max(1).next_power_of_two().trailing_zeros()
    }

    /// Size-banded loser round count.
    pub fn loser_rounds_for(team_count: usize, winner_rounds: u32) -> u32 {
        match team_count {
            0..=2 => 0,
            3..=4 => 2,
            5..=8 => 5,
            _ => 2 * winner_rounds.saturating_sub(1) + 1,
        }
    }

    /// Padded bracket size `P = 2^W`.
    pub fn bracket_size(&self) -> u32 {
        1 << self.winner_rounds
    }

    /// Match count of each loser round, index 0 is loser round 1.
    pub fn loser_round_sizes(&self) -> Vec<u32> {
        let n = self.team_count;
        (1..=self.loser_rounds)
            .map(|r| {
                let count = if r == 1 {
                    (n / 4).max(1)
                } else if r == self.loser_rounds {
                    1
                } else {
                    let exp = self.winner_rounds.saturating_sub(r.div_ceil(2));
                    2u32.pow(exp).max(1)
                };
                count.min(n)
            })
            .collect()
    }

    /// Loser round whose winner takes the grand final's team2 slot.
    pub fn loser_final(&self) -> u32 {
        2 * self.winner_rounds.saturating_sub(1)
    }
}

/// One tournament instance for a sport.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub name: String,
    pub sport_type: Sport,
    pub elimination_type: EliminationType,
    /// Set exactly once, when the terminal match completes.
    pub winner_team_id: Option<TeamId>,
    /// None until matches are generated.
    pub layout: Option<BracketLayout>,
    pub created_at: DateTime<Utc>,
}

impl Bracket {
    /// Create an empty bracket (no teams, no matches).
    pub fn new(name: impl Into<String>, sport_type: Sport, elimination_type: EliminationType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport_type,
            elimination_type,
            winner_team_id: None,
            layout: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winner_team_id.is_some()
    }
}
