//! Bracket store: the persistence operations the engine reads and writes through.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Bracket, BracketId, BracketLayout, EliminationType, GameMatch, MatchId, MatchStatus, Round,
    Scores, Side, Team, TeamId,
};
use chrono::{DateTime, Utc};

/// Storage-layer failures. Any of these aborts the surrounding operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no bracket with id {0}")]
    UnknownBracket(BracketId),
    #[error("no match with id {0}")]
    UnknownMatch(MatchId),
    #[error("no team with id {0}")]
    UnknownTeam(TeamId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Fields of a match to insert. Status follows from `winner_id` (byes are
/// inserted already completed).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NewMatch {
    pub round: Round,
    pub match_order: u32,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub winner_id: Option<TeamId>,
}

impl NewMatch {
    pub fn status(&self) -> MatchStatus {
        if self.winner_id.is_some() {
            MatchStatus::Completed
        } else {
            MatchStatus::Scheduled
        }
    }
}

/// Partial match update; `None` leaves a field unchanged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchUpdate {
    pub winner_id: Option<TeamId>,
    pub status: Option<MatchStatus>,
    pub scores: Option<Scores>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchUpdate {
    /// Record a result: winner, completed status, scores and completion time.
    pub fn completed(winner_id: TeamId, scores: Option<Scores>) -> Self {
        Self {
            winner_id: Some(winner_id),
            status: Some(MatchStatus::Completed),
            scores,
            completed_at: Some(Utc::now()),
        }
    }
}

/// Which slot a conditional fill may target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotPolicy {
    /// team1 if empty, else team2 if empty.
    FirstOpen,
    /// Only this slot, and only if empty.
    Exact(Side),
}

/// Relational store for teams, brackets, bracket membership and matches.
///
/// `fill_slot` must be an atomic conditional update: it never overwrites a
/// team already placed. `transaction` runs a closure all-or-nothing.
pub trait BracketStore {
    fn insert_team(&mut self, team: Team) -> Result<TeamId, StoreError>;
    fn get_team(&self, id: TeamId) -> Result<Option<Team>, StoreError>;
    fn list_teams(&self) -> Result<Vec<Team>, StoreError>;

    fn insert_bracket(&mut self, bracket: Bracket) -> Result<BracketId, StoreError>;
    fn get_bracket(&self, id: BracketId) -> Result<Option<Bracket>, StoreError>;
    fn list_brackets(&self) -> Result<Vec<Bracket>, StoreError>;
    fn add_bracket_team(&mut self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError>;
    /// Teams assigned to the bracket, in assignment order.
    fn get_teams_for_bracket(&self, bracket_id: BracketId) -> Result<Vec<Team>, StoreError>;
    fn set_bracket_format(
        &mut self,
        bracket_id: BracketId,
        elimination_type: EliminationType,
        layout: BracketLayout,
    ) -> Result<(), StoreError>;
    fn set_bracket_winner(&mut self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError>;
    fn clear_bracket_winner(&mut self, bracket_id: BracketId) -> Result<(), StoreError>;

    /// Returns how many matches were removed.
    fn delete_all_matches(&mut self, bracket_id: BracketId) -> Result<usize, StoreError>;
    fn insert_match(&mut self, bracket_id: BracketId, new_match: NewMatch) -> Result<MatchId, StoreError>;
    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError>;
    fn update_match(&mut self, id: MatchId, update: MatchUpdate) -> Result<(), StoreError>;
    /// Lowest `match_order` match of the round satisfying `predicate`.
    fn find_match(
        &self,
        bracket_id: BracketId,
        round: Round,
        predicate: &dyn Fn(&GameMatch) -> bool,
    ) -> Result<Option<GameMatch>, StoreError>;
    /// All matches of the bracket ordered by round number, then match order.
    fn list_matches(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, StoreError>;
    /// Place `team_id` into an empty slot chosen by `policy`. Returns the side
    /// filled, or None when the targeted slot(s) are already taken or the
    /// match is completed.
    fn fill_slot(
        &mut self,
        match_id: MatchId,
        team_id: TeamId,
        policy: SlotPolicy,
    ) -> Result<Option<Side>, StoreError>;

    /// Run `f` as one unit: if it returns `Err`, every write it made is undone.
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>;
}
