//! Read-only view of a bracket: matches grouped by round plus progress counts.

use crate::models::{Bracket, BracketError, BracketId, GameMatch, Round, Team, TeamId};
use crate::store::BracketStore;
use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: Round,
    pub matches: Vec<GameMatch>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    /// Scheduled matches with both teams known.
    pub ready: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketOverview {
    pub bracket: Bracket,
    pub teams: Vec<Team>,
    /// Winner rounds, loser rounds, then the grand final.
    pub rounds: Vec<RoundSummary>,
    pub progress: Progress,
    pub champion: Option<TeamId>,
}

pub fn bracket_overview<S: BracketStore>(
    store: &S,
    bracket_id: BracketId,
) -> Result<BracketOverview, BracketError> {
    let bracket = store
        .get_bracket(bracket_id)?
        .ok_or(BracketError::BracketNotFound(bracket_id))?;
    let teams = store.get_teams_for_bracket(bracket_id)?;
    let matches = store.list_matches(bracket_id)?;

    let progress = Progress {
        total: matches.len(),
        completed: matches.iter().filter(|m| m.is_completed()).count(),
        ready: matches.iter().filter(|m| m.is_ready()).count(),
    };

    // list_matches is ordered by round number, so equal rounds are adjacent.
    let mut rounds: Vec<RoundSummary> = Vec::new();
    for m in matches {
        if rounds.last().map_or(true, |r| r.round != m.round) {
            rounds.push(RoundSummary {
                round: m.round,
                matches: Vec::new(),
            });
        }
        if let Some(summary) = rounds.last_mut() {
            summary.matches.push(m);
        }
    }

    Ok(BracketOverview {
        champion: bracket.winner_team_id,
        bracket,
        teams,
        rounds,
        progress,
    })
}
