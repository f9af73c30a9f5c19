//! Data structures for sportfest brackets: teams, brackets, matches.

mod bracket;
mod game;
mod team;

pub use bracket::{Bracket, BracketError, BracketId, BracketLayout, EliminationType};
pub use game::{BracketType, GameMatch, MatchId, MatchStatus, Round, Scores, Side};
pub use team::{Sport, Team, TeamId};
