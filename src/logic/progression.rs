//! Match completion: record the result, then move the winner (and in double
//! elimination the loser) to their next slots.
//!
//! A missing target (no next match, no open slot) is not an error. The match
//! still records its result; the skipped placement is reported in
//! [`Advancement`] and logged as a warning.

use crate::models::{
    BracketError, BracketId, BracketLayout, EliminationType, GameMatch, MatchId, Round, Scores,
    Side, TeamId,
};
use crate::store::{BracketStore, MatchUpdate, SlotPolicy};
use serde::Serialize;

/// Why a placement did not happen.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The round or match that should receive the team does not exist.
    NoTargetMatch,
    /// The target exists but its slot is taken or it is already completed.
    NoOpenSlot,
}

/// Where a team went after a completed match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    Placed {
        match_id: MatchId,
        round: Round,
        side: Side,
    },
    Skipped {
        reason: SkipReason,
    },
    /// Nowhere to go: champion, eliminated, or no opponent.
    NotApplicable,
}

impl Advance {
    pub fn is_placed(&self) -> bool {
        matches!(self, Advance::Placed { .. })
    }
}

/// Everything a completion changed, for reporting.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Advancement {
    /// The match as stored after completion.
    pub completed: GameMatch,
    pub winner: Advance,
    pub loser: Advance,
    pub tournament_complete: bool,
    pub champion: Option<TeamId>,
}

impl Advancement {
    pub fn winner_advanced(&self) -> bool {
        self.winner.is_placed()
    }

    /// True when the loser was dropped into the loser bracket.
    pub fn loser_advanced(&self) -> bool {
        self.loser.is_placed()
    }
}

struct Outcome {
    winner: Advance,
    loser: Advance,
    champion: Option<TeamId>,
}

impl Outcome {
    fn champion(team_id: TeamId) -> Self {
        Self {
            winner: Advance::NotApplicable,
            loser: Advance::NotApplicable,
            champion: Some(team_id),
        }
    }
}

/// Record `winner_id` as the winner of `match_id` and apply every downstream effect.
///
/// The whole operation is one store transaction. Completing an already
/// completed match, naming a winner who is not in the match, or completing a
/// match with an empty slot that an unplayed match can still fill, is
/// rejected without changes.
pub fn complete_match<S: BracketStore>(
    store: &mut S,
    match_id: MatchId,
    winner_id: TeamId,
    scores: Option<Scores>,
) -> Result<Advancement, BracketError> {
    store.transaction(|tx| -> Result<Advancement, BracketError> {
        let current = tx
            .get_match(match_id)?
            .ok_or(BracketError::MatchNotFound(match_id))?;
        if current.is_completed() {
            return Err(BracketError::MatchAlreadyCompleted(match_id));
        }
        if !current.involves(winner_id) {
            return Err(BracketError::WinnerNotInMatch {
                match_id,
                winner_id,
            });
        }
        let bracket_id = current.bracket_id;
        let bracket = tx
            .get_bracket(bracket_id)?
            .ok_or(BracketError::BracketNotFound(bracket_id))?;
        let layout = match bracket.layout {
            Some(layout) => layout,
            None => BracketLayout::new(
                tx.get_teams_for_bracket(bracket_id)?.len(),
                bracket.elimination_type,
            ),
        };
        // A lone team only plays a walkover once nobody else can arrive.
        if current.has_open_slot() {
            for feeder in feeder_rounds(&layout, current.round) {
                if !round_settled(&*tx, bracket_id, &layout, feeder)? {
                    return Err(BracketError::MatchNotReady(match_id));
                }
            }
        }

        tx.update_match(match_id, MatchUpdate::completed(winner_id, scores))?;
        let loser_id = current.opponent_of(winner_id);

        let outcome = match (bracket.elimination_type, current.round) {
            (_, Round::Championship | Round::ResetChampionship) => Outcome::champion(winner_id),
            (EliminationType::Single, Round::Winner(round)) => {
                advance_single(tx, &current, round, winner_id)?
            }
            (EliminationType::Single, Round::Loser(_)) => Outcome {
                winner: Advance::NotApplicable,
                loser: Advance::NotApplicable,
                champion: None,
            },
            (EliminationType::Double, Round::Winner(round)) => {
                advance_double_winner(tx, &layout, &current, round, winner_id, loser_id)?
            }
            (EliminationType::Double, Round::Loser(round)) => {
                advance_double_loser(tx, &layout, bracket_id, round, winner_id)?
            }
        };

        if let Some(champion) = outcome.champion {
            tx.set_bracket_winner(bracket_id, champion)?;
            log::info!("Bracket {} complete, champion {}", bracket_id, champion);
        }

        let completed = tx
            .get_match(match_id)?
            .ok_or(BracketError::MatchNotFound(match_id))?;
        log::info!(
            "Completed match {} ({}) winner {}",
            match_id,
            completed.round,
            winner_id
        );
        Ok(Advancement {
            completed,
            winner: outcome.winner,
            loser: outcome.loser,
            tournament_complete: outcome.champion.is_some(),
            champion: outcome.champion,
        })
    })
}

/// Single elimination: winner goes to `round + 1`, match `order / 2`. No next
/// match means this was the final.
fn advance_single<S: BracketStore>(
    tx: &mut S,
    current: &GameMatch,
    round: u32,
    winner_id: TeamId,
) -> Result<Outcome, BracketError> {
    let target_order = current.match_order / 2;
    let next = tx.find_match(current.bracket_id, Round::Winner(round + 1), &|m| {
        m.match_order == target_order
    })?;
    let Some(next) = next else {
        return Ok(Outcome::champion(winner_id));
    };
    Ok(Outcome {
        winner: place(tx, &next, winner_id, SlotPolicy::FirstOpen)?,
        loser: Advance::NotApplicable,
        champion: None,
    })
}

/// Double elimination, winner bracket: winner moves up (or into the grand
/// final's team1 slot from the last winner round), loser drops into the loser
/// round with the same index.
fn advance_double_winner<S: BracketStore>(
    tx: &mut S,
    layout: &BracketLayout,
    current: &GameMatch,
    round: u32,
    winner_id: TeamId,
    loser_id: Option<TeamId>,
) -> Result<Outcome, BracketError> {
    let bracket_id = current.bracket_id;
    let winner = if round < layout.winner_rounds {
        let target_order = current.match_order / 2;
        let side = if current.match_order % 2 == 0 {
            Side::Team1
        } else {
            Side::Team2
        };
        let next = tx.find_match(bracket_id, Round::Winner(round + 1), &|m| {
            m.match_order == target_order
        })?;
        match next {
            Some(next) => place(tx, &next, winner_id, SlotPolicy::Exact(side))?,
            None => skipped(winner_id, Round::Winner(round + 1), SkipReason::NoTargetMatch),
        }
    } else {
        place_in_championship(tx, bracket_id, winner_id, Side::Team1)?
    };

    let loser = match loser_id {
        Some(loser_id) => place_first_open(tx, bracket_id, Round::Loser(round), loser_id)?,
        None => Advance::NotApplicable,
    };

    Ok(Outcome {
        winner,
        loser,
        champion: None,
    })
}

/// Double elimination, loser bracket: winner moves to the next loser round, or
/// from the loser final into the grand final's team2 slot. The loser is out.
fn advance_double_loser<S: BracketStore>(
    tx: &mut S,
    layout: &BracketLayout,
    bracket_id: BracketId,
    round: u32,
    winner_id: TeamId,
) -> Result<Outcome, BracketError> {
    let loser_final = layout.loser_final();
    let winner = if round < loser_final {
        place_first_open(tx, bracket_id, Round::Loser(round + 1), winner_id)?
    } else if round == loser_final {
        place_in_championship(tx, bracket_id, winner_id, Side::Team2)?
    } else {
        skipped(winner_id, Round::Loser(round + 1), SkipReason::NoTargetMatch)
    };
    Ok(Outcome {
        winner,
        loser: Advance::NotApplicable,
        champion: None,
    })
}

fn place_in_championship<S: BracketStore>(
    tx: &mut S,
    bracket_id: BracketId,
    team_id: TeamId,
    side: Side,
) -> Result<Advance, BracketError> {
    match tx.find_match(bracket_id, Round::Championship, &|_| true)? {
        Some(final_match) => place(tx, &final_match, team_id, SlotPolicy::Exact(side)),
        None => Ok(skipped(team_id, Round::Championship, SkipReason::NoTargetMatch)),
    }
}

/// Lowest-ordered match of `round` with an open slot, team1 before team2.
fn place_first_open<S: BracketStore>(
    tx: &mut S,
    bracket_id: BracketId,
    round: Round,
    team_id: TeamId,
) -> Result<Advance, BracketError> {
    if let Some(target) = tx.find_match(bracket_id, round, &GameMatch::can_receive)? {
        return place(tx, &target, team_id, SlotPolicy::FirstOpen);
    }
    let reason = if tx.find_match(bracket_id, round, &|_| true)?.is_some() {
        SkipReason::NoOpenSlot
    } else {
        SkipReason::NoTargetMatch
    };
    Ok(skipped(team_id, round, reason))
}

fn place<S: BracketStore>(
    tx: &mut S,
    target: &GameMatch,
    team_id: TeamId,
    policy: SlotPolicy,
) -> Result<Advance, BracketError> {
    match tx.fill_slot(target.id, team_id, policy)? {
        Some(side) => {
            log::debug!(
                "Placed team {} into {} match {} ({:?})",
                team_id,
                target.round,
                target.match_order,
                side
            );
            Ok(Advance::Placed {
                match_id: target.id,
                round: target.round,
                side,
            })
        }
        None => Ok(skipped(team_id, target.round, SkipReason::NoOpenSlot)),
    }
}

fn skipped(team_id: TeamId, round: Round, reason: SkipReason) -> Advance {
    log::warn!("Could not place team {} into {}: {:?}", team_id, round, reason);
    Advance::Skipped { reason }
}

/// Rounds whose results can place a team into `round`.
fn feeder_rounds(layout: &BracketLayout, round: Round) -> Vec<Round> {
    let loser_final = layout.loser_final();
    match round {
        Round::Winner(r) if r > 1 => vec![Round::Winner(r - 1)],
        Round::Winner(_) => Vec::new(),
        Round::Loser(r) => {
            let mut feeders = Vec::new();
            if r <= layout.winner_rounds {
                feeders.push(Round::Winner(r));
            }
            if r > 1 && r - 1 < loser_final {
                feeders.push(Round::Loser(r - 1));
            }
            feeders
        }
        Round::Championship | Round::ResetChampionship => {
            let mut feeders = vec![Round::Winner(layout.winner_rounds)];
            if loser_final > 0 {
                feeders.push(Round::Loser(loser_final));
            }
            feeders
        }
    }
}

/// No team can still arrive in or leave `round`: every match holding a team
/// is completed, and the same holds for every round feeding it.
fn round_settled<S: BracketStore>(
    store: &S,
    bracket_id: BracketId,
    layout: &BracketLayout,
    round: Round,
) -> Result<bool, BracketError> {
    let unplayed = store.find_match(bracket_id, round, &|m| {
        !m.is_completed() && (m.team1_id.is_some() || m.team2_id.is_some())
    })?;
    if unplayed.is_some() {
        return Ok(false);
    }
    for feeder in feeder_rounds(layout, round) {
        if !round_settled(store, bracket_id, layout, feeder)? {
            return Ok(false);
        }
    }
    Ok(true)
}
