//! Bracket generation: seed teams, build the full match graph, persist it in one batch.

use crate::logic::shuffle::{shuffle, RandomSource};
use crate::models::{
    BracketError, BracketId, BracketLayout, EliminationType, GameMatch, Round, TeamId,
};
use crate::store::{BracketStore, NewMatch};

/// What occupies one side of a pairing while the graph is built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Entrant {
    Team(TeamId),
    /// Winner of a match that has not been played yet.
    Pending,
    Bye,
}

impl Entrant {
    fn team(self) -> Option<TeamId> {
        match self {
            Entrant::Team(id) => Some(id),
            Entrant::Pending | Entrant::Bye => None,
        }
    }
}

/// The complete initial match graph of a bracket, before persistence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracketPlan {
    pub elimination_type: EliminationType,
    pub layout: BracketLayout,
    /// Ordered winner rounds, loser rounds, then the grand final.
    pub matches: Vec<NewMatch>,
}

impl BracketPlan {
    /// Planned matches of one round, in match order.
    pub fn round(&self, round: Round) -> impl Iterator<Item = &NewMatch> + '_ {
        self.matches.iter().filter(move |m| m.round == round)
    }
}

/// Round-1 slots padded with byes (`None`) up to the next power of two.
///
/// Pairs are consecutive slots `(2i, 2i+1)`. Full pairs come first; each bye
/// takes the second slot of one of the last pairs, so no pair is bye-vs-bye.
pub fn seed_slots(seeded: &[TeamId]) -> Vec<Option<TeamId>> {
    let size = seeded.len().max(1).next_power_of_two();
    if size < 2 {
        return seeded.iter().copied().map(Some).collect();
    }
    let byes = size - seeded.len();
    let full_pairs = size / 2 - byes;
    let (paired, unopposed) = seeded.split_at(full_pairs * 2);

    let mut slots: Vec<Option<TeamId>> = paired.iter().copied().map(Some).collect();
    for &team in unopposed {
        slots.push(Some(team));
        slots.push(None);
    }
    slots
}

/// Build the match graph for already-seeded teams. Pure: nothing is persisted.
pub fn plan_bracket(seeded: &[TeamId], elimination_type: EliminationType) -> BracketPlan {
    let layout = BracketLayout::new(seeded.len(), elimination_type);
    let mut matches = Vec::new();

    plan_winner_bracket(&seed_slots(seeded), layout.winner_rounds, &mut matches);

    if elimination_type == EliminationType::Double {
        // Loser rounds start empty; losers are dropped in as results come in.
        for (index, &count) in layout.loser_round_sizes().iter().enumerate() {
            let round = Round::Loser(index as u32 + 1);
            matches.extend((0..count).map(|order| empty_match(round, order)));
        }
        matches.push(empty_match(Round::Championship, 0));
    }

    BracketPlan {
        elimination_type,
        layout,
        matches,
    }
}

fn empty_match(round: Round, match_order: u32) -> NewMatch {
    NewMatch {
        round,
        match_order,
        team1_id: None,
        team2_id: None,
        winner_id: None,
    }
}

/// Pair entrants round by round. A team facing a bye wins immediately and is
/// carried straight into the next round's entrant list.
fn plan_winner_bracket(slots: &[Option<TeamId>], winner_rounds: u32, matches: &mut Vec<NewMatch>) {
    let mut entrants: Vec<Entrant> = slots
        .iter()
        .map(|slot| slot.map_or(Entrant::Bye, Entrant::Team))
        .collect();

    let mut round = 1;
    while entrants.len() > 1 && round <= winner_rounds {
        let mut next = Vec::with_capacity(entrants.len().div_ceil(2));
        for (order, pair) in entrants.chunks(2).enumerate() {
            let first = pair[0];
            let second = pair.get(1).copied().unwrap_or(Entrant::Bye);
            let mut planned = NewMatch {
                round: Round::Winner(round),
                match_order: order as u32,
                team1_id: first.team(),
                team2_id: second.team(),
                winner_id: None,
            };
            match (first, second) {
                // Unreachable with `seed_slots`; no match and no entrant.
                (Entrant::Bye, Entrant::Bye) => continue,
                (Entrant::Team(team), Entrant::Bye) | (Entrant::Bye, Entrant::Team(team)) => {
                    planned.winner_id = Some(team);
                    next.push(Entrant::Team(team));
                }
                _ => next.push(Entrant::Pending),
            }
            matches.push(planned);
        }
        entrants = next;
        round += 1;
    }
}

/// Generate (or regenerate) all matches of a bracket.
///
/// Runs as one store transaction: existing matches are deleted and the winner
/// cleared before the new graph is inserted, so a failure leaves the previous
/// bracket untouched.
pub fn generate<S: BracketStore>(
    store: &mut S,
    bracket_id: BracketId,
    elimination_type: EliminationType,
    source: &mut impl RandomSource,
) -> Result<Vec<GameMatch>, BracketError> {
    store.transaction(|tx| -> Result<Vec<GameMatch>, BracketError> {
        tx.get_bracket(bracket_id)?
            .ok_or(BracketError::BracketNotFound(bracket_id))?;
        let teams = tx.get_teams_for_bracket(bracket_id)?;
        if teams.len() < 2 {
            return Err(BracketError::NotEnoughTeams { found: teams.len() });
        }

        let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        let seeded = shuffle(&team_ids, source);
        let plan = plan_bracket(&seeded, elimination_type);

        let removed = tx.delete_all_matches(bracket_id)?;
        tx.clear_bracket_winner(bracket_id)?;
        tx.set_bracket_format(bracket_id, elimination_type, plan.layout)?;
        for planned in &plan.matches {
            tx.insert_match(bracket_id, *planned)?;
        }

        log::info!(
            "Generated {} matches for bracket {} ({:?}, {} teams, replaced {})",
            plan.matches.len(),
            bracket_id,
            elimination_type,
            teams.len(),
            removed
        );
        Ok(tx.list_matches(bracket_id)?)
    })
}
