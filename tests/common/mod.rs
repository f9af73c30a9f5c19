#![allow(dead_code)]

use sportfest_brackets::{
    assign_team, complete_match, create_bracket, register_team, Advancement, BracketError,
    BracketId, BracketStore, EliminationType, GameMatch, MemoryStore, Round, Scores, Sport, Team,
    TeamId,
};
use std::collections::HashMap;

/// A store with one basketball bracket and the named teams assigned in order.
pub fn bracket_with_teams(
    names: &[&str],
    elimination: EliminationType,
) -> (MemoryStore, BracketId, Vec<Team>) {
    let mut store = MemoryStore::new();
    let bracket = create_bracket(&mut store, "Sportfest", Sport::Basketball, elimination).unwrap();
    let teams = names
        .iter()
        .map(|name| {
            let team = register_team(&mut store, name, Sport::Basketball).unwrap();
            assign_team(&mut store, bracket.id, team.id).unwrap();
            team
        })
        .collect();
    (store, bracket.id, teams)
}

pub fn team_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("T{i}")).collect()
}

pub fn id_of(teams: &[Team], name: &str) -> TeamId {
    teams.iter().find(|t| t.name == name).unwrap().id
}

pub fn match_at(store: &MemoryStore, bracket_id: BracketId, round: Round, order: u32) -> GameMatch {
    store
        .find_match(bracket_id, round, &|m| m.match_order == order)
        .unwrap()
        .unwrap_or_else(|| panic!("no match at {round} order {order}"))
}

pub fn round_matches(store: &MemoryStore, bracket_id: BracketId, round: Round) -> Vec<GameMatch> {
    store
        .list_matches(bracket_id)
        .unwrap()
        .into_iter()
        .filter(|m| m.round == round)
        .collect()
}

/// Complete ready matches (lowest round first) until none is left, letting `pick` choose winners.
pub fn play_out(
    store: &mut MemoryStore,
    bracket_id: BracketId,
    pick: impl Fn(&GameMatch) -> TeamId,
) -> Vec<Advancement> {
    let mut results = Vec::new();
    loop {
        let next = store
            .list_matches(bracket_id)
            .unwrap()
            .into_iter()
            .find(|m| m.is_ready());
        let Some(m) = next else { break };
        let scores = Scores { team1: 60, team2: 55 };
        results.push(complete_match(store, m.id, pick(&m), Some(scores)).unwrap());
    }
    results
}

/// Like `play_out`, but also plays matches holding a single team: that team
/// takes a walkover as soon as the engine accepts it. Stops when nothing
/// more can be completed.
pub fn play_with_walkovers(
    store: &mut MemoryStore,
    bracket_id: BracketId,
    pick: impl Fn(&GameMatch) -> TeamId,
) -> Vec<Advancement> {
    let mut results = Vec::new();
    'next: loop {
        let waiting: Vec<GameMatch> = store
            .list_matches(bracket_id)
            .unwrap()
            .into_iter()
            .filter(|m| !m.is_completed() && (m.team1_id.is_some() || m.team2_id.is_some()))
            .collect();
        for m in waiting {
            let winner = if m.is_ready() {
                pick(&m)
            } else {
                m.team1_id.or(m.team2_id).unwrap()
            };
            match complete_match(store, m.id, winner, None) {
                Ok(result) => {
                    results.push(result);
                    continue 'next;
                }
                Err(BracketError::MatchNotReady(_)) => {}
                Err(e) => panic!("completing {} order {}: {e}", m.round, m.match_order),
            }
        }
        return results;
    }
}

/// Matches lost per team, counting only matches played between two teams.
pub fn losses(store: &MemoryStore, bracket_id: BracketId) -> HashMap<TeamId, usize> {
    let mut lost = HashMap::new();
    for m in store.list_matches(bracket_id).unwrap() {
        if let Some(loser) = m.winner_id.and_then(|w| m.opponent_of(w)) {
            *lost.entry(loser).or_insert(0) += 1;
        }
    }
    lost
}

pub fn team1(m: &GameMatch) -> TeamId {
    m.team1_id.unwrap()
}

pub fn team2(m: &GameMatch) -> TeamId {
    m.team2_id.unwrap()
}
