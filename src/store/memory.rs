//! In-memory store used by the web server and tests.

use super::{BracketStore, MatchUpdate, NewMatch, SlotPolicy, StoreError};
use crate::models::{
    Bracket, BracketId, BracketLayout, EliminationType, GameMatch, MatchId, Round, Side, Team,
    TeamId,
};
use std::collections::HashMap;
use uuid::Uuid;

/// All state lives in plain maps; `transaction` snapshots and restores them.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    teams: HashMap<TeamId, Team>,
    brackets: HashMap<BracketId, Bracket>,
    /// Bracket membership in assignment order.
    members: HashMap<BracketId, Vec<TeamId>>,
    matches: HashMap<MatchId, GameMatch>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bracket_mut(&mut self, id: BracketId) -> Result<&mut Bracket, StoreError> {
        self.brackets
            .get_mut(&id)
            .ok_or(StoreError::UnknownBracket(id))
    }

    fn match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, StoreError> {
        self.matches.get_mut(&id).ok_or(StoreError::UnknownMatch(id))
    }
}

impl BracketStore for MemoryStore {
    fn insert_team(&mut self, team: Team) -> Result<TeamId, StoreError> {
        let id = team.id;
        self.teams.insert(id, team);
        Ok(id)
    }

    fn get_team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        Ok(self.teams.get(&id).cloned())
    }

    fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let mut teams: Vec<Team> = self.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn insert_bracket(&mut self, bracket: Bracket) -> Result<BracketId, StoreError> {
        let id = bracket.id;
        self.brackets.insert(id, bracket);
        self.members.entry(id).or_default();
        Ok(id)
    }

    fn get_bracket(&self, id: BracketId) -> Result<Option<Bracket>, StoreError> {
        Ok(self.brackets.get(&id).cloned())
    }

    fn list_brackets(&self) -> Result<Vec<Bracket>, StoreError> {
        let mut brackets: Vec<Bracket> = self.brackets.values().cloned().collect();
        brackets.sort_by_key(|b| b.created_at);
        Ok(brackets)
    }

    fn add_bracket_team(&mut self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError> {
        if !self.brackets.contains_key(&bracket_id) {
            return Err(StoreError::UnknownBracket(bracket_id));
        }
        if !self.teams.contains_key(&team_id) {
            return Err(StoreError::UnknownTeam(team_id));
        }
        let members = self.members.entry(bracket_id).or_default();
        if !members.contains(&team_id) {
            members.push(team_id);
        }
        Ok(())
    }

    fn get_teams_for_bracket(&self, bracket_id: BracketId) -> Result<Vec<Team>, StoreError> {
        if !self.brackets.contains_key(&bracket_id) {
            return Err(StoreError::UnknownBracket(bracket_id));
        }
        self.members
            .get(&bracket_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|id| {
                self.teams
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::UnknownTeam(*id))
            })
            .collect()
    }

    fn set_bracket_format(
        &mut self,
        bracket_id: BracketId,
        elimination_type: EliminationType,
        layout: BracketLayout,
    ) -> Result<(), StoreError> {
        let bracket = self.bracket_mut(bracket_id)?;
        bracket.elimination_type = elimination_type;
        bracket.layout = Some(layout);
        Ok(())
    }

    fn set_bracket_winner(&mut self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError> {
        self.bracket_mut(bracket_id)?.winner_team_id = Some(team_id);
        Ok(())
    }

    fn clear_bracket_winner(&mut self, bracket_id: BracketId) -> Result<(), StoreError> {
        self.bracket_mut(bracket_id)?.winner_team_id = None;
        Ok(())
    }

    fn delete_all_matches(&mut self, bracket_id: BracketId) -> Result<usize, StoreError> {
        let before = self.matches.len();
        self.matches.retain(|_, m| m.bracket_id != bracket_id);
        Ok(before - self.matches.len())
    }

    fn insert_match(&mut self, bracket_id: BracketId, new_match: NewMatch) -> Result<MatchId, StoreError> {
        if !self.brackets.contains_key(&bracket_id) {
            return Err(StoreError::UnknownBracket(bracket_id));
        }
        let id = Uuid::new_v4();
        let completed_at = new_match.winner_id.map(|_| chrono::Utc::now());
        self.matches.insert(
            id,
            GameMatch {
                id,
                bracket_id,
                round: new_match.round,
                match_order: new_match.match_order,
                team1_id: new_match.team1_id,
                team2_id: new_match.team2_id,
                winner_id: new_match.winner_id,
                status: new_match.status(),
                score_team1: None,
                score_team2: None,
                completed_at,
            },
        );
        Ok(id)
    }

    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError> {
        Ok(self.matches.get(&id).cloned())
    }

    fn update_match(&mut self, id: MatchId, update: MatchUpdate) -> Result<(), StoreError> {
        let m = self.match_mut(id)?;
        if let Some(winner_id) = update.winner_id {
            m.winner_id = Some(winner_id);
        }
        if let Some(status) = update.status {
            m.status = status;
        }
        if let Some(scores) = update.scores {
            m.score_team1 = Some(scores.team1);
            m.score_team2 = Some(scores.team2);
        }
        if let Some(at) = update.completed_at {
            m.completed_at = Some(at);
        }
        Ok(())
    }

    fn find_match(
        &self,
        bracket_id: BracketId,
        round: Round,
        predicate: &dyn Fn(&GameMatch) -> bool,
    ) -> Result<Option<GameMatch>, StoreError> {
        Ok(self
            .matches
            .values()
            .filter(|m| m.bracket_id == bracket_id && m.round == round && predicate(m))
            .min_by_key(|m| m.match_order)
            .cloned())
    }

    fn list_matches(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, StoreError> {
        let mut matches: Vec<GameMatch> = self
            .matches
            .values()
            .filter(|m| m.bracket_id == bracket_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round.number(), m.match_order));
        Ok(matches)
    }

    fn fill_slot(
        &mut self,
        match_id: MatchId,
        team_id: TeamId,
        policy: SlotPolicy,
    ) -> Result<Option<Side>, StoreError> {
        let m = self.match_mut(match_id)?;
        if m.is_completed() {
            return Ok(None);
        }
        let side = match policy {
            SlotPolicy::FirstOpen => m.open_slot(),
            SlotPolicy::Exact(side) => m.slot(side).is_none().then_some(side),
        };
        match side {
            Some(Side::Team1) => m.team1_id = Some(team_id),
            Some(Side::Team2) => m.team2_id = Some(team_id),
            None => {}
        }
        Ok(side)
    }

    /// Snapshots the whole store (all brackets and matches), so every call
    /// costs O(store size).
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            log::debug!("Rolling back store transaction");
            *self = snapshot;
        }
        result
    }
}
