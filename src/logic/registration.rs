//! Setup: register teams, create brackets, assign teams to brackets.

use crate::models::{Bracket, BracketError, BracketId, EliminationType, Sport, Team, TeamId};
use crate::store::BracketStore;

/// Register a team. Names are trimmed and unique per sport (case-insensitive).
pub fn register_team<S: BracketStore>(
    store: &mut S,
    name: &str,
    sport: Sport,
) -> Result<Team, BracketError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BracketError::InvalidName);
    }
    let is_duplicate = store
        .list_teams()?
        .iter()
        .any(|t| t.sport == sport && t.name.eq_ignore_ascii_case(name));
    if is_duplicate {
        return Err(BracketError::DuplicateTeamName {
            name: name.to_string(),
            sport,
        });
    }
    let team = Team::new(name, sport);
    store.insert_team(team.clone())?;
    log::info!("Registered {} team '{}' ({})", sport, team.name, team.id);
    Ok(team)
}

/// Create an empty bracket.
pub fn create_bracket<S: BracketStore>(
    store: &mut S,
    name: &str,
    sport_type: Sport,
    elimination_type: EliminationType,
) -> Result<Bracket, BracketError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BracketError::InvalidName);
    }
    let bracket = Bracket::new(name, sport_type, elimination_type);
    store.insert_bracket(bracket.clone())?;
    log::info!("Created {:?} elimination bracket '{}' ({})", elimination_type, bracket.name, bracket.id);
    Ok(bracket)
}

/// Add a team to a bracket. The team must play the bracket's sport.
pub fn assign_team<S: BracketStore>(
    store: &mut S,
    bracket_id: BracketId,
    team_id: TeamId,
) -> Result<Vec<Team>, BracketError> {
    let bracket = store
        .get_bracket(bracket_id)?
        .ok_or(BracketError::BracketNotFound(bracket_id))?;
    let team = store
        .get_team(team_id)?
        .ok_or(BracketError::TeamNotFound(team_id))?;
    if team.sport != bracket.sport_type {
        return Err(BracketError::SportMismatch {
            team: team.sport,
            bracket: bracket.sport_type,
        });
    }
    if store
        .get_teams_for_bracket(bracket_id)?
        .iter()
        .any(|t| t.id == team_id)
    {
        return Err(BracketError::TeamAlreadyAssigned(team_id));
    }
    store.add_bracket_team(bracket_id, team_id)?;
    Ok(store.get_teams_for_bracket(bracket_id)?)
}
