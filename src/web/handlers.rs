use super::{error_response, lock_error, AppState};
use crate::logic::{
    assign_team, bracket_overview, complete_match, create_bracket, generate, register_team,
    PreserveOrder, RngSource,
};
use crate::models::{BracketError, BracketId, EliminationType, MatchId, Scores, Sport, TeamId};
use crate::store::BracketStore;
use actix_web::{
    get, post,
    web::{Bytes, Json, Path},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
    sport: Sport,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    name: String,
    sport_type: Sport,
    #[serde(default)]
    elimination_type: EliminationType,
}

#[derive(Deserialize)]
struct AssignTeamBody {
    team_id: TeamId,
}

/// How teams are ordered before pairing.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Seeding {
    #[default]
    Random,
    /// Assignment order, no shuffle.
    Registration,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerateBody {
    /// Defaults to the bracket's current elimination type.
    elimination_type: Option<EliminationType>,
    #[serde(default)]
    seeding: Seeding,
}

#[derive(Deserialize)]
struct CompleteMatchBody {
    winner_id: TeamId,
    scores: Option<Scores>,
}

/// Path segment: bracket id (e.g. /api/brackets/{id})
#[derive(Deserialize)]
struct BracketPath {
    id: BracketId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "sportfest-brackets",
    })
}

/// Register a team for a sport.
#[post("/api/teams")]
async fn api_create_team(state: AppState, body: Json<CreateTeamBody>) -> HttpResponse {
    let mut store = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match register_team(&mut *store, &body.name, body.sport) {
        Ok(team) => HttpResponse::Created().json(team),
        Err(e) => error_response(&e),
    }
}

#[get("/api/teams")]
async fn api_list_teams(state: AppState) -> HttpResponse {
    let store = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match store.list_teams() {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Create an empty bracket.
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Json<CreateBracketBody>) -> HttpResponse {
    let mut store = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match create_bracket(&mut *store, &body.name, body.sport_type, body.elimination_type) {
        Ok(bracket) => HttpResponse::Created().json(bracket),
        Err(e) => error_response(&e),
    }
}

#[get("/api/brackets")]
async fn api_list_brackets(state: AppState) -> HttpResponse {
    let store = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match store.list_brackets() {
        Ok(brackets) => HttpResponse::Ok().json(brackets),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Bracket with its teams, matches grouped by round, and progress.
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let store = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match bracket_overview(&*store, path.id) {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => error_response(&e),
    }
}

/// Assign a registered team to the bracket. Returns the bracket's teams.
#[post("/api/brackets/{id}/teams")]
async fn api_assign_team(
    state: AppState,
    path: Path<BracketPath>,
    body: Json<AssignTeamBody>,
) -> HttpResponse {
    let mut store = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match assign_team(&mut *store, path.id, body.team_id) {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => error_response(&e),
    }
}

/// (Re)generate all matches. Any previous matches and champion are discarded.
/// The body is optional; when present it must be a valid `GenerateBody`.
#[post("/api/brackets/{id}/generate")]
async fn api_generate(state: AppState, path: Path<BracketPath>, body: Bytes) -> HttpResponse {
    let options = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateBody::default()
    } else {
        match serde_json::from_slice::<GenerateBody>(&body) {
            Ok(options) => options,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("Invalid request body: {}", e) }))
            }
        }
    };
    let mut store = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let elimination_type = match options.elimination_type {
        Some(t) => t,
        None => match store.get_bracket(path.id) {
            Ok(Some(bracket)) => bracket.elimination_type,
            Ok(None) => return error_response(&BracketError::BracketNotFound(path.id)),
            Err(e) => return error_response(&BracketError::from(e)),
        },
    };
    let result = match options.seeding {
        Seeding::Random => {
            generate(&mut *store, path.id, elimination_type, &mut RngSource::thread())
        }
        Seeding::Registration => {
            generate(&mut *store, path.id, elimination_type, &mut PreserveOrder)
        }
    };
    match result {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "matches": matches,
        })),
        Err(e) => error_response(&e),
    }
}

#[get("/api/brackets/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let store = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match store.get_bracket(path.id) {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(&BracketError::BracketNotFound(path.id)),
        Err(e) => return error_response(&BracketError::from(e)),
    }
    match store.list_matches(path.id) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let store = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match store.get_match(path.id) {
        Ok(Some(m)) => HttpResponse::Ok().json(m),
        Ok(None) => error_response(&BracketError::MatchNotFound(path.id)),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Report a result: `{winner_id, scores: {team1, team2}}`.
#[post("/api/matches/{id}/complete")]
async fn api_complete_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<CompleteMatchBody>,
) -> HttpResponse {
    let mut store = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match complete_match(&mut *store, path.id, body.winner_id, body.scores) {
        Ok(advancement) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "match": advancement.completed,
            "winnerAdvanced": advancement.winner_advanced(),
            "loserAdvanced": advancement.loser_advanced(),
            "tournamentComplete": advancement.tournament_complete,
            "champion": advancement.champion,
            "winner": advancement.winner,
            "loser": advancement.loser,
        })),
        Err(e) => error_response(&e),
    }
}
