//! REST API over the bracket engine. State is one in-memory store behind a lock;
//! every request holds the write lock for its whole operation.

mod handlers;

use crate::models::BracketError;
use crate::store::{MemoryStore, StoreError};
use actix_web::web::{Data, ServiceConfig};
use actix_web::HttpResponse;
use std::sync::RwLock;

pub type AppState = Data<RwLock<MemoryStore>>;

/// Fresh, empty application state.
pub fn new_state() -> AppState {
    Data::new(RwLock::new(MemoryStore::new()))
}

/// Register all API routes (state must be added with `app_data`).
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(handlers::api_health)
        .service(handlers::api_create_team)
        .service(handlers::api_list_teams)
        .service(handlers::api_create_bracket)
        .service(handlers::api_list_brackets)
        .service(handlers::api_get_bracket)
        .service(handlers::api_assign_team)
        .service(handlers::api_generate)
        .service(handlers::api_list_matches)
        .service(handlers::api_get_match)
        .service(handlers::api_complete_match);
}

fn error_response(err: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        BracketError::BracketNotFound(_)
        | BracketError::TeamNotFound(_)
        | BracketError::MatchNotFound(_) => HttpResponse::NotFound().json(body),
        BracketError::MatchAlreadyCompleted(_)
        | BracketError::MatchNotReady(_)
        | BracketError::TeamAlreadyAssigned(_)
        | BracketError::DuplicateTeamName { .. } => HttpResponse::Conflict().json(body),
        BracketError::Store(e) => {
            log::error!("Store failure: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    error_response(&BracketError::from(StoreError::Unavailable(
        "state lock poisoned".to_string(),
    )))
}
