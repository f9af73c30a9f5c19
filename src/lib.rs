//! Sportfest brackets: library with models, bracket engine, store and REST API.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;
pub mod web;

pub use config::ServerConfig;
pub use logic::{
    assign_team, bracket_overview, complete_match, create_bracket, generate, plan_bracket,
    register_team, shuffle, Advance, Advancement, BracketOverview, BracketPlan, PreserveOrder,
    RandomSource, RngSource, SkipReason,
};
pub use models::{
    Bracket, BracketError, BracketId, BracketLayout, BracketType, EliminationType, GameMatch,
    MatchId, MatchStatus, Round, Scores, Side, Sport, Team, TeamId,
};
pub use store::{BracketStore, MemoryStore, StoreError};
