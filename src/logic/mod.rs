//! Bracket business logic: seeding, generation, progression, registration and overview.

mod builder;
mod overview;
mod progression;
mod registration;
mod shuffle;

pub use builder::{generate, plan_bracket, seed_slots, BracketPlan};
pub use overview::{bracket_overview, BracketOverview, Progress, RoundSummary};
pub use progression::{complete_match, Advance, Advancement, SkipReason};
pub use registration::{assign_team, create_bracket, register_team};
pub use shuffle::{shuffle, PreserveOrder, RandomSource, RngSource};
