//! snakebid simulator - deterministic auction rounds
//!
//! This crate provides:
//! - `SimConfig`, the rules and knobs of a simulated game
//! - Fruit placement (rejection sampling with a full-scan fallback)
//! - `SimAgent`, a bettor that keeps its balance across games
//! - `Simulator`, the last-vote-wins round state machine with counter bids
//! - Round logs and game outcomes for replay and reporting

pub mod agent;
pub mod auction;
pub mod config;
pub mod placement;
pub mod record;

// Re-exports for convenient access
pub use agent::SimAgent;
pub use auction::{play_game, Simulator};
pub use config::{SimConfig, TEAM_IDS};
pub use placement::{place_fruit, seed_fruits};
pub use record::{EndReason, GameOutcome, IllegalMove, Payout, RoundEvent, RoundRecord, VoteRecord};
