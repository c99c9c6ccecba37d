//! snakebid strategies - turning a game view into a vote
//!
//! This crate provides:
//! - The `Strategy` capability trait and its vote/skip records
//! - Direction scoring shared by the steering policies
//! - The expected-value reference policy and simple baselines
//! - An explicit registry mapping names to strategy factories

pub mod basic;
pub mod expected_value;
pub mod registry;
pub mod steering;
pub mod strategy;

// Re-exports for convenient access
pub use basic::{Aggressive, Greedy, Passive, RandomVoter};
pub use expected_value::{win_probability, EvParams, ExpectedValue};
pub use registry::{StrategyFactory, StrategyRegistry};
pub use steering::{choose_direction, fallback_vote, safest_direction, SteeringWeights};
pub use strategy::{AgentState, Decision, Strategy, VoteAction, DEFAULT_ROUND_SPEND};
