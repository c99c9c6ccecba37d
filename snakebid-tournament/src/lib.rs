//! snakebid tournament - many seeded games, aggregated
//!
//! This crate provides tournament infrastructure:
//! - Named table presets and JSON-loaded configurations
//! - A game runner with a persistent roster and derived seeds
//! - Parallel execution across configurations with per-agent accounting
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: run_config (phases)
//! - Level 3: GameRunner::play_next, game_seed (steps)
//! - Level 4: utilities, configuration

mod config;
mod game_runner;
mod tournament;

pub use config::{default_roster, AgentSpec, GameConfig, TournamentConfig, PRESET_NAMES};
pub use game_runner::{game_seed, splitmix64, GameRunner};
pub use tournament::{run_config, run_tournament, AgentStanding, ConfigSummary, TournamentResult};
