//! Tournament execution - many games per configuration, aggregated
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use snakebid_core::{ConfigError, ConfigResult};
use snakebid_sim::{EndReason, GameOutcome, SimAgent};
use snakebid_strategy::StrategyRegistry;

use crate::config::{GameConfig, TournamentConfig};
use crate::game_runner::GameRunner;

/// Cumulative record of one agent within a configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentStanding {
    pub name: String,
    pub strategy: String,
    pub games: u32,
    /// Games where the agent had backed the winning team
    pub wins: u32,
    pub spent: f64,
    pub earned: f64,
    pub profit: f64,
    pub roi: f64,
    pub final_balance: f64,
}

impl AgentStanding {
    pub fn from_agent(agent: &SimAgent) -> Self {
        Self {
            name: agent.name.clone(),
            strategy: agent.strategy_name().to_string(),
            games: agent.state.games_played,
            wins: agent.state.wins,
            spent: agent.total_spent,
            earned: agent.total_earned,
            profit: agent.profit(),
            roi: agent.roi(),
            final_balance: agent.balance,
        }
    }
}

/// Aggregate results of one configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub name: String,
    pub games: u32,
    /// Wins per team id
    pub team_wins: BTreeMap<String, u32>,
    pub dead_ends: u32,
    pub round_limits: u32,
    pub avg_rounds: f64,
    pub avg_prize_pool: f64,
    /// Sorted by profit (descending)
    pub agents: Vec<AgentStanding>,
}

impl ConfigSummary {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            games: 0,
            team_wins: BTreeMap::new(),
            dead_ends: 0,
            round_limits: 0,
            avg_rounds: 0.0,
            avg_prize_pool: 0.0,
            agents: Vec::new(),
        }
    }

    /// Games that ended with a winner
    pub fn decided_games(&self) -> u32 {
        self.team_wins.values().sum()
    }

    pub fn agent(&self, name: &str) -> Option<&AgentStanding> {
        self.agents.iter().find(|a| a.name == name)
    }
}

/// Result of a tournament
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub seed: u64,
    pub games_per_config: usize,
    /// One entry per configuration, in input order
    pub summaries: Vec<ConfigSummary>,
}

impl TournamentResult {
    pub fn summary_for(&self, name: &str) -> Option<&ConfigSummary> {
        self.summaries.iter().find(|s| s.name == name)
    }

    /// Profit per strategy across every configuration
    pub fn profit_by_strategy(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for standing in self.summaries.iter().flat_map(|s| &s.agents) {
            *totals.entry(standing.strategy.clone()).or_insert(0.0) += standing.profit;
        }
        totals
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a tournament (Level 1 orchestration)
///
/// # Arguments
/// * `configs` - Tables to play, each with its own roster
/// * `registry` - Strategy names available to rosters
/// * `config` - Games per table, master seed, parallelism
///
/// # Returns
/// Per-configuration summaries; identical whether run in parallel or not
pub fn run_tournament(
    configs: &[GameConfig],
    registry: &StrategyRegistry,
    config: &TournamentConfig,
) -> ConfigResult<TournamentResult> {
    check_configs(configs, registry)?;

    let summaries: ConfigResult<Vec<ConfigSummary>> = if config.parallel {
        configs
            .par_iter()
            .enumerate()
            .map(|(index, game_config)| run_config(index, game_config, registry, config))
            .collect()
    } else {
        configs
            .iter()
            .enumerate()
            .map(|(index, game_config)| run_config(index, game_config, registry, config))
            .collect()
    };

    Ok(TournamentResult {
        seed: config.seed,
        games_per_config: config.games_per_config,
        summaries: summaries?,
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Play every game of one configuration (Level 2 phase)
pub fn run_config(
    index: usize,
    game_config: &GameConfig,
    registry: &StrategyRegistry,
    config: &TournamentConfig,
) -> ConfigResult<ConfigSummary> {
    let mut runner = GameRunner::new(game_config.clone(), registry, index, config.seed)?;
    let mut summary = ConfigSummary::new(&game_config.name);
    let mut total_rounds = 0u64;
    let mut total_pool = 0.0;

    for _ in 0..config.games_per_config {
        let outcome = runner.play_next()?;
        total_rounds += outcome.rounds as u64;
        total_pool += outcome.prize_pool;
        record_outcome(&mut summary, &outcome);
    }

    if summary.games > 0 {
        summary.avg_rounds = total_rounds as f64 / summary.games as f64;
        summary.avg_prize_pool = total_pool / summary.games as f64;
    }
    summary.agents = standings(runner.agents());

    tracing::info!(
        config = %summary.name,
        games = summary.games,
        decided = summary.decided_games(),
        dead_ends = summary.dead_ends,
        avg_rounds = summary.avg_rounds,
        "configuration complete"
    );
    Ok(summary)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Fail fast on operator mistakes before any game runs
fn check_configs(configs: &[GameConfig], registry: &StrategyRegistry) -> ConfigResult<()> {
    for game_config in configs {
        game_config.validate()?;
        if let Some(spec) = game_config.agents.iter().find(|a| !registry.contains(&a.strategy)) {
            return Err(ConfigError::UnknownStrategy(spec.strategy.clone()));
        }
    }
    Ok(())
}

fn record_outcome(summary: &mut ConfigSummary, outcome: &GameOutcome) {
    summary.games += 1;
    match (outcome.reason, &outcome.winner) {
        (EndReason::Winner, Some(team)) => *summary.team_wins.entry(team.clone()).or_insert(0) += 1,
        (EndReason::DeadEnd, _) => summary.dead_ends += 1,
        _ => summary.round_limits += 1,
    }
}

/// Agent records sorted by profit, best first
fn standings(agents: &[SimAgent]) -> Vec<AgentStanding> {
    let mut standings: Vec<AgentStanding> = agents.iter().map(AgentStanding::from_agent).collect();
    standings.sort_by(|a, b| {
        b.profit
            .partial_cmp(&a.profit)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    standings
}
