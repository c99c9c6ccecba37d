//! Simulate command - play seeded games on one table
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_games(), report_results()
//! - Level 3: record_game()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use snakebid_sim::{EndReason, GameOutcome};
use snakebid_strategy::StrategyRegistry;
use snakebid_tournament::{game_seed, AgentStanding, GameConfig, GameRunner};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Preset (small, standard, large, square) or JSON config file
    #[arg(long, default_value = "standard")]
    pub config: String,

    /// Number of games to play with the same roster
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Print every round record as a JSON line
    #[arg(long)]
    pub log: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    winner: Option<String>,
    reason: EndReason,
    rounds: u32,
    prize_pool: f64,
}

/// Aggregated simulation results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    config: String,
    seed: u64,
    games: Vec<GameRecord>,
    agents: Vec<AgentStanding>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Resolve the table configuration
/// 2. Play the games with one persistent roster
/// 3. Report results
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args.config)?;
    let registry = StrategyRegistry::with_builtins();
    let seed = crate::master_seed(seed);

    tracing::info!(
        "Simulating {} game(s) on {} with {} agents (seed {})",
        args.games,
        config.name,
        config.agents.len(),
        seed
    );

    let results = play_games(config, &registry, &args, seed)?;
    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_config(name_or_path: &str) -> Result<GameConfig> {
    GameConfig::resolve(name_or_path).with_context(|| format!("Failed to load config: {}", name_or_path))
}

fn play_games(
    config: GameConfig,
    registry: &StrategyRegistry,
    args: &SimulateArgs,
    seed: u64,
) -> Result<SimulationResults> {
    let name = config.name.clone();
    let mut runner = GameRunner::new(config, registry, 0, seed).context("Failed to seat agents")?;
    let mut games = Vec::with_capacity(args.games);

    for game_index in 0..args.games {
        let outcome = runner.play_next()?;
        if args.log {
            println!("{}", outcome.log_json()?);
        }
        let record = record_game(game_index, game_seed(seed, 0, game_index), &outcome);
        tracing::info!(
            "Game {}: {} ({} rounds, pool {:.2})",
            record.game_number,
            describe_result(&record),
            record.rounds,
            record.prize_pool
        );
        games.push(record);
    }

    Ok(SimulationResults {
        config: name,
        seed,
        games,
        agents: runner.agents().iter().map(AgentStanding::from_agent).collect(),
    })
}

fn report_results(results: &SimulationResults, args: &SimulateArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn record_game(game_index: usize, seed: u64, outcome: &GameOutcome) -> GameRecord {
    GameRecord {
        game_number: game_index + 1,
        seed,
        winner: outcome.winner.clone(),
        reason: outcome.reason,
        rounds: outcome.rounds,
        prize_pool: outcome.prize_pool,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn describe_result(record: &GameRecord) -> String {
    match (&record.winner, record.reason) {
        (Some(team), _) => format!("team {} wins", team),
        (None, EndReason::DeadEnd) => "dead end".to_string(),
        (None, _) => "round limit".to_string(),
    }
}

fn print_text_results(results: &SimulationResults) {
    println!("\n=== Simulation: {} (seed {}) ===", results.config, results.seed);
    for game in &results.games {
        println!(
            "Game {:>3}: {:<14} {:>4} rounds  pool {:>8.2}",
            game.game_number,
            describe_result(game),
            game.rounds,
            game.prize_pool
        );
    }

    println!("\n{:<14} {:<16} {:>9} {:>9} {:>9} {:>7} {:>5}", "agent", "strategy", "spent", "earned", "profit", "roi", "wins");
    for agent in &results.agents {
        println!(
            "{:<14} {:<16} {:>9.2} {:>9.2} {:>9.2} {:>6.1}% {:>5}",
            agent.name,
            agent.strategy,
            agent.spent,
            agent.earned,
            agent.profit,
            agent.roi * 100.0,
            agent.wins
        );
    }
}
