//! Tournament command - many games across several tables
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_configs(), run_tournament(), report_results()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;

use snakebid_strategy::StrategyRegistry;
use snakebid_tournament::{run_tournament, GameConfig, TournamentConfig, TournamentResult};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Comma-separated presets or JSON config files
    #[arg(long, value_delimiter = ',', default_value = "small,standard,large,square")]
    pub configs: Vec<String>,

    /// Games per configuration
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Run configurations one after another instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
pub fn run(args: TournamentArgs, seed: Option<u64>) -> Result<()> {
    let configs = load_configs(&args.configs)?;
    let registry = StrategyRegistry::with_builtins();

    let mut settings = TournamentConfig::default()
        .with_games(args.games)
        .with_seed(crate::master_seed(seed));
    if args.sequential {
        settings = settings.sequential();
    }

    tracing::info!(
        "Tournament: {} configs x {} games (seed {}, parallel={})",
        configs.len(),
        settings.games_per_config,
        settings.seed,
        settings.parallel
    );

    let result = run_tournament(&configs, &registry, &settings).context("Tournament failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text_results(&result);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_configs(names: &[String]) -> Result<Vec<GameConfig>> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| GameConfig::resolve(name).with_context(|| format!("Failed to load config: {}", name)))
        .collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_text_results(result: &TournamentResult) {
    println!("\n=== Tournament (seed {}) ===", result.seed);

    for summary in &result.summaries {
        println!(
            "\n--- {} : {} games, avg {:.1} rounds, avg pool {:.2} ---",
            summary.name, summary.games, summary.avg_rounds, summary.avg_prize_pool
        );
        let wins: Vec<String> = summary
            .team_wins
            .iter()
            .map(|(team, count)| format!("{}={}", team, count))
            .collect();
        println!(
            "Team wins: [{}]  dead ends: {}  round limits: {}",
            wins.join(", "),
            summary.dead_ends,
            summary.round_limits
        );
        for agent in &summary.agents {
            println!(
                "  {:<14} {:<16} profit {:>9.2}  roi {:>6.1}%  wins {:>3}",
                agent.name,
                agent.strategy,
                agent.profit,
                agent.roi * 100.0,
                agent.wins
            );
        }
    }

    println!("\nProfit by strategy:");
    for (strategy, profit) in result.profit_by_strategy() {
        println!("  {:<16} {:>10.2}", strategy, profit);
    }
}
