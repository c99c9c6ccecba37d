//! snakebid CLI - Command-line interface
//!
//! Commands:
//! - simulate: Play seeded games on one table and report results
//! - tournament: Play many games across several tables
//! - decide: Ask a strategy for its vote on a snapshot file

mod decide;
mod simulate;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snakebid")]
#[command(about = "Vote-to-steer snake auction simulator")]
struct Cli {
    /// Master random seed (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate games on one table
    Simulate(simulate::SimulateArgs),
    /// Run a tournament over several tables
    Tournament(tournament_cmd::TournamentArgs),
    /// Compute one decision from a snapshot file
    Decide(decide::DecideArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => simulate::run(args, cli.seed),
        Commands::Tournament(args) => tournament_cmd::run(args, cli.seed),
        Commands::Decide(args) => decide::run(args, cli.seed),
    }
}

/// RUST_LOG wins over --verbose; logs go to stderr so JSON output stays clean
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// The seed every game derives from; drawn fresh when none was given
pub(crate) fn master_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| create_rng(None).gen())
}
