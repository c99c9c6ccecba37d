//! Decide command - one strategy decision from a snapshot file
//!
//! An unusable snapshot (missing snake, error marker, malformed JSON) is a
//! skip, not a failure. Only operator mistakes (missing file, unknown
//! strategy) are errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use snakebid_core::{GameRng, ParsedView, Snapshot};
use snakebid_strategy::{AgentState, Decision, Strategy, StrategyRegistry};

#[derive(Args)]
pub struct DecideArgs {
    /// Snapshot JSON file
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Registered strategy name
    #[arg(long, default_value = "expected_value")]
    pub strategy: String,

    /// Balance available to the agent
    #[arg(long, default_value = "100")]
    pub balance: f64,

    /// Output the decision as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DecideArgs, seed: Option<u64>) -> Result<()> {
    let text = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read snapshot: {}", args.snapshot.display()))?;
    let registry = StrategyRegistry::with_builtins();
    let mut strategy = registry
        .create(&args.strategy)
        .with_context(|| format!("Available strategies: {}", registry.names().join(", ")))?;
    let mut rng = crate::create_rng(seed);

    let decision = decide(&text, strategy.as_mut(), args.balance, &mut rng);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        println!("{}", describe(&decision));
    }
    Ok(())
}

/// Ingest the snapshot and ask the strategy
fn decide(text: &str, strategy: &mut dyn Strategy, balance: f64, rng: &mut GameRng) -> Decision {
    let state = match Snapshot::from_json(text) {
        Ok(snapshot) => snapshot.ingest(),
        Err(err) => {
            tracing::warn!("Snapshot is not valid JSON: {}", err);
            None
        }
    };
    let Some(state) = state else {
        return Decision::skip("snapshot unusable");
    };
    let view = ParsedView::new(&state);
    strategy.compute_vote(&view, balance, &AgentState::default(), rng)
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Vote(vote) => format!(
            "vote {} for team {} at {:.2} ({})",
            vote.direction, vote.team, vote.amount, vote.reason
        ),
        Decision::Skip { reason } => format!("skip ({})", reason),
    }
}
