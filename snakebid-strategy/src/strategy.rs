//! Strategy interface and the records that flow through it

use serde::{Deserialize, Serialize};

use snakebid_core::{Direction, GameRng, GameState, ParsedView};

/// Default cap on what one agent stakes in a single round
pub const DEFAULT_ROUND_SPEND: f64 = 8.0;

/// A stake on a direction and a team
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteAction {
    pub direction: Direction,
    pub team: String,
    pub amount: f64,
    /// Diagnostic only
    pub reason: String,
}

impl VoteAction {
    pub fn new(direction: Direction, team: impl Into<String>, amount: f64, reason: impl Into<String>) -> Self {
        Self {
            direction,
            team: team.into(),
            amount,
            reason: reason.into(),
        }
    }
}

/// Outcome of a strategy call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    Vote(VoteAction),
    Skip { reason: String },
}

impl Decision {
    pub fn skip(reason: impl Into<String>) -> Self {
        Decision::Skip {
            reason: reason.into(),
        }
    }

    pub fn vote(&self) -> Option<&VoteAction> {
        match self {
            Decision::Vote(vote) => Some(vote),
            Decision::Skip { .. } => None,
        }
    }

    /// `None` (no decision at all) counts as a skip
    pub fn from_option(decision: Option<Decision>) -> Self {
        decision.unwrap_or_else(|| Decision::skip("no decision"))
    }
}

/// Per-agent counters maintained by whoever drives the strategy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Team backed by the agent's latest vote
    pub current_team: Option<String>,
    /// Direction of the agent's latest vote
    pub last_direction: Option<Direction>,
    pub round_spend: f64,
    pub round_votes: u32,
    pub game_votes: u32,
    pub games_played: u32,
    pub wins: u32,
}

impl AgentState {
    /// Reset per-round counters
    pub fn start_round(&mut self) {
        self.round_spend = 0.0;
        self.round_votes = 0;
    }

    /// Reset per-game counters
    pub fn start_game(&mut self) {
        self.start_round();
        self.current_team = None;
        self.last_direction = None;
        self.game_votes = 0;
    }

    pub fn record_vote(&mut self, vote: &VoteAction) {
        self.current_team = Some(vote.team.clone());
        self.last_direction = Some(vote.direction);
        self.round_spend += vote.amount;
        self.round_votes += 1;
        self.game_votes += 1;
    }

    pub fn finish_game(&mut self, won: bool) {
        self.games_played += 1;
        if won {
            self.wins += 1;
        }
    }
}

/// A voting policy.
///
/// Only `compute_vote` is required. Counter-bidding and the lifecycle hooks
/// default to "never" and no-ops.
pub trait Strategy: Send {
    /// Registry name
    fn name(&self) -> &str;

    /// Decide this round's vote from the current snapshot
    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        rng: &mut GameRng,
    ) -> Decision;

    /// Offered after being outvoted. The view's min bid is the escalated
    /// cost of countering.
    fn should_counter_bid(
        &mut self,
        _view: &ParsedView<'_>,
        _balance: f64,
        _agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Option<VoteAction> {
        None
    }

    fn on_game_start(&mut self, _state: &GameState) {}

    fn on_round_end(&mut self, _state: &GameState) {}

    fn on_game_end(&mut self, _state: &GameState) {}
}
