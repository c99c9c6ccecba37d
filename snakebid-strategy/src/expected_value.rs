//! Reference policy: back the team with the best expected all-pay return
//!
//! Every stake stays in the prize pool whatever happens; when a team wins,
//! the whole pool is split among that team's voters by vote count. The
//! policy estimates each team's chance of winning from how many fruits it
//! still needs and how far its nearest fruit is, blends in how much of the
//! round's stake already sits on that team, and scales by the share of the
//! pot a single voter can expect.

use rand::Rng;
use serde::{Deserialize, Serialize};

use snakebid_core::{
    bfs_distance, nearest_reachable_fruit, GameRng, ParsedView, Position,
};

use crate::steering::{choose_direction, fallback_vote, SteeringWeights};
use crate::strategy::{AgentState, Decision, Strategy, VoteAction, DEFAULT_ROUND_SPEND};

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvParams {
    /// Teams with EV >= max * (1 - fraction) are viable picks
    pub viable_fraction: f64,
    /// Counter only if expected return exceeds this multiple of the cost
    pub counter_multiple: f64,
    /// Most an agent will stake in a single round
    pub max_round_spend: f64,
    /// Weight of raw win probability against control share
    pub win_weight: f64,
    pub steering: SteeringWeights,
}

impl Default for EvParams {
    fn default() -> Self {
        Self {
            viable_fraction: 0.4,
            counter_multiple: 3.0,
            max_round_spend: DEFAULT_ROUND_SPEND,
            win_weight: 0.7,
            steering: SteeringWeights::default(),
        }
    }
}

// ============================================================================
// PAYOUT MODEL
// ============================================================================

/// Banded win probability on (fruits still needed, path distance).
///
/// Non-increasing in both arguments.
pub fn win_probability(fruits_needed: u32, distance: u32) -> f64 {
    match fruits_needed {
        0 => 1.0,
        1 => match distance {
            0..=1 => 0.85,
            2..=3 => 0.6,
            4..=6 => 0.4,
            _ => 0.25,
        },
        2 => match distance {
            0..=2 => 0.45,
            3..=5 => 0.3,
            _ => 0.18,
        },
        n => {
            let base = 0.3 / n as f64;
            if distance <= 3 {
                base
            } else {
                base * 0.7
            }
        }
    }
}

/// Fraction of this round's stake that would sit on `team_pool` after we add ours
pub fn control_share(team_pool: f64, total_pool: f64, stake: f64) -> f64 {
    let total = total_pool + stake;
    if total <= 0.0 {
        return 0.0;
    }
    (team_pool + stake) / total
}

/// Unique voters inferred from pot size relative to votes per round
pub fn estimated_voters(prize_pool: f64, initial_min_bid: f64, round: u32) -> f64 {
    if initial_min_bid <= 0.0 {
        return 1.0;
    }
    let votes = prize_pool / initial_min_bid;
    (votes / round.max(1) as f64).max(1.0)
}

/// Pot share one voter can expect if their team wins
pub fn payout_share(prize_pool: f64, stake: f64, voters: f64) -> f64 {
    (prize_pool + stake) / voters.max(1.0)
}

/// Candidate team with its nearest reachable fruit
#[derive(Clone, Debug, PartialEq)]
pub struct TeamEstimate {
    pub team: String,
    pub target: Position,
    pub distance: u32,
    pub win_probability: f64,
    pub ev: f64,
}

/// EV for every team that has a reachable fruit
pub fn estimate_teams(view: &ParsedView<'_>, stake: f64, win_weight: f64) -> Vec<TeamEstimate> {
    let state = view.state();
    let total_pool = view.total_pool();
    let voters = estimated_voters(view.prize_pool(), view.initial_min_bid(), view.round());
    let payout = payout_share(view.prize_pool(), stake, voters);

    view.teams()
        .iter()
        .filter_map(|team| {
            let (target, path) = nearest_reachable_fruit(state, &team.id)?;
            let p = win_probability(team.fruits_needed, path.distance);
            let share = control_share(team.pool, total_pool, stake);
            let adjusted = win_weight * p + (1.0 - win_weight) * share;
            Some(TeamEstimate {
                team: team.id.clone(),
                target,
                distance: path.distance,
                win_probability: p,
                ev: adjusted * payout,
            })
        })
        .collect()
}

/// Pick an index with probability proportional to its weight
pub fn weighted_pick(weights: &[f64], rng: &mut GameRng) -> usize {
    let total: f64 = weights.iter().sum();
    if weights.len() <= 1 || total <= 0.0 {
        return 0;
    }
    let mut threshold = rng.gen_range(0.0..total);
    for (i, &weight) in weights.iter().enumerate() {
        if threshold < weight {
            return i;
        }
        threshold -= weight;
    }
    weights.len() - 1
}

// ============================================================================
// STRATEGY
// ============================================================================

/// Expected-value policy
#[derive(Clone, Debug, Default)]
pub struct ExpectedValue {
    pub params: EvParams,
    /// (team, fruit) targeted by the latest vote
    last_target: Option<(String, Position)>,
}

impl ExpectedValue {
    pub fn new(params: EvParams) -> Self {
        Self {
            params,
            last_target: None,
        }
    }

    pub fn last_target(&self) -> Option<&(String, Position)> {
        self.last_target.as_ref()
    }

    fn can_afford(&self, cost: f64, balance: f64, agent: &AgentState) -> bool {
        cost <= balance && agent.round_spend + cost <= self.params.max_round_spend
    }

    /// Choose among viable teams, weighted by EV
    fn pick_team(&self, mut estimates: Vec<TeamEstimate>, rng: &mut GameRng) -> Option<TeamEstimate> {
        estimates.retain(|e| e.ev > 0.0);
        let max_ev = estimates.iter().map(|e| e.ev).fold(f64::MIN, f64::max);
        let floor = max_ev * (1.0 - self.params.viable_fraction);
        estimates.retain(|e| e.ev >= floor);
        if estimates.len() <= 1 {
            return estimates.pop();
        }
        let weights: Vec<f64> = estimates.iter().map(|e| e.ev).collect();
        let idx = weighted_pick(&weights, rng);
        Some(estimates.swap_remove(idx))
    }
}

impl Strategy for ExpectedValue {
    fn name(&self) -> &str {
        "expected_value"
    }

    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        rng: &mut GameRng,
    ) -> Decision {
        if !view.is_active() {
            return Decision::skip("game inactive");
        }
        if view.valid_moves().is_empty() {
            return Decision::skip("no legal move");
        }
        let stake = view.min_bid();
        if !self.can_afford(stake, balance, agent) {
            return Decision::skip("over budget");
        }

        let estimates = estimate_teams(view, stake, self.params.win_weight);
        let Some(choice) = self.pick_team(estimates, rng) else {
            self.last_target = None;
            return fallback_vote(view, agent, stake);
        };
        let Some(direction) = choose_direction(view, &choice.team, choice.target, &self.params.steering) else {
            self.last_target = None;
            return fallback_vote(view, agent, stake);
        };

        self.last_target = Some((choice.team.clone(), choice.target));
        Decision::Vote(VoteAction::new(
            direction,
            choice.team,
            stake,
            format!("ev {:.2} fruit at {}", choice.ev, choice.distance),
        ))
    }

    fn should_counter_bid(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Option<VoteAction> {
        let cost = view.min_bid();
        if !self.can_afford(cost, balance, agent) {
            return None;
        }

        let (team, target) = self.last_target.clone()?;
        let state = view.state();
        if !state.team_fruits(&team).contains(&target) {
            return None;
        }
        let path = bfs_distance(view.head(), target, state, true, true)?;
        if path.distance > 1 {
            return None;
        }
        let direction = path.first_step?;

        let needed = view.team(&team)?.fruits_needed;
        let voters = estimated_voters(view.prize_pool(), view.initial_min_bid(), view.round());
        let expected = win_probability(needed, path.distance) * payout_share(view.prize_pool(), cost, voters);
        if expected <= self.params.counter_multiple * cost {
            return None;
        }

        tracing::debug!(team = %team, cost, expected, "counter-bid on adjacent fruit");
        Some(VoteAction::new(
            direction,
            team,
            cost,
            format!("counter: return {:.2} vs cost {:.2}", expected, cost),
        ))
    }

    fn on_game_start(&mut self, _state: &snakebid_core::GameState) {
        self.last_target = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================
