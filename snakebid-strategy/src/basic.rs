//! Simple baseline policies

use rand::seq::SliceRandom;

use snakebid_core::{nearest_reachable_fruit, GameRng, ParsedView};

use crate::steering::{choose_direction, fallback_vote, safest_direction, SteeringWeights};
use crate::strategy::{AgentState, Decision, Strategy, VoteAction, DEFAULT_ROUND_SPEND};

/// Backs the team closest to winning and steers toward its nearest fruit
#[derive(Clone, Debug)]
pub struct Greedy {
    pub weights: SteeringWeights,
    /// Most staked in a single round
    pub max_round_spend: f64,
}

impl Default for Greedy {
    fn default() -> Self {
        Self {
            weights: SteeringWeights::default(),
            max_round_spend: DEFAULT_ROUND_SPEND,
        }
    }
}

impl Greedy {
    fn within_budget(&self, cost: f64, balance: f64, agent: &AgentState) -> bool {
        cost <= balance && agent.round_spend + cost <= self.max_round_spend
    }

    fn decide(&self, view: &ParsedView<'_>, balance: f64, agent: &AgentState) -> Decision {
        if !view.is_active() || view.valid_moves().is_empty() {
            return Decision::skip("nothing to steer");
        }
        let stake = view.min_bid();
        if !self.within_budget(stake, balance, agent) {
            return Decision::skip("over budget");
        }

        // Fewest fruits needed, then shortest path
        let best = view
            .teams()
            .iter()
            .filter_map(|team| {
                nearest_reachable_fruit(view.state(), &team.id)
                    .map(|(fruit, path)| (team, fruit, path.distance))
            })
            .min_by_key(|(team, _, distance)| (team.fruits_needed, *distance));

        let Some((team, fruit, distance)) = best else {
            return fallback_vote(view, agent, stake);
        };
        match choose_direction(view, &team.id, fruit, &self.weights) {
            Some(dir) => Decision::Vote(VoteAction::new(
                dir,
                team.id.clone(),
                stake,
                format!("needs {} fruit at {}", team.fruits_needed, distance),
            )),
            None => fallback_vote(view, agent, stake),
        }
    }
}

impl Strategy for Greedy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Decision {
        self.decide(view, balance, agent)
    }
}

/// Votes like `Greedy` and counters every time it can pay for it
#[derive(Clone, Debug, Default)]
pub struct Aggressive {
    inner: Greedy,
}

impl Strategy for Aggressive {
    fn name(&self) -> &str {
        "aggressive"
    }

    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Decision {
        self.inner.decide(view, balance, agent)
    }

    fn should_counter_bid(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Option<VoteAction> {
        let cost = view.min_bid();
        if !self.inner.within_budget(cost, balance, agent) {
            return None;
        }
        let team = agent.current_team.clone()?;
        let direction = agent
            .last_direction
            .filter(|d| view.valid_moves().contains(d))
            .or_else(|| safest_direction(view))?;
        Some(VoteAction::new(direction, team, cost, "counter: always"))
    }
}

/// Random legal direction, random team
#[derive(Clone, Debug, Default)]
pub struct RandomVoter;

impl Strategy for RandomVoter {
    fn name(&self) -> &str {
        "random"
    }

    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        balance: f64,
        _agent: &AgentState,
        rng: &mut GameRng,
    ) -> Decision {
        let stake = view.min_bid();
        if !view.is_active() || stake > balance {
            return Decision::skip("cannot vote");
        }
        let Some(&direction) = view.valid_moves().choose(rng) else {
            return Decision::skip("no legal move");
        };
        let Some(team) = view.teams().choose(rng) else {
            return Decision::skip("no teams");
        };
        Decision::Vote(VoteAction::new(direction, team.id.clone(), stake, "random"))
    }
}

/// Never votes
#[derive(Clone, Debug, Default)]
pub struct Passive;

impl Strategy for Passive {
    fn name(&self) -> &str {
        "passive"
    }

    fn compute_vote(
        &mut self,
        _view: &ParsedView<'_>,
        _balance: f64,
        _agent: &AgentState,
        _rng: &mut GameRng,
    ) -> Decision {
        Decision::skip("passive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use snakebid_core::{Direction, GameState, GridSpec, Position, Rules, Team};

    fn game() -> GameState {
        let mut state = GameState::new(
            GridSpec::hex(3),
            vec![Team::new("A"), Team::new("B")],
            Rules::default(),
        );
        state.fruits.insert("A".into(), vec![Position::new(0, -3)]);
        state.fruits.insert("B".into(), vec![Position::new(0, 2)]);
        state
    }

    #[test]
    fn test_greedy_prefers_team_closest_to_winning() {
        let mut state = game();
        state.teams[0].score = 2;
        let view = ParsedView::new(&state);
        let mut rng = GameRng::seed_from_u64(1);
        let decision = Greedy::default().compute_vote(&view, 5.0, &AgentState::default(), &mut rng);
        let vote = decision.vote().unwrap();
        assert_eq!(vote.team, "A");
        assert_eq!(vote.direction, Direction::N);
    }

    #[test]
    fn test_greedy_breaks_ties_by_distance() {
        let state = game();
        let view = ParsedView::new(&state);
        let mut rng = GameRng::seed_from_u64(1);
        let decision = Greedy::default().compute_vote(&view, 5.0, &AgentState::default(), &mut rng);
        assert_eq!(decision.vote().unwrap().team, "B");
    }

    #[test]
    fn test_greedy_falls_back_without_fruit() {
        let mut state = game();
        state.fruits.clear();
        state.snake.body = vec![Position::new(1, -3), Position::new(0, -2)];
        let view = ParsedView::new(&state);
        let agent = AgentState {
            current_team: Some("B".into()),
            ..AgentState::default()
        };
        let mut rng = GameRng::seed_from_u64(1);
        let decision = Greedy::default().compute_vote(&view, 5.0, &agent, &mut rng);
        let vote = decision.vote().expect("fallback should still vote");
        assert_eq!(Some(vote.direction), safest_direction(&view));
        assert_eq!(vote.team, "B");
    }

    #[test]
    fn test_baselines_share_round_budget() {
        assert_eq!(Greedy::default().max_round_spend, crate::EvParams::default().max_round_spend);
        let state = game();
        let view = ParsedView::new(&state);
        let spent = AgentState {
            round_spend: DEFAULT_ROUND_SPEND,
            ..AgentState::default()
        };
        let mut rng = GameRng::seed_from_u64(1);
        assert!(Greedy::default().compute_vote(&view, 50.0, &spent, &mut rng).vote().is_none());
    }

    #[test]
    fn test_aggressive_counters_when_affordable() {
        let state = game();
        let view = ParsedView::new(&state);
        let agent = AgentState {
            current_team: Some("A".into()),
            last_direction: Some(Direction::N),
            ..AgentState::default()
        };
        let mut rng = GameRng::seed_from_u64(1);
        let mut strategy = Aggressive::default();
        let counter = strategy.should_counter_bid(&view, 5.0, &agent, &mut rng).unwrap();
        assert_eq!(counter.direction, Direction::N);
        assert_eq!(counter.team, "A");
        assert!(strategy.should_counter_bid(&view, 0.5, &agent, &mut rng).is_none());
    }

    #[test]
    fn test_random_voter_picks_legal_moves() {
        let state = game();
        let view = ParsedView::new(&state);
        let mut rng = GameRng::seed_from_u64(3);
        for _ in 0..20 {
            let decision = RandomVoter.compute_vote(&view, 5.0, &AgentState::default(), &mut rng);
            let vote = decision.vote().unwrap();
            assert!(view.valid_moves().contains(&vote.direction));
        }
    }

    #[test]
    fn test_passive_never_votes() {
        let state = game();
        let view = ParsedView::new(&state);
        let mut rng = GameRng::seed_from_u64(3);
        assert!(Passive.compute_vote(&view, 5.0, &AgentState::default(), &mut rng).vote().is_none());
        assert!(Passive.should_counter_bid(&view, 5.0, &AgentState::default(), &mut rng).is_none());
    }
}
