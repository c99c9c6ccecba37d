//! Integration tests for the snakebid engine
//!
//! Tests the full stack: snapshot ingestion, strategies, the auction
//! simulator and tournaments

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use snakebid_core::{
    flood_fill_size, Direction, GameState, GridSpec, ParsedView, Position, Rules, Snapshot, Team,
};
use snakebid_sim::{play_game, EndReason, RoundEvent, SimAgent, SimConfig, Simulator};
use snakebid_strategy::{AgentState, Decision, ExpectedValue, Strategy, StrategyRegistry, VoteAction};
use snakebid_tournament::{run_tournament, GameConfig, TournamentConfig};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Always votes the same way, never counters
struct Fixed {
    direction: Direction,
    team: &'static str,
}

impl Strategy for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn compute_vote(
        &mut self,
        view: &ParsedView<'_>,
        _balance: f64,
        _agent: &AgentState,
        _rng: &mut ChaCha8Rng,
    ) -> Decision {
        Decision::Vote(VoteAction::new(self.direction, self.team, view.min_bid(), "fixed"))
    }
}

fn two_team_game(radius: i32) -> GameState {
    GameState::new(
        GridSpec::hex(radius),
        vec![Team::new("A"), Team::new("B")],
        Rules::default(),
    )
}

fn roster(registry: &StrategyRegistry, balance: f64) -> Vec<SimAgent> {
    ["expected_value", "expected_value", "greedy", "aggressive", "random"]
        .iter()
        .enumerate()
        .map(|(i, name)| SimAgent::from_registry(registry, format!("agent-{}", i), name, balance).unwrap())
        .collect()
}

// ============================================================================
// SNAPSHOT -> DECISION
// ============================================================================

#[test]
fn test_snapshot_to_vote() {
    let json = r#"{
        "snake": {"body": [{"q": 0, "r": 0}, {"q": 0, "r": 1}], "currentDirection": "n"},
        "gridSize": {"type": "hex", "radius": 4},
        "teams": [{"id": "red"}, {"id": "blue"}],
        "scores": {"red": 2, "blue": 0},
        "fruits": {"red": [{"q": 1, "r": -2}], "blue": [{"q": -3, "r": 3}]},
        "round": 3,
        "countdown": 8,
        "minBid": 1,
        "prizePool": 9,
        "active": true,
        "config": {"initialMinBid": 1, "fruitsToWin": 3}
    }"#;

    let state = Snapshot::from_json(json).unwrap().ingest().unwrap();
    let view = ParsedView::new(&state);
    assert!(!view.valid_moves().contains(&Direction::S));

    let mut strategy = ExpectedValue::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let decision = strategy.compute_vote(&view, 50.0, &AgentState::default(), &mut rng);
    let vote = decision.vote().expect("expected a vote");
    assert_eq!(vote.team, "red");
    assert_eq!(vote.amount, 1.0);
    assert!(view.valid_moves().contains(&vote.direction));
}

#[test]
fn test_exported_snapshot_gives_same_decision() {
    let mut sim = Simulator::new(SimConfig::default(), 17).unwrap();
    let registry = StrategyRegistry::with_builtins();
    let mut agents = roster(&registry, 40.0);
    for _ in 0..3 {
        sim.play_round(&mut agents);
    }

    let json = serde_json::to_string(&sim.snapshot()).unwrap();
    let reloaded = Snapshot::from_json(&json).unwrap().ingest().unwrap();

    let decide = |state: &GameState| {
        let mut strategy = registry.create("greedy").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        strategy.compute_vote(&ParsedView::new(state), 40.0, &AgentState::default(), &mut rng)
    };
    assert_eq!(decide(sim.state()), decide(&reloaded));
}

// ============================================================================
// AUCTION
// ============================================================================

#[test]
fn test_expected_value_counter_on_adjacent_fruit() {
    let mut state = two_team_game(3);
    state.teams[0].score = 2;
    state.round = 10;
    state.prize_pool = 40.0;
    state.fruits.insert("A".into(), vec![Position::new(0, -1)]);
    state.fruits.insert("B".into(), vec![Position::new(0, 3)]);

    let config = SimConfig {
        fair_ordering: false,
        ..SimConfig::default()
    };
    let mut agents = vec![
        SimAgent::new("ev", Box::new(ExpectedValue::default()), 10.0),
        SimAgent::new(
            "rival",
            Box::new(Fixed {
                direction: Direction::S,
                team: "B",
            }),
            10.0,
        ),
    ];
    let mut sim = Simulator::with_state(config, state, ChaCha8Rng::seed_from_u64(3));

    let record = sim.play_round(&mut agents).unwrap().clone();
    assert_eq!(record.votes.len(), 3);
    assert_eq!(record.votes[1].direction, Direction::S);
    assert_eq!(record.extensions, 1);
    assert_eq!(record.min_bid, 2.0);
    assert_eq!(record.direction, Some(Direction::N));
    assert_eq!(record.controlling_team.as_deref(), Some("A"));
    assert!(record.events.contains(&RoundEvent::Winner { team: "A".into() }));
    assert_eq!(agents[0].balance, 7.0);
}

#[test]
fn test_same_seed_byte_identical() {
    let registry = StrategyRegistry::with_builtins();
    let play = |seed: u64| {
        let mut agents = roster(&registry, 60.0);
        let outcome = play_game(SimConfig::default().with_teams(3), seed, &mut agents).unwrap();
        (outcome.log_json().unwrap(), outcome.winner, outcome.rounds)
    };

    let (log_a, winner_a, rounds_a) = play(99);
    let (log_b, winner_b, rounds_b) = play(99);
    assert_eq!(log_a, log_b);
    assert_eq!(winner_a, winner_b);
    assert_eq!(rounds_a, rounds_b);
}

#[test]
fn test_game_invariants_hold_every_round() {
    let registry = StrategyRegistry::with_builtins();
    for seed in 0..4 {
        let mut agents = roster(&registry, 80.0);
        let outcome = play_game(SimConfig::default(), seed, &mut agents).unwrap();

        let mut credited: BTreeMap<String, u32> = BTreeMap::new();
        let mut prize_pool = 0.0;
        for (i, record) in outcome.log.iter().enumerate() {
            assert_eq!(record.round, i as u32);
            // Min bid doubles once per extension and starts fresh every round
            assert_eq!(record.min_bid, 2f64.powi(record.extensions as i32));
            assert!(record.extensions <= 3);

            prize_pool += record.total_staked();
            assert!((record.prize_pool - prize_pool).abs() < 1e-9);

            if let Some(last) = record.votes.last() {
                assert_eq!(record.direction, Some(last.direction));
                assert_eq!(record.controlling_team.as_deref(), Some(last.team.as_str()));
            }
            for event in &record.events {
                if let RoundEvent::FruitEaten {
                    credited_team: Some(team),
                    ..
                } = event
                {
                    assert_eq!(record.controlling_team.as_ref(), Some(team));
                    *credited.entry(team.clone()).or_insert(0) += 1;
                }
            }
        }

        for team in &outcome.final_state.teams {
            assert_eq!(team.score, credited.get(&team.id).copied().unwrap_or(0));
        }
        if outcome.reason == EndReason::Winner {
            let winner = outcome.winner.clone().unwrap();
            assert_eq!(outcome.final_state.team(&winner).unwrap().score, 3);
            let paid: f64 = outcome.payouts.iter().map(|p| p.amount).sum();
            assert!((paid - outcome.prize_pool).abs() < 1e-6);
        } else {
            assert!(outcome.payouts.is_empty());
        }
        assert!(flood_fill_size(outcome.final_state.head(), &outcome.final_state, None) >= 1);
    }
}

// ============================================================================
// TOURNAMENT
// ============================================================================

#[test]
fn test_tournament_reproducible_from_master_seed() {
    let registry = StrategyRegistry::with_builtins();
    let configs = vec![
        GameConfig::preset("small").unwrap(),
        GameConfig::preset("square").unwrap(),
    ];
    let settings = TournamentConfig::default().with_games(3).with_seed(2025);

    let first = run_tournament(&configs, &registry, &settings).unwrap();
    let second = run_tournament(&configs, &registry, &settings.clone().sequential()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    for summary in &first.summaries {
        assert_eq!(summary.games, 3);
        assert_eq!(summary.agents.len(), 5);
    }
}
