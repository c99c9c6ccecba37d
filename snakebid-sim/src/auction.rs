//! Round resolution state machine
//!
//! Level 3 - Step-level implementation
//!
//! Each round runs COLLECT_VOTES -> RESOLVE_DIRECTION -> COUNTER_BID_LOOP
//! -> APPLY_MOVE -> CHECK_WIN on a clone of the previous state. The live
//! state is only replaced once the round is fully resolved.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;

use snakebid_core::{ConfigResult, Direction, GameRng, GameState, ParsedView, Position, Snapshot};
use snakebid_strategy::{Decision, VoteAction};

use crate::agent::SimAgent;
use crate::config::SimConfig;
use crate::placement::{place_fruit, seed_fruits};
use crate::record::{EndReason, GameOutcome, IllegalMove, Payout, RoundEvent, RoundRecord, VoteRecord};

/// Tolerance when comparing a stake against the min bid
const BID_EPSILON: f64 = 1e-9;

/// Deterministic single-game simulator
pub struct Simulator {
    config: SimConfig,
    rng: GameRng,
    state: GameState,
    /// Body length at game start; the growth window only applies to length 1
    start_len: usize,
    log: Vec<RoundRecord>,
    /// Per agent index: votes placed for each team this game
    tallies: Vec<BTreeMap<String, u32>>,
    end: Option<EndReason>,
}

impl Simulator {
    /// Fresh game from a config; fruit placement draws from the seeded rng
    pub fn new(config: SimConfig, seed: u64) -> ConfigResult<Self> {
        config.validate()?;
        let mut rng = GameRng::seed_from_u64(seed);
        let mut state = GameState::new(config.grid, config.teams(), config.rules());
        seed_fruits(
            &mut state,
            config.fruits_per_team,
            config.min_fruit_center_distance,
            config.respawn_attempts,
            &mut rng,
        );
        Ok(Self::with_state(config, state, rng))
    }

    /// Resume from an arbitrary state
    pub fn with_state(config: SimConfig, state: GameState, rng: GameRng) -> Self {
        let start_len = state.snake.len();
        Self {
            config,
            rng,
            state,
            start_len,
            log: Vec::new(),
            tallies: Vec::new(),
            end: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn log(&self) -> &[RoundRecord] {
        &self.log
    }

    /// Current state in wire form
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state)
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Play a whole game: start hooks, rounds until terminal, payouts, end hooks
    pub fn run(mut self, agents: &mut [SimAgent]) -> GameOutcome {
        for agent in agents.iter_mut() {
            agent.state.start_game();
            agent.strategy.on_game_start(&self.state);
        }
        while self.play_round(agents).is_some() {}
        self.finish(agents)
    }

    /// Resolve one round. `None` once the game is over.
    pub fn play_round(&mut self, agents: &mut [SimAgent]) -> Option<&RoundRecord> {
        if self.end.is_some() {
            return None;
        }
        if !self.state.active {
            self.end = Some(if self.state.winner.is_some() {
                EndReason::Winner
            } else {
                EndReason::DeadEnd
            });
            return None;
        }
        if self.state.round >= self.config.max_rounds {
            self.end = Some(EndReason::RoundLimit);
            return None;
        }
        if self.tallies.len() < agents.len() {
            self.tallies.resize(agents.len(), BTreeMap::new());
        }

        let mut next = self.state.clone();
        next.min_bid = next.rules.initial_min_bid;
        next.countdown = self.config.round_seconds;
        next.snake.controlling_team = None;
        for team in &mut next.teams {
            team.pool = 0.0;
        }
        let mut record = RoundRecord::new(next.round);

        if next.legal_moves().is_empty() {
            tracing::debug!(round = next.round, head = ?next.head(), "dead end");
            next.active = false;
            record.events.push(RoundEvent::DeadEnd);
            record.min_bid = next.min_bid;
            record.head = next.head();
            record.prize_pool = next.prize_pool;
            self.end = Some(EndReason::DeadEnd);
            self.state = next;
            self.log.push(record);
            return self.log.last();
        }

        for agent in agents.iter_mut() {
            agent.state.start_round();
        }

        // COLLECT_VOTES
        let mut latest: Vec<Option<Direction>> = vec![None; agents.len()];
        for (idx, vote) in self.collect_votes(&next, agents) {
            let direction = vote.direction;
            if self.place_stake(&mut next, &mut record, agents, idx, vote, false) {
                latest[idx] = Some(direction);
            }
        }

        // RESOLVE_DIRECTION
        let (mut direction, mut controller) = match record.votes.last() {
            Some(vote) => (vote.direction, Some(vote.team.clone())),
            None => {
                let direction = fallback_direction(&next);
                record.events.push(RoundEvent::NoVotes { direction });
                (direction, None)
            }
        };

        // COUNTER_BID_LOOP
        let mut extensions = 0;
        if !record.votes.is_empty() {
            while extensions < self.config.max_extensions {
                let previous_bid = next.min_bid;
                next.min_bid = previous_bid * 2.0;

                let mut overridden: Vec<usize> = (0..agents.len())
                    .filter(|&idx| matches!(latest[idx], Some(d) if d != direction))
                    .collect();
                if self.config.fair_ordering {
                    overridden.shuffle(&mut self.rng);
                }

                let mut countered = false;
                for idx in overridden {
                    // An earlier counter this iteration may already agree with them
                    if latest[idx] == Some(direction) {
                        continue;
                    }
                    let offer = {
                        let view = ParsedView::new(&next);
                        let agent = &mut agents[idx];
                        agent
                            .strategy
                            .should_counter_bid(&view, agent.balance, &agent.state, &mut self.rng)
                    };
                    let Some(counter) = offer else {
                        continue;
                    };
                    let (counter_dir, counter_team) = (counter.direction, counter.team.clone());
                    if self.place_stake(&mut next, &mut record, agents, idx, counter, true) {
                        record.events.push(RoundEvent::Counter {
                            agent: agents[idx].name.clone(),
                            direction: counter_dir,
                            cost: next.min_bid,
                        });
                        latest[idx] = Some(counter_dir);
                        direction = counter_dir;
                        controller = Some(counter_team);
                        countered = true;
                    }
                }

                if !countered {
                    next.min_bid = previous_bid;
                    break;
                }
                extensions += 1;
            }
        }

        record.direction = Some(direction);
        record.controlling_team = controller.clone();
        record.extensions = extensions;
        record.min_bid = next.min_bid;
        next.snake.controlling_team = controller.clone();

        // APPLY_MOVE + CHECK_WIN
        self.apply_move(&mut next, &mut record, direction, controller.as_deref());

        record.head = next.head();
        record.prize_pool = next.prize_pool;
        tracing::debug!(
            round = record.round,
            direction = %direction,
            team = ?record.controlling_team,
            votes = record.votes.len(),
            extensions,
            "round resolved"
        );

        next.round += 1;
        next.min_bid = next.rules.initial_min_bid;
        next.countdown = 0;
        for agent in agents.iter_mut() {
            agent.strategy.on_round_end(&next);
        }

        self.state = next;
        self.log.push(record);
        self.log.last()
    }

    // ========================================================================
    // ROUND STEPS
    // ========================================================================

    /// Agent indices in this phase's order
    fn agent_order(&mut self, count: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..count).collect();
        if self.config.fair_ordering {
            order.shuffle(&mut self.rng);
        }
        order
    }

    /// Every agent sees the same snapshot; votes come back in submission order
    fn collect_votes(&mut self, state: &GameState, agents: &mut [SimAgent]) -> Vec<(usize, VoteAction)> {
        let order = self.agent_order(agents.len());
        let view = ParsedView::new(state);
        let mut votes = Vec::new();
        for idx in order {
            let agent = &mut agents[idx];
            match agent
                .strategy
                .compute_vote(&view, agent.balance, &agent.state, &mut self.rng)
            {
                Decision::Vote(vote) => votes.push((idx, vote)),
                Decision::Skip { reason } => {
                    tracing::trace!(agent = %agent.name, %reason, "abstained");
                }
            }
        }
        votes
    }

    /// Validate and bank a stake. All-pay: accepted stakes are never refunded.
    fn place_stake(
        &mut self,
        state: &mut GameState,
        record: &mut RoundRecord,
        agents: &mut [SimAgent],
        idx: usize,
        vote: VoteAction,
        counter: bool,
    ) -> bool {
        let agent = &mut agents[idx];
        if let Err(reason) = check_stake(state, agent, &vote) {
            tracing::debug!(agent = %agent.name, %reason, "vote rejected");
            record.events.push(RoundEvent::VoteRejected {
                agent: agent.name.clone(),
                reason,
            });
            return false;
        }

        agent.pay(vote.amount);
        agent.state.record_vote(&vote);
        if let Some(team) = state.team_mut(&vote.team) {
            team.pool += vote.amount;
        }
        state.prize_pool += vote.amount;
        *self.tallies[idx].entry(vote.team.clone()).or_insert(0) += 1;

        record.votes.push(VoteRecord {
            agent: agent.name.clone(),
            direction: vote.direction,
            team: vote.team,
            amount: vote.amount,
            counter,
        });
        true
    }

    fn apply_move(
        &mut self,
        state: &mut GameState,
        record: &mut RoundRecord,
        direction: Direction,
        controller: Option<&str>,
    ) {
        let target = state.head().step(direction);
        if !state.grid.contains(target) {
            record.events.push(RoundEvent::IllegalMove {
                direction,
                code: IllegalMove::OutOfBounds,
            });
            return;
        }

        let eaten = state.fruit_at(target).map(str::to_string);
        let in_growth_window =
            self.start_len == 1 && state.round < self.config.initial_growth_rounds;
        let grow = eaten.is_some() || in_growth_window;
        let tail_vacates = !grow && state.snake.len() > 1 && target == state.snake.tail();
        if state.snake.contains(target) && !tail_vacates {
            record.events.push(RoundEvent::IllegalMove {
                direction,
                code: IllegalMove::SelfCollision,
            });
            return;
        }

        state.snake = state.snake.advanced(target, direction, grow);
        if let Some(native) = eaten {
            self.eat_fruit(state, record, target, native, controller);
        }
    }

    /// Credit the controlling team, check the win, then respawn for the native team
    fn eat_fruit(
        &mut self,
        state: &mut GameState,
        record: &mut RoundRecord,
        position: Position,
        native: String,
        controller: Option<&str>,
    ) {
        if let Some(cells) = state.fruits.get_mut(&native) {
            cells.retain(|&cell| cell != position);
        }
        record.events.push(RoundEvent::FruitEaten {
            position,
            native_team: native.clone(),
            credited_team: controller.map(str::to_string),
        });

        if let Some(team_id) = controller {
            let fruits_to_win = state.rules.fruits_to_win;
            let won = match state.team_mut(team_id) {
                Some(team) => {
                    team.score += 1;
                    team.score >= fruits_to_win
                }
                None => false,
            };
            if won {
                state.active = false;
                state.winner = Some(team_id.to_string());
                record.events.push(RoundEvent::Winner {
                    team: team_id.to_string(),
                });
                self.end = Some(EndReason::Winner);
                return;
            }
        }

        if !self.config.respawn_fruit {
            return;
        }
        match place_fruit(
            state,
            self.config.min_fruit_center_distance,
            self.config.respawn_attempts,
            &mut self.rng,
        ) {
            Some(cell) => {
                state.fruits.entry(native.clone()).or_default().push(cell);
                record.events.push(RoundEvent::FruitRespawned {
                    team: native,
                    position: cell,
                });
            }
            None => tracing::warn!(team = %native, "no free cell for respawned fruit"),
        }
    }

    // ========================================================================
    // SETTLEMENT
    // ========================================================================

    fn finish(self, agents: &mut [SimAgent]) -> GameOutcome {
        let reason = self.end.unwrap_or(EndReason::RoundLimit);
        let winner = self.state.winner.clone();
        let payouts = match &winner {
            Some(team) => self.settle(team, agents),
            None => Vec::new(),
        };

        for (idx, agent) in agents.iter_mut().enumerate() {
            let backed_winner = match (&winner, self.tallies.get(idx)) {
                (Some(team), Some(tally)) => tally.contains_key(team),
                _ => false,
            };
            agent.state.finish_game(backed_winner);
            agent.strategy.on_game_end(&self.state);
        }

        tracing::info!(
            winner = ?winner,
            reason = ?reason,
            rounds = self.state.round,
            prize_pool = self.state.prize_pool,
            "game finished"
        );

        GameOutcome {
            winner,
            reason,
            rounds: self.state.round,
            prize_pool: self.state.prize_pool,
            payouts,
            log: self.log,
            final_state: self.state,
        }
    }

    /// Split the whole prize pool by each agent's vote count for the winner
    fn settle(&self, team: &str, agents: &mut [SimAgent]) -> Vec<Payout> {
        let counts: Vec<u32> = (0..agents.len())
            .map(|idx| {
                self.tallies
                    .get(idx)
                    .and_then(|tally| tally.get(team))
                    .copied()
                    .unwrap_or(0)
            })
            .collect();
        let total: u32 = counts.iter().sum();
        if total == 0 {
            tracing::warn!(team, "winning team has no backers, pool unclaimed");
            return Vec::new();
        }

        let pool = self.state.prize_pool;
        agents
            .iter_mut()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(agent, count)| {
                let amount = pool * count as f64 / total as f64;
                agent.credit(amount);
                Payout {
                    agent: agent.name.clone(),
                    amount,
                }
            })
            .collect()
    }
}

/// Play one game from a config and seed
pub fn play_game(config: SimConfig, seed: u64, agents: &mut [SimAgent]) -> ConfigResult<GameOutcome> {
    Ok(Simulator::new(config, seed)?.run(agents))
}

/// Keep going the same way when possible
fn fallback_direction(state: &GameState) -> Direction {
    let legal = state.legal_moves();
    if legal.contains(&state.snake.direction) {
        state.snake.direction
    } else {
        legal.first().copied().unwrap_or(state.snake.direction)
    }
}

fn check_stake(state: &GameState, agent: &SimAgent, vote: &VoteAction) -> Result<(), String> {
    if !(vote.amount + BID_EPSILON >= state.min_bid) {
        return Err(format!("stake {:.2} below min bid {:.2}", vote.amount, state.min_bid));
    }
    if !agent.can_afford(vote.amount) {
        return Err(format!("stake {:.2} exceeds balance {:.2}", vote.amount, agent.balance));
    }
    if state.team(&vote.team).is_none() {
        return Err(format!("unknown team {}", vote.team));
    }
    if !state.grid.has_direction(vote.direction) {
        return Err(format!("direction {} not on this grid", vote.direction));
    }
    Ok(())
}
