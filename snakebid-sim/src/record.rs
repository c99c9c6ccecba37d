//! Round log and game outcome records
//!
//! The serialized round log is the reproducibility artefact: two games
//! played from the same seed and roster produce identical JSON.

use serde::{Deserialize, Serialize};

use snakebid_core::{Direction, GameState, Position};

/// Why an attempted move did not happen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalMove {
    OutOfBounds,
    SelfCollision,
}

/// Something notable that happened during a round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    /// No stakes; the snake kept going on its own
    NoVotes { direction: Direction },
    VoteRejected { agent: String, reason: String },
    Counter { agent: String, direction: Direction, cost: f64 },
    IllegalMove { direction: Direction, code: IllegalMove },
    FruitEaten {
        position: Position,
        native_team: String,
        credited_team: Option<String>,
    },
    FruitRespawned { team: String, position: Position },
    Winner { team: String },
    DeadEnd,
}

/// One accepted stake
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub agent: String,
    pub direction: Direction,
    pub team: String,
    pub amount: f64,
    /// Placed during the counter-bid loop
    pub counter: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub votes: Vec<VoteRecord>,
    pub direction: Option<Direction>,
    pub controlling_team: Option<String>,
    pub extensions: u32,
    /// Min bid after the counter loop
    pub min_bid: f64,
    pub events: Vec<RoundEvent>,
    pub head: Position,
    pub prize_pool: f64,
}

impl RoundRecord {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }

    pub fn total_staked(&self) -> f64 {
        self.votes.iter().map(|v| v.amount).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Winner,
    DeadEnd,
    RoundLimit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub agent: String,
    pub amount: f64,
}

/// Result of a finished game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<String>,
    pub reason: EndReason,
    pub rounds: u32,
    pub prize_pool: f64,
    pub payouts: Vec<Payout>,
    pub log: Vec<RoundRecord>,
    pub final_state: GameState,
}

impl GameOutcome {
    /// Round log as JSON lines
    pub fn log_json(&self) -> serde_json::Result<String> {
        let lines = self
            .log
            .iter()
            .map(serde_json::to_string)
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    pub fn payout_for(&self, agent: &str) -> f64 {
        self.payouts
            .iter()
            .filter(|p| p.agent == agent)
            .map(|p| p.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = RoundEvent::IllegalMove {
            direction: Direction::N,
            code: IllegalMove::OutOfBounds,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"illegal_move","direction":"n","code":"out_of_bounds"}"#);
        assert_eq!(serde_json::to_string(&RoundEvent::DeadEnd).unwrap(), r#"{"event":"dead_end"}"#);
    }

    #[test]
    fn test_total_staked() {
        let mut record = RoundRecord::new(4);
        for amount in [1.0, 2.0] {
            record.votes.push(VoteRecord {
                agent: "a".into(),
                direction: Direction::S,
                team: "A".into(),
                amount,
                counter: amount > 1.0,
            });
        }
        assert_eq!(record.round, 4);
        assert_eq!(record.total_staked(), 3.0);
    }
}
