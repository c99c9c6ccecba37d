//! Wire snapshot as polled from a game server
//!
//! Every field is optional. `Snapshot::ingest` validates once and produces a
//! typed `GameState`; nothing deeper in the call chain re-validates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Rules, Snake, Team};
use crate::grid::{Direction, GridKind, GridSpec, Position, DEFAULT_RADIUS};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnakeWire {
    pub body: Vec<Position>,
    pub current_direction: Option<String>,
    pub controlling_team: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWire {
    #[serde(rename = "type")]
    pub kind: Option<GridKind>,
    pub radius: Option<i32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamWire {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigWire {
    pub initial_min_bid: Option<f64>,
    pub fruits_to_win: Option<u32>,
    pub grid_type: Option<GridKind>,
}

/// Raw game snapshot
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub snake: Option<SnakeWire>,
    pub grid_size: Option<GridWire>,
    pub teams: Vec<TeamWire>,
    pub scores: BTreeMap<String, u32>,
    pub pools: BTreeMap<String, f64>,
    pub fruits: BTreeMap<String, Vec<Position>>,
    pub round: Option<u32>,
    pub countdown: Option<u32>,
    pub min_bid: Option<f64>,
    pub prize_pool: Option<f64>,
    pub active: Option<bool>,
    pub winner: Option<String>,
    pub config: Option<ConfigWire>,
    /// Set by the server when the game could not be served
    pub error: Option<String>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate into a typed state.
    ///
    /// Returns `None` for an error marker, a missing snake or an empty or
    /// off-board head. Callers skip the tick.
    pub fn ingest(&self) -> Option<GameState> {
        if self.error.is_some() {
            return None;
        }
        let snake = self.snake.as_ref()?;
        let head = *snake.body.first()?;

        let config = self.config.clone().unwrap_or_default();
        let grid_wire = self.grid_size.clone().unwrap_or_default();
        let kind = grid_wire.kind.or(config.grid_type).unwrap_or(GridKind::Hex);
        let grid = GridSpec {
            kind,
            radius: grid_wire.radius.unwrap_or(DEFAULT_RADIUS),
        };
        if !grid.contains(head) {
            return None;
        }

        let defaults = Rules::default();
        let rules = Rules {
            initial_min_bid: config.initial_min_bid.unwrap_or(defaults.initial_min_bid),
            fruits_to_win: config.fruits_to_win.unwrap_or(defaults.fruits_to_win),
        };

        let direction = snake
            .current_direction
            .as_deref()
            .and_then(Direction::parse)
            .filter(|d| grid.has_direction(*d))
            .unwrap_or(grid.directions()[0]);

        let teams = self.collect_teams();
        let mut fruits = self.fruits.clone();
        for team in &teams {
            fruits.entry(team.id.clone()).or_default();
        }

        Some(GameState {
            grid,
            snake: Snake {
                body: snake.body.clone(),
                direction,
                controlling_team: snake.controlling_team.clone(),
            },
            teams,
            fruits,
            round: self.round.unwrap_or(0),
            countdown: self.countdown.unwrap_or(0),
            min_bid: self.min_bid.unwrap_or(rules.initial_min_bid),
            prize_pool: self.prize_pool.unwrap_or(0.0),
            active: self.active.unwrap_or(true),
            winner: self.winner.clone(),
            rules,
        })
    }

    /// Team list, falling back to ids seen in scores/pools/fruits
    fn collect_teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self
            .teams
            .iter()
            .filter(|t| !t.id.is_empty())
            .map(|t| Team {
                id: t.id.clone(),
                name: t.name.clone().unwrap_or_else(|| format!("Team {}", t.id)),
                color: t.color.clone(),
                score: 0,
                pool: 0.0,
            })
            .collect();

        if teams.is_empty() {
            let mut ids: Vec<&String> = self
                .scores
                .keys()
                .chain(self.pools.keys())
                .chain(self.fruits.keys())
                .collect();
            ids.sort();
            ids.dedup();
            teams = ids.into_iter().map(|id| Team::new(id.clone())).collect();
        }

        for team in &mut teams {
            team.score = self.scores.get(&team.id).copied().unwrap_or(0);
            team.pool = self.pools.get(&team.id).copied().unwrap_or(0.0);
        }
        teams
    }

    /// Export a typed state back to wire form
    pub fn from_state(state: &GameState) -> Self {
        Self {
            snake: Some(SnakeWire {
                body: state.snake.body.clone(),
                current_direction: Some(state.snake.direction.as_str().to_string()),
                controlling_team: state.snake.controlling_team.clone(),
            }),
            grid_size: Some(GridWire {
                kind: Some(state.grid.kind),
                radius: Some(state.grid.radius),
            }),
            teams: state
                .teams
                .iter()
                .map(|t| TeamWire {
                    id: t.id.clone(),
                    name: Some(t.name.clone()),
                    color: t.color.clone(),
                })
                .collect(),
            scores: state.teams.iter().map(|t| (t.id.clone(), t.score)).collect(),
            pools: state.teams.iter().map(|t| (t.id.clone(), t.pool)).collect(),
            fruits: state.fruits.clone(),
            round: Some(state.round),
            countdown: Some(state.countdown),
            min_bid: Some(state.min_bid),
            prize_pool: Some(state.prize_pool),
            active: Some(state.active),
            winner: state.winner.clone(),
            config: Some(ConfigWire {
                initial_min_bid: Some(state.rules.initial_min_bid),
                fruits_to_win: Some(state.rules.fruits_to_win),
                grid_type: Some(state.grid.kind),
            }),
            error: None,
        }
    }
}
