//! Game state snapshot: snake, teams, fruit and auction counters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, GridSpec, Position};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seconds left on the clock at which counter-bids can extend a round
pub const EXTENSION_WINDOW_SECS: u32 = 5;

/// Default stake for the first vote of a round
pub const DEFAULT_MIN_BID: f64 = 1.0;

/// Default fruits a team needs to win
pub const DEFAULT_FRUITS_TO_WIN: u32 = 3;

// ============================================================================
// CORE TYPES
// ============================================================================

/// The snake. `body[0]` is the head.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    pub body: Vec<Position>,
    pub direction: Direction,
    /// Team credited with anything eaten this round
    pub controlling_team: Option<String>,
}

impl Snake {
    /// Length-1 snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
            controlling_team: None,
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Body after the head moves to `next`; the tail is kept when growing.
    pub fn advanced(&self, next: Position, direction: Direction, grow: bool) -> Snake {
        let mut body = Vec::with_capacity(self.body.len() + 1);
        body.push(next);
        body.extend_from_slice(&self.body);
        if !grow {
            body.pop();
        }
        Snake {
            body,
            direction,
            controlling_team: self.controlling_team.clone(),
        }
    }
}

/// A team that can be backed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub score: u32,
    /// Stake placed on this team during the current round
    pub pool: f64,
}

impl Team {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("Team {}", id),
            id,
            color: None,
            score: 0,
            pool: 0.0,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Per-game rules carried in every snapshot
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub initial_min_bid: f64,
    pub fruits_to_win: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            initial_min_bid: DEFAULT_MIN_BID,
            fruits_to_win: DEFAULT_FRUITS_TO_WIN,
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// One immutable game snapshot (clone to advance)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub grid: GridSpec,
    pub snake: Snake,
    pub teams: Vec<Team>,
    /// Team id -> fruit positions native to that team
    pub fruits: BTreeMap<String, Vec<Position>>,
    pub round: u32,
    pub countdown: u32,
    pub min_bid: f64,
    pub prize_pool: f64,
    pub active: bool,
    pub winner: Option<String>,
    pub rules: Rules,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game: length-1 snake at the center, no fruit, empty pools
    pub fn new(grid: GridSpec, teams: Vec<Team>, rules: Rules) -> Self {
        let direction = grid.directions()[0];
        let fruits = teams.iter().map(|t| (t.id.clone(), Vec::new())).collect();
        Self {
            grid,
            snake: Snake::new(Position::new(0, 0), direction),
            teams,
            fruits,
            round: 0,
            countdown: 0,
            min_bid: rules.initial_min_bid,
            prize_pool: 0.0,
            active: true,
            winner: None,
            rules,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn head(&self) -> Position {
        self.snake.head()
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Fruits native to a team (empty if none)
    pub fn team_fruits(&self, id: &str) -> &[Position] {
        self.fruits.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate (native team, position) over all fruit
    pub fn all_fruits(&self) -> impl Iterator<Item = (&str, Position)> + '_ {
        self.fruits
            .iter()
            .flat_map(|(team, cells)| cells.iter().map(move |&pos| (team.as_str(), pos)))
    }

    /// Native team of the fruit at `pos`, if any
    pub fn fruit_at(&self, pos: Position) -> Option<&str> {
        self.all_fruits()
            .find(|&(_, cell)| cell == pos)
            .map(|(team, _)| team)
    }

    /// Body or fruit occupies the cell
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.snake.contains(pos) || self.fruit_at(pos).is_some()
    }

    /// Sum of this round's team pools
    pub fn total_pool(&self) -> f64 {
        self.teams.iter().map(|t| t.pool).sum()
    }

    /// Number of counter-bid extensions implied by the current min bid
    pub fn extension_count(&self) -> u32 {
        extension_count(self.min_bid, self.rules.initial_min_bid)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Directions the head can take without leaving the board or hitting
    /// any body cell other than the head itself.
    pub fn legal_moves(&self) -> Vec<Direction> {
        let head = self.head();
        let rest = &self.snake.body[1..];
        self.grid
            .neighbors(head)
            .filter(|(_, next)| !rest.contains(next))
            .map(|(dir, _)| dir)
            .collect()
    }

    pub fn is_legal(&self, direction: Direction) -> bool {
        self.legal_moves().contains(&direction)
    }
}

/// round(log2(current / initial)) when the bid has been escalated
pub fn extension_count(current_min_bid: f64, initial_min_bid: f64) -> u32 {
    if initial_min_bid <= 0.0 || current_min_bid <= initial_min_bid {
        return 0;
    }
    (current_min_bid / initial_min_bid).log2().round() as u32
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_team_game() -> GameState {
        GameState::new(
            GridSpec::hex(3),
            vec![Team::new("A"), Team::new("B")],
            Rules::default(),
        )
    }

    #[test]
    fn test_new_game() {
        let game = two_team_game();
        assert_eq!(game.snake.len(), 1);
        assert_eq!(game.head(), Position::new(0, 0));
        assert_eq!(game.round, 0);
        assert!(game.active);
        assert_eq!(game.min_bid, DEFAULT_MIN_BID);
        assert_eq!(game.legal_moves().len(), 6);
        assert!(game.team_fruits("A").is_empty());
    }

    #[test]
    fn test_fruit_lookup() {
        let mut game = two_team_game();
        game.fruits.get_mut("B").unwrap().push(Position::new(1, 1));
        assert_eq!(game.fruit_at(Position::new(1, 1)), Some("B"));
        assert_eq!(game.fruit_at(Position::new(0, 1)), None);
        assert!(game.is_occupied(Position::new(1, 1)));
        assert!(game.is_occupied(Position::new(0, 0)));
    }

    #[test]
    fn test_legal_moves_exclude_body() {
        let mut game = two_team_game();
        // Head at (0,0), neck at (0,1) which is south of the head
        game.snake.body = vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)];
        let moves = game.legal_moves();
        assert!(!moves.contains(&Direction::S));
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn test_legal_moves_at_edge() {
        let mut game = two_team_game();
        game.snake.body = vec![Position::new(0, -3)];
        let moves = game.legal_moves();
        assert!(!moves.contains(&Direction::N));
        assert!(!moves.contains(&Direction::NE));
    }

    #[test]
    fn test_snake_advanced() {
        let snake = Snake {
            body: vec![Position::new(0, 0), Position::new(0, 1)],
            direction: Direction::N,
            controlling_team: None,
        };
        let moved = snake.advanced(Position::new(0, -1), Direction::N, false);
        assert_eq!(moved.body, vec![Position::new(0, -1), Position::new(0, 0)]);
        let grown = snake.advanced(Position::new(0, -1), Direction::N, true);
        assert_eq!(grown.len(), 3);
        assert_eq!(grown.tail(), Position::new(0, 1));
    }

    #[test]
    fn test_extension_count() {
        assert_eq!(extension_count(1.0, 1.0), 0);
        assert_eq!(extension_count(2.0, 1.0), 1);
        assert_eq!(extension_count(8.0, 1.0), 3);
        assert_eq!(extension_count(0.5, 1.0), 0);
        assert_eq!(extension_count(3.0, 0.0), 0);
    }
}
