//! Decision-ready projection of a game state
//!
//! A `ParsedView` borrows the state and never mutates it. Policies read
//! everything they need from here.

use crate::game::{GameState, EXTENSION_WINDOW_SECS};
use crate::grid::{Direction, Position};

/// Per-team summary
#[derive(Clone, Debug, PartialEq)]
pub struct TeamView {
    pub id: String,
    pub score: u32,
    pub pool: f64,
    /// Fruits still needed to reach the win threshold
    pub fruits_needed: u32,
    /// Closest native fruit by grid metric, with its distance from the head
    pub nearest_fruit: Option<(Position, u32)>,
}

/// Read-only derived view used by strategies
#[derive(Clone, Debug)]
pub struct ParsedView<'a> {
    state: &'a GameState,
    valid_moves: Vec<Direction>,
    teams: Vec<TeamView>,
}

impl<'a> ParsedView<'a> {
    pub fn new(state: &'a GameState) -> Self {
        let head = state.head();
        let fruits_to_win = state.rules.fruits_to_win;
        let teams = state
            .teams
            .iter()
            .map(|team| {
                let nearest_fruit = state
                    .team_fruits(&team.id)
                    .iter()
                    .map(|&pos| (pos, state.grid.distance(head, pos)))
                    .min_by_key(|&(_, d)| d);
                TeamView {
                    id: team.id.clone(),
                    score: team.score,
                    pool: team.pool,
                    fruits_needed: fruits_to_win.saturating_sub(team.score),
                    nearest_fruit,
                }
            })
            .collect();

        Self {
            state,
            valid_moves: state.legal_moves(),
            teams,
        }
    }

    pub fn state(&self) -> &'a GameState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn head(&self) -> Position {
        self.state.head()
    }

    pub fn snake_len(&self) -> usize {
        self.state.snake.len()
    }

    pub fn prize_pool(&self) -> f64 {
        self.state.prize_pool
    }

    pub fn min_bid(&self) -> f64 {
        self.state.min_bid
    }

    pub fn initial_min_bid(&self) -> f64 {
        self.state.rules.initial_min_bid
    }

    pub fn countdown(&self) -> u32 {
        self.state.countdown
    }

    /// Clock is inside the short window where counter-bids extend the round
    pub fn in_extension_window(&self) -> bool {
        self.state.countdown > 0 && self.state.countdown <= EXTENSION_WINDOW_SECS
    }

    pub fn extension_count(&self) -> u32 {
        self.state.extension_count()
    }

    pub fn fruits_to_win(&self) -> u32 {
        self.state.rules.fruits_to_win
    }

    /// Directions that neither leave the board nor hit the body
    pub fn valid_moves(&self) -> &[Direction] {
        &self.valid_moves
    }

    pub fn teams(&self) -> &[TeamView] {
        &self.teams
    }

    pub fn team(&self, id: &str) -> Option<&TeamView> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Sum of all team pools this round
    pub fn total_pool(&self) -> f64 {
        self.teams.iter().map(|t| t.pool).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Rules, Team};
    use crate::grid::GridSpec;

    fn sample_state() -> GameState {
        let mut state = GameState::new(
            GridSpec::hex(3),
            vec![Team::new("A"), Team::new("B")],
            Rules {
                initial_min_bid: 1.0,
                fruits_to_win: 3,
            },
        );
        state.snake.body = vec![Position::new(0, 0), Position::new(0, 1)];
        state.fruits.insert("A".into(), vec![Position::new(2, -2), Position::new(0, -1)]);
        state.fruits.insert("B".into(), vec![Position::new(-3, 0)]);
        state.teams[0].score = 1;
        state.teams[1].pool = 2.5;
        state
    }

    #[test]
    fn test_team_summaries() {
        let state = sample_state();
        let view = ParsedView::new(&state);
        let a = view.team("A").unwrap();
        assert_eq!(a.fruits_needed, 2);
        assert_eq!(a.nearest_fruit, Some((Position::new(0, -1), 1)));
        let b = view.team("B").unwrap();
        assert_eq!(b.nearest_fruit, Some((Position::new(-3, 0), 3)));
        assert_eq!(view.total_pool(), 2.5);
        assert!(view.team("C").is_none());
    }

    #[test]
    fn test_valid_moves() {
        let state = sample_state();
        let view = ParsedView::new(&state);
        assert_eq!(view.valid_moves().len(), 5);
        assert!(!view.valid_moves().contains(&Direction::S));
    }

    #[test]
    fn test_extension_window() {
        let mut state = sample_state();
        state.countdown = 0;
        assert!(!ParsedView::new(&state).in_extension_window());
        state.countdown = 5;
        assert!(ParsedView::new(&state).in_extension_window());
        state.countdown = 6;
        assert!(!ParsedView::new(&state).in_extension_window());
    }

    #[test]
    fn test_extension_count_from_min_bid() {
        let mut state = sample_state();
        state.min_bid = 4.0;
        assert_eq!(ParsedView::new(&state).extension_count(), 2);
    }
}
