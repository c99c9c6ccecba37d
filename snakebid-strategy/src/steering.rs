//! Direction scoring toward a target fruit
//!
//! Shared by every policy that steers. Each candidate move is evaluated on
//! the board as it would look after the move.

use serde::{Deserialize, Serialize};

use snakebid_core::{
    bfs_distance, exit_count, flood_fill_size, Direction, GameState, ParsedView, Position,
};

use crate::strategy::{AgentState, Decision, VoteAction};

/// Weights for direction scoring
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteeringWeights {
    /// Moving onto the target fruit
    pub eat_target: f64,
    /// Divided by remaining path length to the target
    pub path_bonus: f64,
    /// Per other fruit within `nearby_radius` of the new head
    pub nearby_fruit: f64,
    pub nearby_radius: u32,
    /// Landing on a fruit native to another team
    pub rival_fruit: f64,
    /// Reachable area smaller than the snake (or a handful of cells)
    pub dead_end: f64,
    /// Reachable area only slightly larger than the snake
    pub cramped: f64,
    /// Extra cells over snake length still counted as cramped
    pub cramped_margin: usize,
    pub per_exit: f64,
    /// Subtracted per unit of distance from the center
    pub center_bias: f64,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            eat_target: 1000.0,
            path_bonus: 100.0,
            nearby_fruit: 5.0,
            nearby_radius: 2,
            rival_fruit: -500.0,
            dead_end: -1000.0,
            cramped: -300.0,
            cramped_margin: 3,
            per_exit: 2.0,
            center_bias: 0.5,
        }
    }
}

/// Board after the head moves one step in `direction` (eaten fruit removed)
pub fn state_after_move(state: &GameState, direction: Direction) -> GameState {
    let next = state.head().step(direction);
    let grow = state.fruit_at(next).is_some();
    let mut after = state.clone();
    after.snake = state.snake.advanced(next, direction, grow);
    for cells in after.fruits.values_mut() {
        cells.retain(|&pos| pos != next);
    }
    after
}

/// Score one candidate move for backing `team` toward `target`
pub fn score_direction(
    state: &GameState,
    direction: Direction,
    team: &str,
    target: Position,
    weights: &SteeringWeights,
) -> f64 {
    let next = state.head().step(direction);
    let after = state_after_move(state, direction);
    let mut score = 0.0;

    if next == target {
        score += weights.eat_target;
    } else if let Some(path) = bfs_distance(next, target, &after, true, true) {
        score += weights.path_bonus / path.distance.max(1) as f64;
    }

    let nearby = state
        .all_fruits()
        .filter(|&(_, pos)| pos != target && pos != next)
        .filter(|&(_, pos)| state.grid.distance(next, pos) <= weights.nearby_radius)
        .count();
    score += weights.nearby_fruit * nearby as f64;

    if let Some(native) = state.fruit_at(next) {
        if native != team {
            score += weights.rival_fruit;
        }
    }

    let area = flood_fill_size(next, &after, Some(direction.opposite()));
    let len = after.snake.len();
    if area < len.max(3) {
        score += weights.dead_end;
    } else if area < len + weights.cramped_margin {
        score += weights.cramped;
    }

    score += weights.per_exit * exit_count(next, &after) as f64;
    score -= weights.center_bias * state.grid.distance_to_center(next) as f64;
    score
}

/// Best legal move toward `target`; ties go to the earlier direction
pub fn choose_direction(
    view: &ParsedView<'_>,
    team: &str,
    target: Position,
    weights: &SteeringWeights,
) -> Option<Direction> {
    let mut best: Option<(Direction, f64)> = None;
    for &dir in view.valid_moves() {
        let score = score_direction(view.state(), dir, team, target, weights);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((dir, score));
        }
    }
    best.map(|(dir, _)| dir)
}

/// Vote for the most open direction when no fruit is worth chasing.
///
/// Backs the agent's current team if it still exists, otherwise the team
/// needing the fewest fruits. Skips only when there is no legal move.
pub fn fallback_vote(view: &ParsedView<'_>, agent: &AgentState, stake: f64) -> Decision {
    let Some(direction) = safest_direction(view) else {
        return Decision::skip("no legal move");
    };
    let team = agent
        .current_team
        .as_deref()
        .and_then(|id| view.team(id))
        .or_else(|| view.teams().iter().min_by_key(|t| t.fruits_needed));
    match team {
        Some(team) => Decision::Vote(VoteAction::new(direction, team.id.clone(), stake, "fallback: most exits")),
        None => Decision::skip("no teams"),
    }
}

/// Legal move leaving the most free neighbors. Fallback when there is no
/// usable target.
pub fn safest_direction(view: &ParsedView<'_>) -> Option<Direction> {
    let mut best: Option<(Direction, usize)> = None;
    for &dir in view.valid_moves() {
        let after = state_after_move(view.state(), dir);
        let exits = exit_count(after.head(), &after);
        if best.map_or(true, |(_, e)| exits > e) {
            best = Some((dir, exits));
        }
    }
    best.map(|(dir, _)| dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snakebid_core::{GridSpec, Rules, Team};

    fn state() -> GameState {
        GameState::new(
            GridSpec::hex(3),
            vec![Team::new("A"), Team::new("B")],
            Rules::default(),
        )
    }

    #[test]
    fn test_eats_adjacent_target() {
        let mut state = state();
        state.fruits.insert("A".into(), vec![Position::new(1, 0)]);
        let view = ParsedView::new(&state);
        let dir = choose_direction(&view, "A", Position::new(1, 0), &SteeringWeights::default());
        assert_eq!(dir, Some(Direction::SE));
    }

    #[test]
    fn test_first_step_toward_distant_target() {
        let mut state = state();
        state.fruits.insert("A".into(), vec![Position::new(0, -3)]);
        let view = ParsedView::new(&state);
        let dir = choose_direction(&view, "A", Position::new(0, -3), &SteeringWeights::default());
        assert_eq!(dir, Some(Direction::N));
    }

    #[test]
    fn test_avoids_rival_fruit() {
        let mut state = state();
        // Rival fruit sits directly on the straight line to the target
        state.fruits.insert("A".into(), vec![Position::new(0, -3)]);
        state.fruits.insert("B".into(), vec![Position::new(0, -1)]);
        let weights = SteeringWeights::default();
        let north = score_direction(&state, Direction::N, "A", Position::new(0, -3), &weights);
        let north_east = score_direction(&state, Direction::NE, "A", Position::new(0, -3), &weights);
        assert!(north_east > north);
    }

    #[test]
    fn test_dead_end_penalized() {
        let mut state = GameState::new(GridSpec::cartesian(2), vec![Team::new("A")], Rules::default());
        // Moving E from (1,2) enters the corner pocket (2,2)
        state.snake.body = vec![
            Position::new(1, 2),
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(2, 0),
        ];
        state.snake.direction = Direction::S;
        let weights = SteeringWeights::default();
        let into_corner = score_direction(&state, Direction::E, "A", Position::new(-2, -2), &weights);
        let open = score_direction(&state, Direction::W, "A", Position::new(-2, -2), &weights);
        assert!(open > into_corner);
        assert!(into_corner < weights.dead_end / 2.0);
    }

    #[test]
    fn test_safest_direction_prefers_open_space() {
        let mut state = GameState::new(GridSpec::cartesian(2), vec![Team::new("A")], Rules::default());
        state.snake.body = vec![Position::new(2, 1), Position::new(1, 1)];
        let view = ParsedView::new(&state);
        // From (2,1): N -> (2,0) has exits (1,0),(2,-1); S -> (2,2) has (1,2) only
        assert_eq!(safest_direction(&view), Some(Direction::N));
    }

    #[test]
    fn test_fallback_vote_takes_most_exits() {
        let mut state = GameState::new(
            GridSpec::cartesian(2),
            vec![Team::new("A"), Team::new("B")],
            Rules::default(),
        );
        state.snake.body = vec![Position::new(2, 1), Position::new(1, 1)];
        state.teams[1].score = 1;
        let view = ParsedView::new(&state);

        let vote = fallback_vote(&view, &AgentState::default(), 1.0);
        let vote = vote.vote().expect("legal moves exist");
        assert_eq!(vote.direction, Direction::N);
        assert_eq!(vote.team, "B");
        assert_eq!(vote.amount, 1.0);

        let backing_a = AgentState {
            current_team: Some("A".into()),
            ..AgentState::default()
        };
        assert_eq!(fallback_vote(&view, &backing_a, 1.0).vote().unwrap().team, "A");
    }

    #[test]
    fn test_fallback_vote_skips_when_boxed_in() {
        let mut state = GameState::new(GridSpec::cartesian(1), vec![Team::new("A")], Rules::default());
        state.snake.body = vec![
            Position::new(-1, -1),
            Position::new(0, -1),
            Position::new(0, 0),
            Position::new(-1, 0),
            Position::new(-1, 1),
        ];
        let view = ParsedView::new(&state);
        assert!(view.valid_moves().is_empty());
        assert_eq!(
            fallback_vote(&view, &AgentState::default(), 1.0),
            Decision::skip("no legal move")
        );
    }

    #[test]
    fn test_state_after_move_removes_eaten_fruit() {
        let mut state = state();
        state.fruits.insert("B".into(), vec![Position::new(0, -1)]);
        let after = state_after_move(&state, Direction::N);
        assert_eq!(after.head(), Position::new(0, -1));
        assert_eq!(after.snake.len(), 2);
        assert!(after.team_fruits("B").is_empty());
    }
}
