//! Fruit placement by rejection sampling with a full-scan fallback

use rand::seq::SliceRandom;
use rand::Rng;

use snakebid_core::{GameRng, GameState, Position};

fn is_free(state: &GameState, pos: Position) -> bool {
    state.grid.contains(pos) && !state.is_occupied(pos)
}

/// Pick a free cell at least `min_center_distance` from the center.
///
/// Tries `attempts` uniform draws first, then scans the whole board. If no
/// cell honors the distance rule, any free cell is accepted. `None` only
/// when the board is full.
pub fn place_fruit(
    state: &GameState,
    min_center_distance: u32,
    attempts: u32,
    rng: &mut GameRng,
) -> Option<Position> {
    let grid = state.grid;
    let radius = grid.radius;

    for _ in 0..attempts {
        let pos = Position::new(rng.gen_range(-radius..=radius), rng.gen_range(-radius..=radius));
        if is_free(state, pos) && grid.distance_to_center(pos) >= min_center_distance {
            return Some(pos);
        }
    }

    let cells = grid.cells();
    let preferred: Vec<Position> = cells
        .iter()
        .copied()
        .filter(|&pos| is_free(state, pos) && grid.distance_to_center(pos) >= min_center_distance)
        .collect();
    if let Some(&pos) = preferred.choose(rng) {
        return Some(pos);
    }

    let any: Vec<Position> = cells.into_iter().filter(|&pos| is_free(state, pos)).collect();
    any.choose(rng).copied()
}

/// Fill every team up to `per_team` fruits
pub fn seed_fruits(
    state: &mut GameState,
    per_team: usize,
    min_center_distance: u32,
    attempts: u32,
    rng: &mut GameRng,
) {
    let team_ids: Vec<String> = state.teams.iter().map(|t| t.id.clone()).collect();
    for id in team_ids {
        while state.team_fruits(&id).len() < per_team {
            match place_fruit(state, min_center_distance, attempts, rng) {
                Some(pos) => state.fruits.entry(id.clone()).or_default().push(pos),
                None => {
                    tracing::warn!(team = %id, "board full, fruit not placed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use snakebid_core::{GridSpec, Rules, Team};

    fn game(grid: GridSpec) -> GameState {
        GameState::new(grid, vec![Team::new("A"), Team::new("B")], Rules::default())
    }

    #[test]
    fn test_placed_fruit_is_free_and_off_center() {
        let mut rng = GameRng::seed_from_u64(11);
        let mut state = game(GridSpec::hex(3));
        seed_fruits(&mut state, 3, 1, 64, &mut rng);
        let all: Vec<Position> = state.all_fruits().map(|(_, p)| p).collect();
        assert_eq!(all.len(), 6);
        for (i, pos) in all.iter().enumerate() {
            assert!(state.grid.contains(*pos));
            assert!(!state.snake.contains(*pos));
            assert!(state.grid.distance_to_center(*pos) >= 1);
            assert!(!all[i + 1..].contains(pos));
        }
    }

    #[test]
    fn test_scan_fallback_finds_last_cell() {
        let mut rng = GameRng::seed_from_u64(5);
        let mut state = game(GridSpec::hex(1));
        // Fill all but one ring cell
        state.fruits.insert(
            "A".into(),
            vec![
                Position::new(0, -1),
                Position::new(1, -1),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(-1, 1),
            ],
        );
        let pos = place_fruit(&state, 1, 0, &mut rng);
        assert_eq!(pos, Some(Position::new(-1, 0)));
    }

    #[test]
    fn test_distance_rule_relaxed_when_impossible() {
        let mut rng = GameRng::seed_from_u64(5);
        let mut state = game(GridSpec::hex(1));
        state.snake.body = vec![Position::new(0, -1)];
        // Snake and fruit cover the whole ring, only the center is left
        state.fruits.insert(
            "A".into(),
            vec![
                Position::new(1, -1),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(-1, 1),
                Position::new(-1, 0),
            ],
        );
        assert_eq!(place_fruit(&state, 1, 8, &mut rng), Some(Position::new(0, 0)));

        state.fruits.get_mut("B").unwrap().push(Position::new(0, 0));
        assert_eq!(place_fruit(&state, 1, 8, &mut rng), None);
    }

    #[test]
    fn test_placement_is_deterministic() {
        let state = game(GridSpec::hex(4));
        let a = place_fruit(&state, 1, 64, &mut GameRng::seed_from_u64(99));
        let b = place_fruit(&state, 1, 64, &mut GameRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
