//! Breadth-first search over the board with the snake body as obstacles
//!
//! All functions here are pure over an immutable `GameState`.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::game::GameState;
use crate::grid::{Direction, Position};

/// Result of a successful search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Path {
    /// Steps from start to target
    pub distance: u32,
    /// First move on a shortest path (`None` when start == target)
    pub first_step: Option<Direction>,
}

/// Body cell -> number of moves until it is vacated.
///
/// The tail clears after 1 move, the segment before it after 2, and so on.
/// Without time awareness every body cell stays blocked forever.
fn clear_times(state: &GameState, exclude_head: bool, time_aware: bool) -> FxHashMap<Position, u32> {
    let body = &state.snake.body;
    let len = body.len() as u32;
    let skip = usize::from(exclude_head);
    body.iter()
        .enumerate()
        .skip(skip)
        .map(|(i, &pos)| {
            let clear = if time_aware { len - i as u32 } else { u32::MAX };
            (pos, clear)
        })
        .collect()
}

/// Shortest path length from `from` to `to`.
///
/// A body cell entered at search distance `d` is blocked iff
/// `d < clear_time(cell)`. Returns `None` when the target is unreachable.
pub fn bfs_distance(
    from: Position,
    to: Position,
    state: &GameState,
    exclude_head: bool,
    time_aware: bool,
) -> Option<Path> {
    if from == to {
        return Some(Path {
            distance: 0,
            first_step: None,
        });
    }
    if !state.grid.contains(to) {
        return None;
    }

    let obstacles = clear_times(state, exclude_head, time_aware);
    let mut visited = FxHashSet::default();
    let mut queue: VecDeque<(Position, u32, Option<Direction>)> = VecDeque::new();
    visited.insert(from);
    queue.push_back((from, 0, None));

    while let Some((current, dist, first)) = queue.pop_front() {
        let next_dist = dist + 1;
        for (dir, next) in state.grid.neighbors(current) {
            if visited.contains(&next) {
                continue;
            }
            if let Some(&clear) = obstacles.get(&next) {
                if next_dist < clear {
                    // Still occupied at this distance; may open up via a longer route
                    continue;
                }
            }
            let first_step = first.or(Some(dir));
            if next == to {
                return Some(Path {
                    distance: next_dist,
                    first_step,
                });
            }
            visited.insert(next);
            queue.push_back((next, next_dist, first_step));
        }
    }

    None
}

/// Count cells reachable from `pos` (including `pos`) avoiding the body.
///
/// `exclude_dir` is forbidden only as the first step out of `pos`.
pub fn flood_fill_size(pos: Position, state: &GameState, exclude_dir: Option<Direction>) -> usize {
    let obstacles: FxHashSet<Position> = state.snake.body.iter().copied().collect();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(pos);
    queue.push_back(pos);

    while let Some(current) = queue.pop_front() {
        for (dir, next) in state.grid.neighbors(current) {
            if current == pos && Some(dir) == exclude_dir {
                continue;
            }
            if obstacles.contains(&next) || !visited.insert(next) {
                continue;
            }
            queue.push_back(next);
        }
    }

    visited.len()
}

/// Free on-board neighbors of `pos`
pub fn exit_count(pos: Position, state: &GameState) -> usize {
    state
        .grid
        .neighbors(pos)
        .filter(|(_, next)| !state.snake.contains(*next))
        .count()
}

/// Closest fruit of `team` from the head by time-aware BFS.
///
/// Ties go to the fruit listed first.
pub fn nearest_reachable_fruit(state: &GameState, team: &str) -> Option<(Position, Path)> {
    let head = state.head();
    let mut best: Option<(Position, Path)> = None;
    for &fruit in state.team_fruits(team) {
        if let Some(path) = bfs_distance(head, fruit, state, true, true) {
            let better = best.map_or(true, |(_, b)| path.distance < b.distance);
            if better {
                best = Some((fruit, path));
            }
        }
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
