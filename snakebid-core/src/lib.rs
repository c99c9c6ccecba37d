//! snakebid core - board geometry, search and game snapshots
//!
//! This crate provides the leaf layer of the engine:
//! - Grid geometry (hex axial or square coordinates)
//! - Time-aware BFS and flood fill over the snake body
//! - The immutable game snapshot and its wire form
//! - A read-only decision view for strategies

pub mod error;
pub mod game;
pub mod grid;
pub mod pathfind;
pub mod snapshot;
pub mod view;

/// Random source threaded through every stochastic step
pub type GameRng = rand_chacha::ChaCha8Rng;

// Re-exports for convenient access
pub use error::{ConfigError, ConfigResult};
pub use game::{extension_count, GameState, Rules, Snake, Team};
pub use grid::{Direction, GridKind, GridSpec, Position};
pub use pathfind::{bfs_distance, exit_count, flood_fill_size, nearest_reachable_fruit, Path};
pub use snapshot::Snapshot;
pub use view::{ParsedView, TeamView};
