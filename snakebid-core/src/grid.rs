//! Grid geometry: axial hex or square cells, bounds and distance metrics

use serde::{Deserialize, Serialize};

/// Default board radius when a snapshot omits one
pub const DEFAULT_RADIUS: i32 = 4;

/// A cell coordinate. Axial (q, r) on hex grids, (x, y) on square grids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub q: i32,
    pub r: i32,
}

impl Position {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Neighbor one step in `direction` (no bounds check)
    pub fn step(self, direction: Direction) -> Position {
        let (dq, dr) = direction.offset();
        Position::new(self.q + dq, self.r + dr)
    }
}

/// Grid topology
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    Hex,
    #[serde(alias = "square")]
    Cartesian,
}

/// Move direction.
///
/// Hex grids use N, NE, SE, S, SW, NW; cartesian grids use N, E, S, W.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Hex directions in canonical order
pub const HEX_DIRECTIONS: [Direction; 6] = [
    Direction::N,
    Direction::NE,
    Direction::SE,
    Direction::S,
    Direction::SW,
    Direction::NW,
];

/// Square directions in canonical order
pub const CARTESIAN_DIRECTIONS: [Direction; 4] =
    [Direction::N, Direction::E, Direction::S, Direction::W];

impl Direction {
    /// Offset (dq, dr). E and SE share (1, 0), W and NW share (-1, 0):
    /// a grid only ever uses one of each pair.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E | Direction::SE => (1, 0),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W | Direction::NW => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::NE => "ne",
            Direction::E => "e",
            Direction::SE => "se",
            Direction::S => "s",
            Direction::SW => "sw",
            Direction::W => "w",
            Direction::NW => "nw",
        }
    }

    /// Parse a direction name as sent by the game server
    pub fn parse(name: &str) -> Option<Direction> {
        let dir = match name.trim().to_ascii_lowercase().as_str() {
            "n" | "north" | "up" => Direction::N,
            "ne" | "northeast" => Direction::NE,
            "e" | "east" | "right" => Direction::E,
            "se" | "southeast" => Direction::SE,
            "s" | "south" | "down" => Direction::S,
            "sw" | "southwest" => Direction::SW,
            "w" | "west" | "left" => Direction::W,
            "nw" | "northwest" => Direction::NW,
            _ => return None,
        };
        Some(dir)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board shape and size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(rename = "type")]
    pub kind: GridKind,
    pub radius: i32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::hex(DEFAULT_RADIUS)
    }
}

impl GridSpec {
    pub const fn hex(radius: i32) -> Self {
        Self {
            kind: GridKind::Hex,
            radius,
        }
    }

    pub const fn cartesian(radius: i32) -> Self {
        Self {
            kind: GridKind::Cartesian,
            radius,
        }
    }

    /// Directions legal on this grid, in canonical order
    pub fn directions(&self) -> &'static [Direction] {
        match self.kind {
            GridKind::Hex => &HEX_DIRECTIONS,
            GridKind::Cartesian => &CARTESIAN_DIRECTIONS,
        }
    }

    pub fn has_direction(&self, direction: Direction) -> bool {
        self.directions().contains(&direction)
    }

    /// Check if a position is on the board
    pub fn contains(&self, pos: Position) -> bool {
        let r = self.radius;
        match self.kind {
            GridKind::Hex => pos.q.abs() <= r && pos.r.abs() <= r && (pos.q + pos.r).abs() <= r,
            GridKind::Cartesian => pos.q.abs() <= r && pos.r.abs() <= r,
        }
    }

    /// Distance between two cells under this grid's metric
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        let dq = a.q - b.q;
        let dr = a.r - b.r;
        let d = match self.kind {
            GridKind::Hex => dq.abs().max(dr.abs()).max((dq + dr).abs()),
            GridKind::Cartesian => dq.abs() + dr.abs(),
        };
        d as u32
    }

    /// Distance from the center cell
    pub fn distance_to_center(&self, pos: Position) -> u32 {
        self.distance(pos, Position::new(0, 0))
    }

    /// On-board neighbors paired with the direction that reaches them
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = (Direction, Position)> + '_ {
        self.directions()
            .iter()
            .map(move |&dir| (dir, pos.step(dir)))
            .filter(move |&(_, next)| self.contains(next))
    }

    /// Every cell on the board, q ascending then r ascending
    pub fn cells(&self) -> Vec<Position> {
        let r = self.radius;
        let mut cells = Vec::new();
        for q in -r..=r {
            for rr in -r..=r {
                let pos = Position::new(q, rr);
                if self.contains(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        let r = self.radius.max(0) as usize;
        match self.kind {
            GridKind::Hex => 3 * r * (r + 1) + 1,
            GridKind::Cartesian => (2 * r + 1) * (2 * r + 1),
        }
    }
}
