//! Simulation parameters

use serde::{Deserialize, Serialize};

use snakebid_core::{ConfigError, ConfigResult, GridSpec, Rules, Team};

/// Team ids handed out in order
pub const TEAM_IDS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

const TEAM_COLORS: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#bcf60c",
];

/// Rules and knobs for one simulated game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridSpec,
    pub team_count: usize,
    pub fruits_per_team: usize,
    pub fruits_to_win: u32,
    pub initial_min_bid: f64,
    /// Counter-bid iterations allowed per round
    pub max_extensions: u32,
    /// Replace eaten fruit for its native team
    pub respawn_fruit: bool,
    /// Placed fruit keeps at least this distance from the center
    pub min_fruit_center_distance: u32,
    /// Random draws before falling back to a full board scan
    pub respawn_attempts: u32,
    /// Game stops without a winner after this many rounds
    pub max_rounds: u32,
    /// Clock value reported at the start of each round
    pub round_seconds: u32,
    /// Rounds during which a length-1 snake grows without eating
    pub initial_growth_rounds: u32,
    /// Shuffle agent order each phase; off replays roster order
    pub fair_ordering: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::hex(4),
            team_count: 2,
            fruits_per_team: 1,
            fruits_to_win: 3,
            initial_min_bid: 1.0,
            max_extensions: 3,
            respawn_fruit: true,
            min_fruit_center_distance: 1,
            respawn_attempts: 64,
            max_rounds: 200,
            round_seconds: 10,
            initial_growth_rounds: 2,
            fair_ordering: true,
        }
    }
}

impl SimConfig {
    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_teams(mut self, team_count: usize) -> Self {
        self.team_count = team_count;
        self
    }

    pub fn with_fruits(mut self, fruits_per_team: usize, fruits_to_win: u32) -> Self {
        self.fruits_per_team = fruits_per_team;
        self.fruits_to_win = fruits_to_win;
        self
    }

    pub fn rules(&self) -> Rules {
        Rules {
            initial_min_bid: self.initial_min_bid,
            fruits_to_win: self.fruits_to_win,
        }
    }

    /// Teams for a fresh game
    pub fn teams(&self) -> Vec<Team> {
        TEAM_IDS
            .iter()
            .zip(TEAM_COLORS.iter())
            .take(self.team_count)
            .map(|(id, color)| Team::new(*id).with_color(*color))
            .collect()
    }

    /// Reject configurations no game can be played under
    pub fn validate(&self) -> ConfigResult<()> {
        if self.team_count == 0 || self.team_count > TEAM_IDS.len() {
            return Err(ConfigError::Invalid(format!(
                "team_count must be 1..={}, got {}",
                TEAM_IDS.len(),
                self.team_count
            )));
        }
        if self.grid.radius < 1 {
            return Err(ConfigError::Invalid(format!("grid radius must be >= 1, got {}", self.grid.radius)));
        }
        if !(self.initial_min_bid > 0.0) {
            return Err(ConfigError::Invalid("initial_min_bid must be positive".into()));
        }
        if self.fruits_to_win == 0 {
            return Err(ConfigError::Invalid("fruits_to_win must be >= 1".into()));
        }
        let fruit_cells = self.team_count * self.fruits_per_team;
        // Center cell holds the starting snake
        if fruit_cells + 1 > self.grid.cell_count() {
            return Err(ConfigError::Invalid(format!(
                "{} fruit do not fit on a board of {} cells",
                fruit_cells,
                self.grid.cell_count()
            )));
        }
        Ok(())
    }
}
