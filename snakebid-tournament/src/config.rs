//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use snakebid_core::{ConfigError, ConfigResult, GridSpec};
use snakebid_sim::SimConfig;

/// Names accepted by `GameConfig::preset`
pub const PRESET_NAMES: [&str; 4] = ["small", "standard", "large", "square"];

/// One seat at the table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    /// Registry name of the strategy
    pub strategy: String,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: strategy.into(),
        }
    }
}

/// Mixed roster used by every preset
pub fn default_roster() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new("ev-1", "expected_value"),
        AgentSpec::new("ev-2", "expected_value"),
        AgentSpec::new("greedy", "greedy"),
        AgentSpec::new("aggressive", "aggressive"),
        AgentSpec::new("random", "random"),
    ]
}

/// A table: game rules, starting money and who sits down
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub name: String,
    pub sim: SimConfig,
    /// Balance every agent starts the first game with
    pub starting_balance: f64,
    pub agents: Vec<AgentSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            sim: SimConfig::default().with_teams(3).with_fruits(2, 3),
            starting_balance: 100.0,
            agents: default_roster(),
        }
    }
}

impl GameConfig {
    /// Named preset
    pub fn preset(name: &str) -> ConfigResult<Self> {
        let base = Self::default();
        let config = match name {
            "small" => Self {
                name: name.to_string(),
                sim: SimConfig::default()
                    .with_grid(GridSpec::hex(3))
                    .with_teams(2)
                    .with_fruits(1, 3),
                starting_balance: 50.0,
                ..base
            },
            "standard" => base,
            "large" => Self {
                name: name.to_string(),
                sim: SimConfig {
                    max_rounds: 400,
                    ..SimConfig::default()
                        .with_grid(GridSpec::hex(6))
                        .with_teams(4)
                        .with_fruits(3, 5)
                },
                starting_balance: 200.0,
                ..base
            },
            "square" => Self {
                name: name.to_string(),
                sim: SimConfig::default()
                    .with_grid(GridSpec::cartesian(4))
                    .with_teams(2)
                    .with_fruits(2, 3),
                ..base
            },
            other => return Err(ConfigError::UnknownConfig(other.to_string())),
        };
        Ok(config)
    }

    /// Load from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Existing file path, else preset name
    pub fn resolve(name_or_path: &str) -> ConfigResult<Self> {
        let path = Path::new(name_or_path);
        if path.is_file() {
            Self::load(path)
        } else {
            Self::preset(name_or_path)
        }
    }

    pub fn with_agents(mut self, agents: Vec<AgentSpec>) -> Self {
        self.agents = agents;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.sim.validate()?;
        if self.agents.is_empty() {
            return Err(ConfigError::Invalid(format!("config {} has no agents", self.name)));
        }
        if !(self.starting_balance >= 0.0) {
            return Err(ConfigError::Invalid("starting_balance must be non-negative".into()));
        }
        Ok(())
    }
}

/// Tournament-wide settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Games played per configuration
    pub games_per_config: usize,
    /// Every game seed derives from this value
    pub seed: u64,
    /// Run configurations on the rayon pool
    pub parallel: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            games_per_config: 10,
            seed: 42,
            parallel: true,
        }
    }
}

impl TournamentConfig {
    pub fn with_games(mut self, games: usize) -> Self {
        self.games_per_config = games;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
