//! Game runner - plays the games of one configuration
//!
//! Level 3 - Step-level implementation

use snakebid_core::ConfigResult;
use snakebid_sim::{play_game, GameOutcome, SimAgent};
use snakebid_strategy::StrategyRegistry;

use crate::config::GameConfig;

/// splitmix64 output function
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of one game, derived from the master seed and its position
pub fn game_seed(master: u64, config_index: usize, game_index: usize) -> u64 {
    let config_stream = splitmix64(master ^ splitmix64(config_index as u64));
    splitmix64(config_stream ^ game_index as u64)
}

/// Plays successive games of one configuration with a persistent roster
pub struct GameRunner {
    config: GameConfig,
    agents: Vec<SimAgent>,
    config_index: usize,
    master_seed: u64,
    games_played: usize,
}

impl GameRunner {
    /// Seat the configured roster; agents keep their balances across games
    pub fn new(
        config: GameConfig,
        registry: &StrategyRegistry,
        config_index: usize,
        master_seed: u64,
    ) -> ConfigResult<Self> {
        let agents = config
            .agents
            .iter()
            .map(|spec| SimAgent::from_registry(registry, spec.name.clone(), &spec.strategy, config.starting_balance))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self {
            config,
            agents,
            config_index,
            master_seed,
            games_played: 0,
        })
    }

    /// Play the next game in sequence
    pub fn play_next(&mut self) -> ConfigResult<GameOutcome> {
        let seed = game_seed(self.master_seed, self.config_index, self.games_played);
        let outcome = play_game(self.config.sim.clone(), seed, &mut self.agents)?;
        self.games_played += 1;
        tracing::debug!(
            config = %self.config.name,
            game = self.games_played,
            seed,
            winner = ?outcome.winner,
            rounds = outcome.rounds,
            "game complete"
        );
        Ok(outcome)
    }

    pub fn agents(&self) -> &[SimAgent] {
        &self.agents
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn games_played(&self) -> usize {
        self.games_played
    }
}
