use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::board::{MAX_TILE_VALUE, WIN_VALUE};
use crate::error::{GameError, GameResult};

pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

/// Round settings. JS callers may pass any subset of the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Tile value that sets the win flag.
    pub win_value: u32,
    /// Chance that a spawned tile is a 4 instead of a 2.
    pub four_probability: f64,
    /// RNG seed; `None` derives one from the clock.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            win_value: WIN_VALUE,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> GameResult<()> {
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::invalid_config(format!(
                "fourProbability must be within [0, 1], got {}",
                self.four_probability
            )));
        }
        if self.win_value < 4
            || !self.win_value.is_power_of_two()
            || self.win_value > MAX_TILE_VALUE
        {
            return Err(GameError::invalid_config(format!(
                "winValue must be a power of two in 4..={MAX_TILE_VALUE}, got {}",
                self.win_value
            )));
        }
        Ok(())
    }

    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
