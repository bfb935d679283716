use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::empty_cells;
use crate::config::{DEFAULT_FOUR_PROBABILITY, GameConfig};
use crate::error::GameResult;
use crate::types::{Tile, TileId};

/// Monotonic id source owned by one game instance.
#[derive(Debug, Clone, Default)]
pub struct TileIdGenerator {
    last: u64,
}

impl TileIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TileId {
        self.last += 1;
        TileId(self.last)
    }
}

/// Places new tiles after a move. Implementations must only use empty cells.
pub trait TileSpawner: Send {
    fn spawn(&mut self, tiles: &[Tile], ids: &mut TileIdGenerator) -> Option<Tile>;
}

/// Uniform empty cell, value 4 with `four_probability`, 2 otherwise.
#[derive(Debug, Clone)]
pub struct RandomSpawner {
    rng: StdRng,
    four_probability: f64,
}

impl RandomSpawner {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            four_probability: DEFAULT_FOUR_PROBABILITY,
        }
    }

    pub fn from_config(config: &GameConfig) -> GameResult<Self> {
        config.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.resolved_seed()),
            four_probability: config.four_probability,
        })
    }
}

impl TileSpawner for RandomSpawner {
    fn spawn(&mut self, tiles: &[Tile], ids: &mut TileIdGenerator) -> Option<Tile> {
        spawn(tiles, ids, &mut self.rng, self.four_probability)
    }
}

/// Picks an empty cell uniformly and returns a fresh tile for it,
/// or `None` when the board is full. `four_probability` is clamped to `[0, 1]`;
/// NaN falls back to the default.
pub fn spawn<R: Rng + ?Sized>(
    tiles: &[Tile],
    ids: &mut TileIdGenerator,
    rng: &mut R,
    four_probability: f64,
) -> Option<Tile> {
    let cells = empty_cells(tiles);
    let position = *cells.choose(rng)?;
    let value = if rng.gen_bool(clamp_probability(four_probability)) {
        4
    } else {
        2
    };
    let tile = Tile::new(ids.next_id(), value, position);

    debug!("spawned {} = {} at {}", tile.id, tile.value, tile.position);
    Some(tile)
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        DEFAULT_FOUR_PROBABILITY
    } else {
        p.clamp(0.0, 1.0)
    }
}
