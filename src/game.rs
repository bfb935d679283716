use log::{info, trace};

use crate::board::{self, Grid};
use crate::config::GameConfig;
use crate::engine;
use crate::error::GameResult;
use crate::spawn::{RandomSpawner, TileIdGenerator, TileSpawner};
use crate::types::{Direction, GameState, MoveOutcome, MoveReport, MovementEvent, Tile};

const SEED_TILES: usize = 2;

/// One round of play: tiles, score and flags, mutated once per accepted move.
pub struct GameInstance {
    tiles: Vec<Tile>,
    score: u64,
    best_score: u64,
    is_game_over: bool,
    won: bool,
    /// Set once the player dismisses a win; suppresses further win detection this round.
    keep_playing: bool,
    win_value: u32,
    last_events: Vec<MovementEvent>,
    last_spawned: Option<Tile>,
    ids: TileIdGenerator,
    spawner: Box<dyn TileSpawner>,
}

impl GameInstance {
    pub fn new(config: GameConfig) -> GameResult<Self> {
        let spawner = RandomSpawner::from_config(&config)?;
        Self::with_spawner(config.win_value, Box::new(spawner))
    }

    pub fn seeded(seed: u64) -> GameResult<Self> {
        Self::with_spawner(board::WIN_VALUE, Box::new(RandomSpawner::seeded(seed)))
    }

    /// Starts a round with a caller-supplied spawner.
    pub fn with_spawner(win_value: u32, spawner: Box<dyn TileSpawner>) -> GameResult<Self> {
        let mut game = Self {
            tiles: Vec::new(),
            score: 0,
            best_score: 0,
            is_game_over: false,
            won: false,
            keep_playing: false,
            win_value,
            last_events: Vec::new(),
            last_spawned: None,
            ids: TileIdGenerator::new(),
            spawner,
        };
        game.restart()?;
        Ok(game)
    }

    /// Seeds the best score from an external store.
    pub fn with_best_score(mut self, best_score: u64) -> Self {
        self.best_score = self.best_score.max(best_score);
        self
    }

    /// Applies one direction input.
    ///
    /// Ignored (state untouched, `accepted == false`) when the game is over or
    /// the move changes nothing. Otherwise adopts the moved tiles, spawns one
    /// tile if there is room, then updates score, best score and flags.
    pub fn make_move(&mut self, direction: Direction) -> GameResult<MoveReport> {
        if self.is_game_over {
            trace!("game over, {direction:?} ignored");
            return Ok(self.ignored());
        }

        let MoveOutcome {
            mut tiles,
            score_delta,
            events,
        } = engine::apply_move(&self.tiles, direction)?;
        if events.is_empty() {
            trace!("{direction:?} moved nothing, ignored");
            return Ok(self.ignored());
        }

        let spawned = self.spawner.spawn(&tiles, &mut self.ids);
        if let Some(tile) = spawned {
            tiles.push(tile);
            board::validate_tiles(&tiles)?;
        }

        self.tiles = tiles;
        self.score += score_delta;
        self.best_score = self.best_score.max(self.score);

        if !self.won && !self.keep_playing && board::contains_value(&self.tiles, self.win_value) {
            self.won = true;
            info!("reached {} with score {}", self.win_value, self.score);
        }
        if !board::can_move(&self.tiles) {
            self.is_game_over = true;
            info!("game over with score {}", self.score);
        }

        self.last_events = events;
        self.last_spawned = spawned;

        Ok(MoveReport {
            accepted: true,
            score_delta,
            events: self.last_events.clone(),
            spawned,
            state: self.to_game_state(),
        })
    }

    /// Fresh board with two spawned tiles. Best score is kept.
    ///
    /// On `InvalidState` from a misbehaving spawner the current round is left untouched.
    pub fn restart(&mut self) -> GameResult<()> {
        let mut tiles = Vec::with_capacity(SEED_TILES);
        for _ in 0..SEED_TILES {
            if let Some(tile) = self.spawner.spawn(&tiles, &mut self.ids) {
                tiles.push(tile);
                board::validate_tiles(&tiles)?;
            }
        }

        self.tiles = tiles;
        self.score = 0;
        self.is_game_over = false;
        self.won = false;
        self.keep_playing = false;
        self.last_events.clear();
        self.last_spawned = None;

        info!("new round, best score {}", self.best_score);
        Ok(())
    }

    /// Dismisses the win flag without touching the board.
    pub fn continue_after_win(&mut self) {
        if self.won {
            self.keep_playing = true;
        }
        self.won = false;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn can_move(&self) -> bool {
        board::can_move(&self.tiles)
    }

    /// Events of the last accepted move, for animation.
    pub fn last_events(&self) -> &[MovementEvent] {
        &self.last_events
    }

    pub fn last_spawned(&self) -> Option<Tile> {
        self.last_spawned
    }

    pub fn grid(&self) -> Grid {
        Grid::from_tiles(&self.tiles)
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            tiles: self.tiles.clone(),
            score: self.score,
            best_score: self.best_score,
            game_over: self.is_game_over,
            won: self.won,
        }
    }

    fn ignored(&self) -> MoveReport {
        MoveReport {
            accepted: false,
            score_delta: 0,
            events: Vec::new(),
            spawned: None,
            state: self.to_game_state(),
        }
    }

    #[cfg(test)]
    fn set_tiles_for_test(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
        self.is_game_over = false;
        self.won = false;
        self.keep_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{NUM_CELLS, all_positions};
    use crate::error::GameError;
    use crate::types::{MovementKind, Position, TileId};

    /// Spawns a 2 in the first empty cell, row-major.
    struct FirstEmptySpawner;

    impl TileSpawner for FirstEmptySpawner {
        fn spawn(&mut self, tiles: &[Tile], ids: &mut TileIdGenerator) -> Option<Tile> {
            let position = board::empty_cells(tiles).into_iter().next()?;
            Some(Tile::new(ids.next_id(), 2, position))
        }
    }

    /// Always spawns on (0,0), occupied or not.
    struct CornerSpawner;

    impl TileSpawner for CornerSpawner {
        fn spawn(&mut self, _tiles: &[Tile], ids: &mut TileIdGenerator) -> Option<Tile> {
            Some(Tile::new(ids.next_id(), 2, Position::new(0, 0)))
        }
    }

    fn tile(id: u64, value: u32, row: u8, col: u8) -> Tile {
        Tile::new(TileId(id + 1000), value, Position::new(row, col))
    }

    fn fixed_game() -> GameInstance {
        GameInstance::with_spawner(board::WIN_VALUE, Box::new(FirstEmptySpawner)).unwrap()
    }

    #[test]
    fn new_round_has_two_tiles_and_clean_flags() {
        let game = GameInstance::seeded(1).unwrap();
        let state = game.to_game_state();

        assert_eq!(state.tiles.len(), 2);
        assert_ne!(state.tiles[0].position, state.tiles[1].position);
        assert!(state.tiles.iter().all(|t| t.value == 2 || t.value == 4));
        assert_eq!(state.score, 0);
        assert_eq!(state.best_score, 0);
        assert!(!state.game_over);
        assert!(!state.won);
        assert!(game.last_events().is_empty());
    }

    #[test]
    fn accepted_move_spawns_and_scores() {
        let mut game = fixed_game();
        game.set_tiles_for_test(vec![tile(1, 2, 0, 2), tile(2, 2, 0, 3)]);

        let report = game.make_move(Direction::Left).unwrap();

        assert!(report.accepted);
        assert_eq!(report.score_delta, 4);
        assert_eq!(report.events.len(), 2);
        let spawned = report.spawned.unwrap();
        assert_eq!(spawned.position, Position::new(0, 1));
        assert_eq!(game.tiles().len(), 2);
        assert_eq!(game.score(), 4);
        assert_eq!(game.best_score(), 4);
        assert_eq!(game.last_events(), report.events.as_slice());
        assert_eq!(game.last_spawned(), Some(spawned));
        assert_eq!(report.state, game.to_game_state());
    }

    #[test]
    fn noop_move_is_ignored() {
        let mut game = fixed_game();
        game.set_tiles_for_test(vec![tile(1, 2, 0, 0), tile(2, 4, 0, 1)]);
        let before = game.to_game_state();

        let report = game.make_move(Direction::Left).unwrap();

        assert!(!report.accepted);
        assert!(report.events.is_empty());
        assert!(report.spawned.is_none());
        assert_eq!(game.to_game_state(), before);
    }

    #[test]
    fn reaching_win_value_sets_sticky_flag() {
        let mut game = fixed_game();
        game.set_tiles_for_test(vec![tile(1, 1024, 3, 0), tile(2, 1024, 3, 1)]);

        let report = game.make_move(Direction::Left).unwrap();
        assert!(report.state.won);
        assert!(game.has_won());

        // Still won after a further move; board not cleared.
        game.make_move(Direction::Right).unwrap();
        assert!(game.has_won());
        assert!(game.tiles().iter().any(|t| t.value == 2048));
    }

    #[test]
    fn continue_after_win_clears_flag_for_the_rest_of_the_round() {
        let mut game = fixed_game();
        game.set_tiles_for_test(vec![tile(1, 1024, 3, 0), tile(2, 1024, 3, 1)]);
        game.make_move(Direction::Left).unwrap();
        let tiles_before = game.tiles().to_vec();

        game.continue_after_win();

        assert!(!game.has_won());
        assert_eq!(game.tiles(), tiles_before.as_slice());
        game.make_move(Direction::Right).unwrap();
        assert!(!game.has_won());
    }

    #[test]
    fn stuck_board_after_spawn_is_game_over() {
        let mut game = fixed_game();
        // Checkerboard of 8/16 with (0,0) empty; sliding row 0 left frees (0,3)
        // and the spawned 2 lands there next to a 16.
        let mut tiles: Vec<Tile> = all_positions()
            .enumerate()
            .filter(|(_, p)| *p != Position::new(0, 0))
            .map(|(i, p)| {
                let value = if (p.row + p.col) % 2 == 0 { 8 } else { 16 };
                tile(i as u64, value, p.row, p.col)
            })
            .collect();
        assert_eq!(tiles.len(), NUM_CELLS - 1);
        // Row 1 becomes 4 32 4 32 so no column pair forms once row 0 reads 16 8 16 2.
        tiles.retain(|t| t.position.row != 1);
        tiles.extend([
            tile(100, 4, 1, 0),
            tile(101, 32, 1, 1),
            tile(102, 4, 1, 2),
            tile(103, 32, 1, 3),
        ]);
        game.set_tiles_for_test(tiles);

        let report = game.make_move(Direction::Left).unwrap();

        assert!(report.accepted);
        assert_eq!(report.spawned.unwrap().position, Position::new(0, 3));
        assert!(report.state.game_over);
        assert!(!game.can_move());

        let ignored = game.make_move(Direction::Down).unwrap();
        assert!(!ignored.accepted);
        assert_eq!(ignored.state, report.state);
    }

    #[test]
    fn restart_keeps_best_score_and_resets_the_rest() {
        let mut game = fixed_game().with_best_score(10);
        game.set_tiles_for_test(vec![tile(1, 8, 2, 2), tile(2, 8, 2, 3)]);
        game.make_move(Direction::Left).unwrap();
        assert_eq!(game.score(), 16);
        assert_eq!(game.best_score(), 16);

        game.restart().unwrap();

        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), 16);
        assert_eq!(game.tiles().len(), 2);
        assert!(!game.is_game_over());
        assert!(!game.has_won());
        assert!(game.last_events().is_empty());
        assert!(game.last_spawned().is_none());
    }

    #[test]
    fn ids_stay_unique_across_restarts() {
        let mut game = GameInstance::seeded(3).unwrap();
        let first: Vec<TileId> = game.tiles().iter().map(|t| t.id).collect();

        game.restart().unwrap();

        assert!(game.tiles().iter().all(|t| !first.contains(&t.id)));
    }

    #[test]
    fn spawner_that_overwrites_a_tile_is_rejected() {
        let mut game = fixed_game();
        game.spawner = Box::new(CornerSpawner);
        game.set_tiles_for_test(vec![tile(1, 2, 0, 3)]);

        assert!(game.make_move(Direction::Left).is_err());
        assert_eq!(game.tiles(), [tile(1, 2, 0, 3)].as_slice());
    }

    #[test]
    fn construction_with_overlapping_seed_tiles_fails() {
        let result = GameInstance::with_spawner(board::WIN_VALUE, Box::new(CornerSpawner));

        assert!(matches!(result, Err(GameError::InvalidState { .. })));
    }

    #[test]
    fn failed_restart_keeps_the_current_round() {
        let mut game = fixed_game();
        game.set_tiles_for_test(vec![tile(1, 8, 2, 2), tile(2, 8, 2, 3)]);
        game.make_move(Direction::Left).unwrap();
        let before = game.to_game_state();
        game.spawner = Box::new(CornerSpawner);

        assert!(game.restart().is_err());
        assert_eq!(game.to_game_state(), before);
        assert!(!game.last_events().is_empty());
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = GameInstance::new(GameConfig::with_seed(2024)).unwrap();
        let mut b = GameInstance::new(GameConfig::with_seed(2024)).unwrap();

        for step in 0..200 {
            let direction = Direction::ALL[step % 4];
            let ra = a.make_move(direction).unwrap();
            let rb = b.make_move(direction).unwrap();
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn random_play_preserves_invariants() {
        let mut game = GameInstance::seeded(8).unwrap();

        for step in 0..1000 {
            if game.is_game_over() {
                game.restart().unwrap();
            }
            let before: u64 = game.tiles().iter().map(|t| u64::from(t.value)).sum();
            let report = game.make_move(Direction::ALL[(step * 7 + step / 3) % 4]).unwrap();

            assert!(board::validate_tiles(game.tiles()).is_ok());
            assert!(game.best_score() >= game.score());
            if report.accepted {
                let after: u64 = game.tiles().iter().map(|t| u64::from(t.value)).sum();
                let spawned = report.spawned.map_or(0, |t| u64::from(t.value));
                assert_eq!(after, before + spawned);
                assert!(
                    report
                        .events
                        .iter()
                        .all(|e| e.kind != MovementKind::Disappear || e.merged_into.is_some())
                );
            }
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            four_probability: -0.5,
            ..GameConfig::default()
        };

        assert!(GameInstance::new(config).is_err());
    }
}
