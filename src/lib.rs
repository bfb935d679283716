use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod spawn;
pub mod types;

use crate::config::GameConfig;
use crate::game::GameInstance;
use crate::types::Direction;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Installs the panic hook and console logger in the browser. Safe to call twice.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Debug);
    }
}

/// JS handle to one game instance.
#[wasm_bindgen]
pub struct WasmGame {
    game: GameInstance,
}

#[wasm_bindgen]
impl WasmGame {
    /// Creates a game; without a seed the clock is used.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<WasmGame, JsError> {
        let config = GameConfig {
            seed,
            ..GameConfig::default()
        };
        Ok(Self {
            game: GameInstance::new(config)?,
        })
    }

    /// Accepts a partial `{ winValue, fourProbability, seed }` object and a stored best score.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue, best_score: Option<u64>) -> Result<WasmGame, JsError> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let game = GameInstance::new(config)?.with_best_score(best_score.unwrap_or(0));
        Ok(Self { game })
    }

    /// Direction is `"up" | "down" | "left" | "right"`. Returns a `MoveReport`.
    #[wasm_bindgen(js_name = "move")]
    pub fn make_move(&mut self, direction: &str) -> Result<JsValue, JsError> {
        let direction: Direction = direction.parse()?;
        self.apply(direction)
    }

    /// Numeric variant of `move`: 0=Up, 1=Down, 2=Left, 3=Right.
    #[wasm_bindgen(js_name = moveCode)]
    pub fn move_code(&mut self, code: u8) -> Result<JsValue, JsError> {
        let direction = Direction::from_code(code)?;
        self.apply(direction)
    }

    pub fn restart(&mut self) -> Result<(), JsError> {
        Ok(self.game.restart()?)
    }

    #[wasm_bindgen(js_name = continueAfterWin)]
    pub fn continue_after_win(&mut self) {
        self.game.continue_after_win();
    }

    /// Current `GameState` snapshot.
    pub fn state(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.game.to_game_state())?)
    }

    /// 16 row-major cells, 0 for empty.
    pub fn grid(&self) -> Vec<u32> {
        self.game.grid().to_cells().to_vec()
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    #[wasm_bindgen(js_name = bestScore)]
    pub fn best_score(&self) -> u64 {
        self.game.best_score()
    }

    #[wasm_bindgen(js_name = canMove)]
    pub fn can_move(&self) -> bool {
        self.game.can_move()
    }

    #[wasm_bindgen(js_name = hasWon)]
    pub fn has_won(&self) -> bool {
        self.game.has_won()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }
}

impl WasmGame {
    fn apply(&mut self, direction: Direction) -> Result<JsValue, JsError> {
        let report = self.game.make_move(direction)?;
        Ok(serde_wasm_bindgen::to_value(&report)?)
    }
}
