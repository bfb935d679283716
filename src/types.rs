use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Numeric codes used by JS callers: 0=Up, 1=Down, 2=Left, 3=Right.
    pub fn from_code(code: u8) -> Result<Self, GameError> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| GameError::UnknownDirection(code.to_string()))
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(GameError::UnknownDirection(s.to_string())),
        }
    }
}

/// Stable tile identity, used by renderers to track a tile across moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    pub position: Position,
}

impl Tile {
    pub const fn new(id: TileId, value: u32, position: Position) -> Self {
        Self {
            id,
            value,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Move,
    Merge,
    Disappear,
}

/// One tile's change during a single move.
///
/// Contract:
/// - `Move`: the tile slid to a new cell, value unchanged.
/// - `Merge`: the tile absorbed its neighbour and now sits at `to` with twice its value.
/// - `Disappear`: the tile was absorbed; `merged_into` names the surviving tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEvent {
    pub tile_id: TileId,
    pub from: Position,
    pub to: Position,
    pub kind: MovementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_into: Option<TileId>,
}

/// Result of sliding a tile set in one direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub tiles: Vec<Tile>,
    pub score_delta: u64,
    pub events: Vec<MovementEvent>,
}

impl MoveOutcome {
    /// A move with no events changed nothing and must not advance the round.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// Public round state returned from the controller and WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub tiles: Vec<Tile>,
    pub score: u64,
    pub best_score: u64,
    pub game_over: bool,
    pub won: bool,
}

/// What a single direction input did to the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    /// Contract:
    /// - `false` when the input was ignored (no-op move or game already over).
    /// - `true` when the round advanced.
    pub accepted: bool,
    pub score_delta: u64,
    pub events: Vec<MovementEvent>,
    pub spawned: Option<Tile>,
    pub state: GameState,
}
