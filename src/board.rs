use std::collections::HashSet;

use crate::error::{GameError, GameResult};
use crate::spawn::TileIdGenerator;
use crate::types::{Position, Tile};

pub const BOARD_SIZE: usize = 4;
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;
pub const WIN_VALUE: u32 = 2048;
/// Largest tile value accepted as input. Keeps doubling and scoring inside integer range.
pub const MAX_TILE_VALUE: u32 = 1 << 30;

/// Grid view of a tile set: `None` for an empty cell, the tile value otherwise.
///
/// Derived from tiles for display and terminal-state checks; the tile set stays authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grid {
    cells: [[Option<u32>; BOARD_SIZE]; BOARD_SIZE],
}

impl Grid {
    /// Builds the grid view. Tiles outside the board are skipped; validate first if that matters.
    pub fn from_tiles(tiles: &[Tile]) -> Self {
        let mut grid = Self::default();
        for tile in tiles {
            if in_bounds(tile.position) {
                grid.cells[tile.position.row as usize][tile.position.col as usize] =
                    Some(tile.value);
            }
        }
        grid
    }

    /// Builds a grid from 16 row-major cells where 0 means empty.
    pub fn from_cells(cells: &[u32]) -> GameResult<Self> {
        if cells.len() != NUM_CELLS {
            return Err(GameError::invalid_state(format!(
                "expected {NUM_CELLS} cells, got {}",
                cells.len()
            )));
        }

        let mut grid = Self::default();
        for (idx, &value) in cells.iter().enumerate() {
            if value == 0 {
                continue;
            }
            check_value(value)?;
            grid.cells[idx / BOARD_SIZE][idx % BOARD_SIZE] = Some(value);
        }
        Ok(grid)
    }

    pub fn get(&self, pos: Position) -> Option<u32> {
        if !in_bounds(pos) {
            return None;
        }
        self.cells[pos.row as usize][pos.col as usize]
    }

    /// Row-major 4x4 view for display.
    pub fn to_rows(&self) -> [[Option<u32>; BOARD_SIZE]; BOARD_SIZE] {
        self.cells
    }

    /// Converts to `[u32; 16]` row-major, 0 for empty.
    pub fn to_cells(&self) -> [u32; NUM_CELLS] {
        let mut out = [0u32; NUM_CELLS];
        for (idx, cell) in out.iter_mut().enumerate() {
            *cell = self.cells[idx / BOARD_SIZE][idx % BOARD_SIZE].unwrap_or(0);
        }
        out
    }

    pub fn empty_cells(&self) -> Vec<Position> {
        all_positions()
            .filter(|&pos| self.get(pos).is_none())
            .collect()
    }
}

/// Checks every tile-set invariant: positions on the board and unique,
/// ids unique, values powers of two in `2..=MAX_TILE_VALUE`.
pub fn validate_tiles(tiles: &[Tile]) -> GameResult<()> {
    let mut occupied = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut ids = HashSet::with_capacity(tiles.len());

    for tile in tiles {
        if !in_bounds(tile.position) {
            return Err(GameError::invalid_state(format!(
                "{} is outside the board at {}",
                tile.id, tile.position
            )));
        }
        check_value(tile.value)?;

        let cell = &mut occupied[tile.position.row as usize][tile.position.col as usize];
        if *cell {
            return Err(GameError::invalid_state(format!(
                "more than one tile at {}",
                tile.position
            )));
        }
        *cell = true;

        if !ids.insert(tile.id) {
            return Err(GameError::invalid_state(format!("duplicate id {}", tile.id)));
        }
    }

    Ok(())
}

/// Unoccupied cells in row-major order.
pub fn empty_cells(tiles: &[Tile]) -> Vec<Position> {
    Grid::from_tiles(tiles).empty_cells()
}

pub fn contains_value(tiles: &[Tile], value: u32) -> bool {
    tiles.iter().any(|tile| tile.value == value)
}

/// True iff some tile has reached 2048.
pub fn has_won(tiles: &[Tile]) -> bool {
    contains_value(tiles, WIN_VALUE)
}

/// True iff any direction could still change the board.
pub fn can_move(tiles: &[Tile]) -> bool {
    let occupied: HashSet<Position> = tiles.iter().map(|tile| tile.position).collect();
    if occupied.len() < NUM_CELLS {
        return true;
    }

    let grid = Grid::from_tiles(tiles);
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let current = grid.cells[row][col];
            if col + 1 < BOARD_SIZE && current == grid.cells[row][col + 1] {
                return true;
            }
            if row + 1 < BOARD_SIZE && current == grid.cells[row + 1][col] {
                return true;
            }
        }
    }

    false
}

/// Builds a tile set from a grid, assigning fresh ids in row-major order.
pub fn tiles_from_grid(grid: &Grid, ids: &mut TileIdGenerator) -> Vec<Tile> {
    all_positions()
        .filter_map(|pos| grid.get(pos).map(|value| Tile::new(ids.next_id(), value, pos)))
        .collect()
}

pub(crate) fn all_positions() -> impl Iterator<Item = Position> {
    (0..NUM_CELLS).map(|idx| Position::new((idx / BOARD_SIZE) as u8, (idx % BOARD_SIZE) as u8))
}

fn in_bounds(pos: Position) -> bool {
    (pos.row as usize) < BOARD_SIZE && (pos.col as usize) < BOARD_SIZE
}

fn check_value(value: u32) -> GameResult<()> {
    if value < 2 || !value.is_power_of_two() || value > MAX_TILE_VALUE {
        return Err(GameError::invalid_state(format!(
            "tile value {value} is not a power of two in 2..={MAX_TILE_VALUE}"
        )));
    }
    Ok(())
}
