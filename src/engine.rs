use log::debug;

use crate::board::{BOARD_SIZE, Grid, tiles_from_grid, validate_tiles};
use crate::error::GameResult;
use crate::spawn::TileIdGenerator;
use crate::types::{Direction, MoveOutcome, MovementEvent, MovementKind, Position, Tile};

const LAST: u8 = BOARD_SIZE as u8 - 1;

/// Slides and merges `tiles` toward the `direction` edge.
///
/// Each line (row for Left/Right, column for Up/Down) is swept once from the
/// target edge; adjacent equal values merge at most once per move. Merged
/// tiles keep the id of the edge-nearer tile. Events are reported per line in
/// ascending line order, then in sweep order. Tiles that stay put are not reported.
pub fn apply_move(tiles: &[Tile], direction: Direction) -> GameResult<MoveOutcome> {
    validate_tiles(tiles)?;

    let mut lines: [Vec<Tile>; BOARD_SIZE] = Default::default();
    for tile in tiles {
        lines[line_key(direction, tile.position) as usize].push(*tile);
    }

    let mut outcome = MoveOutcome {
        tiles: Vec::with_capacity(tiles.len()),
        ..MoveOutcome::default()
    };
    for (key, line) in lines.iter_mut().enumerate() {
        line.sort_by_key(|tile| position_in_line(direction, tile.position));
        sweep_line(direction, key as u8, line, &mut outcome);
    }

    debug!(
        "move {:?}: {} tiles in, {} out, {} events, +{}",
        direction,
        tiles.len(),
        outcome.tiles.len(),
        outcome.events.len(),
        outcome.score_delta
    );

    Ok(outcome)
}

/// Grid-level move: returns the resulting grid and the score gained.
pub fn apply_move_to_grid(grid: &Grid, direction: Direction) -> GameResult<(Grid, u64)> {
    let tiles = tiles_from_grid(grid, &mut TileIdGenerator::new());
    let outcome = apply_move(&tiles, direction)?;
    Ok((Grid::from_tiles(&outcome.tiles), outcome.score_delta))
}

/// `line` must already be sorted by distance from the target edge.
fn sweep_line(direction: Direction, key: u8, line: &[Tile], outcome: &mut MoveOutcome) {
    let mut slot = 0u8;
    let mut i = 0usize;

    while i < line.len() {
        let current = line[i];
        let target = position_from_line(direction, key, slot);

        match line.get(i + 1) {
            Some(next) if next.value == current.value => {
                let merged_value = current.value * 2;
                outcome.score_delta += u64::from(merged_value);
                outcome.tiles.push(Tile::new(current.id, merged_value, target));
                outcome.events.push(MovementEvent {
                    tile_id: current.id,
                    from: current.position,
                    to: target,
                    kind: MovementKind::Merge,
                    merged_into: None,
                });
                outcome.events.push(MovementEvent {
                    tile_id: next.id,
                    from: next.position,
                    to: target,
                    kind: MovementKind::Disappear,
                    merged_into: Some(current.id),
                });
                i += 2;
            }
            _ => {
                outcome.tiles.push(Tile::new(current.id, current.value, target));
                if current.position != target {
                    outcome.events.push(MovementEvent {
                        tile_id: current.id,
                        from: current.position,
                        to: target,
                        kind: MovementKind::Move,
                        merged_into: None,
                    });
                }
                i += 1;
            }
        }

        slot += 1;
    }
}

/// Index of the line a cell belongs to.
fn line_key(direction: Direction, pos: Position) -> u8 {
    match direction {
        Direction::Left | Direction::Right => pos.row,
        Direction::Up | Direction::Down => pos.col,
    }
}

/// Distance of a cell from the target edge.
fn position_in_line(direction: Direction, pos: Position) -> u8 {
    match direction {
        Direction::Left => pos.col,
        Direction::Right => LAST - pos.col,
        Direction::Up => pos.row,
        Direction::Down => LAST - pos.row,
    }
}

/// Inverse of `line_key` + `position_in_line`.
fn position_from_line(direction: Direction, key: u8, index: u8) -> Position {
    match direction {
        Direction::Left => Position::new(key, index),
        Direction::Right => Position::new(key, LAST - index),
        Direction::Up => Position::new(index, key),
        Direction::Down => Position::new(LAST - index, key),
    }
}
