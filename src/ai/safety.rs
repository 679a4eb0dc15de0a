//! Tail-reachability check for a candidate move.
//!
//! A move counts as safe when, after it, the head can still reach the cell
//! the tail currently occupies. This is a heuristic: a reachable tail means
//! the snake can keep chasing itself for now, not that the position is
//! survivable in the long run. Callers must not treat `true` as a guarantee.

use crate::error::Result;
use crate::game::{Grid, Occupancy, Position, Snake};

use super::pathfinder::Pathfinder;

/// Cells the body will occupy right after moving the head to `candidate`.
///
/// The tail cell is left out unless `grows`, in which case the tail is kept
/// for this tick.
pub fn post_move_body(grid: &Grid, snake: &Snake, candidate: Position, grows: bool) -> Occupancy {
    let mut body = Occupancy::from_cells(grid, snake.body());
    if !grows {
        body.remove(snake.tail());
    }
    body.insert(candidate);
    body
}

/// Whether the head at `candidate` can still reach the current tail.
///
/// `grows` is set when the move eats fruit or growth is pending, i.e. when
/// the tail stays where it is this tick. An out-of-bounds candidate is an
/// error.
pub fn is_safe(
    pathfinder: &Pathfinder,
    grid: &Grid,
    snake: &Snake,
    candidate: Position,
    grows: bool,
) -> Result<bool> {
    let tail = snake.tail();
    if grows && candidate == tail {
        return Ok(false);
    }

    let mut blocked = post_move_body(grid, snake, candidate, grows);
    // The tail is the search target
    blocked.remove(tail);

    let path = pathfinder.find_path(grid, candidate, tail, &blocked).into_path()?;
    Ok(path.is_some())
}
