//! Random world content: obstacle blocks and fruit.
//!
//! Both placements draw from a caller-supplied RNG so a seeded session is
//! fully reproducible, and both give up after a fixed number of draws.

use rand::Rng;
use tracing::debug;

use super::config::GameConfig;
use super::grid::{Grid, Position};
use super::state::Snake;
use crate::error::{Result, SnakeError};

/// Scatter square obstacle blocks until the nominal coverage is met.
///
/// The block count is fixed up front from the coverage target, so overlapping
/// blocks leave the realized coverage short of it. Blocks touching the
/// starting body are redrawn.
pub fn generate_obstacles<R: Rng + ?Sized>(
    config: &GameConfig,
    keep_clear: &Snake,
    rng: &mut R,
) -> Result<Grid> {
    let width = config.grid_width;
    let height = config.grid_height;
    let size = config.obstacle_size;

    let target_cells = width * height * config.clamped_coverage() as usize / 100;
    if target_cells == 0 || size == 0 || size > width || size > height {
        return Ok(Grid::new(width, height));
    }

    let blocks = target_cells.div_ceil(size * size);
    let side = size as i32;
    let mut cells = Vec::with_capacity(blocks * size * size);
    let mut placed = 0;
    let mut attempts = 0;

    while placed < blocks {
        if attempts >= config.placement_attempts {
            return Err(SnakeError::PlacementExhausted { attempts });
        }
        attempts += 1;

        let x = rng.gen_range(0..=width - size) as i32;
        let y = rng.gen_range(0..=height - size) as i32;

        let covers_body = keep_clear
            .cells()
            .any(|c| c.x >= x && c.x < x + side && c.y >= y && c.y < y + side);
        if covers_body {
            continue;
        }

        for dy in 0..side {
            for dx in 0..side {
                cells.push(Position::new(x + dx, y + dy));
            }
        }
        placed += 1;
    }

    let grid = Grid::with_obstacles(width, height, cells)?;
    debug!(
        blocks,
        attempts,
        target_cells,
        obstacle_cells = grid.obstacle_count(),
        "placed obstacles"
    );
    Ok(grid)
}

/// Pick a uniformly random cell that is neither obstacle nor snake
pub fn spawn_fruit<R: Rng + ?Sized>(
    grid: &Grid,
    snake: &Snake,
    attempts: usize,
    rng: &mut R,
) -> Result<Position> {
    for _ in 0..attempts {
        let x = rng.gen_range(0..grid.width()) as i32;
        let y = rng.gen_range(0..grid.height()) as i32;
        let pos = Position::new(x, y);

        if grid.is_open(pos) && !snake.contains(pos) {
            return Ok(pos);
        }
    }

    Err(SnakeError::SpawnExhausted { attempts })
}
