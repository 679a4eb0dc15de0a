//! Move selection: fruit, then tail, then clearance.
//!
//! Each tier is tried in order and the first one that yields a step wins:
//!
//! 1. the first step of a path to the fruit, if it passes the tail check;
//! 2. the first step of a path to the snake's own tail, if it passes the
//!    tail check (a holding pattern while the fruit is out of reach);
//! 3. the legal neighbour with the most clearance among those passing the
//!    tail check;
//! 4. the legal neighbour with the most clearance, checked or not.
//!
//! Only when the head has no legal neighbour at all is the snake trapped.

use tracing::debug;

use crate::error::Result;
use crate::game::{GameConfig, GameState, Grid, Occupancy, Position, Snake};

use super::pathfinder::Pathfinder;
use super::safety::is_safe;

/// Which tier produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Fruit,
    Tail,
    Clearance,
    LastResort,
    Trapped,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fruit => "fruit",
            Strategy::Tail => "tail",
            Strategy::Clearance => "clearance",
            Strategy::LastResort => "last resort",
            Strategy::Trapped => "trapped",
        }
    }
}

/// The policy's answer for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Next head cell, `None` when trapped
    pub next: Option<Position>,
    pub strategy: Strategy,
}

impl Decision {
    pub fn step(next: Position, strategy: Strategy) -> Self {
        Self {
            next: Some(next),
            strategy,
        }
    }

    pub fn trapped() -> Self {
        Self {
            next: None,
            strategy: Strategy::Trapped,
        }
    }
}

/// Ordered fallback policy over a shared set of search limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePolicy {
    pathfinder: Pathfinder,
}

impl MovePolicy {
    pub fn new(pathfinder: Pathfinder) -> Self {
        Self { pathfinder }
    }

    pub fn for_config(config: &GameConfig) -> Self {
        Self::new(Pathfinder::for_config(config))
    }

    /// Choose the next head cell for the current state.
    ///
    /// A head or fruit outside the grid is an error rather than a reason to
    /// fall through to the next tier.
    pub fn decide(&self, state: &GameState) -> Result<Decision> {
        let grid = &state.grid;
        let snake = &state.snake;
        let head = snake.head();
        let grows = |cell: Position| cell == state.fruit || !snake.tail_vacates();
        let safe = |cell: Position| is_safe(&self.pathfinder, grid, snake, cell, grows(cell));

        let mut blocked = Occupancy::from_cells(grid, snake.body());
        if snake.tail_vacates() {
            blocked.remove(snake.tail());
        }

        let to_fruit = self
            .pathfinder
            .find_path(grid, head, state.fruit, &blocked)
            .into_next_step()?;
        if let Some(next) = to_fruit {
            if safe(next)? {
                return Ok(Decision::step(next, Strategy::Fruit));
            }
            debug!(?next, "fruit step fails the tail check");
        }

        if snake.len() > 1 {
            // The tail is the target here, so it must be enterable
            let tail = snake.tail();
            let mut towards_tail = blocked.clone();
            towards_tail.remove(tail);

            let to_tail = self
                .pathfinder
                .find_path(grid, head, tail, &towards_tail)
                .into_next_step()?;
            if let Some(next) = to_tail {
                if safe(next)? {
                    return Ok(Decision::step(next, Strategy::Tail));
                }
                debug!(?next, "tail step fails the tail check");
            }
        }

        let legal: Vec<Position> = grid
            .neighbors(head)
            .filter(|cell| !snake.collides_with_body(*cell))
            .collect();
        if legal.is_empty() {
            return Ok(Decision::trapped());
        }

        let mut checked = Vec::with_capacity(legal.len());
        for &cell in &legal {
            if safe(cell)? {
                checked.push(cell);
            }
        }
        if let Some(best) = roomiest(grid, snake, &checked) {
            return Ok(Decision::step(best, Strategy::Clearance));
        }

        debug!(candidates = legal.len(), "no neighbour passes the tail check");
        Ok(match roomiest(grid, snake, &legal) {
            Some(best) => Decision::step(best, Strategy::LastResort),
            None => Decision::trapped(),
        })
    }
}

/// Candidate with the largest clearance; ties keep the earlier candidate
fn roomiest(grid: &Grid, snake: &Snake, candidates: &[Position]) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    for &cell in candidates {
        let room = clearance(grid, snake, cell);
        if best.map_or(true, |(_, best_room)| room > best_room) {
            best = Some((cell, room));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Manhattan distance from `cell` to the nearest wall, obstacle or body
/// segment.
///
/// Not the plain nearest-body distance: the current head is skipped, since
/// it always sits right behind the new head and would cap every score at 1.
/// A tail that is about to move away is skipped too.
pub fn clearance(grid: &Grid, snake: &Snake, cell: Position) -> i32 {
    let mut room = grid.wall_distance(cell);
    if let Some(obstacle) = grid.nearest_obstacle_distance(cell) {
        room = room.min(obstacle);
    }

    let staying = if snake.tail_vacates() {
        snake.len().saturating_sub(1)
    } else {
        snake.len()
    };
    for segment in snake.body().iter().take(staying).skip(1) {
        room = room.min(segment.manhattan(cell));
    }
    room
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnakeError;
    use crate::game::Direction;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn policy() -> MovePolicy {
        MovePolicy::new(Pathfinder::new(10_000))
    }

    #[test]
    fn test_heads_for_fruit() {
        let state = GameState::new(
            Grid::new(10, 10),
            Snake::new(p(5, 5), Direction::Right, 3),
            p(7, 5),
        );

        let decision = policy().decide(&state).unwrap();
        assert_eq!(decision.next, Some(p(6, 5)));
        assert_eq!(decision.strategy, Strategy::Fruit);
    }

    #[test]
    fn test_unreachable_fruit_falls_back_to_tail() {
        let walls = [p(8, 1), p(8, 3), p(7, 2), p(9, 2)];
        let grid = Grid::with_obstacles(12, 12, walls).unwrap();
        let state = GameState::new(grid, Snake::new(p(5, 5), Direction::Right, 4), p(8, 2));

        let decision = policy().decide(&state).unwrap();
        assert_eq!(decision.strategy, Strategy::Tail);
        let next = decision.next.unwrap();
        assert!(next.is_adjacent(p(5, 5)));
        assert!(!state.snake.collides_with_body(next));
    }

    #[test]
    fn test_single_cell_snake_uses_clearance() {
        // Fruit sealed off; a one-cell snake has no tail to chase
        let walls = [p(0, 1), p(1, 0)];
        let grid = Grid::with_obstacles(7, 7, walls).unwrap();
        let state = GameState::new(grid, Snake::from_cells([p(1, 3)]), p(0, 0));

        let decision = policy().decide(&state).unwrap();
        assert_eq!(decision.strategy, Strategy::Clearance);
        // Right keeps the most room from the left wall
        assert_eq!(decision.next, Some(p(2, 3)));
    }

    #[test]
    fn test_out_of_bounds_fruit_is_error() {
        let state = GameState::new(
            Grid::new(10, 10),
            Snake::new(p(5, 5), Direction::Right, 3),
            p(50, 50),
        );

        assert!(matches!(
            policy().decide(&state),
            Err(SnakeError::InvalidCoordinate { x: 50, y: 50, .. })
        ));
    }

    #[test]
    fn test_trapped_when_no_legal_neighbour() {
        let grid = Grid::with_obstacles(3, 3, [p(1, 0), p(0, 1)]).unwrap();
        let state = GameState::new(grid, Snake::from_cells([p(0, 0)]), p(2, 2));

        let decision = policy().decide(&state).unwrap();
        assert_eq!(decision, Decision::trapped());
    }

    #[test]
    fn test_coiled_snake_enters_vacating_tail() {
        let snake = Snake::from_cells([
            p(1, 1),
            p(2, 1),
            p(2, 0),
            p(1, 0),
            p(0, 0),
            p(0, 1),
            p(0, 2),
            p(1, 2),
        ]);
        let state = GameState::new(Grid::new(5, 5), snake, p(4, 4));

        let decision = policy().decide(&state).unwrap();
        assert_eq!(decision.next, Some(p(1, 2)));
    }

    #[test]
    fn test_budget_starved_policy_still_moves() {
        let obstacles: Vec<_> = (10..54).map(|y| p(40, y)).collect();
        let grid = Grid::with_obstacles(64, 64, obstacles).unwrap();
        let state = GameState::new(grid, Snake::new(p(32, 32), Direction::Right, 20), p(50, 32));

        let decision = MovePolicy::new(Pathfinder::new(1)).decide(&state).unwrap();
        let next = decision.next.expect("an open neighbour exists");
        assert!(next.is_adjacent(p(32, 32)));
        assert!(state.grid.is_open(next));
        assert!(!state.snake.collides_with_body(next));
        assert_eq!(decision.strategy, Strategy::LastResort);
    }

    #[test]
    fn test_clearance_measure() {
        let grid = Grid::with_obstacles(11, 11, [p(9, 5)]).unwrap();
        let snake = Snake::new(p(5, 5), Direction::Right, 3);

        // (6,5): obstacle 3, wall 4, neck 2; head and vacating tail are skipped
        assert_eq!(clearance(&grid, &snake, p(6, 5)), 2);
        assert_eq!(clearance(&grid, &snake, p(5, 4)), 2);
        assert_eq!(clearance(&grid, &snake, p(0, 0)), 0);
    }
}
