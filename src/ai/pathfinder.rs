//! Bounded weighted A* over the 4-connected grid.
//!
//! The queue is ordered by `f = g + w·h` with `h` the Manhattan distance to
//! the target. Equal priorities pop in insertion order, so a given
//! `(start, target, blocked)` always produces the same path. Every call
//! allocates its own scratch arrays; a [`Pathfinder`] is just the limits.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::error::{Result, SnakeError};
use crate::game::{GameConfig, Grid, Occupancy, Position};

/// Outcome of a path search
#[derive(Debug)]
pub enum PathResult {
    /// Cells from start to target, both inclusive
    Found(Vec<Position>),
    /// Target unreachable, too far, or the node budget ran out
    NotFound,
    /// The query itself was malformed
    Fault(SnakeError),
}

impl PathResult {
    /// The path, or `None` when nothing was found. A malformed query is an
    /// error, never a missing path.
    pub fn into_path(self) -> Result<Option<Vec<Position>>> {
        match self {
            PathResult::Found(path) => Ok(Some(path)),
            PathResult::NotFound => Ok(None),
            PathResult::Fault(err) => Err(err),
        }
    }

    /// The cell after the start, if a path with one was found
    pub fn into_next_step(self) -> Result<Option<Position>> {
        Ok(self.into_path()?.and_then(|path| path.get(1).copied()))
    }
}

/// Search limits shared by every query in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pathfinder {
    node_budget: usize,
    /// Heuristic weight in hundredths, 100 = plain A*
    weight_centi: u32,
    /// Nodes deeper than this are not expanded
    max_depth: Option<u32>,
}

impl Pathfinder {
    /// Plain A* with the given node budget and no depth limit
    pub fn new(node_budget: usize) -> Self {
        Self {
            node_budget,
            weight_centi: 100,
            max_depth: None,
        }
    }

    /// Limits for a session: configured budget and weight, depth capped at
    /// twice the longer grid side.
    pub fn for_config(config: &GameConfig) -> Self {
        let longest = config.grid_width.max(config.grid_height) as u32;
        Self {
            node_budget: config.node_budget,
            weight_centi: config.heuristic_weight_centi(),
            max_depth: Some(longest.saturating_mul(2)),
        }
    }

    /// Scale the heuristic; values below 1.0 are treated as 1.0
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight_centi = (weight.max(1.0) * 100.0).round() as u32;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn node_budget(&self) -> usize {
        self.node_budget
    }

    fn priority(&self, g: u32, h: u32) -> u64 {
        u64::from(g) * 100 + u64::from(self.weight_centi) * u64::from(h)
    }

    /// Find a path from `start` to `target` through open cells not in
    /// `blocked`. The start cell itself is never checked against `blocked`.
    pub fn find_path(
        &self,
        grid: &Grid,
        start: Position,
        target: Position,
        blocked: &Occupancy,
    ) -> PathResult {
        let start_idx = match grid.index(start) {
            Ok(idx) => idx,
            Err(err) => return PathResult::Fault(err),
        };
        let target_idx = match grid.index(target) {
            Ok(idx) => idx,
            Err(err) => return PathResult::Fault(err),
        };

        if start == target {
            return PathResult::Found(vec![start]);
        }

        let heuristic = |pos: Position| pos.manhattan(target) as u32;
        if self.max_depth.is_some_and(|depth| heuristic(start) > depth) {
            return PathResult::NotFound;
        }

        let width = grid.width();
        let cells = grid.cell_count();
        let mut g_score = vec![u32::MAX; cells];
        let mut parent = vec![usize::MAX; cells];
        let mut closed = vec![false; cells];

        let mut open = BinaryHeap::new();
        let mut sequence: u64 = 0;
        g_score[start_idx] = 0;
        open.push(Reverse((self.priority(0, heuristic(start)), sequence, start_idx)));

        let mut expanded = 0usize;
        while let Some(Reverse((_, _, idx))) = open.pop() {
            if closed[idx] {
                continue;
            }

            if idx == target_idx {
                return PathResult::Found(reconstruct(&parent, start_idx, target_idx, width));
            }

            if expanded >= self.node_budget {
                trace!(expanded, ?start, ?target, "node budget exhausted");
                return PathResult::NotFound;
            }
            expanded += 1;
            closed[idx] = true;

            let current = position_of(idx, width);
            let current_g = g_score[idx];
            if self.max_depth.is_some_and(|depth| current_g > depth) {
                continue;
            }

            for next in grid.neighbors(current) {
                let next_idx = next.y as usize * width + next.x as usize;
                if closed[next_idx] || blocked.contains(next) {
                    continue;
                }

                let tentative = current_g + 1;
                if tentative < g_score[next_idx] {
                    g_score[next_idx] = tentative;
                    parent[next_idx] = idx;
                    sequence += 1;
                    open.push(Reverse((
                        self.priority(tentative, heuristic(next)),
                        sequence,
                        next_idx,
                    )));
                }
            }
        }

        PathResult::NotFound
    }
}

fn position_of(idx: usize, width: usize) -> Position {
    Position::new((idx % width) as i32, (idx / width) as i32)
}

fn reconstruct(parent: &[usize], start_idx: usize, target_idx: usize, width: usize) -> Vec<Position> {
    let mut path = vec![position_of(target_idx, width)];
    let mut idx = target_idx;
    while idx != start_idx {
        idx = parent[idx];
        path.push(position_of(idx, width));
    }
    path.reverse();
    path
}
