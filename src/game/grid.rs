//! Static world model: grid dimensions and obstacle membership.
//!
//! Membership is stored densely (`y * width + x`) so every query is a bounds
//! check plus one indexed load. The same layout backs [`Occupancy`], the
//! per-search blocked set handed to the pathfinder.

use super::direction::Direction;
use crate::error::{Result, SnakeError};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True when `other` is exactly one orthogonal step away
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

/// Bounded grid with an immutable obstacle set
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    obstacles: Vec<bool>,
    /// Obstacle cells in placement order, without duplicates
    obstacle_cells: Vec<Position>,
}

impl Grid {
    /// Create an obstacle-free grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            obstacles: vec![false; width * height],
            obstacle_cells: Vec::new(),
        }
    }

    /// Create a grid with the given obstacle cells.
    ///
    /// Repeated cells are collapsed. Any out-of-bounds cell is rejected with
    /// [`SnakeError::InvalidCoordinate`].
    pub fn with_obstacles<I>(width: usize, height: usize, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut grid = Self::new(width, height);
        for cell in cells {
            let idx = grid.index(cell)?;
            if !grid.obstacles[idx] {
                grid.obstacles[idx] = true;
                grid.obstacle_cells.push(cell);
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Check if a position is within the grid bounds
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    /// Dense index of an in-bounds cell
    pub fn index(&self, pos: Position) -> Result<usize> {
        self.slot(pos).ok_or(SnakeError::InvalidCoordinate {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        })
    }

    fn slot(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.slot(pos).is_some_and(|idx| self.obstacles[idx])
    }

    /// In bounds and not an obstacle
    pub fn is_open(&self, pos: Position) -> bool {
        self.slot(pos).is_some_and(|idx| !self.obstacles[idx])
    }

    /// Open orthogonal neighbours, in [`Direction::ALL`] order
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| pos.moved_in_direction(dir))
            .filter(|next| self.is_open(*next))
    }

    pub fn obstacles(&self) -> &[Position] {
        &self.obstacle_cells
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacle_cells.len()
    }

    /// Distance from an in-bounds cell to the nearest edge row or column
    pub fn wall_distance(&self, pos: Position) -> i32 {
        let right = self.width as i32 - 1 - pos.x;
        let bottom = self.height as i32 - 1 - pos.y;
        pos.x.min(pos.y).min(right).min(bottom)
    }

    /// Manhattan distance to the closest obstacle, `None` on an empty field
    pub fn nearest_obstacle_distance(&self, pos: Position) -> Option<i32> {
        self.obstacle_cells.iter().map(|o| o.manhattan(pos)).min()
    }
}

/// Dense set of cells matching a grid's layout.
///
/// Out-of-bounds cells are never members; inserting one is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Occupancy {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    /// Build a set from cells sized to `grid`
    pub fn from_cells<'a, I>(grid: &Grid, cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut set = Self::for_grid(grid);
        for cell in cells {
            set.insert(*cell);
        }
        set
    }

    fn slot(&self, pos: Position) -> Option<usize> {
        let in_bounds =
            pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32;
        in_bounds.then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn insert(&mut self, pos: Position) {
        if let Some(idx) = self.slot(pos) {
            self.cells[idx] = true;
        }
    }

    pub fn remove(&mut self, pos: Position) {
        if let Some(idx) = self.slot(pos) {
            self.cells[idx] = false;
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.slot(pos).is_some_and(|idx| self.cells[idx])
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|c| *c)
    }
}
