use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use super::direction::Direction;
use super::grid::{Grid, Position};

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    body: VecDeque<Position>,
    /// Ticks on which the tail stays put instead of following the head
    pending_growth: u32,
}

impl Snake {
    /// Create a new snake with given head position, facing `direction`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self {
            body,
            pending_growth: 0,
        }
    }

    /// Create a snake from explicit head-to-tail cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is empty.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let body: VecDeque<Position> = cells.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one cell");
        Self {
            body,
            pending_growth: 0,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    /// Body cells from head to tail
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Check if `pos` hits a segment that will still be there after the next
    /// move. The tail only counts when it is retained for growth.
    pub fn collides_with_body(&self, pos: Position) -> bool {
        let keep = if self.tail_vacates() {
            self.body.len() - 1
        } else {
            self.body.len()
        };
        self.body.iter().take(keep).any(|cell| *cell == pos)
    }

    /// Whether the tail cell frees up on the next non-eating move
    pub fn tail_vacates(&self) -> bool {
        self.pending_growth == 0
    }

    pub fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    /// Queue extra ticks on which the tail is kept
    pub fn add_growth(&mut self, ticks: u32) {
        self.pending_growth = self.pending_growth.saturating_add(ticks);
    }

    /// Prepend `new_head`; pop the tail unless `grow` is set
    pub fn move_to(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);

        if !grow {
            self.body.pop_back();
        }
    }

    /// Consume one tick of pending growth, returning whether one was pending
    pub fn take_growth(&mut self) -> bool {
        if self.pending_growth > 0 {
            self.pending_growth -= 1;
            true
        } else {
            false
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why a session ended without winning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// No legal neighbour left for the head
    Trapped,
    /// Snake moved off the grid or into an obstacle
    HitWall,
    /// Snake hit itself
    HitSelf,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EndReason::Trapped => "trapped - no safe moves",
            EndReason::HitWall => "hit wall",
            EndReason::HitSelf => "hit self",
        };
        f.write_str(text)
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Running,
    GameOver(EndReason),
    /// Fruit quota reached
    Won,
    /// Tick or wall-clock limit reached
    TimedOut,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Running)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Running => f.write_str("running"),
            GameStatus::GameOver(reason) => write!(f, "game over: {reason}"),
            GameStatus::Won => f.write_str("won"),
            GameStatus::TimedOut => f.write_str("time limit reached"),
        }
    }
}

/// What occupies a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellRole {
    Obstacle,
    Head,
    Body,
    Fruit,
}

/// End-of-session summary for whoever hosts the sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub status: GameStatus,
    pub fruits_eaten: u32,
    pub ticks: u32,
    pub length: usize,
}

/// Complete session state: world, snake, fruit and counters
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub grid: Grid,
    pub snake: Snake,
    pub fruit: Position,
    pub fruits_eaten: u32,
    pub ticks: u32,
    pub status: GameStatus,
}

impl GameState {
    /// Create a new game state
    pub fn new(grid: Grid, snake: Snake, fruit: Position) -> Self {
        Self {
            grid,
            snake,
            fruit,
            fruits_eaten: 0,
            ticks: 0,
            status: GameStatus::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    /// Cells to draw this tick: obstacles, head, body, then fruit
    pub fn frame(&self) -> Vec<(Position, CellRole)> {
        let mut cells = Vec::with_capacity(self.grid.obstacle_count() + self.snake.len() + 1);
        cells.extend(
            self.grid
                .obstacles()
                .iter()
                .map(|cell| (*cell, CellRole::Obstacle)),
        );
        for (i, cell) in self.snake.cells().enumerate() {
            let role = if i == 0 { CellRole::Head } else { CellRole::Body };
            cells.push((cell, role));
        }
        if self.fruit != self.snake.head() {
            cells.push((self.fruit, CellRole::Fruit));
        }
        cells
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            status: self.status,
            fruits_eaten: self.fruits_eaten,
            ticks: self.ticks,
            length: self.snake.len(),
        }
    }
}
