//! Error types for the autopilot core.
//!
//! Searching and trapping are not errors: a missing path is
//! [`PathResult::NotFound`](crate::ai::PathResult) and a trapped snake is a
//! terminal [`GameStatus`](crate::game::GameStatus). Only logic faults and
//! exhausted placement caps end up here.

use thiserror::Error;

/// Main error type for autopilot operations
#[derive(Error, Debug)]
pub enum SnakeError {
    /// A caller handed over a cell outside the grid
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    InvalidCoordinate {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// The fruit spawner ran out of draws without finding a free cell
    #[error("no free cell for fruit after {attempts} attempts")]
    SpawnExhausted { attempts: usize },

    /// Obstacle placement kept hitting the initial body footprint
    #[error("obstacle placement gave up after {attempts} attempts")]
    PlacementExhausted { attempts: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for autopilot operations
pub type Result<T> = std::result::Result<T, SnakeError>;

impl SnakeError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
