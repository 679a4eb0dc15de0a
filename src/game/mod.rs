//! Core game logic module for the self-playing snake
//!
//! This module contains the world model, session state and the tick
//! controller, without any I/O or rendering dependencies. Move selection
//! lives in [`crate::ai`].

pub mod config;
pub mod direction;
pub mod engine;
pub mod grid;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use config::GameConfig;
pub use direction::Direction;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use grid::{Grid, Occupancy, Position};
pub use state::{CellRole, EndReason, GameState, GameStatus, SessionReport, Snake};
