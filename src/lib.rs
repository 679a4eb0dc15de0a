//! Snake Autopilot - a snake that plays itself
//!
//! This library provides:
//! - Core game logic: grid, obstacles, fruit and the tick controller (game module)
//! - Move selection: bounded A*, tail-reachability check, fallback policy (ai module)
//! - TUI rendering of the per-tick cell frame (render module)
//! - Session timing and batch statistics (metrics module)
//! - Watch and headless execution modes (modes module)

pub mod ai;
pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;

pub use error::{Result, SnakeError};
