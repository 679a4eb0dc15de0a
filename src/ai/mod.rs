//! Decision making: bounded path search, the tail-reachability check and the
//! fallback move policy built on top of both.

pub mod pathfinder;
pub mod policy;
pub mod safety;

pub use pathfinder::{PathResult, Pathfinder};
pub use policy::{Decision, MovePolicy, Strategy};
pub use safety::{is_safe, post_move_body};
