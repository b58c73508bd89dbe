//! Swarm Engine
//!
//! Flocking physics on the toroidal `[-1, 1]` square, proximity clustering
//! and speaker selection.

pub mod cluster;
pub mod field;
pub mod speakers;
pub mod vector;

pub use field::{AgentState, FlockField};
pub use vector::Vec2;
