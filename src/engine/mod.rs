//! Simulation Engine
//!
//! Turn orchestration, prompt assembly and the event stream.

pub mod events;
pub mod moves;
pub mod orchestrator;
pub mod prompt;

pub use events::{SimEvent, TranscriptEntry};
pub use moves::Move;
pub use orchestrator::{RunState, SimHandle, Simulation};
