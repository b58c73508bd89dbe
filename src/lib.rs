//! Convergent Core - Flocking Multi-Agent Discussion Engine
//!
//! Agents drift through a 2D toroidal field under boids forces. Agents that
//! come within talking distance form clusters, a few members of each cluster
//! speak through an external text generator, and the structured votes they
//! attach are tallied into local consensus. Agreement feeds back into each
//! agent's flocking weights, so groups that agree pull tighter together.

pub mod consensus;
pub mod core;
pub mod engine;
pub mod swarm;

pub use consensus::{ConsensusEntry, Vote};
pub use core::agent::{Agent, AgentId, AgentPool};
pub use core::config::{Preset, SimConfig};
pub use core::error::{ConfigError, GenerationError, SimError, SimResult};
pub use core::generator::{Embedder, FnEmbedder, FnGenerator, GenerationRequest, Generator};
pub use core::llm::OpenAiClient;
pub use engine::{Move, RunState, SimEvent, SimHandle, Simulation};
pub use swarm::Vec2;

/// Initialize tracing for the library.
///
/// `level` is an `EnvFilter` directive such as `"info"` or
/// `"convergent_core=debug"`. Logs go to stderr so stdout stays free for the
/// event stream. A second call is a no-op.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
