//! Error types for the simulation engine.

use thiserror::Error;

/// Failure reported by a generation or embedding collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("Provider rejected request: {0}")]
    Provider(String),
    #[error("Transport failed: {0}")]
    Transport(String),
    #[error("Could not decode provider response: {0}")]
    Decode(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// A generation call failed. Fatal to the run, never retried.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The consumer went away before the run finished.
    #[error("Simulation cancelled")]
    Cancelled,
}

pub type SimResult<T> = Result<T, SimError>;

/// Failure to read a configuration document. Out-of-range values are not
/// errors; they are clamped after parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
