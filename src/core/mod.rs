//! Core types: agents, traits, configuration, errors, randomness and the
//! generation seams.

pub mod agent;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod random;
pub mod traits;
