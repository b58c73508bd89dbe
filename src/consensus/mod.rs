//! Consensus
//!
//! Vote extraction, per-cluster tallies, agreement-driven weight adaptation
//! and the embedding similarity proxy.

pub mod adapt;
pub mod similarity;
pub mod tally;
pub mod vote;

pub use tally::ConsensusEntry;
pub use vote::Vote;
