//! Per-cluster vote tally.

use crate::consensus::vote::{normalize_proposal, Vote};
use serde::{Deserialize, Serialize};

/// A cluster that reached the support threshold this turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusEntry {
    pub cluster_size: usize,
    /// `yes / (yes + no)` for the winning proposal.
    pub support: f64,
    pub proposal: String,
}

/// The leading proposal of a cluster, whether or not it cleared the threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct Leader {
    /// Normalized grouping key.
    pub key: String,
    /// Proposal text as first written.
    pub proposal: String,
    pub yes: usize,
    pub total: usize,
}

impl Leader {
    pub fn support(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.yes as f64 / self.total as f64
        }
    }
}

struct Group {
    key: String,
    proposal: String,
    yes: usize,
    total: usize,
}

/// Finds the proposal with the most yes votes.
///
/// Ties go to the proposal seen first. Proposals that only collected neutral
/// votes, and votes without a proposal, are ignored.
pub fn leading_proposal(votes: &[Vote]) -> Option<Leader> {
    let mut groups: Vec<Group> = Vec::new();

    for vote in votes.iter().filter(|v| v.has_proposal()) {
        let key = normalize_proposal(&vote.proposal);
        let idx = match groups.iter().position(|g| g.key == key) {
            Some(i) => i,
            None => {
                groups.push(Group {
                    key,
                    proposal: vote.proposal.clone(),
                    yes: 0,
                    total: 0,
                });
                groups.len() - 1
            }
        };
        let g = &mut groups[idx];
        if vote.stance > 0 {
            g.yes += 1;
        }
        if vote.stance != 0 {
            g.total += 1;
        }
    }

    let mut best: Option<&Group> = None;
    for g in groups.iter().filter(|g| g.total > 0) {
        if best.map_or(true, |b| g.yes > b.yes) {
            best = Some(g);
        }
    }

    best.map(|g| Leader {
        key: g.key.clone(),
        proposal: g.proposal.clone(),
        yes: g.yes,
        total: g.total,
    })
}

/// Tallies one cluster's votes. Returns an entry only when the leading
/// proposal's support reaches `threshold`.
pub fn tally(votes: &[Vote], cluster_size: usize, threshold: f64) -> Option<ConsensusEntry> {
    let leader = leading_proposal(votes)?;
    let support = leader.support();
    (support >= threshold).then(|| ConsensusEntry {
        cluster_size,
        support,
        proposal: leader.proposal,
    })
}
