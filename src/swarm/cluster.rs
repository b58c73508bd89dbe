//! Proximity clusters.
//!
//! Two agents are linked when their distance is at most the talk radius;
//! clusters are the connected components of that graph.

use crate::core::agent::AgentId;
use crate::swarm::vector::Vec2;
use std::collections::{BTreeMap, VecDeque};

/// Partitions `positions` into connected components.
///
/// Components are discovered by BFS, seeded in the map's iteration order, and
/// members are listed in discovery order. Every id appears in exactly one
/// component; isolated agents are singletons. An empty map yields no clusters.
pub fn clusters(positions: &BTreeMap<AgentId, Vec2>, talk_radius: f64) -> Vec<Vec<AgentId>> {
    let nodes: Vec<(&AgentId, Vec2)> = positions.iter().map(|(id, p)| (id, *p)).collect();
    let n = nodes.len();
    let mut visited = vec![false; n];
    let mut out = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([seed]);

        while let Some(u) = queue.pop_front() {
            component.push(nodes[u].0.clone());
            for v in 0..n {
                if !visited[v] && nodes[u].1.distance(nodes[v].1) <= talk_radius {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        out.push(component);
    }

    out
}

/// Sizes of the given clusters, largest first.
pub fn size_histogram(clusters: &[Vec<AgentId>]) -> Vec<usize> {
    let mut sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

pub fn mean_size(clusters: &[Vec<AgentId>]) -> f64 {
    if clusters.is_empty() {
        return 0.0;
    }
    let total: usize = clusters.iter().map(Vec::len).sum();
    total as f64 / clusters.len() as f64
}
