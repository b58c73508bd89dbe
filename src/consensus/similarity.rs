//! Embedding-based agreement proxy.
//!
//! A cheaper stand-in for explicit votes: the latest reply of each agent is
//! embedded and the group is considered aligned when the replies point the
//! same way.

use crate::core::agent::AgentId;
use std::collections::BTreeMap;

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut mag_a = 0.0_f64;
    let mut mag_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}

/// Pairwise similarities, 1.0 on the diagonal.
pub type SimilarityMatrix = BTreeMap<AgentId, BTreeMap<AgentId, f64>>;

pub fn similarity_matrix(vectors: &BTreeMap<AgentId, Vec<f32>>) -> SimilarityMatrix {
    vectors
        .iter()
        .map(|(a, va)| {
            let row = vectors
                .iter()
                .map(|(b, vb)| {
                    let s = if a == b { 1.0 } else { cosine(va, vb) };
                    (b.clone(), s)
                })
                .collect();
            (a.clone(), row)
        })
        .collect()
}

/// Mean of the off-diagonal entries. `None` with fewer than two agents.
pub fn average_similarity(matrix: &SimilarityMatrix) -> Option<f64> {
    let ids: Vec<&AgentId> = matrix.keys().collect();
    let mut sum = 0.0;
    let mut count = 0usize;
    for (i, a) in ids.iter().enumerate() {
        for b in ids.iter().skip(i + 1) {
            sum += matrix[*a][*b];
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

/// True when every pair is at or above `threshold`.
pub fn all_pairs_above(matrix: &SimilarityMatrix, threshold: f64) -> bool {
    let ids: Vec<&AgentId> = matrix.keys().collect();
    ids.iter().enumerate().all(|(i, a)| {
        ids.iter()
            .skip(i + 1)
            .all(|b| matrix[*a][*b] >= threshold)
    })
}

/// Latest embedding per agent.
#[derive(Clone, Debug, Default)]
pub struct SimilarityTracker {
    latest: BTreeMap<AgentId, Vec<f32>>,
}

impl SimilarityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &str, vector: Vec<f32>) {
        self.latest.insert(id.to_string(), vector);
    }

    pub fn forget(&mut self, id: &str) {
        self.latest.remove(id);
    }

    /// Mean pairwise similarity among `active` agents that have a vector.
    pub fn mean_among(&self, active: &[AgentId]) -> Option<f64> {
        let subset: BTreeMap<AgentId, Vec<f32>> = active
            .iter()
            .filter_map(|id| self.latest.get(id).map(|v| (id.clone(), v.clone())))
            .collect();
        average_similarity(&similarity_matrix(&subset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_basics() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn matrix_and_average() {
        let mut v = BTreeMap::new();
        v.insert("A".to_string(), vec![1.0, 0.0]);
        v.insert("B".to_string(), vec![1.0, 0.0]);
        v.insert("C".to_string(), vec![0.0, 1.0]);
        let m = similarity_matrix(&v);
        assert_eq!(m["A"]["A"], 1.0);
        let avg = average_similarity(&m).unwrap();
        assert!((avg - 1.0 / 3.0).abs() < 1e-12);
        assert!(!all_pairs_above(&m, 0.9));
        assert!(all_pairs_above(&m, -0.1));
    }

    #[test]
    fn tracker_filters_to_active() {
        let mut t = SimilarityTracker::new();
        t.record("A", vec![1.0, 0.0]);
        t.record("B", vec![0.9, 0.1]);
        t.record("C", vec![0.0, 1.0]);
        let ab = t.mean_among(&["A".to_string(), "B".to_string()]).unwrap();
        assert!(ab > 0.9);
        t.forget("B");
        assert_eq!(t.mean_among(&["A".to_string(), "B".to_string()]), None);
    }
}
