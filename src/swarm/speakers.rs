//! Picks who talks in a cluster this round.

use crate::core::agent::AgentId;
use crate::core::random::RandomSource;

pub const MAX_SPEAKERS: usize = 3;
const MIN_P: f64 = 0.05;
const MAX_P: f64 = 0.95;

/// Probability that a member with `bias` volunteers at global rate `speak_rate`.
pub fn speak_probability(speak_rate: f64, bias: f64) -> f64 {
    let p = speak_rate + bias;
    if p.is_nan() {
        return MIN_P;
    }
    p.clamp(MIN_P, MAX_P)
}

/// Samples speakers for one cluster.
///
/// Each member volunteers independently; if nobody does, one member is drawn
/// uniformly. The result is shuffled and capped at [`MAX_SPEAKERS`], so a
/// non-empty cluster always yields between one and `min(3, len)` speakers.
pub fn select_speakers<F>(
    cluster: &[AgentId],
    speak_rate: f64,
    bias_of: F,
    rng: &mut RandomSource,
) -> Vec<AgentId>
where
    F: Fn(&str) -> f64,
{
    let mut chosen: Vec<AgentId> = cluster
        .iter()
        .filter(|id| {
            let p = speak_probability(speak_rate, bias_of(id.as_str()));
            rng.weighted_index(&[1.0 - p, p]) == Some(1)
        })
        .cloned()
        .collect();

    if chosen.is_empty() {
        if let Some(id) = rng.pick(cluster) {
            chosen.push(id.clone());
        }
    }

    rng.shuffle(&mut chosen);
    chosen.truncate(MAX_SPEAKERS);
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<AgentId> {
        (0..n).map(|i| format!("a{}", i)).collect()
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(speak_probability(1.0, 0.1), 0.95);
        assert_eq!(speak_probability(0.1, -0.5), 0.05);
        assert_eq!(speak_probability(f64::NAN, 0.0), 0.05);
        assert!((speak_probability(0.6, 0.1) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn bounds_hold_for_every_size() {
        let mut rng = RandomSource::seeded(17);
        for n in 1..=12 {
            let cluster = ids(n);
            for _ in 0..200 {
                for rate in [0.1, 0.6, 1.0] {
                    let s = select_speakers(&cluster, rate, |_| 0.0, &mut rng);
                    assert!(!s.is_empty());
                    assert!(s.len() <= MAX_SPEAKERS.min(n));
                    assert!(s.iter().all(|id| cluster.contains(id)));
                    let mut dedup = s.clone();
                    dedup.sort();
                    dedup.dedup();
                    assert_eq!(dedup.len(), s.len());
                }
            }
        }
    }

    #[test]
    fn empty_cluster_yields_nobody() {
        let mut rng = RandomSource::seeded(2);
        assert!(select_speakers(&[], 1.0, |_| 0.0, &mut rng).is_empty());
    }

    #[test]
    fn quiet_members_still_get_picked_eventually() {
        let mut rng = RandomSource::seeded(5);
        let cluster = ids(2);
        let mut seen = [false; 2];
        for _ in 0..200 {
            for id in select_speakers(&cluster, 0.1, |_| -1.0, &mut rng) {
                seen[if id == "a0" { 0 } else { 1 }] = true;
            }
        }
        assert!(seen[0] && seen[1]);
    }
}
