//! Injectable random source.
//!
//! Every stochastic decision in a run (join/leave rolls, wander, speaker and
//! move sampling, viewpoint assignment) draws from one `RandomSource`, so a
//! seeded run is fully reproducible for a given generator.

use crate::swarm::vector::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, UnitCircle};

pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        RandomSource {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy-backed otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform draw in `[lo, hi)`. Degenerate ranges return `lo`.
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        if !(hi > lo) {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Uniformly distributed direction on the unit circle.
    pub fn unit_vector(&mut self) -> Vec2 {
        let [x, y]: [f64; 2] = UnitCircle.sample(&mut self.rng);
        Vec2::new(x, y)
    }

    /// Uniform point in the `[-1, 1]` square.
    pub fn point_in_domain(&mut self) -> Vec2 {
        Vec2::new(self.range(-1.0, 1.0), self.range(-1.0, 1.0))
    }

    /// Cumulative-weight draw over `weights`.
    ///
    /// Non-positive and non-finite weights are never selected. If no weight is
    /// positive the draw degrades to a uniform pick. Returns `None` only for an
    /// empty slice.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let usable = |w: f64| w.is_finite() && w > 0.0;
        let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
        if total <= 0.0 {
            return self.index(weights.len());
        }

        let target = self.unit() * total;
        let mut acc = 0.0;
        let mut last = None;
        for (i, w) in weights.iter().copied().enumerate() {
            if !usable(w) {
                continue;
            }
            acc += w;
            last = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        // Float rounding can leave target == total.
        last
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
