//! Minimal 2D vector math for the flock field.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).magnitude()
    }

    pub fn scale(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }

    /// Same direction, magnitude `m`. The zero vector stays zero.
    pub fn set_magnitude(self, m: f64) -> Vec2 {
        let len = self.magnitude();
        if len > 0.0 {
            self.scale(m / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Caps the magnitude at `max`.
    pub fn limit(self, max: f64) -> Vec2 {
        if self.magnitude() > max {
            self.set_magnitude(max)
        } else {
            self
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Toroidal wrap of both axes into `[-1, 1]`.
    pub fn wrapped(self) -> Vec2 {
        Vec2::new(wrap_axis(self.x), wrap_axis(self.y))
    }
}

fn wrap_axis(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    if (-1.0..=1.0).contains(&v) {
        return v;
    }
    (v + 1.0).rem_euclid(2.0) - 1.0
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        self.scale(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_magnitude_keeps_direction() {
        let v = Vec2::new(3.0, 4.0).set_magnitude(10.0);
        assert!((v.x - 6.0).abs() < 1e-12);
        assert!((v.y - 8.0).abs() < 1e-12);
        assert_eq!(Vec2::ZERO.set_magnitude(5.0), Vec2::ZERO);
    }

    #[test]
    fn limit_only_shrinks() {
        let short = Vec2::new(0.1, 0.0);
        assert_eq!(short.limit(1.0), short);
        assert!((Vec2::new(0.0, 9.0).limit(2.0).magnitude() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_reenters_opposite_edge() {
        let w = Vec2::new(1.05, -1.25).wrapped();
        assert!((w.x - (-0.95)).abs() < 1e-12);
        assert!((w.y - 0.75).abs() < 1e-12);

        let far = Vec2::new(7.3, -12.6).wrapped();
        assert!((-1.0..=1.0).contains(&far.x));
        assert!((-1.0..=1.0).contains(&far.y));
    }

    #[test]
    fn wrap_neutralises_non_finite() {
        let w = Vec2::new(f64::NAN, f64::INFINITY).wrapped();
        assert_eq!(w, Vec2::ZERO);
    }
}
