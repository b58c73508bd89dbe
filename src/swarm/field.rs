//! Flock field: per-agent kinematic state and the boids tick.
//!
//! Forces per agent, from neighbours inside the perception radius:
//!   alignment   steer toward the neighbours' mean heading
//!   cohesion    steer toward the neighbours' centroid
//!   separation  push away, inverse-square in distance
//!   interest    pull toward neighbours that spoke recently (heat)
//!   wander      random unit kick, keeps the flock from freezing
//!
//! All accelerations of a tick are computed from one pre-tick snapshot, then
//! applied together.

use crate::core::agent::AgentId;
use crate::core::random::RandomSource;
use crate::core::traits::WeightProfile;
use crate::swarm::vector::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Multiplicative heat decay applied at the start of every tick.
pub const HEAT_DECAY: f64 = 0.92;
/// Heat at or below this does not attract neighbours.
pub const HEAT_FLOOR: f64 = 0.02;
/// Hard cap on the interest-pull and wander magnitudes.
const KICK_CAP: f64 = 0.02;

/// Everything the field tracks for one active agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub heat: f64,
    pub weights: WeightProfile,
    /// Fixed per activation; scales this agent's speed cap.
    pub speed_multiplier: f64,
    /// Additive shift on the speak probability.
    pub speak_bias: f64,
}

impl AgentState {
    pub fn at(position: Vec2, weights: WeightProfile) -> Self {
        AgentState {
            position: position.wrapped(),
            velocity: Vec2::ZERO,
            heat: 0.0,
            weights,
            speed_multiplier: 1.0,
            speak_bias: 0.0,
        }
    }
}

/// Kinematic state of every active agent, keyed by id.
#[derive(Clone, Debug)]
pub struct FlockField {
    agents: BTreeMap<AgentId, AgentState>,
    pub perception: f64,
    pub max_speed: f64,
}

struct Snapshot {
    position: Vec2,
    velocity: Vec2,
    heat: f64,
}

impl FlockField {
    pub fn new(perception: f64, max_speed: f64) -> Self {
        FlockField {
            agents: BTreeMap::new(),
            perception,
            max_speed,
        }
    }

    pub fn insert(&mut self, id: AgentId, state: AgentState) {
        self.agents.insert(id, state);
    }

    pub fn remove(&mut self, id: &str) -> Option<AgentState> {
        self.agents.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&AgentState> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AgentState> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Active ids in stable (sorted) order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &AgentState)> {
        self.agents.iter()
    }

    pub fn positions(&self) -> BTreeMap<AgentId, Vec2> {
        self.agents
            .iter()
            .map(|(id, s)| (id.clone(), s.position))
            .collect()
    }

    /// Marks an agent as having just spoken.
    pub fn ignite(&mut self, id: &str) {
        if let Some(s) = self.agents.get_mut(id) {
            s.heat = 1.0;
        }
    }

    /// Advances every agent by one tick.
    pub fn step(&mut self, rng: &mut RandomSource) {
        for s in self.agents.values_mut() {
            s.heat *= HEAT_DECAY;
            if !s.heat.is_finite() || s.heat < 0.0 {
                s.heat = 0.0;
            }
        }

        let snapshot: Vec<Snapshot> = self
            .agents
            .values()
            .map(|s| Snapshot {
                position: s.position,
                velocity: s.velocity,
                heat: s.heat,
            })
            .collect();

        let accelerations: Vec<Vec2> = self
            .agents
            .values()
            .enumerate()
            .map(|(i, s)| self.acceleration(i, &s.weights, &snapshot, rng))
            .collect();

        let max_speed = self.max_speed;
        for (s, acc) in self.agents.values_mut().zip(accelerations) {
            let mut velocity = (s.velocity + acc).limit(max_speed * s.speed_multiplier);
            if !velocity.is_finite() {
                velocity = Vec2::ZERO;
            }
            s.velocity = velocity;
            s.position = (s.position + velocity).wrapped();
        }

        debug!("[FlockField] Stepped {} agents", self.agents.len());
    }

    fn acceleration(
        &self,
        i: usize,
        w: &WeightProfile,
        snapshot: &[Snapshot],
        rng: &mut RandomSource,
    ) -> Vec2 {
        let me = &snapshot[i];
        let max_speed = self.max_speed;

        let mut count = 0usize;
        let mut velocity_sum = Vec2::ZERO;
        let mut position_sum = Vec2::ZERO;
        let mut push = Vec2::ZERO;
        let mut pull = Vec2::ZERO;

        for (j, other) in snapshot.iter().enumerate() {
            if j == i {
                continue;
            }
            let offset = other.position - me.position;
            let d = offset.magnitude();
            if d >= self.perception {
                continue;
            }
            count += 1;
            velocity_sum += other.velocity;
            position_sum += other.position;
            if d > 1e-9 {
                push += offset.scale(-1.0).set_magnitude(1.0).scale(1.0 / (d * d));
            }
            if other.heat > HEAT_FLOOR {
                pull += offset.scale(other.heat);
            }
        }

        let mut acc = Vec2::ZERO;

        if count > 0 {
            let n = count as f64;

            let mean_velocity = velocity_sum.scale(1.0 / n);
            if !mean_velocity.is_zero() {
                let steer = mean_velocity.set_magnitude(max_speed) - me.velocity;
                acc += steer.scale(w.align);
            }

            let to_centroid = position_sum.scale(1.0 / n) - me.position;
            if !to_centroid.is_zero() {
                let steer = to_centroid.set_magnitude(max_speed) - me.velocity;
                acc += steer.scale(w.cohere);
            }

            if !push.is_zero() {
                acc += push.set_magnitude(max_speed).scale(w.separate);
            }

            if !pull.is_zero() {
                acc += pull.set_magnitude((0.6 * max_speed).min(KICK_CAP));
            }
        }

        let kick = rng.unit_vector().set_magnitude(max_speed.min(KICK_CAP));
        acc += kick.scale(w.wander);

        acc
    }
}
