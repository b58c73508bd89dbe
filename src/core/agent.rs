use crate::core::config::{SimConfig, MAX_POOL};
use crate::core::random::RandomSource;
use crate::core::traits::{parse_viewpoints, TraitSet, Viewpoint};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Stable short label such as `"A"`.
pub type AgentId = String;

/// Immutable base disposition assigned when the pool is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub stance: String,
    /// Added to the global temperature on every generation call.
    pub temperature_offset: f64,
    pub style: String,
}

const PERSONAS: [(&str, f64, &str); 6] = [
    ("pragmatist", 0.0, "Plain-spoken and focused on what works in practice."),
    ("skeptic", -0.1, "Questions assumptions and asks what the evidence says."),
    ("optimist", 0.1, "Looks for upside and for common ground."),
    ("contrarian", 0.15, "Pushes against the room to stress-test ideas."),
    ("mediator", -0.05, "Bridges positions and names what people share."),
    ("idealist", 0.05, "Argues from principles and long-term values."),
];

const COLORS: [&str; MAX_POOL] = [
    "#3b82f6", "#8b5cf6", "#10b981", "#f59e0b", "#ef4444", "#06b6d4",
    "#ec4899", "#84cc16", "#f97316", "#6366f1", "#14b8a6", "#a855f7",
];

/// A member of the agent pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub color: String,
    pub persona: Persona,
    pub viewpoint: Option<Viewpoint>,
}

impl Agent {
    /// Voice traits, empty when the agent has no viewpoint.
    pub fn traits(&self) -> TraitSet {
        self.viewpoint
            .as_ref()
            .map(|v| v.traits.clone())
            .unwrap_or_default()
    }

    pub fn viewpoint_label(&self) -> Option<&str> {
        self.viewpoint.as_ref().map(|v| v.label.as_str())
    }
}

/// The fixed set of agents a run draws its active members from.
#[derive(Clone, Debug)]
pub struct AgentPool {
    agents: Vec<Agent>,
}

impl AgentPool {
    /// Builds a full pool of `MAX_POOL` agents with personas cycled in order and
    /// viewpoints sampled from the configured lines.
    ///
    /// Viewpoints are dealt at random among the least-used lines, so every
    /// line is handed out once before any line repeats.
    pub fn create(cfg: &SimConfig, rng: &mut RandomSource) -> Self {
        let viewpoints = parse_viewpoints(&cfg.viewpoint_lines());
        let mut assigned = vec![0usize; viewpoints.len()];

        let agents = (0..MAX_POOL)
            .map(|i| {
                let label = char::from(b'A' + i as u8).to_string();
                let (stance, offset, style) = PERSONAS[i % PERSONAS.len()];

                let least = assigned.iter().copied().min().unwrap_or(0);
                let weights: Vec<f64> = assigned
                    .iter()
                    .map(|n| if *n == least { 1.0 } else { 0.0 })
                    .collect();
                let viewpoint = rng.weighted_index(&weights).map(|k| {
                    assigned[k] += 1;
                    viewpoints[k].clone()
                });

                Agent {
                    name: format!("Agent {}", label),
                    id: label,
                    color: COLORS[i].to_string(),
                    persona: Persona {
                        stance: stance.to_string(),
                        temperature_offset: offset,
                        style: style.to_string(),
                    },
                    viewpoint,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "🧑‍🤝‍🧑 [AgentPool] Created {} agents over {} viewpoints",
            agents.len(),
            viewpoints.len()
        );
        AgentPool { agents }
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
