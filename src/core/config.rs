use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full parameter set for one simulation run.
///
/// Every field has a default, so partial JSON documents deserialize. Values
/// are never rejected: `clamped()` pulls them back into range instead.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    pub goal: String,
    pub agent_count: usize,
    pub max_turns: u32,
    pub max_context_messages: usize,
    pub max_tokens: u32,
    pub temperature: f64,
    pub join_prob: f64,
    pub leave_prob: f64,
    pub turn_delay_ms: u64,
    pub model: String,

    // Boids
    pub talk_radius: f64,
    pub perception: f64,
    pub max_speed: f64,
    pub align_w: f64,
    pub cohere_w: f64,
    pub separate_w: f64,

    // Motion and conversation dynamics
    pub activity_rate: f64,
    pub speak_rate: f64,
    pub wander_w: f64,
    pub speed_jitter: f64,

    // Viewpoints and persona variance
    pub viewpoints: Vec<String>,
    /// Newline separated alternative to `viewpoints`; wins when non-empty.
    pub viewpoints_text: Option<String>,
    pub temp_jitter: f64,

    // Adaptive dynamics
    pub adapt_weights: bool,
    pub per_agent_weights: bool,
    pub adapt_rate: f64,
    pub consensus_threshold: f64,

    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    /// Stop early once mean embedding similarity exceeds this value.
    pub similarity_stop: Option<f64>,
}

pub const MAX_POOL: usize = 12;

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            goal: "Should governments implement universal basic income funded through AI taxation, \
                   or would that erode human ambition and innovation?"
                .to_string(),
            agent_count: 4,
            max_turns: 10,
            max_context_messages: 10,
            max_tokens: 200,
            temperature: 0.7,
            join_prob: 0.20,
            leave_prob: 0.10,
            turn_delay_ms: 200,
            model: "gpt-4o-mini".to_string(),
            talk_radius: 0.30,
            perception: 0.45,
            max_speed: 0.035,
            align_w: 0.8,
            cohere_w: 0.6,
            separate_w: 1.2,
            activity_rate: 1.4,
            speak_rate: 0.6,
            wander_w: 0.50,
            speed_jitter: 0.25,
            viewpoints: vec![
                "Authoritarian Left | humor=light, direction=decider, rigor=data, optimism=high".to_string(),
                "Libertarian Left | humor=playful, direction=explorer, rigor=anecdotal, naivety=high, optimism=med".to_string(),
                "Authoritarian Right | humor=dry, direction=decider, rigor=balanced, snark=high".to_string(),
                "Libertarian Right | humor=light, direction=wanderer, rigor=balanced, optimism=high".to_string(),
            ],
            viewpoints_text: None,
            temp_jitter: 0.25,
            adapt_weights: true,
            per_agent_weights: true,
            adapt_rate: 0.15,
            consensus_threshold: 0.6,
            seed: None,
            similarity_stop: None,
        }
    }
}

fn clamp_f(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        fallback
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(json)?;
        Ok(cfg.clamped())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Returns a copy with every parameter pulled into its documented range.
    pub fn clamped(mut self) -> Self {
        let d = SimConfig::default();

        self.agent_count = self.agent_count.clamp(2, MAX_POOL);
        self.max_turns = self.max_turns.clamp(1, 50);
        self.max_context_messages = self.max_context_messages.clamp(2, 50);
        self.max_tokens = self.max_tokens.clamp(48, 400);
        self.temperature = clamp_f(self.temperature, 0.0, 1.5, d.temperature);
        self.join_prob = clamp_f(self.join_prob, 0.0, 1.0, d.join_prob);
        self.leave_prob = clamp_f(self.leave_prob, 0.0, 1.0, d.leave_prob);
        self.turn_delay_ms = self.turn_delay_ms.min(3000);

        self.talk_radius = clamp_f(self.talk_radius, 0.05, 1.0, d.talk_radius);
        self.perception = clamp_f(self.perception, 0.1, 1.5, d.perception);
        self.max_speed = clamp_f(self.max_speed, 0.005, 0.1, d.max_speed);
        self.align_w = clamp_f(self.align_w, 0.0, 3.0, d.align_w);
        self.cohere_w = clamp_f(self.cohere_w, 0.0, 3.0, d.cohere_w);
        self.separate_w = clamp_f(self.separate_w, 0.0, 3.0, d.separate_w);

        self.activity_rate = clamp_f(self.activity_rate, 0.3, 4.0, d.activity_rate);
        self.speak_rate = clamp_f(self.speak_rate, 0.1, 1.0, d.speak_rate);
        self.wander_w = clamp_f(self.wander_w, 0.0, 1.5, d.wander_w);
        self.speed_jitter = clamp_f(self.speed_jitter, 0.0, 0.6, d.speed_jitter);
        self.temp_jitter = clamp_f(self.temp_jitter, 0.0, 0.8, d.temp_jitter);

        self.adapt_rate = clamp_f(self.adapt_rate, 0.0, 1.0, d.adapt_rate);
        self.consensus_threshold =
            clamp_f(self.consensus_threshold, 0.5, 1.0, d.consensus_threshold);
        self.similarity_stop = self
            .similarity_stop
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0));

        if self.goal.trim().is_empty() {
            self.goal = d.goal;
        }
        if self.model.trim().is_empty() {
            self.model = d.model;
        }
        self
    }

    /// Physics ticks run between two conversational rounds.
    pub fn ticks_per_turn(&self) -> u32 {
        ((24.0 * self.activity_rate).round() as u32).max(8)
    }

    /// The effective viewpoint lines, preferring the free-text form.
    pub fn viewpoint_lines(&self) -> Vec<String> {
        match self.viewpoints_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            _ => self.viewpoints.clone(),
        }
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        preset.apply(&mut self);
        self.clamped()
    }
}

/// Named parameter overlays for common discussion shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    PoliticalCompass,
    PolarizedDebate,
    ConsensusWorkshop,
    ChaoticAgora,
    CalmSeminar,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::PoliticalCompass,
        Preset::PolarizedDebate,
        Preset::ConsensusWorkshop,
        Preset::ChaoticAgora,
        Preset::CalmSeminar,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Preset::PoliticalCompass => "political_compass",
            Preset::PolarizedDebate => "polarized_debate",
            Preset::ConsensusWorkshop => "consensus_workshop",
            Preset::ChaoticAgora => "chaotic_agora",
            Preset::CalmSeminar => "calm_seminar",
        }
    }

    pub fn from_id(id: &str) -> Option<Preset> {
        Preset::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Preset::PoliticalCompass => "Distinct factions, vivid debate, gradual convergence.",
            Preset::PolarizedDebate => "Hard factions, slower consensus, sharper motion.",
            Preset::ConsensusWorkshop => "Cooperative behavior; finds middle quickly.",
            Preset::ChaoticAgora => "Noisy square; ideas collide; unpredictable arcs.",
            Preset::CalmSeminar => "Gentle motion, clear turn-taking, low heat.",
        }
    }

    fn apply(&self, c: &mut SimConfig) {
        c.adapt_weights = true;
        c.per_agent_weights = true;
        match self {
            Preset::PoliticalCompass => {
                c.goal = "Should governments adopt UBI funded by AI taxation, or would that erode \
                          human ambition and innovation?"
                    .to_string();
                c.viewpoints = vec![
                    "Authoritarian Left | humor=light, direction=decider, rigor=data".to_string(),
                    "Libertarian Left | humor=playful, direction=explorer, rigor=anecdotal, naivety=high".to_string(),
                    "Authoritarian Right | humor=dry, direction=decider, rigor=balanced, snark=high".to_string(),
                    "Libertarian Right | humor=light, direction=wanderer, rigor=balanced, optimism=high".to_string(),
                ];
                c.viewpoints_text = None;
                c.agent_count = 4;
                c.max_turns = 10;
                c.talk_radius = 0.30;
                c.perception = 0.45;
                c.max_speed = 0.035;
                c.align_w = 0.6;
                c.cohere_w = 0.7;
                c.separate_w = 1.3;
                c.activity_rate = 1.4;
                c.speak_rate = 0.7;
                c.wander_w = 0.5;
                c.speed_jitter = 0.25;
                c.temp_jitter = 0.25;
                c.adapt_rate = 0.18;
            }
            Preset::PolarizedDebate => {
                c.agent_count = 6;
                c.max_turns = 12;
                c.talk_radius = 0.24;
                c.perception = 0.42;
                c.align_w = 0.55;
                c.cohere_w = 0.55;
                c.separate_w = 1.6;
                c.wander_w = 0.55;
                c.activity_rate = 1.6;
                c.speak_rate = 0.65;
                c.temp_jitter = 0.30;
                c.adapt_rate = 0.12;
            }
            Preset::ConsensusWorkshop => {
                c.agent_count = 5;
                c.max_turns = 8;
                c.talk_radius = 0.36;
                c.perception = 0.5;
                c.align_w = 1.0;
                c.cohere_w = 0.85;
                c.separate_w = 0.9;
                c.wander_w = 0.3;
                c.activity_rate = 1.2;
                c.speak_rate = 0.55;
                c.temp_jitter = 0.18;
                c.adapt_rate = 0.2;
            }
            Preset::ChaoticAgora => {
                c.agent_count = 8;
                c.max_turns = 10;
                c.talk_radius = 0.26;
                c.perception = 0.48;
                c.align_w = 0.5;
                c.cohere_w = 0.55;
                c.separate_w = 1.45;
                c.wander_w = 0.9;
                c.speed_jitter = 0.35;
                c.activity_rate = 1.8;
                c.speak_rate = 0.8;
                c.temp_jitter = 0.35;
                c.adapt_rate = 0.22;
            }
            Preset::CalmSeminar => {
                c.agent_count = 4;
                c.max_turns = 8;
                c.talk_radius = 0.34;
                c.perception = 0.46;
                c.align_w = 0.8;
                c.cohere_w = 0.7;
                c.separate_w = 1.0;
                c.wander_w = 0.25;
                c.activity_rate = 1.0;
                c.speak_rate = 0.45;
                c.temp_jitter = 0.15;
                c.adapt_rate = 0.10;
                c.turn_delay_ms = 260;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = SimConfig::from_json_str(r#"{"agentCount": 6, "alignW": 1.1}"#).unwrap();
        assert_eq!(cfg.agent_count, 6);
        assert_eq!(cfg.align_w, 1.1);
        assert_eq!(cfg.max_turns, 10);
        assert_eq!(cfg.viewpoints.len(), 4);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = SimConfig::from_json_str(
            r#"{"agentCount": 40, "maxTurns": 0, "maxTokens": 9000, "talkRadius": -2.0,
                "speakRate": 3.5, "joinProb": 1.7, "turnDelayMs": 60000, "consensusThreshold": 0.1}"#,
        )
        .unwrap();
        assert_eq!(cfg.agent_count, 12);
        assert_eq!(cfg.max_turns, 1);
        assert_eq!(cfg.max_tokens, 400);
        assert_eq!(cfg.talk_radius, 0.05);
        assert_eq!(cfg.speak_rate, 1.0);
        assert_eq!(cfg.join_prob, 1.0);
        assert_eq!(cfg.turn_delay_ms, 3000);
        assert_eq!(cfg.consensus_threshold, 0.5);
    }

    #[test]
    fn non_finite_values_fall_back() {
        let mut cfg = SimConfig::default();
        cfg.max_speed = f64::NAN;
        cfg.similarity_stop = Some(f64::INFINITY);
        let cfg = cfg.clamped();
        assert_eq!(cfg.max_speed, SimConfig::default().max_speed);
        assert_eq!(cfg.similarity_stop, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SimConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn ticks_have_a_floor() {
        let mut cfg = SimConfig::default();
        cfg.activity_rate = 0.3;
        assert_eq!(cfg.ticks_per_turn(), 8);
        cfg.activity_rate = 1.4;
        assert_eq!(cfg.ticks_per_turn(), 34);
    }

    #[test]
    fn free_text_viewpoints_take_precedence() {
        let mut cfg = SimConfig::default();
        cfg.viewpoints_text = Some("Greens\n\n  Hawks | snark=high \n".to_string());
        assert_eq!(cfg.viewpoint_lines(), vec!["Greens", "Hawks | snark=high"]);
        cfg.viewpoints_text = Some("   ".to_string());
        assert_eq!(cfg.viewpoint_lines().len(), 4);
    }

    #[test]
    fn presets_round_trip_ids() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_id(p.id()), Some(p));
            assert!(!p.hint().is_empty());
        }
        let cfg = SimConfig::default().with_preset(Preset::ChaoticAgora);
        assert_eq!(cfg.agent_count, 8);
        assert_eq!(cfg.wander_w, 0.9);
    }
}
