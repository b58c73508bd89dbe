//! Viewpoint traits and the motion/temperament weights derived from them.
//!
//! Viewpoints are configured one per line:
//!
//! ```text
//! Label[ - description] [| trait=value, trait=value, ...]
//! ```
//!
//! Parsing is permissive: unknown keys, unknown values and stray separators
//! are dropped rather than reported.

use crate::core::config::SimConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Humor {
    None,
    Dry,
    Light,
    Playful,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Med,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Decider,
    Explorer,
    Wanderer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rigor {
    Data,
    Balanced,
    Anecdotal,
}

impl Humor {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "none" | "off" | "no" => Some(Humor::None),
            "dry" => Some(Humor::Dry),
            "light" => Some(Humor::Light),
            "playful" => Some(Humor::Playful),
            _ => None,
        }
    }
}

impl Level {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Level::Low),
            "med" | "medium" | "mid" => Some(Level::Med),
            "high" => Some(Level::High),
            _ => None,
        }
    }
}

impl Direction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "decider" => Some(Direction::Decider),
            "explorer" => Some(Direction::Explorer),
            "wanderer" => Some(Direction::Wanderer),
            _ => None,
        }
    }
}

impl Rigor {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "data" => Some(Rigor::Data),
            "balanced" => Some(Rigor::Balanced),
            "anecdotal" => Some(Rigor::Anecdotal),
            _ => None,
        }
    }
}

/// Six independent voice dimensions. Unset dimensions read as their default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    pub humor: Option<Humor>,
    pub naivety: Option<Level>,
    pub direction: Option<Direction>,
    pub rigor: Option<Rigor>,
    pub optimism: Option<Level>,
    pub snark: Option<Level>,
}

impl TraitSet {
    pub fn humor(&self) -> Humor {
        self.humor.unwrap_or(Humor::Light)
    }

    pub fn naivety(&self) -> Level {
        self.naivety.unwrap_or(Level::Low)
    }

    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or(Direction::Explorer)
    }

    pub fn rigor(&self) -> Rigor {
        self.rigor.unwrap_or(Rigor::Balanced)
    }

    pub fn optimism(&self) -> Level {
        self.optimism.unwrap_or(Level::Med)
    }

    pub fn snark(&self) -> Level {
        self.snark.unwrap_or(Level::Low)
    }

    /// Applies one `key=value` pair. Returns false when the pair was ignored.
    fn set(&mut self, key: &str, value: &str) -> bool {
        match key {
            "humor" | "humour" => Humor::parse(value).map(|v| self.humor = Some(v)).is_some(),
            "naivety" | "naive" | "naivete" => {
                Level::parse(value).map(|v| self.naivety = Some(v)).is_some()
            }
            "direction" | "dir" => {
                Direction::parse(value).map(|v| self.direction = Some(v)).is_some()
            }
            "rigor" | "rigour" | "evidence" => {
                Rigor::parse(value).map(|v| self.rigor = Some(v)).is_some()
            }
            "optimism" => Level::parse(value).map(|v| self.optimism = Some(v)).is_some(),
            "snark" => Level::parse(value).map(|v| self.snark = Some(v)).is_some(),
            _ => false,
        }
    }

    /// Parses `humor=dry, snark=high` style lists.
    pub fn parse(list: &str) -> TraitSet {
        let mut traits = TraitSet::default();
        for pair in list.split([',', ';']) {
            let Some((k, v)) = pair.split_once(['=', ':']) else {
                continue;
            };
            let key = k.trim().to_ascii_lowercase();
            let value = v.trim().trim_matches(['"', '\'']).to_ascii_lowercase();
            traits.set(&key, &value);
        }
        traits
    }
}

/// A shared stance descriptor that agents are assigned from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub label: String,
    pub description: Option<String>,
    pub traits: TraitSet,
}

impl Viewpoint {
    /// Parses one configuration line. Blank or label-less lines yield `None`.
    pub fn parse(line: &str) -> Option<Viewpoint> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (head, trait_list) = match line.split_once('|') {
            Some((h, t)) => (h, Some(t)),
            None => (line, None),
        };

        let (label, description) = split_description(head);
        if label.is_empty() {
            return None;
        }

        Some(Viewpoint {
            label,
            description,
            traits: trait_list.map(TraitSet::parse).unwrap_or_default(),
        })
    }

    /// One-line summary used in prompts.
    pub fn summary(&self) -> String {
        match &self.description {
            Some(d) => format!("{}: {}", self.label, d),
            None => self.label.clone(),
        }
    }
}

fn split_description(head: &str) -> (String, Option<String>) {
    for sep in [" - ", " – ", " — "] {
        if let Some((l, d)) = head.split_once(sep) {
            let d = d.trim();
            let description = (!d.is_empty()).then(|| d.to_string());
            return (l.trim().to_string(), description);
        }
    }
    (head.trim().to_string(), None)
}

/// Parses a list of configured viewpoint lines, dropping unusable ones.
pub fn parse_viewpoints<S: AsRef<str>>(lines: &[S]) -> Vec<Viewpoint> {
    lines
        .iter()
        .flat_map(|l| l.as_ref().lines())
        .filter_map(Viewpoint::parse)
        .collect()
}

pub const COEFF_RANGE: (f64, f64) = (0.0, 3.0);
pub const WANDER_RANGE: (f64, f64) = (0.0, 1.5);
pub const TEMP_BIAS_RANGE: (f64, f64) = (-0.4, 0.4);

/// Per-agent motion and temperament coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub align: f64,
    pub cohere: f64,
    pub separate: f64,
    pub wander: f64,
    pub temp_bias: f64,
    /// Resistance to adaptation, 1.0 freezes the profile.
    pub stubbornness: f64,
    /// How far a single adaptation step reaches.
    pub volatility: f64,
}

impl WeightProfile {
    /// Profile taken straight from the global flocking weights.
    pub fn from_config(cfg: &SimConfig) -> Self {
        WeightProfile {
            align: cfg.align_w,
            cohere: cfg.cohere_w,
            separate: cfg.separate_w,
            wander: cfg.wander_w,
            temp_bias: 0.0,
            stubbornness: 0.5,
            volatility: 0.5,
        }
        .clamped()
    }

    /// Global weights shifted by the agent's voice traits.
    pub fn from_traits(traits: &TraitSet, cfg: &SimConfig) -> Self {
        let mut w = WeightProfile::from_config(cfg);
        w.volatility = 0.4;

        match traits.direction() {
            Direction::Decider => {
                w.align += 0.2;
                w.cohere += 0.15;
                w.wander -= 0.15;
                w.stubbornness += 0.2;
                w.volatility -= 0.15;
            }
            Direction::Explorer => {
                w.wander += 0.15;
                w.separate += 0.1;
            }
            Direction::Wanderer => {
                w.wander += 0.35;
                w.cohere -= 0.15;
                w.align -= 0.1;
                w.stubbornness -= 0.1;
                w.volatility += 0.2;
            }
        }

        match traits.rigor() {
            Rigor::Data => {
                w.separate += 0.1;
                w.temp_bias -= 0.1;
                w.stubbornness += 0.15;
                w.volatility -= 0.1;
            }
            Rigor::Anecdotal => {
                w.temp_bias += 0.1;
                w.cohere += 0.05;
            }
            Rigor::Balanced => {}
        }

        match traits.snark() {
            Level::High => {
                w.separate += 0.3;
                w.align -= 0.1;
                w.stubbornness += 0.15;
            }
            Level::Med => w.separate += 0.15,
            Level::Low => {}
        }

        match traits.optimism() {
            Level::High => {
                w.cohere += 0.15;
                w.volatility += 0.05;
            }
            Level::Low => {
                w.cohere -= 0.1;
                w.separate += 0.1;
            }
            Level::Med => {}
        }

        match traits.humor() {
            Humor::Playful => {
                w.temp_bias += 0.15;
                w.wander += 0.1;
                w.volatility += 0.2;
            }
            Humor::Dry => w.temp_bias -= 0.05,
            Humor::None => w.temp_bias -= 0.1,
            Humor::Light => {}
        }

        match traits.naivety() {
            Level::High => {
                w.align += 0.1;
                w.temp_bias += 0.05;
                w.stubbornness -= 0.25;
                w.volatility += 0.15;
            }
            Level::Med => w.stubbornness -= 0.1,
            Level::Low => {}
        }

        w.clamped()
    }

    pub fn clamped(mut self) -> Self {
        self.align = clamp(self.align, COEFF_RANGE);
        self.cohere = clamp(self.cohere, COEFF_RANGE);
        self.separate = clamp(self.separate, COEFF_RANGE);
        self.wander = clamp(self.wander, WANDER_RANGE);
        self.temp_bias = clamp(self.temp_bias, TEMP_BIAS_RANGE);
        self.stubbornness = clamp(self.stubbornness, (0.0, 1.0));
        self.volatility = clamp(self.volatility, (0.0, 1.0));
        self
    }
}

/// Additive shift on the speak probability, by conversational direction.
pub fn speak_bias(traits: &TraitSet) -> f64 {
    match traits.direction() {
        Direction::Decider => 0.10,
        Direction::Explorer => 0.05,
        Direction::Wanderer => -0.10,
    }
}

fn clamp(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if v.is_nan() {
        lo
    } else {
        v.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let vp = Viewpoint::parse(
            "Libertarian Left - bottom-up cooperation | humor=playful, direction=explorer, rigor=anecdotal, naivety=high",
        )
        .unwrap();
        assert_eq!(vp.label, "Libertarian Left");
        assert_eq!(vp.description.as_deref(), Some("bottom-up cooperation"));
        assert_eq!(vp.traits.humor, Some(Humor::Playful));
        assert_eq!(vp.traits.direction, Some(Direction::Explorer));
        assert_eq!(vp.traits.rigor, Some(Rigor::Anecdotal));
        assert_eq!(vp.traits.naivety, Some(Level::High));
        assert_eq!(vp.traits.snark, None);
    }

    #[test]
    fn label_only_and_hyphenated_labels() {
        let vp = Viewpoint::parse("  Techno-optimist  ").unwrap();
        assert_eq!(vp.label, "Techno-optimist");
        assert_eq!(vp.description, None);
        assert_eq!(vp.traits, TraitSet::default());
    }

    #[test]
    fn unknown_traits_are_ignored() {
        let t = TraitSet::parse("humor=sarcastic, volume=loud, snark = HIGH, optimism=medium, junk");
        assert_eq!(t.humor, None);
        assert_eq!(t.snark, Some(Level::High));
        assert_eq!(t.optimism, Some(Level::Med));
    }

    #[test]
    fn defaults_for_unset_dimensions() {
        let t = TraitSet::default();
        assert_eq!(t.humor(), Humor::Light);
        assert_eq!(t.naivety(), Level::Low);
        assert_eq!(t.direction(), Direction::Explorer);
        assert_eq!(t.rigor(), Rigor::Balanced);
        assert_eq!(t.optimism(), Level::Med);
        assert_eq!(t.snark(), Level::Low);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let vps = parse_viewpoints(&["Alpha\n\n  \n# comment\nBeta | snark=high", " | humor=dry"]);
        let labels: Vec<_> = vps.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn trait_weights_stay_in_range() {
        let cfg = SimConfig::default();
        let extreme = TraitSet::parse(
            "humor=playful, naivety=high, direction=wanderer, rigor=anecdotal, optimism=low, snark=high",
        );
        let w = WeightProfile::from_traits(&extreme, &cfg);
        assert!((0.0..=3.0).contains(&w.align));
        assert!((0.0..=1.5).contains(&w.wander));
        assert!((-0.4..=0.4).contains(&w.temp_bias));
        assert!((0.0..=1.0).contains(&w.stubbornness));
        assert!((0.0..=1.0).contains(&w.volatility));
    }

    #[test]
    fn deciders_are_more_stubborn_than_wanderers() {
        let cfg = SimConfig::default();
        let decider = WeightProfile::from_traits(&TraitSet::parse("direction=decider"), &cfg);
        let wanderer = WeightProfile::from_traits(&TraitSet::parse("direction=wanderer"), &cfg);
        assert!(decider.stubbornness > wanderer.stubbornness);
        assert!(wanderer.wander > decider.wander);
        assert!(speak_bias(&decider_traits()) > speak_bias(&TraitSet::parse("direction=wanderer")));
    }

    fn decider_traits() -> TraitSet {
        TraitSet::parse("direction=decider")
    }
}
