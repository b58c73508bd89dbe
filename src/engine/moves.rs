//! Conversational moves and their trait-weighted draw.

use crate::core::random::RandomSource;
use crate::core::traits::{Direction, Humor, Level, Rigor, TraitSet};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Ask,
    Challenge,
    Build,
    Story,
    Analogy,
    Datum,
    Synthesize,
    Decide,
}

impl Move {
    pub const ALL: [Move; 8] = [
        Move::Ask,
        Move::Challenge,
        Move::Build,
        Move::Story,
        Move::Analogy,
        Move::Datum,
        Move::Synthesize,
        Move::Decide,
    ];

    pub fn base_weight(self) -> f64 {
        match self {
            Move::Ask | Move::Challenge | Move::Build => 1.0,
            Move::Story | Move::Analogy | Move::Datum | Move::Decide => 0.6,
            Move::Synthesize => 0.8,
        }
    }

    /// Instruction appended to the speaker's prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Move::Ask => "Ask one pointed question that would move the group forward.",
            Move::Challenge => "Challenge a specific claim someone made; say what is weak about it.",
            Move::Build => "Build on a peer's point and take it one step further.",
            Move::Story => "Share a short, concrete anecdote that bears on the question.",
            Move::Analogy => "Offer an analogy that makes the trade-off easier to see.",
            Move::Datum => "Cite one relevant fact, figure or piece of evidence.",
            Move::Synthesize => "Synthesize where the group agrees and name what is still open.",
            Move::Decide => "Propose a concrete decision the group could adopt now.",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Weights over [`Move::ALL`] for a speaker with `traits`.
pub fn move_weights(traits: &TraitSet) -> [f64; 8] {
    let mut w = Move::ALL.map(Move::base_weight);
    let mut bump = |m: Move, by: f64| w[m.index()] += by;

    match traits.naivety() {
        Level::High => {
            bump(Move::Ask, 0.8);
            bump(Move::Analogy, 0.5);
        }
        Level::Med => bump(Move::Ask, 0.3),
        Level::Low => {}
    }
    match traits.direction() {
        Direction::Decider => {
            bump(Move::Decide, 0.9);
            bump(Move::Synthesize, 0.5);
        }
        Direction::Explorer => {
            bump(Move::Ask, 0.4);
            bump(Move::Analogy, 0.3);
        }
        Direction::Wanderer => {
            bump(Move::Story, 0.4);
            bump(Move::Analogy, 0.4);
        }
    }
    match traits.rigor() {
        Rigor::Data => {
            bump(Move::Datum, 0.9);
            bump(Move::Challenge, 0.2);
        }
        Rigor::Anecdotal => bump(Move::Story, 0.9),
        Rigor::Balanced => {}
    }
    match traits.snark() {
        Level::High => bump(Move::Challenge, 0.6),
        Level::Med => bump(Move::Challenge, 0.3),
        Level::Low => {}
    }
    if traits.humor() == Humor::Playful {
        bump(Move::Analogy, 0.3);
        bump(Move::Story, 0.2);
    }
    match traits.optimism() {
        Level::High => bump(Move::Build, 0.4),
        Level::Low => bump(Move::Challenge, 0.3),
        Level::Med => {}
    }
    w
}

/// Draws one move for a speaker.
pub fn choose_move(traits: &TraitSet, rng: &mut RandomSource) -> Move {
    rng.weighted_index(&move_weights(traits))
        .and_then(|i| Move::ALL.get(i).copied())
        .unwrap_or(Move::Build)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(traits: &TraitSet, m: Move) -> f64 {
        move_weights(traits)[m.index()]
    }

    #[test]
    fn defaults_favor_asking() {
        // Default traits are explorer + light humor + balanced + med optimism.
        let t = TraitSet::default();
        assert!((weight(&t, Move::Ask) - 1.4).abs() < 1e-12);
        assert!((weight(&t, Move::Analogy) - 0.9).abs() < 1e-12);
        assert_eq!(weight(&t, Move::Decide), 0.6);
        assert_eq!(weight(&t, Move::Synthesize), 0.8);
    }

    #[test]
    fn traits_shift_weights() {
        let t = TraitSet::parse("direction=decider, rigor=data, snark=high, optimism=low");
        assert!((weight(&t, Move::Decide) - 1.5).abs() < 1e-12);
        assert!((weight(&t, Move::Synthesize) - 1.3).abs() < 1e-12);
        assert!((weight(&t, Move::Datum) - 1.5).abs() < 1e-12);
        assert!((weight(&t, Move::Challenge) - 2.1).abs() < 1e-12);

        let t = TraitSet::parse("humor=playful, rigor=anecdotal, direction=wanderer");
        assert!((weight(&t, Move::Story) - 2.1).abs() < 1e-12);
    }

    #[test]
    fn draw_follows_weights() {
        let t = TraitSet::parse("direction=decider, rigor=data");
        let mut rng = RandomSource::seeded(11);
        let mut counts = [0usize; 8];
        for _ in 0..4000 {
            counts[choose_move(&t, &mut rng).index()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
        assert!(counts[Move::Decide.index()] > counts[Move::Story.index()]);
        assert!(counts[Move::Datum.index()] > counts[Move::Story.index()]);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Move::Synthesize).unwrap(), "\"synthesize\"");
    }
}
