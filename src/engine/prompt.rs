//! Prompt assembly for one speaking turn.

use crate::core::agent::Agent;
use crate::core::traits::{Direction, Humor, Level, Rigor, TraitSet};
use crate::engine::moves::Move;

/// One line of local context as shown to the speaker.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextLine {
    pub speaker: String,
    pub text: String,
}

/// Everything the user prompt is built from.
#[derive(Clone, Debug)]
pub struct TurnPrompt<'a> {
    pub goal: &'a str,
    pub turn: u32,
    pub chosen_move: Move,
    pub target: Option<&'a Agent>,
    pub context: &'a [ContextLine],
    pub cluster_size: usize,
}

const VOTE_INSTRUCTION: &str = "End your reply with a tag of the form \
<META stance=S proposal=\"P\"> where P is a short proposal you are reacting to \
(or making) and S is 1 if you support it, -1 if you oppose it, 0 if undecided. \
The tag is hidden from the others.";

/// Tone guidance derived from voice traits, one clause per trait.
pub fn tone_guidance(traits: &TraitSet) -> Vec<&'static str> {
    let mut out = Vec::new();
    out.push(match traits.humor() {
        Humor::None => "Keep a serious tone with no jokes.",
        Humor::Dry => "Allow an occasional dry, understated remark.",
        Humor::Light => "A light touch of humor is fine.",
        Humor::Playful => "Be playful; wit is welcome.",
    });
    match traits.naivety() {
        Level::High => out.push("Admit what you do not know and ask basic questions freely."),
        Level::Med => out.push("Be open about gaps in your understanding."),
        Level::Low => {}
    }
    out.push(match traits.direction() {
        Direction::Decider => "Push toward a concrete decision.",
        Direction::Explorer => "Explore options before settling.",
        Direction::Wanderer => "Feel free to follow tangents that seem interesting.",
    });
    match traits.rigor() {
        Rigor::Data => out.push("Ground claims in evidence and numbers."),
        Rigor::Anecdotal => out.push("Lean on lived experience and stories."),
        Rigor::Balanced => {}
    }
    match traits.optimism() {
        Level::High => out.push("Stay upbeat about what is possible."),
        Level::Low => out.push("Be wary of rosy assumptions."),
        Level::Med => {}
    }
    match traits.snark() {
        Level::High => out.push("You can be sharp and a little sarcastic."),
        Level::Med => out.push("A bit of edge is fine."),
        Level::Low => {}
    }
    out
}

/// Identity and voice of the speaker. `traits` drives the tone lines and is
/// passed separately so callers can neutralize it.
pub fn system_prompt(agent: &Agent, traits: &TraitSet) -> String {
    let mut s = format!(
        "You are {}, a {} in a small group discussion. {}",
        agent.name, agent.persona.stance, agent.persona.style
    );
    if let Some(vp) = &agent.viewpoint {
        s.push_str(&format!("\nYou argue from this viewpoint: {}.", vp.summary()));
    }
    let tone = tone_guidance(traits);
    if !tone.is_empty() {
        s.push_str("\nTone: ");
        s.push_str(&tone.join(" "));
    }
    s.push_str("\nReply in at most three sentences. Speak in your own voice; do not prefix your name.");
    s
}

pub fn user_prompt(p: &TurnPrompt<'_>) -> String {
    let mut s = format!("Goal: {}\nTurn {}.", p.goal, p.turn);

    if p.context.is_empty() {
        s.push_str("\nNobody nearby has spoken yet.");
    } else {
        s.push_str("\nRecent messages near you:");
        for line in p.context {
            s.push_str(&format!("\n- {}: {}", line.speaker, line.text));
        }
    }

    match p.target {
        Some(peer) if p.cluster_size > 1 => {
            s.push_str(&format!("\nAddress {} directly.", peer.name));
        }
        _ => s.push_str("\nYou are on your own for now; think out loud."),
    }

    s.push('\n');
    s.push_str(p.chosen_move.instruction());
    s.push('\n');
    s.push_str(VOTE_INSTRUCTION);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::Persona;
    use crate::core::traits::Viewpoint;

    fn agent(id: &str, viewpoint: Option<&str>) -> Agent {
        Agent {
            id: id.to_string(),
            name: format!("Agent {}", id),
            color: "#000000".to_string(),
            persona: Persona {
                stance: "skeptic".to_string(),
                temperature_offset: -0.1,
                style: "Questions assumptions.".to_string(),
            },
            viewpoint: viewpoint.and_then(Viewpoint::parse),
        }
    }

    #[test]
    fn system_prompt_carries_persona_and_viewpoint() {
        let a = agent("A", Some("Green Left - climate first | rigor=data, snark=high"));
        let s = system_prompt(&a, &a.traits());
        assert!(s.contains("Agent A"));
        assert!(s.contains("skeptic"));
        assert!(s.contains("Green Left: climate first"));
        assert!(s.contains("evidence and numbers"));
        assert!(s.contains("sarcastic"));
    }

    #[test]
    fn neutral_traits_drop_viewpoint_tone() {
        let a = agent("A", Some("Green Left - climate first | rigor=data, snark=high"));
        let s = system_prompt(&a, &TraitSet::default());
        assert!(s.contains("Green Left: climate first"));
        assert!(!s.contains("evidence and numbers"));
        assert!(!s.contains("sarcastic"));
    }

    #[test]
    fn user_prompt_names_target_and_move() {
        let peer = agent("B", None);
        let context = vec![ContextLine {
            speaker: "Agent B".into(),
            text: "We need more data.".into(),
        }];
        let p = TurnPrompt {
            goal: "Pick a lunch spot",
            turn: 3,
            chosen_move: Move::Datum,
            target: Some(&peer),
            context: &context,
            cluster_size: 2,
        };
        let s = user_prompt(&p);
        assert!(s.contains("Goal: Pick a lunch spot"));
        assert!(s.contains("- Agent B: We need more data."));
        assert!(s.contains("Address Agent B directly."));
        assert!(s.contains(Move::Datum.instruction()));
        assert!(s.contains("<META stance="));
    }

    #[test]
    fn lone_speaker_gets_no_target() {
        let p = TurnPrompt {
            goal: "g",
            turn: 1,
            chosen_move: Move::Ask,
            target: None,
            context: &[],
            cluster_size: 1,
        };
        let s = user_prompt(&p);
        assert!(s.contains("Nobody nearby has spoken yet."));
        assert!(!s.contains("Address"));
    }

    #[test]
    fn default_traits_give_baseline_tone() {
        let tone = tone_guidance(&TraitSet::default());
        assert_eq!(tone.len(), 2);
    }
}
