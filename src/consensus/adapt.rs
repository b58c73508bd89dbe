//! Agreement-driven drift of per-agent weights.
//!
//! Speakers who backed the cluster's leading proposal flock tighter and cool
//! down; speakers who voted against it spread out and heat up. Everyone else
//! relaxes slowly toward the global defaults.

use crate::consensus::tally::Leader;
use crate::consensus::vote::{normalize_proposal, Vote};
use crate::core::agent::AgentId;
use crate::core::config::SimConfig;
use crate::core::traits::WeightProfile;
use crate::swarm::field::FlockField;
use tracing::debug;

/// Fraction of the gap to the defaults closed per neutral update.
pub const NEUTRAL_DECAY: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Agreement {
    Agree,
    Disagree,
    Neutral,
}

/// Compares one vote against the cluster's leading proposal.
pub fn classify(vote: &Vote, leader: Option<&Leader>) -> Agreement {
    let Some(leader) = leader else {
        return Agreement::Neutral;
    };
    if !vote.has_proposal() || normalize_proposal(&vote.proposal) != leader.key {
        return Agreement::Neutral;
    }
    match vote.stance {
        s if s > 0 => Agreement::Agree,
        s if s < 0 => Agreement::Disagree,
        _ => Agreement::Neutral,
    }
}

/// `rate × kind × (0.4 + 0.6·volatility) × (1 − stubbornness)`.
pub fn step_size(rate: f64, agreement: Agreement, w: &WeightProfile) -> f64 {
    let kind = match agreement {
        Agreement::Agree | Agreement::Disagree => 1.0,
        Agreement::Neutral => 0.5,
    };
    let reach = 0.4 + 0.6 * w.volatility;
    let resist = 1.0 - w.stubbornness;
    rate * kind * reach * resist
}

/// Global coefficients that neutral agents relax toward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub align: f64,
    pub cohere: f64,
    pub separate: f64,
}

impl Baseline {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Baseline {
            align: cfg.align_w,
            cohere: cfg.cohere_w,
            separate: cfg.separate_w,
        }
    }
}

/// Applies one adaptation to `w`.
pub fn adapt(w: &mut WeightProfile, agreement: Agreement, rate: f64, baseline: &Baseline) {
    let step = step_size(rate, agreement, w);
    match agreement {
        Agreement::Agree => {
            w.align += step;
            w.cohere += step;
            w.separate -= step;
            w.wander -= 0.5 * step;
            w.temp_bias -= 0.5 * step;
        }
        Agreement::Disagree => {
            w.align -= step;
            w.cohere -= step;
            w.separate += step;
            w.wander += 0.5 * step;
            w.temp_bias += 0.5 * step;
        }
        Agreement::Neutral => {
            w.align += NEUTRAL_DECAY * (baseline.align - w.align);
            w.cohere += NEUTRAL_DECAY * (baseline.cohere - w.cohere);
            w.separate += NEUTRAL_DECAY * (baseline.separate - w.separate);
        }
    }
    *w = w.clamped();
}

/// Adapts every speaker of one cluster, in speaking order.
pub fn adapt_cluster(
    field: &mut FlockField,
    spoken: &[(AgentId, Vote)],
    leader: Option<&Leader>,
    rate: f64,
    baseline: &Baseline,
) {
    for (id, vote) in spoken {
        let agreement = classify(vote, leader);
        if let Some(state) = field.get_mut(id) {
            adapt(&mut state.weights, agreement, rate, baseline);
            debug!(
                "[Adapt] {} {:?} -> align {:.2} cohere {:.2} separate {:.2}",
                id, agreement, state.weights.align, state.weights.cohere, state.weights.separate
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(stubbornness: f64, volatility: f64) -> WeightProfile {
        WeightProfile {
            align: 1.0,
            cohere: 1.0,
            separate: 1.0,
            wander: 0.5,
            temp_bias: 0.0,
            stubbornness,
            volatility,
        }
    }

    fn leader(text: &str) -> Leader {
        Leader {
            key: normalize_proposal(text),
            proposal: text.to_string(),
            yes: 2,
            total: 2,
        }
    }

    fn baseline() -> Baseline {
        Baseline {
            align: 0.8,
            cohere: 0.6,
            separate: 1.2,
        }
    }

    #[test]
    fn classification() {
        let l = leader("Go nuclear");
        assert_eq!(classify(&Vote::new(1, "go  NUCLEAR"), Some(&l)), Agreement::Agree);
        assert_eq!(classify(&Vote::new(-1, "Go nuclear"), Some(&l)), Agreement::Disagree);
        assert_eq!(classify(&Vote::new(0, "Go nuclear"), Some(&l)), Agreement::Neutral);
        assert_eq!(classify(&Vote::new(1, "Solar"), Some(&l)), Agreement::Neutral);
        assert_eq!(classify(&Vote::new(1, "Go nuclear"), None), Agreement::Neutral);
    }

    #[test]
    fn full_stubbornness_freezes_weights() {
        for agreement in [Agreement::Agree, Agreement::Disagree] {
            let mut w = profile(1.0, 1.0);
            let before = w;
            assert_eq!(step_size(0.5, agreement, &w), 0.0);
            adapt(&mut w, agreement, 0.5, &baseline());
            assert_eq!(w, before);
        }
    }

    #[test]
    fn agreement_tightens_disagreement_loosens() {
        let mut agree = profile(0.0, 0.5);
        adapt(&mut agree, Agreement::Agree, 0.2, &baseline());
        assert!(agree.align > 1.0 && agree.cohere > 1.0);
        assert!(agree.separate < 1.0 && agree.wander < 0.5 && agree.temp_bias < 0.0);

        let mut disagree = profile(0.0, 0.5);
        adapt(&mut disagree, Agreement::Disagree, 0.2, &baseline());
        assert!(disagree.align < 1.0 && disagree.cohere < 1.0);
        assert!(disagree.separate > 1.0 && disagree.wander > 0.5 && disagree.temp_bias > 0.0);
    }

    #[test]
    fn step_scales_with_volatility_and_kind() {
        let calm = profile(0.0, 0.0);
        let wild = profile(0.0, 1.0);
        assert!((step_size(0.1, Agreement::Agree, &calm) - 0.04).abs() < 1e-12);
        assert!((step_size(0.1, Agreement::Agree, &wild) - 0.1).abs() < 1e-12);
        assert!((step_size(0.1, Agreement::Neutral, &wild) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn neutral_relaxes_toward_baseline() {
        let mut w = profile(0.0, 0.5);
        adapt(&mut w, Agreement::Neutral, 0.2, &baseline());
        assert!((w.align - (1.0 + 0.05 * (0.8 - 1.0))).abs() < 1e-12);
        assert!(w.separate > 1.0 && w.separate < 1.2);
        assert_eq!(w.wander, 0.5);
    }

    #[test]
    fn weights_stay_clamped() {
        let mut w = profile(0.0, 1.0);
        for _ in 0..200 {
            adapt(&mut w, Agreement::Disagree, 1.0, &baseline());
        }
        assert_eq!(w.align, 0.0);
        assert_eq!(w.separate, 3.0);
        assert_eq!(w.wander, 1.5);
        assert_eq!(w.temp_bias, 0.4);
    }
}
