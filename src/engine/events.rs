//! Structured events emitted by a run.
//!
//! Serialized with a `type` tag so each event is one self-describing JSON
//! object; framing and transport are up to the consumer.

use crate::consensus::tally::ConsensusEntry;
use crate::core::agent::AgentId;
use crate::core::config::SimConfig;
use crate::engine::moves::Move;
use crate::swarm::vector::Vec2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Start {
        goal: String,
        config: SimConfig,
    },
    PositionSnapshot {
        turn: u32,
        tick: u32,
        positions: BTreeMap<AgentId, Vec2>,
    },
    AgentJoined {
        id: AgentId,
        name: String,
        color: String,
    },
    AgentLeft {
        id: AgentId,
    },
    AgentMessage {
        turn: u32,
        agent_id: AgentId,
        name: String,
        color: String,
        text: String,
        position: Vec2,
        active_ids: Vec<AgentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        viewpoint_label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stance: Option<i8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proposal: Option<String>,
        #[serde(rename = "move")]
        chosen_move: Move,
    },
    Telemetry {
        turn: u32,
        active_count: usize,
        cluster_sizes: Vec<usize>,
        mean_cluster_size: f64,
        consensus: Vec<ConsensusEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mean_similarity: Option<f64>,
    },
    Converged {
        turn: u32,
        mean_similarity: f64,
    },
    Completed {},
    Failed {
        message: String,
    },
}

impl SimEvent {
    /// Wire name of the variant, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::Start { .. } => "start",
            SimEvent::PositionSnapshot { .. } => "position_snapshot",
            SimEvent::AgentJoined { .. } => "agent_joined",
            SimEvent::AgentLeft { .. } => "agent_left",
            SimEvent::AgentMessage { .. } => "agent_message",
            SimEvent::Telemetry { .. } => "telemetry",
            SimEvent::Converged { .. } => "converged",
            SimEvent::Completed {} => "completed",
            SimEvent::Failed { .. } => "failed",
        }
    }

    /// True for the events that close a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimEvent::Completed {} | SimEvent::Failed { .. })
    }
}

/// One line of the shared discussion record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: AgentId,
    pub text: String,
    pub turn: u32,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_serializes_with_type_tag() {
        let ev = SimEvent::AgentMessage {
            turn: 2,
            agent_id: "A".into(),
            name: "Agent A".into(),
            color: "#3b82f6".into(),
            text: "Hello".into(),
            position: Vec2::new(0.5, -0.25),
            active_ids: vec!["A".into(), "B".into()],
            viewpoint_label: None,
            stance: Some(1),
            proposal: Some("Go nuclear".into()),
            chosen_move: Move::Decide,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "agent_message");
        assert_eq!(v["move"], "decide");
        assert_eq!(v["position"], json!({"x": 0.5, "y": -0.25}));
        assert!(v.get("viewpoint_label").is_none());
        assert_eq!(ev.kind(), "agent_message");
    }

    #[test]
    fn completed_is_an_empty_object() {
        let v = serde_json::to_value(SimEvent::Completed {}).unwrap();
        assert_eq!(v, json!({"type": "completed"}));
        assert!(SimEvent::Completed {}.is_terminal());
        assert!(!SimEvent::AgentLeft { id: "A".into() }.is_terminal());
    }

    #[test]
    fn events_parse_back() {
        let raw = r#"{"type":"telemetry","turn":1,"active_count":3,"cluster_sizes":[2,1],
                      "mean_cluster_size":1.5,"consensus":[]}"#;
        let ev: SimEvent = serde_json::from_str(raw).unwrap();
        match ev {
            SimEvent::Telemetry { active_count, mean_similarity, .. } => {
                assert_eq!(active_count, 3);
                assert_eq!(mean_similarity, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
