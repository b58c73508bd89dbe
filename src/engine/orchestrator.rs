//! Turn orchestrator.
//!
//! Drives one simulation run: membership churn, physics ticks, clustering,
//! per-cluster conversation, consensus and adaptation. Every generation call
//! is awaited before the next prompt is built, since prompts read the growing
//! transcript. Events go out on a bounded channel; a closed channel is treated
//! as cancellation.

use crate::consensus::adapt::{adapt_cluster, Baseline};
use crate::consensus::similarity::SimilarityTracker;
use crate::consensus::tally::{leading_proposal, tally, ConsensusEntry};
use crate::consensus::vote::{parse_reply, Vote};
use crate::core::agent::{Agent, AgentId, AgentPool};
use crate::core::config::SimConfig;
use crate::core::error::{SimError, SimResult};
use crate::core::generator::{Embedder, GenerationRequest, Generator};
use crate::core::random::RandomSource;
use crate::core::traits::{speak_bias, TraitSet, WeightProfile};
use crate::engine::events::{SimEvent, TranscriptEntry};
use crate::engine::moves::choose_move;
use crate::engine::prompt::{system_prompt, user_prompt, ContextLine, TurnPrompt};
use crate::swarm::cluster::{clusters, mean_size, size_histogram};
use crate::swarm::field::{AgentState, FlockField};
use crate::swarm::speakers::select_speakers;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Physics ticks between two position snapshots.
pub const SNAPSHOT_EVERY: u32 = 6;

const MIN_ACTIVE: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum RunState {
    Idle,
    Running { turn: u32 },
    Completed,
    Aborted(String),
    Cancelled,
}

pub struct Simulation {
    cfg: SimConfig,
    pool: AgentPool,
    field: FlockField,
    transcript: Vec<TranscriptEntry>,
    rng: RandomSource,
    generator: Arc<dyn Generator>,
    embedder: Option<Arc<dyn Embedder>>,
    similarity: SimilarityTracker,
    baseline: Baseline,
    state: RunState,
}

impl Simulation {
    /// Builds a run from a configuration. The config is clamped first; the
    /// first `agentCount` agents of the pool start active.
    pub fn new(cfg: SimConfig, generator: Arc<dyn Generator>) -> Self {
        let cfg = cfg.clamped();
        let mut rng = RandomSource::new(cfg.seed);
        let pool = AgentPool::create(&cfg, &mut rng);
        let field = FlockField::new(cfg.perception, cfg.max_speed);
        let baseline = Baseline::from_config(&cfg);

        let mut sim = Simulation {
            cfg,
            pool,
            field,
            transcript: Vec::new(),
            rng,
            generator,
            embedder: None,
            similarity: SimilarityTracker::new(),
            baseline,
            state: RunState::Idle,
        };

        let initial: Vec<AgentId> = sim.pool.ids().into_iter().take(sim.cfg.agent_count).collect();
        for id in &initial {
            sim.activate(id);
        }
        sim
    }

    /// Attaches an embedder; replies are then embedded and telemetry carries
    /// the mean pairwise similarity.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn pool(&self) -> &AgentPool {
        &self.pool
    }

    pub fn field(&self) -> &FlockField {
        &self.field
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Active ids in stable order.
    pub fn active_ids(&self) -> Vec<AgentId> {
        self.field.ids()
    }

    /// Moves the run onto its own task. Dropping the returned receiver, or
    /// calling [`SimHandle::kill`], stops it.
    pub fn spawn(self, buffer: usize) -> SimHandle {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(async move {
            let mut sim = self;
            sim.run(&tx).await
        });
        SimHandle { events: rx, task }
    }

    /// Runs every turn, emitting events on `tx`.
    ///
    /// Emits `start` first and exactly one of `completed` or `failed` last,
    /// unless the consumer went away, in which case nothing more is sent and
    /// `SimError::Cancelled` is returned.
    pub async fn run(&mut self, tx: &mpsc::Sender<SimEvent>) -> SimResult<()> {
        info!(
            "🚀 [Orchestrator] Starting run: {} active, {} turns, goal: {}",
            self.field.len(),
            self.cfg.max_turns,
            self.cfg.goal
        );
        self.state = RunState::Running { turn: 0 };

        let outcome = match self
            .emit(
                tx,
                SimEvent::Start {
                    goal: self.cfg.goal.clone(),
                    config: self.cfg.clone(),
                },
            )
            .await
        {
            Ok(()) => self.run_turns(tx).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                if let Err(e) = self.emit(tx, SimEvent::Completed {}).await {
                    self.state = RunState::Cancelled;
                    return Err(e);
                }
                self.state = RunState::Completed;
                info!("🏁 [Orchestrator] Run completed ({} messages)", self.transcript.len());
                Ok(())
            }
            Err(SimError::Generation(e)) => {
                warn!("❌ [Orchestrator] Generation failed, aborting run: {}", e);
                self.state = RunState::Aborted(e.to_string());
                let _ = tx
                    .send(SimEvent::Failed {
                        message: e.to_string(),
                    })
                    .await;
                Err(SimError::Generation(e))
            }
            Err(SimError::Cancelled) => {
                info!("⏹️ [Orchestrator] Consumer went away, run cancelled");
                self.state = RunState::Cancelled;
                Err(SimError::Cancelled)
            }
        }
    }

    async fn run_turns(&mut self, tx: &mpsc::Sender<SimEvent>) -> SimResult<()> {
        for turn in 1..=self.cfg.max_turns {
            self.state = RunState::Running { turn };
            info!(
                "🔄 [Orchestrator] Turn {}/{} ({} active)",
                turn,
                self.cfg.max_turns,
                self.field.len()
            );

            self.roll_join(tx).await?;
            self.roll_leave(tx).await?;
            self.advance(turn, tx).await?;

            let mut groups = clusters(&self.field.positions(), self.cfg.talk_radius);
            self.rng.shuffle(&mut groups);

            let mut consensus = Vec::new();
            for cluster in &groups {
                if let Some(entry) = self.converse(turn, cluster, tx).await? {
                    consensus.push(entry);
                }
            }

            let mean_similarity = self
                .embedder
                .as_ref()
                .and_then(|_| self.similarity.mean_among(&self.field.ids()));

            self.emit(
                tx,
                SimEvent::Telemetry {
                    turn,
                    active_count: self.field.len(),
                    cluster_sizes: size_histogram(&groups),
                    mean_cluster_size: mean_size(&groups),
                    consensus,
                    mean_similarity,
                },
            )
            .await?;

            if let (Some(stop), Some(mean)) = (self.cfg.similarity_stop, mean_similarity) {
                if mean > stop {
                    info!(
                        "🤝 [Orchestrator] Replies converged at turn {} (mean similarity {:.3})",
                        turn, mean
                    );
                    self.emit(
                        tx,
                        SimEvent::Converged {
                            turn,
                            mean_similarity: mean,
                        },
                    )
                    .await?;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn roll_join(&mut self, tx: &mpsc::Sender<SimEvent>) -> SimResult<()> {
        if self.field.len() >= self.pool.len() || !self.rng.chance(self.cfg.join_prob) {
            return Ok(());
        }
        let inactive: Vec<AgentId> = self
            .pool
            .ids()
            .into_iter()
            .filter(|id| !self.field.contains(id))
            .collect();
        let Some(id) = self.rng.pick(&inactive).cloned() else {
            return Ok(());
        };
        self.activate(&id);

        let Some(agent) = self.pool.get(&id) else {
            return Ok(());
        };
        info!("➕ [Orchestrator] {} joined", agent.name);
        let event = SimEvent::AgentJoined {
            id: agent.id.clone(),
            name: agent.name.clone(),
            color: agent.color.clone(),
        };
        self.emit(tx, event).await
    }

    async fn roll_leave(&mut self, tx: &mpsc::Sender<SimEvent>) -> SimResult<()> {
        if self.field.len() <= MIN_ACTIVE || !self.rng.chance(self.cfg.leave_prob) {
            return Ok(());
        }
        let active = self.field.ids();
        let Some(id) = self.rng.pick(&active).cloned() else {
            return Ok(());
        };
        self.field.remove(&id);
        self.similarity.forget(&id);
        info!("➖ [Orchestrator] {} left", id);
        self.emit(tx, SimEvent::AgentLeft { id }).await
    }

    /// Runs the physics ticks of one turn.
    async fn advance(&mut self, turn: u32, tx: &mpsc::Sender<SimEvent>) -> SimResult<()> {
        let ticks = self.cfg.ticks_per_turn();
        for tick in 1..=ticks {
            self.field.step(&mut self.rng);
            if tick % SNAPSHOT_EVERY == 0 {
                let positions = self.field.positions();
                self.emit(
                    tx,
                    SimEvent::PositionSnapshot {
                        turn,
                        tick,
                        positions,
                    },
                )
                .await?;
            }
        }
        debug!("[FlockField] Turn {} advanced {} ticks", turn, ticks);
        Ok(())
    }

    /// One cluster's round of conversation, then its tally and adaptation.
    async fn converse(
        &mut self,
        turn: u32,
        cluster: &[AgentId],
        tx: &mpsc::Sender<SimEvent>,
    ) -> SimResult<Option<ConsensusEntry>> {
        let field = &self.field;
        let speakers = select_speakers(
            cluster,
            self.cfg.speak_rate,
            |id| field.get(id).map(|s| s.speak_bias).unwrap_or(0.0),
            &mut self.rng,
        );

        let mut spoken: Vec<(AgentId, Vote)> = Vec::with_capacity(speakers.len());
        for id in speakers {
            let vote = self.speak(turn, cluster, &id, tx).await?;
            spoken.push((id, vote));
        }

        let votes: Vec<Vote> = spoken.iter().map(|(_, v)| v.clone()).collect();
        let leader = leading_proposal(&votes);
        let entry = tally(&votes, cluster.len(), self.cfg.consensus_threshold);
        if let Some(e) = &entry {
            info!(
                "✅ [Consensus] Cluster of {} backs \"{}\" ({:.0}%)",
                e.cluster_size,
                e.proposal,
                e.support * 100.0
            );
        }

        if self.cfg.adapt_weights {
            adapt_cluster(
                &mut self.field,
                &spoken,
                leader.as_ref(),
                self.cfg.adapt_rate,
                &self.baseline,
            );
        }
        Ok(entry)
    }

    /// One speaker's turn: prompt, generate, parse, record, emit.
    async fn speak(
        &mut self,
        turn: u32,
        cluster: &[AgentId],
        id: &str,
        tx: &mpsc::Sender<SimEvent>,
    ) -> SimResult<Vote> {
        let Some(agent) = self.pool.get(id).cloned() else {
            return Ok(Vote::neutral());
        };
        // Nobody is listening; do not spend another generation call.
        if tx.is_closed() {
            return Err(SimError::Cancelled);
        }

        let context = self.local_context(cluster);
        let traits = self.voice_traits(&agent);
        let chosen_move = choose_move(&traits, &mut self.rng);
        let peers: Vec<&AgentId> = cluster.iter().filter(|p| p.as_str() != id).collect();
        let target = self
            .rng
            .pick(&peers)
            .and_then(|p| self.pool.get(p))
            .cloned();

        let request = GenerationRequest {
            system: system_prompt(&agent, &traits),
            user: user_prompt(&TurnPrompt {
                goal: &self.cfg.goal,
                turn,
                chosen_move,
                target: target.as_ref(),
                context: &context,
                cluster_size: cluster.len(),
            }),
            temperature: self.temperature_for(&agent),
            max_tokens: self.cfg.max_tokens,
        };

        debug!(
            "[Generator] {} speaking ({:?}, t={:.2})",
            agent.name, chosen_move, request.temperature
        );
        let raw = self.generator.generate(&request).await?;
        let reply = parse_reply(&raw);

        self.transcript.push(TranscriptEntry {
            speaker: agent.id.clone(),
            text: reply.text.clone(),
            turn,
            at: Utc::now(),
        });
        self.field.ignite(id);

        if let Some(embedder) = &self.embedder {
            match embedder.embed(&reply.text).await {
                Ok(vector) => self.similarity.record(id, vector),
                Err(e) => warn!("⚠️ [Orchestrator] Embedding for {} failed: {}", agent.name, e),
            }
        }

        let voted = reply.vote != Vote::neutral();
        let position = self.field.get(id).map(|s| s.position).unwrap_or_default();
        self.emit(
            tx,
            SimEvent::AgentMessage {
                turn,
                agent_id: agent.id.clone(),
                name: agent.name.clone(),
                color: agent.color.clone(),
                text: reply.text,
                position,
                active_ids: self.field.ids(),
                viewpoint_label: agent.viewpoint_label().map(str::to_string),
                stance: voted.then_some(reply.vote.stance),
                proposal: reply.vote.has_proposal().then(|| reply.vote.proposal.clone()),
                chosen_move,
            },
        )
        .await?;

        if self.cfg.turn_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.cfg.turn_delay_ms)).await;
        }
        Ok(reply.vote)
    }

    /// The last `maxContextMessages` transcript lines spoken by members of
    /// `cluster`, oldest first.
    fn local_context(&self, cluster: &[AgentId]) -> Vec<ContextLine> {
        let mut lines: Vec<ContextLine> = self
            .transcript
            .iter()
            .rev()
            .filter(|e| cluster.contains(&e.speaker))
            .take(self.cfg.max_context_messages)
            .map(|e| ContextLine {
                speaker: self
                    .pool
                    .get(&e.speaker)
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| e.speaker.clone()),
                text: e.text.clone(),
            })
            .collect();
        lines.reverse();
        lines
    }

    fn voice_traits(&self, agent: &Agent) -> TraitSet {
        if self.cfg.per_agent_weights {
            agent.traits()
        } else {
            TraitSet::default()
        }
    }

    /// Global temperature shifted by persona, jitter and learned bias.
    fn temperature_for(&mut self, agent: &Agent) -> f64 {
        let half = self.cfg.temp_jitter / 2.0;
        let jitter = self.rng.range(-half, half);
        let bias = self
            .field
            .get(&agent.id)
            .map(|s| s.weights.temp_bias)
            .unwrap_or(0.0);
        (self.cfg.temperature + agent.persona.temperature_offset + jitter + bias).clamp(0.0, 1.5)
    }

    /// Places a pool member into the field at a random position.
    fn activate(&mut self, id: &str) {
        let Some(agent) = self.pool.get(id) else {
            return;
        };
        let traits = agent.traits();
        let (weights, bias) = if self.cfg.per_agent_weights {
            (WeightProfile::from_traits(&traits, &self.cfg), speak_bias(&traits))
        } else {
            (WeightProfile::from_config(&self.cfg), 0.0)
        };

        let position = self.rng.point_in_domain();
        let jitter = self.cfg.speed_jitter;
        let mut state = AgentState::at(position, weights);
        state.speed_multiplier = 1.0 + self.rng.range(-jitter, jitter);
        state.speak_bias = bias;
        self.field.insert(id.to_string(), state);
    }

    async fn emit(&self, tx: &mpsc::Sender<SimEvent>, event: SimEvent) -> SimResult<()> {
        tx.send(event).await.map_err(|_| SimError::Cancelled)
    }
}

/// A run on its own task.
pub struct SimHandle {
    pub events: mpsc::Receiver<SimEvent>,
    pub task: JoinHandle<SimResult<()>>,
}

impl SimHandle {
    /// Hard-stops the run mid-flight. No further events or generation calls.
    pub fn kill(&self) {
        self.task.abort();
    }
}
