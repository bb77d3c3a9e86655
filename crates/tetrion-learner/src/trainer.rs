use std::{fmt, mem};

use candle_core::Tensor;
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use chrono::Utc;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use serde::Serialize;

use tetrion_agent::{CandidateSet, FeatureEncoder, RewardFunction};
use tetrion_engine::GameField;

use crate::{
    CheckpointMeta, Checkpointer, DescriptiveStats, EpsilonSchedule, LearnerError, ReplayBuffer,
    Transition, ValueNetwork,
};

/// Hyperparameters of one training run.
///
/// The defaults are the canonical configuration: 3000 episodes, 30k replay
/// capacity pre-filled to 1%, batches of 512 once per episode boundary,
/// discount 0.99, Adam-style learning rate 1e-3, and epsilon decaying from
/// 1.0 to 1e-3 over 2000 episodes.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Episode budget of the run.
    pub episodes: usize,
    /// Replay buffer capacity.
    pub replay_capacity: usize,
    /// Transitions collected under the random policy before episodes count.
    pub prefill_len: usize,
    /// Batch size of the per-episode gradient update.
    pub batch_size: usize,
    /// TD discount factor.
    pub discount: f32,
    /// Optimizer learning rate.
    pub learning_rate: f64,
    /// Exploration schedule.
    pub epsilon: EpsilonSchedule,
    /// Episodes between aggregated statistics log lines.
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        const REPLAY_CAPACITY: usize = 30_000;
        Self {
            episodes: 3000,
            replay_capacity: REPLAY_CAPACITY,
            prefill_len: REPLAY_CAPACITY / 100,
            batch_size: 512,
            discount: 0.99,
            learning_rate: 1e-3,
            epsilon: EpsilonSchedule::default(),
            log_interval: 50,
        }
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub episodes: usize,
    pub steps: usize,
    pub final_epsilon: f64,
    pub mean_pieces_recent: f32,
    pub mean_lines_recent: f32,
}

/// Index of the candidate the network currently scores highest (first wins
/// ties).
pub fn greedy_index(
    network: &ValueNetwork,
    candidates: &CandidateSet,
) -> Result<usize, LearnerError> {
    let rows: Vec<&[f32]> = candidates.feature_rows().collect();
    let values = network.values(&rows)?;
    let best = values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);
    Ok(best)
}

/// The afterstate value learner's training loop.
///
/// A state machine over episodes: first a **pre-fill** phase appends
/// transitions from a fully random policy until the replay buffer holds
/// `prefill_len` entries (these episodes do not count and trigger no
/// updates), then the **training** phase selects actions epsilon-greedily
/// and performs one sampled batch update per episode boundary.
///
/// The TD target is `reward` for terminal transitions and
/// `reward + discount * V(next)` otherwise, with `V(next)` evaluated
/// detached on the same live network being updated. There is no lagged
/// target network; training dynamics match the original, including its
/// documented instability.
pub struct Trainer {
    config: TrainerConfig,
    encoder: Box<dyn FeatureEncoder>,
    reward: Box<dyn RewardFunction>,
    network: ValueNetwork,
    optimizer: AdamW,
    replay: ReplayBuffer,
    checkpointer: Checkpointer,
    rng: StdRng,
    episode: usize,
    steps: usize,
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("encoder", &self.encoder)
            .field("reward", &self.reward)
            .field("episode", &self.episode)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl Trainer {
    /// Builds a trainer with a freshly initialized network sized to the
    /// encoder.
    pub fn new(
        config: TrainerConfig,
        encoder: Box<dyn FeatureEncoder>,
        reward: Box<dyn RewardFunction>,
        checkpointer: Checkpointer,
        seed: Option<u64>,
    ) -> Result<Self, LearnerError> {
        let network = ValueNetwork::new(encoder.feature_len())?;
        Self::with_network(config, encoder, reward, network, checkpointer, seed)
    }

    /// Builds a trainer around an existing network.
    ///
    /// The encoder's output shape must match the network's declared input;
    /// a mismatch is fatal here, before any training happens.
    pub fn with_network(
        config: TrainerConfig,
        encoder: Box<dyn FeatureEncoder>,
        reward: Box<dyn RewardFunction>,
        network: ValueNetwork,
        checkpointer: Checkpointer,
        seed: Option<u64>,
    ) -> Result<Self, LearnerError> {
        if encoder.feature_len() != network.input_len() {
            return Err(LearnerError::FeatureShapeMismatch {
                encoder: encoder.feature_len(),
                network: network.input_len(),
            });
        }
        assert!(
            config.prefill_len <= config.replay_capacity,
            "pre-fill threshold cannot exceed the replay capacity"
        );

        let optimizer = AdamW::new(
            network.trainable_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                ..Default::default()
            },
        )?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let replay = ReplayBuffer::new(config.replay_capacity);

        Ok(Self {
            config,
            encoder,
            reward,
            network,
            optimizer,
            replay,
            checkpointer,
            rng,
            episode: 0,
            steps: 0,
        })
    }

    #[must_use]
    pub fn episode(&self) -> usize {
        self.episode
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn network(&self) -> &ValueNetwork {
        &self.network
    }

    /// Restores the `latest` checkpoint into the live network.
    ///
    /// Resuming is an explicit caller decision; construction never loads
    /// parameters implicitly, and a missing checkpoint surfaces as an error
    /// instead of a silent fresh start.
    pub fn resume_latest(&mut self) -> Result<CheckpointMeta, LearnerError> {
        self.checkpointer.load_latest(&mut self.network)
    }

    /// Epsilon-greedy choice over the enumerated candidates.
    fn select_index(
        &mut self,
        candidates: &CandidateSet,
        epsilon: f64,
    ) -> Result<usize, LearnerError> {
        if self.rng.random::<f64>() <= epsilon {
            return Ok(self.rng.random_range(0..candidates.len()));
        }
        greedy_index(&self.network, candidates)
    }

    /// Runs the configured episode budget and writes the final `latest`
    /// checkpoint.
    pub fn train(&mut self) -> Result<TrainingReport, LearnerError> {
        let mut field = GameField::new();
        let mut features = self
            .encoder
            .encode_field(field.board(), field.current_piece());

        let mut prefill_episodes = 0usize;
        let mut episode_pieces = 0usize;
        let mut episode_lines = 0usize;
        let mut history: Vec<(usize, usize)> = Vec::with_capacity(self.config.episodes);

        while self.episode < self.config.episodes {
            let epsilon = self.config.epsilon.value(self.episode);
            let candidates = CandidateSet::enumerate(
                field.board(),
                field.current_piece(),
                self.encoder.as_ref(),
            );
            let prefilling = self.replay.len() < self.config.prefill_len;
            let index = if prefilling {
                self.rng.random_range(0..candidates.len())
            } else {
                self.select_index(&candidates, epsilon)?
            };
            let candidate = &candidates.candidates()[index];

            let reward = self.reward.reward(&candidate.outcome);
            let next_features = candidate.features.clone();
            let cleared_lines = candidate.outcome.cleared_lines();

            let committed = field.commit(candidate.placement);
            let terminal = field.is_game_over();
            debug_assert_eq!(committed.is_ok(), candidate.outcome.is_reachable());

            if !terminal {
                episode_pieces += 1;
                episode_lines += cleared_lines;
            }

            self.replay.push(Transition {
                features: mem::take(&mut features),
                reward,
                next_features: next_features.clone(),
                terminal,
            });
            self.steps += 1;

            if terminal {
                field = GameField::new();
                features = self
                    .encoder
                    .encode_field(field.board(), field.current_piece());
                let pieces = mem::take(&mut episode_pieces);
                let lines = mem::take(&mut episode_lines);

                if self.replay.len() < self.config.prefill_len {
                    prefill_episodes += 1;
                    eprintln!(
                        "[replay] pre-filled by {prefill_episodes} episodes: length now {}",
                        self.replay.len()
                    );
                    continue;
                }

                self.episode += 1;
                let loss = self.train_step()?;
                history.push((pieces, lines));

                eprintln!(
                    "Episode {}/{} | pieces {pieces} @ lines {lines} | eps {epsilon:.3} loss {loss:.5}",
                    self.episode, self.config.episodes
                );
                if self.episode % self.config.log_interval == 0 {
                    self.log_window_stats(&history);
                }

                self.checkpointer.save_progress(self.episode, &self.network)?;
            } else {
                features = next_features;
            }
        }

        let meta = CheckpointMeta {
            name: format!("td-{}", self.encoder.name()),
            trained_at: Utc::now(),
            episodes: self.episode,
            encoder: self.encoder.name().to_owned(),
            feature_len: self.encoder.feature_len(),
        };
        self.checkpointer.save_latest(&self.network, &meta)?;

        Ok(self.report(&history))
    }

    /// One sampled batch update toward the TD targets.
    fn train_step(&mut self) -> Result<f32, LearnerError> {
        let batch = self.replay.sample(self.config.batch_size, &mut self.rng);
        let batch_len = batch.len();

        let rows: Vec<&[f32]> = batch.iter().map(|t| t.features.as_slice()).collect();
        let next_rows: Vec<&[f32]> = batch.iter().map(|t| t.next_features.as_slice()).collect();
        let rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
        let continues: Vec<f32> = batch
            .iter()
            .map(|t| if t.terminal { 0.0 } else { 1.0 })
            .collect();

        let current_t = self.network.batch_tensor(&rows)?;
        let next_t = self.network.batch_tensor(&next_rows)?;
        let reward_t = Tensor::from_vec(rewards, batch_len, self.network.device())?;
        let continue_t = Tensor::from_vec(continues, batch_len, self.network.device())?;

        // Bootstrap from the live network, detached; terminal transitions
        // keep the bare reward as their target.
        let next_values = self.network.forward(&next_t)?.squeeze(1)?.detach();
        let discounted = (next_values * continue_t)?.affine(f64::from(self.config.discount), 0.0)?;
        let targets = (&reward_t + discounted)?;

        let predictions = self.network.forward(&current_t)?.squeeze(1)?;
        let loss = (&predictions - &targets)?.sqr()?.mean_all()?;

        let grads = loss.backward()?;
        self.optimizer.step(&grads)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    #[expect(clippy::cast_precision_loss)]
    fn log_window_stats(&self, history: &[(usize, usize)]) {
        let window = &history[history.len().saturating_sub(self.config.log_interval)..];
        let pieces = DescriptiveStats::compute(window.iter().map(|(p, _)| *p as f32));
        let lines = DescriptiveStats::compute(window.iter().map(|(_, l)| *l as f32));
        if let (Some(pieces), Some(lines)) = (pieces, lines) {
            eprintln!(
                "  last {} episodes: pieces min {:.0} max {:.0} mean {:.1} | lines min {:.0} max {:.0} mean {:.1}",
                window.len(),
                pieces.min,
                pieces.max,
                pieces.mean,
                lines.min,
                lines.max,
                lines.mean,
            );
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn report(&self, history: &[(usize, usize)]) -> TrainingReport {
        let window = &history[history.len().saturating_sub(100)..];
        let pieces = DescriptiveStats::compute(window.iter().map(|(p, _)| *p as f32));
        let lines = DescriptiveStats::compute(window.iter().map(|(_, l)| *l as f32));
        TrainingReport {
            episodes: self.episode,
            steps: self.steps,
            final_epsilon: self.config.epsilon.value(self.episode),
            mean_pieces_recent: pieces.map_or(0.0, |s| s.mean),
            mean_lines_recent: lines.map_or(0.0, |s| s.mean),
        }
    }
}
