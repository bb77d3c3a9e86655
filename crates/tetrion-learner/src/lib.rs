//! Afterstate value learning for the tetrion training stack.
//!
//! The learner estimates the value of feature-encoded afterstates with a
//! small fully connected network and improves the estimate online via
//! temporal-difference targets sampled from a bounded replay history:
//!
//! - [`Transition`] / [`ReplayBuffer`] - bounded FIFO experience store
//! - [`EpsilonSchedule`] - linearly decaying exploration rate
//! - [`ValueNetwork`] - the MLP approximator (candle, CPU)
//! - [`Trainer`] - the pre-fill / training state machine
//! - [`Checkpointer`] / [`CheckpointMeta`] - episode-keyed parameter
//!   snapshots plus a `latest` slot
//!
//! The TD target bootstraps from the *live* network (no lagged target
//! network), evaluated without gradient tracking; this matches the original
//! training dynamics, oscillations included.

pub use self::{
    checkpoint::*, network::*, replay::*, schedule::*, stats::*, trainer::*,
};

mod checkpoint;
mod network;
mod replay;
mod schedule;
mod stats;
mod trainer;

/// Errors surfaced by the learner.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LearnerError {
    /// The encoder's output size does not match the value network's declared
    /// input size. Raised at construction or resume time, never mid-training.
    #[display("feature encoder produces {encoder} values but the value network expects {network}")]
    #[from(ignore)]
    FeatureShapeMismatch { encoder: usize, network: usize },
    /// Tensor or optimizer failure from the network backend.
    #[display("value network error: {_0}")]
    Network(candle_core::Error),
    /// Checkpoint file I/O failure (including a missing `latest` slot).
    #[display("checkpoint io error: {_0}")]
    Io(std::io::Error),
    /// Corrupt or unreadable checkpoint metadata.
    #[display("checkpoint metadata error: {_0}")]
    Metadata(serde_json::Error),
}
