//! Decision layer for the tetrion training stack.
//!
//! Given the live game field, this crate enumerates every legal final
//! placement of the current piece, simulates each one on a disposable board
//! copy, and reduces the results to the representations the learner consumes:
//!
//! - [`PlacementOutcome`] - non-destructive simulation of one placement
//! - [`CandidateSet`] - the full candidate enumeration with encoded features
//! - [`FeatureEncoder`] strategies ([`CompactEncoder`], [`PerColumnEncoder`])
//! - [`RewardFunction`] strategies ([`LineClearReward`], [`HeuristicReward`])
//! - [`HeuristicAgent`] - the fixed-weight baseline player
//!
//! Simulation never mutates the live field: enumerating candidates any number
//! of times leaves the engine state untouched.

pub use self::{
    candidate_set::*, feature_encoder::*, heuristic_agent::*, placement_outcome::*, reward::*,
};

mod candidate_set;
mod feature_encoder;
mod heuristic_agent;
mod placement_outcome;
mod reward;
