//! Game state management on top of the core data structures.
//!
//! - [`GameField`] - board + current piece lifecycle for one game
//! - [`PieceQueue`] - 7-bag piece generation
//! - [`BagSeed`] - seed for deterministic piece sequences
//!
//! A training episode drives a [`GameField`] by repeatedly committing
//! placements until [`GameField::commit`] reports a top-out.

pub use self::{game_field::*, piece_queue::*};

mod game_field;
mod piece_queue;
