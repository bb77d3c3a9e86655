//! Game engine for the tetrion training stack.
//!
//! This crate owns the authoritative game state and the placement primitives
//! the decision layers build on:
//!
//! - [`BitBoard`] - bit-row playing field with sentinel borders
//! - [`PieceKind`] / [`PieceRotation`] / [`Placement`] - piece identity and
//!   the `(rotation, column)` placement addressing
//! - [`Piece`] - a positioned piece with spawn and gravity-drop resolution
//! - [`PieceQueue`] - 7-bag piece generation with seedable randomness
//! - [`GameField`] - board + current piece lifecycle with top-out detection
//!
//! Decision layers never mutate the live board directly: they clone it,
//! simulate on the copy, and commit a chosen [`Placement`] through
//! [`GameField::commit`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// The current piece cannot be spawned at the requested placement because the
/// stack already occupies its spawn cells. Committing such a placement ends
/// the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece cannot spawn at the requested placement (top out)")]
pub struct TopOutError;
