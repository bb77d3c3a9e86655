//! Field feature analysis for the tetrion training stack.
//!
//! [`FieldAnalysis`] reduces an occupancy grid to the surface statistics the
//! feature encoders and reward functions consume: column heights, relative
//! heights, elevations (adjacent-column height differences), and covered
//! holes. All transforms are pure reads over a board snapshot; expensive
//! vectors are computed lazily and cached per analysis instance.

pub use self::field_analysis::*;

mod field_analysis;
