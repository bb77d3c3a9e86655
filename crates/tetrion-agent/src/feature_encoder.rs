use std::fmt;

use tetrion_analysis::FieldAnalysis;
use tetrion_engine::{BitBoard, PieceKind};

use crate::placement_outcome::PlacementOutcome;

/// Fixed-size numeric representation of an afterstate, fed to the value
/// network.
pub type FeatureVector = Vec<f32>;

const HEIGHT: usize = BitBoard::PLAYABLE_HEIGHT;
const WIDTH: usize = BitBoard::PLAYABLE_WIDTH;

/// Strategy turning simulated outcomes into feature vectors.
///
/// Exactly one encoder is chosen per training run; its shape must match the
/// value network's declared input size, which is checked when the learner is
/// constructed.
///
/// Every encoder reserves the all-zero vector as the fixed game-over
/// encoding, so terminal afterstates are represented explicitly instead of
/// being dropped from the candidate set.
pub trait FeatureEncoder: fmt::Debug {
    /// Short identifier recorded in checkpoint metadata.
    fn name(&self) -> &'static str;

    /// Number of entries in every produced vector.
    fn feature_len(&self) -> usize;

    /// Number of representable values per entry, implied by the board
    /// dimensions: entry `i` takes integer values in `[0, cardinalities()[i])`.
    fn cardinalities(&self) -> Vec<u32>;

    /// Encodes a simulated outcome; unreachable outcomes map to the fixed
    /// game-over encoding.
    fn encode(&self, outcome: &PlacementOutcome) -> FeatureVector;

    /// Encodes a bare field with no pending placement (the episode-reset
    /// observation): zero cleared lines, the given piece as identity.
    fn encode_field(&self, board: &BitBoard, kind: PieceKind) -> FeatureVector;

    /// The fixed encoding of the game-over outcome.
    fn game_over_features(&self) -> FeatureVector {
        vec![0.0; self.feature_len()]
    }
}

/// Compact 3-scalar field summary: total height, total absolute elevation,
/// total holes, followed by the cleared-line count and optionally the piece
/// id.
#[derive(Debug, Clone)]
pub struct CompactEncoder {
    include_piece: bool,
}

impl CompactEncoder {
    #[must_use]
    pub fn new(include_piece: bool) -> Self {
        Self { include_piece }
    }

    #[expect(clippy::cast_precision_loss)]
    fn push_field(features: &mut FeatureVector, analysis: &FieldAnalysis) {
        features.push(analysis.height_sum() as f32);
        features.push(analysis.elevation_abs_sum() as f32);
        features.push(analysis.total_holes() as f32);
    }

    #[expect(clippy::cast_precision_loss)]
    fn push_tail(&self, features: &mut FeatureVector, cleared_lines: usize, kind: PieceKind) {
        features.push(cleared_lines as f32);
        if self.include_piece {
            features.push(f32::from(kind.id()));
        }
    }
}

impl FeatureEncoder for CompactEncoder {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn feature_len(&self) -> usize {
        4 + usize::from(self.include_piece)
    }

    fn cardinalities(&self) -> Vec<u32> {
        let mut cards = vec![
            u32::try_from(HEIGHT * WIDTH + 1).unwrap(),
            u32::try_from(HEIGHT * (WIDTH - 1) + 1).unwrap(),
            u32::try_from((HEIGHT - 1) * WIDTH + 1).unwrap(),
            5,
        ];
        if self.include_piece {
            cards.push(u32::try_from(PieceKind::LEN).unwrap());
        }
        cards
    }

    fn encode(&self, outcome: &PlacementOutcome) -> FeatureVector {
        let Some(analysis) = outcome.analysis() else {
            return self.game_over_features();
        };
        let mut features = Vec::with_capacity(self.feature_len());
        Self::push_field(&mut features, analysis);
        self.push_tail(&mut features, outcome.cleared_lines(), outcome.kind());
        features
    }

    fn encode_field(&self, board: &BitBoard, kind: PieceKind) -> FeatureVector {
        let analysis = FieldAnalysis::from_board(board);
        let mut features = Vec::with_capacity(self.feature_len());
        Self::push_field(&mut features, &analysis);
        self.push_tail(&mut features, 0, kind);
        features
    }
}

/// Per-column field representation: every column height, every absolute
/// adjacent-column elevation, every column's hole count, then the
/// cleared-line count and optionally the piece id.
#[derive(Debug, Clone)]
pub struct PerColumnEncoder {
    include_piece: bool,
}

impl PerColumnEncoder {
    #[must_use]
    pub fn new(include_piece: bool) -> Self {
        Self { include_piece }
    }

    fn push_field(features: &mut FeatureVector, analysis: &FieldAnalysis) {
        for &height in analysis.column_heights() {
            features.push(f32::from(height));
        }
        for &elevation in analysis.elevations() {
            features.push(f32::from(elevation.unsigned_abs()));
        }
        for &holes in analysis.column_holes() {
            features.push(f32::from(holes));
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn push_tail(&self, features: &mut FeatureVector, cleared_lines: usize, kind: PieceKind) {
        features.push(cleared_lines as f32);
        if self.include_piece {
            features.push(f32::from(kind.id()));
        }
    }
}

impl FeatureEncoder for PerColumnEncoder {
    fn name(&self) -> &'static str {
        "per-column"
    }

    fn feature_len(&self) -> usize {
        WIDTH + (WIDTH - 1) + WIDTH + 1 + usize::from(self.include_piece)
    }

    fn cardinalities(&self) -> Vec<u32> {
        let height_card = u32::try_from(HEIGHT + 1).unwrap();
        let hole_card = u32::try_from(HEIGHT).unwrap();

        let mut cards = Vec::with_capacity(self.feature_len());
        cards.extend(std::iter::repeat_n(height_card, WIDTH));
        cards.extend(std::iter::repeat_n(height_card, WIDTH - 1));
        cards.extend(std::iter::repeat_n(hole_card, WIDTH));
        cards.push(5);
        if self.include_piece {
            cards.push(u32::try_from(PieceKind::LEN).unwrap());
        }
        cards
    }

    fn encode(&self, outcome: &PlacementOutcome) -> FeatureVector {
        let Some(analysis) = outcome.analysis() else {
            return self.game_over_features();
        };
        let mut features = Vec::with_capacity(self.feature_len());
        Self::push_field(&mut features, analysis);
        self.push_tail(&mut features, outcome.cleared_lines(), outcome.kind());
        features
    }

    fn encode_field(&self, board: &BitBoard, kind: PieceKind) -> FeatureVector {
        let analysis = FieldAnalysis::from_board(board);
        let mut features = Vec::with_capacity(self.feature_len());
        Self::push_field(&mut features, &analysis);
        self.push_tail(&mut features, 0, kind);
        features
    }
}
