use tetrion_engine::{BitBoard, PieceKind, Placement};

use crate::{
    feature_encoder::{FeatureEncoder, FeatureVector},
    placement_outcome::PlacementOutcome,
};

/// One enumerated candidate: a legal placement, its simulated outcome, and
/// the outcome's encoding.
#[derive(Debug)]
pub struct Candidate {
    pub placement: Placement,
    pub features: FeatureVector,
    pub outcome: PlacementOutcome,
}

/// The complete action set for one decision step.
///
/// Enumeration covers every `(rotation, column)` pair in the legal range of
/// the current piece, in rotation-major order; the candidate count is always
/// the sum of the legal column range sizes over the piece's distinct
/// rotations. Placements whose spawn is blocked appear as unreachable
/// sentinel candidates rather than being omitted; an enumeration with fewer
/// entries than the legal action count would be a contract violation.
///
/// Enumeration only reads the board and simulates on copies: running it any
/// number of times never changes what the engine does afterwards.
#[derive(Debug)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Enumerates and encodes every legal placement of `kind` on `board`.
    #[must_use]
    pub fn enumerate(board: &BitBoard, kind: PieceKind, encoder: &dyn FeatureEncoder) -> Self {
        let candidates = kind
            .legal_placements()
            .map(|placement| {
                let outcome = PlacementOutcome::simulate(board, kind, placement);
                let features = encoder.encode(&outcome);
                Candidate {
                    placement,
                    features,
                    outcome,
                }
            })
            .collect();
        Self { candidates }
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Feature vectors of all candidates, in enumeration order.
    pub fn feature_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.candidates.iter().map(|c| c.features.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_encoder::CompactEncoder;

    #[test]
    fn enumeration_covers_the_whole_legal_action_space() {
        let board = BitBoard::INITIAL;
        let encoder = CompactEncoder::new(true);

        for kind in PieceKind::ALL {
            let set = CandidateSet::enumerate(&board, kind, &encoder);
            assert_eq!(set.len(), kind.legal_placement_count(), "{kind:?}");
        }
    }

    #[test]
    fn enumeration_is_idempotent() {
        let board = BitBoard::from_ascii(
            "
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ...#......
            ..##......
            .###....#.
            ####...##.
            ####..###.
            ",
        );
        let encoder = CompactEncoder::new(true);
        let before = board.clone();

        let first = CandidateSet::enumerate(&board, PieceKind::L, &encoder);
        let second = CandidateSet::enumerate(&board, PieceKind::L, &encoder);

        assert_eq!(board, before);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.candidates().iter().zip(second.candidates()) {
            assert_eq!(a.placement, b.placement);
            assert_eq!(a.features, b.features);
        }
    }

    #[test]
    fn blocked_placements_are_kept_as_unreachable_sentinels() {
        // Columns 0-1 stacked to the ceiling: every placement overlapping
        // them is unreachable, yet the enumeration stays complete.
        let mut art = String::new();
        for _ in 0..BitBoard::PLAYABLE_HEIGHT {
            art.push_str("##........\n");
        }
        let board = BitBoard::from_ascii(&art);
        let encoder = CompactEncoder::new(false);

        let set = CandidateSet::enumerate(&board, PieceKind::O, &encoder);
        assert_eq!(set.len(), PieceKind::O.legal_placement_count());

        let unreachable: Vec<_> = set
            .candidates()
            .iter()
            .filter(|c| !c.outcome.is_reachable())
            .collect();
        // O at columns 0 and 1 overlaps the stack.
        assert_eq!(unreachable.len(), 2);
        for candidate in unreachable {
            assert_eq!(candidate.features, encoder.game_over_features());
        }
    }

    #[test]
    fn feature_rows_align_with_candidates() {
        let board = BitBoard::INITIAL;
        let encoder = CompactEncoder::new(false);
        let set = CandidateSet::enumerate(&board, PieceKind::S, &encoder);

        assert_eq!(set.feature_rows().count(), set.len());
        for (row, candidate) in set.feature_rows().zip(set.candidates()) {
            assert_eq!(row, candidate.features.as_slice());
        }
    }
}
