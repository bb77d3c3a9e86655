use tetrion_analysis::FieldAnalysis;
use tetrion_engine::{BitBoard, LineGroup, LineGroups, Piece, PieceKind, Placement};

/// Speculative result of committing one placement of the current piece.
///
/// The simulation runs entirely on a clone of the live board; the
/// authoritative field is never touched. A placement whose spawn cells are
/// already occupied is *unreachable* (committing it would end the game) and
/// stays a first-class outcome: it still gets encoded and scored.
#[derive(Debug)]
pub struct PlacementOutcome {
    kind: PieceKind,
    placement: Placement,
    drop: SimulatedDrop,
}

#[derive(Debug)]
enum SimulatedDrop {
    Reached {
        line_groups: LineGroups,
        analysis: FieldAnalysis,
    },
    Unreachable,
}

impl PlacementOutcome {
    /// Simulates dropping `kind` at `placement` on a disposable copy of
    /// `board`.
    #[must_use]
    pub fn simulate(board: &BitBoard, kind: PieceKind, placement: Placement) -> Self {
        let piece = Piece::spawn(kind, placement);
        if board.is_colliding(piece) {
            return Self {
                kind,
                placement,
                drop: SimulatedDrop::Unreachable,
            };
        }

        let rested = piece.rested(board);
        let mut resulting = board.clone();
        resulting.fill_piece(rested);
        let line_groups = resulting.clear_line_groups();

        Self {
            kind,
            placement,
            drop: SimulatedDrop::Reached {
                line_groups,
                analysis: FieldAnalysis::from_board(&resulting),
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// `false` means the spawn collided: choosing this placement tops out.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        matches!(self.drop, SimulatedDrop::Reached { .. })
    }

    /// Groups of rows this placement would clear (empty if unreachable).
    #[must_use]
    pub fn line_groups(&self) -> &[LineGroup] {
        match &self.drop {
            SimulatedDrop::Reached { line_groups, .. } => line_groups,
            SimulatedDrop::Unreachable => &[],
        }
    }

    /// Total rows cleared across all groups.
    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.line_groups().iter().map(LineGroup::size).sum()
    }

    /// Analysis of the post-clear board, `None` if unreachable.
    #[must_use]
    pub fn analysis(&self) -> Option<&FieldAnalysis> {
        match &self.drop {
            SimulatedDrop::Reached { analysis, .. } => Some(analysis),
            SimulatedDrop::Unreachable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrion_engine::PieceRotation;

    #[test]
    fn simulation_leaves_the_source_board_untouched() {
        let board = BitBoard::INITIAL;
        let before = board.clone();

        for placement in PieceKind::T.legal_placements() {
            let _ = PlacementOutcome::simulate(&board, PieceKind::T, placement);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn reachable_outcome_reflects_the_dropped_piece() {
        let board = BitBoard::INITIAL;
        let placement = Placement::new(PieceRotation::new(0), 0);
        let outcome = PlacementOutcome::simulate(&board, PieceKind::O, placement);

        assert!(outcome.is_reachable());
        assert!(outcome.line_groups().is_empty());
        let analysis = outcome.analysis().unwrap();
        // O occupies the two leftmost columns, two cells high, on the floor.
        assert_eq!(analysis.column_heights()[0], 1);
        assert_eq!(analysis.column_heights()[1], 1);
        assert_eq!(analysis.column_occupied_cells()[0], 2);
        assert_eq!(analysis.total_holes(), 0);
    }

    #[test]
    fn line_clear_is_detected_on_the_copy() {
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
            ..........
            ..........
            ..........
            ..........
            ....######
            ",
        );
        let placement = Placement::new(PieceRotation::new(0), 0);
        let outcome = PlacementOutcome::simulate(&board, PieceKind::I, placement);

        assert!(outcome.is_reachable());
        assert_eq!(outcome.cleared_lines(), 1);
        assert_eq!(outcome.line_groups().len(), 1);
        // After the clear the simulated board is empty again.
        assert_eq!(outcome.analysis().unwrap().height_sum(), 0);
    }

    #[test]
    fn blocked_spawn_is_unreachable() {
        // Column 0 is stacked to the top, so any placement overlapping it
        // cannot spawn.
        let mut art = String::new();
        for _ in 0..BitBoard::PLAYABLE_HEIGHT {
            art.push_str("#.........\n");
        }
        let board = BitBoard::from_ascii(&art);

        let placement = Placement::new(PieceRotation::new(1), 0);
        let outcome = PlacementOutcome::simulate(&board, PieceKind::I, placement);

        assert!(!outcome.is_reachable());
        assert!(outcome.line_groups().is_empty());
        assert_eq!(outcome.cleared_lines(), 0);
        assert!(outcome.analysis().is_none());
    }
}
