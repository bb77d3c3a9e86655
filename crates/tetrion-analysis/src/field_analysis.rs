use std::{cell::OnceCell, iter};

use tetrion_engine::BitBoard;

/// Lazily computed surface statistics of a board snapshot.
///
/// The analysis owns a clone of the board, so it stays valid regardless of
/// what happens to the live field afterwards. Each statistic is computed on
/// first access and cached.
///
/// # Height convention
///
/// Column height is `rows - 1 - topmost_occupied_index`, counted upward from
/// the floor with 0-based indexing: an empty column has height 0, and so does
/// a column whose only occupied cell sits on the floor. The maximum height is
/// therefore `rows - 1` (19 on the standard board).
#[derive(Debug)]
pub struct FieldAnalysis {
    board: BitBoard,
    column_heights: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    column_occupied_cells: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    relative_heights: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    elevations: OnceCell<[i16; BitBoard::PLAYABLE_WIDTH - 1]>,
    column_holes: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    height_max: OnceCell<u8>,
    height_min: OnceCell<u8>,
    height_sum: OnceCell<u32>,
    elevation_abs_sum: OnceCell<u32>,
    total_holes: OnceCell<u32>,
}

impl FieldAnalysis {
    #[must_use]
    pub fn from_board(board: &BitBoard) -> Self {
        Self {
            board: board.clone(),
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            relative_heights: OnceCell::new(),
            elevations: OnceCell::new(),
            column_holes: OnceCell::new(),
            height_max: OnceCell::new(),
            height_min: OnceCell::new(),
            height_sum: OnceCell::new(),
            elevation_abs_sum: OnceCell::new(),
            total_holes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    /// Absolute height of every column, left to right.
    #[must_use]
    pub fn column_heights(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut heights = [0; BitBoard::PLAYABLE_WIDTH];
            for (x, h) in iter::zip(BitBoard::PLAYABLE_X_RANGE, &mut heights) {
                let top = self
                    .board
                    .playable_rows()
                    .enumerate()
                    .find(|(_y, row)| row.is_cell_occupied(x));
                let Some((top_y, _)) = top else {
                    continue;
                };
                *h = u8::try_from(BitBoard::PLAYABLE_HEIGHT - 1 - top_y).unwrap();
            }
            heights
        })
    }

    /// Number of occupied cells per column.
    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.column_occupied_cells.get_or_init(|| {
            let mut occupied = [0; BitBoard::PLAYABLE_WIDTH];
            for (x, o) in iter::zip(BitBoard::PLAYABLE_X_RANGE, &mut occupied) {
                for row in self.board.playable_rows() {
                    if row.is_cell_occupied(x) {
                        *o += 1;
                    }
                }
            }
            occupied
        })
    }

    /// Tallest column height.
    #[must_use]
    pub fn height_max(&self) -> u8 {
        *self
            .height_max
            .get_or_init(|| *self.column_heights().iter().max().unwrap())
    }

    /// Shortest column height.
    #[must_use]
    pub fn height_min(&self) -> u8 {
        *self
            .height_min
            .get_or_init(|| *self.column_heights().iter().min().unwrap())
    }

    /// Sum of all column heights.
    #[must_use]
    pub fn height_sum(&self) -> u32 {
        *self
            .height_sum
            .get_or_init(|| self.column_heights().iter().map(|&h| u32::from(h)).sum())
    }

    /// Column heights with the global minimum subtracted; a perfectly level
    /// field yields all zeros.
    #[must_use]
    pub fn relative_heights(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.relative_heights.get_or_init(|| {
            let min = self.height_min();
            self.column_heights().map(|h| h - min)
        })
    }

    /// Relative heights clipped at an upper bound (never a lower one), used
    /// to keep feature values inside a declared range.
    #[must_use]
    pub fn relative_heights_clipped(&self, clip_at: u8) -> [u8; BitBoard::PLAYABLE_WIDTH] {
        self.relative_heights().map(|h| h.min(clip_at))
    }

    /// Signed height difference between adjacent columns, derived from the
    /// relative heights: `elevation[i] = rel[i] - rel[i+1]`, positive when
    /// the left column is taller. One element shorter than the height
    /// vector.
    #[must_use]
    pub fn elevations(&self) -> &[i16; BitBoard::PLAYABLE_WIDTH - 1] {
        self.elevations.get_or_init(|| {
            let rel = self.relative_heights();
            let mut elevations = [0; BitBoard::PLAYABLE_WIDTH - 1];
            for (e, w) in iter::zip(&mut elevations, rel.windows(2)) {
                *e = i16::from(w[0]) - i16::from(w[1]);
            }
            elevations
        })
    }

    /// Sum of absolute elevations over all adjacent column pairs.
    #[must_use]
    pub fn elevation_abs_sum(&self) -> u32 {
        *self.elevation_abs_sum.get_or_init(|| {
            self.elevations()
                .iter()
                .map(|e| u32::from(e.unsigned_abs()))
                .sum()
        })
    }

    /// Covered holes per column: empty cells strictly below the topmost
    /// occupied cell. Cells above the surface are never holes, and an empty
    /// column has none.
    #[must_use]
    pub fn column_holes(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.column_holes.get_or_init(|| {
            let mut holes = [0; BitBoard::PLAYABLE_WIDTH];
            let heights = self.column_heights();
            let occupied = self.column_occupied_cells();
            for (hole, (&height, &occ)) in
                iter::zip(&mut holes, iter::zip(heights, occupied))
            {
                if occ > 0 {
                    // `height + 1` cells lie at or below the surface cell.
                    *hole = height + 1 - occ;
                }
            }
            holes
        })
    }

    /// Total covered holes over the whole board.
    #[must_use]
    pub fn total_holes(&self) -> u32 {
        *self
            .total_holes
            .get_or_init(|| self.column_holes().iter().map(|&h| u32::from(h)).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod test_boards {
        use super::*;

        pub fn empty() -> BitBoard {
            BitBoard::INITIAL
        }

        pub fn full() -> BitBoard {
            let rows = "##########\n".repeat(BitBoard::PLAYABLE_HEIGHT);
            BitBoard::from_ascii(&rows)
        }

        pub fn flat() -> BitBoard {
            BitBoard::from_ascii(
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
                ##########
                ##########
                ",
            )
        }

        pub fn staircase() -> BitBoard {
            BitBoard::from_ascii(
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
                #.........
                ##........
                ###.......
                ####......
                #####.....
                ",
            )
        }

        pub fn single_hole() -> BitBoard {
            BitBoard::from_ascii(
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
                #.........
                ..........
                #.........
                ",
            )
        }
    }

    #[test]
    fn empty_board_is_all_zero() {
        let analysis = FieldAnalysis::from_board(&test_boards::empty());

        assert_eq!(analysis.column_heights(), &[0; BitBoard::PLAYABLE_WIDTH]);
        assert_eq!(
            analysis.relative_heights(),
            &[0; BitBoard::PLAYABLE_WIDTH]
        );
        assert_eq!(
            analysis.elevations(),
            &[0; BitBoard::PLAYABLE_WIDTH - 1]
        );
        assert_eq!(analysis.height_sum(), 0);
        assert_eq!(analysis.total_holes(), 0);
    }

    #[test]
    fn full_board_saturates_heights_without_holes() {
        let analysis = FieldAnalysis::from_board(&test_boards::full());

        let expected = u8::try_from(BitBoard::PLAYABLE_HEIGHT - 1).unwrap();
        assert_eq!(
            analysis.column_heights(),
            &[expected; BitBoard::PLAYABLE_WIDTH]
        );
        assert_eq!(analysis.total_holes(), 0);
        assert_eq!(
            analysis.relative_heights(),
            &[0; BitBoard::PLAYABLE_WIDTH]
        );
    }

    #[test]
    fn level_field_has_zero_relative_heights_and_elevations() {
        let analysis = FieldAnalysis::from_board(&test_boards::flat());

        assert_eq!(analysis.column_heights(), &[1; BitBoard::PLAYABLE_WIDTH]);
        assert_eq!(
            analysis.relative_heights(),
            &[0; BitBoard::PLAYABLE_WIDTH]
        );
        assert_eq!(
            analysis.elevations(),
            &[0; BitBoard::PLAYABLE_WIDTH - 1]
        );
    }

    #[test]
    fn staircase_heights_and_elevations() {
        let analysis = FieldAnalysis::from_board(&test_boards::staircase());

        assert_eq!(
            analysis.column_heights(),
            &[4, 3, 2, 1, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(analysis.elevations(), &[1, 1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(analysis.elevation_abs_sum(), 4);
        assert_eq!(analysis.height_max(), 4);
        assert_eq!(analysis.height_min(), 0);
        assert_eq!(analysis.height_sum(), 10);
        assert_eq!(analysis.total_holes(), 0);
    }

    #[test]
    fn elevations_are_signed_differences() {
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
            .#........
            .#........
            ##........
            ",
        );
        let analysis = FieldAnalysis::from_board(&board);

        assert_eq!(analysis.column_heights()[0], 0);
        assert_eq!(analysis.column_heights()[1], 2);
        assert_eq!(analysis.elevations()[0], -2);
        assert_eq!(analysis.elevations()[1], 2);
    }

    #[test]
    fn holes_count_only_cells_below_the_surface() {
        // Column 0 reads 1,0,1 from the surface down: exactly one hole.
        let analysis = FieldAnalysis::from_board(&test_boards::single_hole());

        assert_eq!(analysis.column_heights()[0], 2);
        assert_eq!(analysis.column_occupied_cells()[0], 2);
        assert_eq!(analysis.column_holes()[0], 1);
        assert_eq!(analysis.total_holes(), 1);
        for x in 1..BitBoard::PLAYABLE_WIDTH {
            assert_eq!(analysis.column_holes()[x], 0);
        }
    }

    #[test]
    fn floor_only_column_has_height_zero_and_no_holes() {
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
            #.........
            ",
        );
        let analysis = FieldAnalysis::from_board(&board);

        assert_eq!(analysis.column_heights()[0], 0);
        assert_eq!(analysis.column_holes()[0], 0);
    }

    #[test]
    fn relative_heights_clip_upper_bound_only() {
        let analysis = FieldAnalysis::from_board(&test_boards::staircase());

        assert_eq!(
            analysis.relative_heights_clipped(2),
            [2, 2, 2, 1, 0, 0, 0, 0, 0, 0]
        );
        // A clip above the maximum changes nothing.
        assert_eq!(
            &analysis.relative_heights_clipped(100),
            analysis.relative_heights()
        );
    }

    #[test]
    fn analysis_invariants() {
        let boards = [
            test_boards::empty(),
            test_boards::flat(),
            test_boards::staircase(),
            test_boards::single_hole(),
            test_boards::full(),
        ];

        for board in boards {
            let analysis = FieldAnalysis::from_board(&board);

            assert!(analysis.height_max() >= analysis.height_min());
            assert!(u32::from(analysis.height_max()) <= analysis.height_sum().max(1));

            // Holes never exceed the cells under the surface.
            for (&holes, &height) in
                iter::zip(analysis.column_holes(), analysis.column_heights())
            {
                assert!(u32::from(holes) <= u32::from(height) + 1);
            }

            // Relative heights preserve elevation differences.
            let rel = analysis.relative_heights();
            for (i, e) in analysis.elevations().iter().enumerate() {
                assert_eq!(*e, i16::from(rel[i]) - i16::from(rel[i + 1]));
            }
        }
    }

    #[test]
    fn repeated_access_is_consistent() {
        let analysis = FieldAnalysis::from_board(&test_boards::staircase());

        let heights1 = *analysis.column_heights();
        let heights2 = *analysis.column_heights();
        assert_eq!(heights1, heights2);

        let holes1 = analysis.total_holes();
        let holes2 = analysis.total_holes();
        assert_eq!(holes1, holes2);
    }
}
