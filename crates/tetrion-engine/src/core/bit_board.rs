use std::ops::Range;

use arrayvec::ArrayVec;

use crate::core::piece::Piece;

use super::{
    PLAYABLE_HEIGHT, PLAYABLE_WIDTH, SENTINEL_MARGIN_LEFT, SENTINEL_MARGIN_TOP, TOTAL_HEIGHT,
    TOTAL_WIDTH,
};

// Left sentinel: bits 0-1 (x=0,1)
const LEFT_SENTINEL_MASK: u16 = 0b11;
// Right sentinel: bits 12-13 (x=12,13)
const RIGHT_SENTINEL_MASK: u16 = 0b11 << (SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH);
const SENTINEL_MASK: u16 = LEFT_SENTINEL_MASK | RIGHT_SENTINEL_MASK;
const FULL_ROW_MASK: u16 = (1 << TOTAL_WIDTH) - 1;
const PLAYABLE_MASK: u16 = FULL_ROW_MASK & !SENTINEL_MASK;

/// Single row of the board, stored as a 16-bit occupancy mask.
///
/// Bit layout (LSB to MSB): 2 left sentinel bits, 10 playable bits, 2 right
/// sentinel bits, 2 unused padding bits. Sentinel bits are always set so that
/// piece masks collide with the walls without extra bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self {
        bits: SENTINEL_MASK,
    };
    pub const FULL_SENTINEL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    /// Checks if every playable cell in the row is occupied.
    #[inline]
    #[must_use]
    pub fn is_playable_filled(self) -> bool {
        (self.bits & PLAYABLE_MASK) == PLAYABLE_MASK
    }

    /// Checks if the cell at the given board x-coordinate is occupied.
    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        let bit = 1 << x;
        (self.bits & bit) != 0
    }

    /// Checks if any cell covered by `mask` (shifted by `x0`) is occupied.
    #[inline]
    #[must_use]
    fn is_any_cell_occupied(self, x0: usize, mask: u16) -> bool {
        let bits = mask << x0;
        (self.bits & bits) != 0
    }

    /// Marks the cells covered by `mask` (shifted by `x0`) as occupied.
    #[inline]
    fn occupy_cells(&mut self, x0: usize, mask: u16) {
        let bits = mask << x0;
        self.bits |= bits;
    }

    /// Iterates over the playable cells of the row, left to right.
    #[inline]
    pub fn iter_playable_cells(self) -> impl Iterator<Item = bool> {
        (SENTINEL_MARGIN_LEFT..SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH).map(move |x| {
            let bit = 1 << x;
            (self.bits & bit) != 0
        })
    }
}

/// A contiguous run of rows cleared together by one placement.
///
/// Rows are counted in playable coordinates before compaction. Simultaneous
/// but non-adjacent clears produce separate groups; scoring layers treat each
/// group on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineGroup {
    start: usize,
    size: usize,
}

impl LineGroup {
    #[must_use]
    pub const fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    const fn extended(self) -> Self {
        Self {
            start: self.start,
            size: self.size + 1,
        }
    }

    /// Topmost playable row of the run, in pre-clear coordinates.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Number of rows cleared together in this group (1-4 in normal play).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

/// Upper bound on simultaneously cleared groups (alternating full rows).
pub const MAX_LINE_GROUPS: usize = PLAYABLE_HEIGHT.div_ceil(2);

/// Groups of rows cleared by a single [`BitBoard::clear_line_groups`] call,
/// ordered top to bottom.
pub type LineGroups = ArrayVec<LineGroup, MAX_LINE_GROUPS>;

/// Bit-row playing field with sentinel borders.
///
/// The playable area is 10x20 cells, surrounded by 2-cell sentinel margins on
/// the left, right, and bottom (top rows carry only the side sentinels so
/// pieces can spawn partially above the visible field). The 2-cell margin
/// matches the 4x4 bounding box used by every piece mask: the I-piece keeps
/// up to two empty columns next to its cells, and the wide margin lets it
/// reach both edge columns without special-casing collision checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    rows: [BitRow; TOTAL_HEIGHT],
}

impl BitBoard {
    pub const TOTAL_WIDTH: usize = TOTAL_WIDTH;
    pub const TOTAL_HEIGHT: usize = TOTAL_HEIGHT;
    pub const PLAYABLE_WIDTH: usize = PLAYABLE_WIDTH;
    pub const PLAYABLE_HEIGHT: usize = PLAYABLE_HEIGHT;
    pub const PLAYABLE_X_RANGE: Range<usize> =
        SENTINEL_MARGIN_LEFT..(SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH);
    pub const PLAYABLE_Y_RANGE: Range<usize> =
        SENTINEL_MARGIN_TOP..(SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT);

    pub const INITIAL: Self = {
        let mut rows = [BitRow::EMPTY; TOTAL_HEIGHT];
        let mut y = SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT;
        while y < TOTAL_HEIGHT {
            rows[y] = BitRow::FULL_SENTINEL;
            y += 1;
        }
        Self { rows }
    };

    /// Returns a playable row by index (0 = top visible row).
    #[must_use]
    pub fn playable_row(&self, y: usize) -> BitRow {
        self.rows[y + SENTINEL_MARGIN_TOP]
    }

    /// Returns an iterator over the playable rows, top to bottom.
    pub fn playable_rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT]
            .iter()
            .copied()
    }

    /// Checks if the piece overlaps occupied cells (walls included).
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in piece.mask().into_iter().zip(&self.rows[y0..]) {
            if row.is_any_cell_occupied(x0, mask) {
                return true;
            }
        }
        false
    }

    /// Locks a piece onto the board by marking its cells occupied.
    pub fn fill_piece(&mut self, piece: Piece) {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in piece.mask().into_iter().zip(&mut self.rows[y0..]) {
            row.occupy_cells(x0, mask);
        }
    }

    /// Clears every filled row and reports the contiguous groups that were
    /// cleared, top to bottom.
    ///
    /// A row is filled when all of its playable cells are occupied. Rows
    /// above a cleared run shift down by the run's size, and the vacated top
    /// rows are reset to sentinel-only.
    pub fn clear_line_groups(&mut self) -> LineGroups {
        let playable = &mut self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT];

        let mut groups = LineGroups::new();
        let mut open: Option<LineGroup> = None;
        for (y, row) in playable.iter().enumerate() {
            if row.is_playable_filled() {
                open = Some(match open {
                    Some(group) => group.extended(),
                    None => LineGroup::new(y, 1),
                });
            } else if let Some(group) = open.take() {
                groups.push(group);
            }
        }
        if let Some(group) = open {
            groups.push(group);
        }

        let mut cleared = 0;
        for y in (0..PLAYABLE_HEIGHT).rev() {
            if playable[y].is_playable_filled() {
                cleared += 1;
                continue;
            }
            if cleared > 0 {
                playable[y + cleared] = playable[y];
            }
        }
        playable[..cleared].fill(BitRow::EMPTY);

        groups
    }

    /// Builds a board from ASCII art for tests: `#` occupied, `.` empty,
    /// rows given top to bottom. Each row must have exactly 10 cells.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::INITIAL;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();

        for (y, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                Self::PLAYABLE_WIDTH,
                "Each row must have exactly {} cells, got {} at row {}",
                Self::PLAYABLE_WIDTH,
                chars.len(),
                y
            );

            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    let row_index = y + SENTINEL_MARGIN_TOP;
                    let col_index = x + SENTINEL_MARGIN_LEFT;
                    board.rows[row_index].occupy_cells(col_index, 0b1);
                }
            }
        }
        board
    }
}
