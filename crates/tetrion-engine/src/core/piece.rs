use std::ops::RangeInclusive;

use super::{
    PLAYABLE_WIDTH, SENTINEL_MARGIN_LEFT, SENTINEL_MARGIN_TOP, TOTAL_HEIGHT, TOTAL_WIDTH,
    bit_board::BitBoard,
};

/// Enum representing the type of piece.
///
/// Discriminants double as the piece id exposed to feature encoders
/// (`I=0 .. T=6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

/// Number of distinct orientations per piece kind, indexed by discriminant.
///
/// O looks the same in every orientation; I, S, and Z repeat after two
/// rotations; J, L, and T need all four. This table is a fixed property of
/// the piece set, not configuration.
const ORIENTATION_COUNTS: [usize; PieceKind::LEN] = [2, 1, 2, 2, 4, 4, 4];

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in discriminant order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Discrete piece id in `[0, 6]`.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Number of distinct orientations of this kind (1, 2, or 4).
    #[must_use]
    pub const fn orientation_count(self) -> usize {
        ORIENTATION_COUNTS[self as usize]
    }

    /// Iterates over the distinct rotations of this kind.
    pub fn orientations(self) -> impl Iterator<Item = PieceRotation> {
        (0..self.orientation_count()).map(PieceRotation::new)
    }

    pub(crate) fn mask(self, rotation: PieceRotation) -> PieceMask {
        PIECE_MASKS[self as usize][rotation.index()]
    }

    const fn span(self, rotation: PieceRotation) -> MaskSpan {
        PIECE_SPANS[self as usize][rotation.index()]
    }

    /// Width in columns of this kind at the given rotation.
    #[must_use]
    pub const fn width(self, rotation: PieceRotation) -> usize {
        let span = self.span(rotation);
        span.max_dx - span.min_dx + 1
    }

    /// Legal columns for the piece's leftmost occupied cell at the given
    /// rotation. Columns outside this range would overlap a wall.
    #[must_use]
    pub const fn legal_column_range(self, rotation: PieceRotation) -> RangeInclusive<usize> {
        0..=(PLAYABLE_WIDTH - self.width(rotation))
    }

    /// Total number of legal `(rotation, column)` placements of this kind.
    #[must_use]
    pub fn legal_placement_count(self) -> usize {
        self.orientations()
            .map(|rotation| self.legal_column_range(rotation).count())
            .sum()
    }

    /// Iterates over every legal placement of this kind, rotation-major.
    pub fn legal_placements(self) -> impl Iterator<Item = Placement> {
        self.orientations().flat_map(move |rotation| {
            self.legal_column_range(rotation)
                .map(move |column| Placement::new(rotation, column))
        })
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rotation state of a piece: `0` is the spawn orientation, each step is 90
/// degrees clockwise. Only indices below the kind's orientation count name
/// distinct shapes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// Creates a rotation from its index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        assert!(index < 4);
        Self(index as u8)
    }

    /// Rotation index in `[0, 3]`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A final placement decision: which orientation to use and which column the
/// piece's leftmost occupied cell lands in.
///
/// The legal column range depends on the kind and rotation; see
/// [`PieceKind::legal_column_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    rotation: PieceRotation,
    column: usize,
}

impl Placement {
    #[must_use]
    pub const fn new(rotation: PieceRotation, column: usize) -> Self {
        Self { rotation, column }
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

/// A piece at a specific location and orientation on the board.
///
/// Pieces are immutable; movement returns new `Piece` instances. A piece is
/// created at the top of the field with [`Piece::spawn`] and dropped to its
/// resting position with [`Piece::rested`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Positions a piece at the top of the playable area for the given
    /// placement: the leftmost occupied cell sits in `placement.column()` and
    /// the topmost occupied cell in playable row 0.
    ///
    /// The caller decides reachability by collision-testing the result
    /// against the board; a colliding spawn is a top-out.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn spawn(kind: PieceKind, placement: Placement) -> Self {
        let rotation = placement.rotation();
        debug_assert!(
            kind.legal_column_range(rotation).contains(&placement.column()),
            "column {} out of legal range for {kind:?} at rotation {}",
            placement.column(),
            rotation.index(),
        );
        let span = kind.span(rotation);
        let x = SENTINEL_MARGIN_LEFT - span.min_dx + placement.column();
        let y = SENTINEL_MARGIN_TOP - span.min_dy;
        Self {
            position: PiecePosition::new(x as u8, y as u8),
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn mask(&self) -> PieceMask {
        self.kind.mask(self.rotation)
    }

    /// Iterates over the board coordinates occupied by this piece.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mask = self.mask();
        let x0 = self.position.x();
        let y0 = self.position.y();
        (0..4).flat_map(move |dy| {
            (0..4).filter_map(move |dx| {
                if mask[dy] & (1 << dx) == 0 {
                    None
                } else {
                    Some((x0 + dx, y0 + dy))
                }
            })
        })
    }

    #[must_use]
    fn down(&self) -> Option<Self> {
        let position = self.position.down()?;
        Some(Self { position, ..*self })
    }

    /// Resolves the gravity drop: moves the piece down until the next step
    /// would collide. Deterministic for a given board.
    #[must_use]
    pub fn rested(self, board: &BitBoard) -> Self {
        let mut rested = self;
        while let Some(piece) = rested.down().filter(|p| !board.is_colliding(*p)) {
            rested = piece;
        }
        rested
    }
}

/// Position of a piece's 4x4 bounding box on the board, in total (sentinel
/// inclusive) coordinates. (0, 0) is the top-left corner; x grows rightward,
/// y downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    x: u8,
    y: u8,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < TOTAL_WIDTH);
        assert!((y as usize) < TOTAL_HEIGHT);
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }

    #[must_use]
    const fn down(self) -> Option<Self> {
        if self.y as usize >= TOTAL_HEIGHT - 1 {
            None
        } else {
            Some(Self::new(self.x, self.y + 1))
        }
    }
}

/// Bitboard representation of a piece within its 4x4 bounding box.
///
/// Each element is one row of 4 bits, matching the board's row masks for
/// cheap collision tests.
pub(crate) type PieceMask = [u16; 4];

/// Occupied-cell extents of a mask within its 4x4 box.
#[derive(Debug, Clone, Copy)]
struct MaskSpan {
    min_dx: usize,
    max_dx: usize,
    min_dy: usize,
}

/// Generates all 4 rotation states of a piece mask by rotating 90 degrees
/// clockwise within the piece's effective grid size (4 for I, 2 for O, 3 for
/// the rest).
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece
        mask_rotations(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};

const fn mask_span(mask: &PieceMask) -> MaskSpan {
    let mut min_dx = 3;
    let mut max_dx = 0;
    let mut min_dy = 3;
    let mut dy = 0;
    while dy < 4 {
        let row = mask[dy];
        if row != 0 {
            if dy < min_dy {
                min_dy = dy;
            }
            let mut dx = 0;
            while dx < 4 {
                if row & (1 << dx) != 0 {
                    if dx < min_dx {
                        min_dx = dx;
                    }
                    if dx > max_dx {
                        max_dx = dx;
                    }
                }
                dx += 1;
            }
        }
        dy += 1;
    }
    MaskSpan {
        min_dx,
        max_dx,
        min_dy,
    }
}

const PIECE_SPANS: [[MaskSpan; 4]; PieceKind::LEN] = {
    let mut spans = [[MaskSpan {
        min_dx: 0,
        max_dx: 0,
        min_dy: 0,
    }; 4]; PieceKind::LEN];
    let mut kind = 0;
    while kind < PieceKind::LEN {
        let mut rot = 0;
        while rot < 4 {
            spans[kind][rot] = mask_span(&PIECE_MASKS[kind][rot]);
            rot += 1;
        }
        kind += 1;
    }
    spans
};
