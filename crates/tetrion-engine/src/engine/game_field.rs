use crate::{
    TopOutError,
    core::{
        bit_board::{BitBoard, LineGroups},
        piece::{Piece, PieceKind, Placement},
    },
};

use super::piece_queue::{BagSeed, PieceQueue};

/// Authoritative state of one game: the board, the piece waiting to be
/// placed, and the bag it came from.
///
/// The field advances only through [`GameField::commit`]; decision layers
/// read the board and piece, simulate on copies, and commit exactly one
/// placement per turn. After a top-out the field stays frozen in its
/// game-over state until a new one is created for the next episode.
#[derive(Debug, Clone)]
pub struct GameField {
    board: BitBoard,
    current_piece: PieceKind,
    queue: PieceQueue,
    game_over: bool,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    /// Creates an empty field with a randomly seeded piece queue.
    #[must_use]
    pub fn new() -> Self {
        Self::from_queue(PieceQueue::new())
    }

    /// Creates an empty field with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: BagSeed) -> Self {
        Self::from_queue(PieceQueue::with_seed(seed))
    }

    fn from_queue(mut queue: PieceQueue) -> Self {
        let current_piece = queue.pop_next();
        Self {
            board: BitBoard::INITIAL,
            current_piece,
            queue,
            game_over: false,
        }
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    /// The piece the next placement decision applies to.
    #[must_use]
    pub fn current_piece(&self) -> PieceKind {
        self.current_piece
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Returns an iterator over the upcoming pieces in the bag.
    pub fn upcoming_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.upcoming()
    }

    /// Commits a placement of the current piece: spawns it at the requested
    /// rotation and column, resolves the gravity drop, locks it, clears
    /// filled lines, and advances to the next piece.
    ///
    /// If the piece cannot spawn because the stack already occupies its spawn
    /// cells, the game is over: the board is left untouched, the field is
    /// marked game-over, and [`TopOutError`] is returned.
    pub fn commit(&mut self, placement: Placement) -> Result<LineGroups, TopOutError> {
        let piece = Piece::spawn(self.current_piece, placement);
        if self.game_over || self.board.is_colliding(piece) {
            self.game_over = true;
            return Err(TopOutError);
        }

        let rested = piece.rested(&self.board);
        self.board.fill_piece(rested);
        let groups = self.board.clear_line_groups();
        self.current_piece = self.queue.pop_next();
        Ok(groups)
    }
}
