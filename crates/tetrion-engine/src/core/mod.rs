pub use self::{bit_board::*, piece::*};

pub(crate) mod bit_board;
pub(crate) mod piece;

pub(crate) const PLAYABLE_WIDTH: usize = 10;
pub(crate) const PLAYABLE_HEIGHT: usize = 20;
pub(crate) const SENTINEL_MARGIN_LEFT: usize = 2;
pub(crate) const SENTINEL_MARGIN_TOP: usize = 2;
pub(crate) const SENTINEL_MARGIN_BOTTOM: usize = 2;
pub(crate) const TOTAL_WIDTH: usize = PLAYABLE_WIDTH + 2 * SENTINEL_MARGIN_LEFT;
pub(crate) const TOTAL_HEIGHT: usize = PLAYABLE_HEIGHT + SENTINEL_MARGIN_TOP + SENTINEL_MARGIN_BOTTOM;
