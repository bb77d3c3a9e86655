use std::{fmt, iter};

use tetrion_engine::{BitBoard, LineGroup};

use crate::placement_outcome::PlacementOutcome;

/// Guideline score per group of simultaneously cleared lines, indexed by
/// group size (capped at 4): <https://tetris.wiki/Scoring>.
const GROUP_SCORE_TABLE: [u32; 5] = [0, 1, 3, 5, 8];

/// Strategy producing a scalar reward from a simulated outcome.
///
/// Implementations are interchangeable at construction time; the learner
/// treats the reward purely as a number attached to each transition.
pub trait RewardFunction: fmt::Debug {
    /// Reward for choosing this candidate.
    fn reward(&self, outcome: &PlacementOutcome) -> f32;

    /// Neutral reward reported once the episode has already ended; the TD
    /// bootstrap value past a terminal transition.
    fn post_terminal_reward(&self) -> f32 {
        0.0
    }
}

/// The standard training reward: guideline line-clear scoring plus a small
/// survival bonus, with a fixed penalty for topping out.
///
/// Each cleared group scores by the guideline table (1 line = 1, 2 = 3,
/// 3 = 5, 4 = 8), groups are summed and scaled by `10 x board width`. Two
/// separate single-line groups therefore score `2`, not the `3` a merged
/// double would earn; this per-group summation is deliberate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineClearReward;

impl LineClearReward {
    const SURVIVAL_REWARD: f32 = 1.0;
    const TOP_OUT_REWARD: f32 = -10.0;

    /// Line-clear score for a set of simultaneously cleared groups.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn line_clear_reward(groups: &[LineGroup]) -> f32 {
        let scale = u32::try_from(10 * BitBoard::PLAYABLE_WIDTH).unwrap();
        let score: u32 = groups
            .iter()
            .map(|group| GROUP_SCORE_TABLE[group.size().min(4)])
            .sum();
        (scale * score) as f32
    }
}

impl RewardFunction for LineClearReward {
    fn reward(&self, outcome: &PlacementOutcome) -> f32 {
        if !outcome.is_reachable() {
            return Self::TOP_OUT_REWARD;
        }
        Self::line_clear_reward(outcome.line_groups()) + Self::SURVIVAL_REWARD
    }
}

/// Fixed linear weighting of the compact field features, the reward transform
/// of the non-learning baseline agent.
///
/// Coefficients follow the hand-tuned weights popularized by the
/// genetic-algorithm Tetris bots: aggregate height, bumpiness, and holes are
/// penalized, cleared lines rewarded. Unreachable outcomes score 0 (the
/// all-zero encoding dotted with any coefficients).
#[derive(Debug, Clone, Copy)]
pub struct HeuristicReward {
    coefficients: [f32; 4],
}

impl Default for HeuristicReward {
    fn default() -> Self {
        Self {
            coefficients: [-0.51, -0.18, -0.35, 0.76],
        }
    }
}

impl HeuristicReward {
    #[must_use]
    pub fn new(coefficients: [f32; 4]) -> Self {
        Self { coefficients }
    }
}

impl RewardFunction for HeuristicReward {
    #[expect(clippy::cast_precision_loss)]
    fn reward(&self, outcome: &PlacementOutcome) -> f32 {
        let Some(analysis) = outcome.analysis() else {
            return 0.0;
        };
        let features = [
            analysis.height_sum() as f32,
            analysis.elevation_abs_sum() as f32,
            analysis.total_holes() as f32,
            outcome.cleared_lines() as f32,
        ];
        iter::zip(self.coefficients, features).map(|(c, f)| c * f).sum()
    }
}
