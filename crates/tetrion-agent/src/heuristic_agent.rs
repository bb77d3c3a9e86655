use tetrion_engine::{GameField, LineGroup, Placement};

use crate::{
    placement_outcome::PlacementOutcome,
    reward::{HeuristicReward, RewardFunction as _},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SessionSummary {
    pub completed_pieces: usize,
    pub cleared_lines: usize,
}

/// Non-learning baseline player: greedy argmax of [`HeuristicReward`] over
/// all candidates, unreachable sentinels included (they score 0; committing
/// one ends the session).
#[derive(Debug, Clone, Default)]
pub struct HeuristicAgent {
    reward: HeuristicReward,
}

impl HeuristicAgent {
    #[must_use]
    pub fn new(reward: HeuristicReward) -> Self {
        Self { reward }
    }

    #[must_use]
    pub fn select_placement(&self, field: &GameField) -> Option<Placement> {
        let kind = field.current_piece();
        let mut best_score = f32::MIN;
        let mut best = None;

        for placement in kind.legal_placements() {
            let outcome = PlacementOutcome::simulate(field.board(), kind, placement);
            let score = self.reward.reward(&outcome);
            if score > best_score {
                best_score = score;
                best = Some(placement);
            }
        }
        best
    }

    pub fn play_session(&self, field: &mut GameField, turn_limit: usize) -> SessionSummary {
        let mut summary = SessionSummary::default();

        for _ in 0..turn_limit {
            let Some(placement) = self.select_placement(field) else {
                break;
            };
            let Ok(groups) = field.commit(placement) else {
                break;
            };
            summary.completed_pieces += 1;
            summary.cleared_lines += groups.iter().map(LineGroup::size).sum::<usize>();
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_a_placement_on_an_empty_field() {
        let agent = HeuristicAgent::default();
        let field = GameField::new();

        let placement = agent.select_placement(&field);
        assert!(placement.is_some());
    }

    #[test]
    fn session_respects_the_turn_limit() {
        let agent = HeuristicAgent::default();
        let mut field = GameField::new();

        let summary = agent.play_session(&mut field, 5);
        assert!(summary.completed_pieces <= 5);
    }

    #[test]
    fn heuristic_play_survives_many_pieces() {
        // The baseline weights should keep a game alive for a while; this
        // guards against sign errors in the coefficients.
        let agent = HeuristicAgent::default();
        let mut field = GameField::new();

        let summary = agent.play_session(&mut field, 200);
        assert!(
            summary.completed_pieces >= 50,
            "heuristic agent died after {} pieces",
            summary.completed_pieces
        );
    }
}
