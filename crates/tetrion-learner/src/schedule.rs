/// Linearly decaying exploration rate with a floor.
///
/// `epsilon(e) = floor + max(decay - e, 0) * (initial - floor) / decay`:
/// starts at `initial`, reaches `floor` after `decay` episodes, and stays
/// clamped there for the rest of the run.
#[derive(Debug, Clone, Copy)]
pub struct EpsilonSchedule {
    initial: f64,
    floor: f64,
    decay_episodes: usize,
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self::new(1.0, 1e-3, 2000)
    }
}

impl EpsilonSchedule {
    /// Creates a schedule decaying from `initial` to `floor` over
    /// `decay_episodes` episodes.
    ///
    /// # Panics
    ///
    /// Panics if `decay_episodes` is zero or `initial < floor`.
    #[must_use]
    pub fn new(initial: f64, floor: f64, decay_episodes: usize) -> Self {
        assert!(decay_episodes > 0, "decay must span at least one episode");
        assert!(initial >= floor, "epsilon cannot decay upward");
        Self {
            initial,
            floor,
            decay_episodes,
        }
    }

    /// Exploration probability for the given episode number.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn value(&self, episode: usize) -> f64 {
        let remaining = self.decay_episodes.saturating_sub(episode);
        self.floor + (remaining as f64) * (self.initial - self.floor) / (self.decay_episodes as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_and_ends_at_floor() {
        let schedule = EpsilonSchedule::new(1.0, 1e-3, 2000);

        assert!((schedule.value(0) - 1.0).abs() < 1e-12);
        assert!((schedule.value(2000) - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn clamps_at_the_floor_after_decay() {
        let schedule = EpsilonSchedule::new(1.0, 1e-3, 2000);

        for episode in [2000, 2001, 5000, 1_000_000] {
            assert!((schedule.value(episode) - 1e-3).abs() < 1e-12);
        }
    }

    #[test]
    fn decays_monotonically() {
        let schedule = EpsilonSchedule::default();

        let mut previous = schedule.value(0);
        for episode in 1..=2100 {
            let current = schedule.value(episode);
            assert!(current <= previous, "rose at episode {episode}");
            previous = current;
        }
    }

    #[test]
    fn midpoint_is_halfway() {
        let schedule = EpsilonSchedule::new(1.0, 0.0, 1000);
        assert!((schedule.value(500) - 0.5).abs() < 1e-12);
    }
}
