use std::collections::VecDeque;

use rand::Rng;

use tetrion_agent::FeatureVector;

/// One recorded environment step.
///
/// Created once per decision, appended to the replay buffer, and sampled many
/// times afterwards; never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Afterstate features the agent acted from.
    pub features: FeatureVector,
    /// Reward of the chosen transition.
    pub reward: f32,
    /// Features of the chosen afterstate.
    pub next_features: FeatureVector,
    /// Whether the chosen placement ended the episode.
    pub terminal: bool,
}

/// Bounded FIFO replay history.
///
/// Capacity is fixed at construction; appending beyond it evicts strictly the
/// oldest entries. Sampling is uniform and non-destructive: entries stay in
/// the buffer until evicted by age.
#[derive(Debug)]
pub struct ReplayBuffer {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Creates a buffer holding at most `capacity` transitions.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draws a uniform batch of `batch_size` transitions.
    ///
    /// When the buffer holds fewer transitions than requested, all of them
    /// are returned instead of failing. Otherwise indices are drawn with
    /// replacement; a batch may repeat a transition.
    pub fn sample<R>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition>
    where
        R: Rng + ?Sized,
    {
        if self.transitions.len() <= batch_size {
            return self.transitions.iter().collect();
        }
        (0..batch_size)
            .map(|_| &self.transitions[rng.random_range(0..self.transitions.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(tag: f32) -> Transition {
        Transition {
            features: vec![tag],
            reward: tag,
            next_features: vec![tag],
            terminal: false,
        }
    }

    #[test]
    fn push_beyond_capacity_evicts_the_oldest() {
        let mut buffer = ReplayBuffer::new(3);
        for tag in 0..5u8 {
            buffer.push(transition(f32::from(tag)));
        }

        assert_eq!(buffer.len(), 3);
        let tags: Vec<f32> = buffer
            .sample(10, &mut rand::rng())
            .iter()
            .map(|t| t.reward)
            .collect();
        assert_eq!(tags, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::new(8);
        for tag in 0..100u8 {
            buffer.push(transition(f32::from(tag)));
            assert!(buffer.len() <= buffer.capacity());
        }
    }

    #[test]
    fn short_buffer_sample_degrades_to_all_available() {
        let mut buffer = ReplayBuffer::new(100);
        for tag in 0..3u8 {
            buffer.push(transition(f32::from(tag)));
        }

        let batch = buffer.sample(32, &mut rand::rng());
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn full_batch_has_requested_size() {
        let mut buffer = ReplayBuffer::new(100);
        for tag in 0..50u8 {
            buffer.push(transition(f32::from(tag)));
        }

        let batch = buffer.sample(16, &mut rand::rng());
        assert_eq!(batch.len(), 16);
        for t in batch {
            assert!(t.reward >= 0.0 && t.reward < 50.0);
        }
    }
}
