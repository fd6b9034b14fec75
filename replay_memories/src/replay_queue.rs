use super::SampleError;
use rand::seq::index;
use rand::Rng;
use std::collections::VecDeque;

/// Bounded FIFO experience store with uniform sampling.
///
/// Once `max_size` entries are held, every insertion evicts the oldest one.
/// Sampling never removes anything.
pub struct ReplayQueue<T> {
    transitions: VecDeque<T>,
    max_size: usize,
}

impl<T> ReplayQueue<T> {
    pub fn with_max_size(max_size: usize) -> Self {
        assert!(max_size > 0, "replay memory needs a positive capacity");
        Self {
            transitions: VecDeque::with_capacity(max_size),
            max_size,
        }
    }
    pub fn add_transition(&mut self, transition: T) {
        if self.transitions.len() >= self.max_size {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }
    /// Draws `batch_size` distinct entries uniformly at random, in random order.
    pub fn sample_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        batch_size: usize,
    ) -> Result<Vec<&T>, SampleError> {
        if self.transitions.len() < batch_size {
            return Err(SampleError::NotEnoughTransitions {
                requested: batch_size,
                available: self.transitions.len(),
            });
        }
        Ok(index::sample(rng, self.transitions.len(), batch_size)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect())
    }
    pub fn len(&self) -> usize {
        self.transitions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
    pub fn max_size(&self) -> usize {
        self.max_size
    }
    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.transitions.iter()
    }
}
