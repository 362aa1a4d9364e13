use crate::game::Action;
use crate::state::StateVector;

use rand::Rng;
use std::collections::VecDeque;

/// One step of experience. Never modified after it is recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: StateVector,
    pub action: Action,
    pub reward: f32,
    pub next_state: StateVector,
    pub terminal: bool,
}

/// Bounded FIFO memory; the oldest transition goes first once full.
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(4096)),
            capacity
        }
    }

    pub fn add(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Up to `batch_size` distinct transitions, drawn without replacement.
    /// Everything is returned when the memory holds fewer.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<Transition> {
        let amount = batch_size.min(self.buffer.len());
        if amount == self.buffer.len() {
            return self.buffer.iter().copied().collect();
        }

        rand::seq::index::sample(rng, self.buffer.len(), amount)
            .iter()
            .map(|index| self.buffer[index])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn transition(i: usize) -> Transition {
        Transition {
            state: [i as f32; 11],
            action: Action::ALL[i % 3],
            reward: i as f32,
            next_state: [(i + 1) as f32; 11],
            terminal: i % 10 == 9,
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..250 {
            buffer.add(transition(i));
            assert!(buffer.len() <= 100);
        }
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.capacity(), 100);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = ReplayBuffer::new(5);
        for i in 0..6 {
            buffer.add(transition(i));
        }

        let rewards: Vec<f32> = buffer.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(buffer.iter().all(|t| *t != transition(0)));
        assert_eq!(buffer.iter().last(), Some(&transition(5)));
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..50 {
            buffer.add(transition(i));
        }

        let batch = buffer.sample(20, &mut StdRng::seed_from_u64(1));
        assert_eq!(batch.len(), 20);

        let mut rewards: Vec<i64> = batch.iter().map(|t| t.reward as i64).collect();
        rewards.sort();
        rewards.dedup();
        assert_eq!(rewards.len(), 20);
    }

    #[test]
    fn test_sample_small_memory_returns_everything() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..7 {
            buffer.add(transition(i));
        }

        let batch = buffer.sample(1000, &mut StdRng::seed_from_u64(1));
        assert_eq!(batch.len(), 7);
        assert!(ReplayBuffer::new(10).sample(1000, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
