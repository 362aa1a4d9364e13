use super::model::QNetwork;
use super::replaybuffer::Transition;
use crate::sequential::tensor::Tensor;
use crate::state::StateVector;

use tracing::debug;

/// Bellman updater for a [`QNetwork`].
pub struct QTrainer {
    gamma: f32,
}

impl QTrainer {
    pub fn new(gamma: f32) -> Self {
        Self { gamma }
    }

    /// One optimizer step on `batch`. A single transition is just a batch of
    /// one. Returns the loss, or 0 for an empty batch.
    pub fn train_step(&self, model: &mut QNetwork, batch: &[Transition]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }

        let states: Vec<StateVector> = batch.iter().map(|t| t.state).collect();
        let states = Tensor::from_rows(&states);
        let predictions = model.predict(&states);

        // only non-terminal rows bootstrap from the next state
        let bootstrap: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.terminal)
            .map(|(i, _)| i)
            .collect();
        let mut next_max = vec![0.0; batch.len()];
        if !bootstrap.is_empty() {
            let next_states: Vec<StateVector> = bootstrap.iter().map(|&i| batch[i].next_state).collect();
            let next_predictions = model.predict(&Tensor::from_rows(&next_states));
            for (row, &i) in bootstrap.iter().enumerate() {
                next_max[i] = next_predictions
                    .row(row)
                    .iter()
                    .fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            }
        }

        let targets = self.targets(batch, &predictions, &next_max);
        let loss = model.train_on_batch(&states, &targets);
        debug!(batch = batch.len(), loss, "train step");
        loss
    }

    /// Copies `predictions` and overwrites the taken action of each row with
    /// its Q target. `next_max` is ignored for terminal rows.
    pub fn targets(&self, batch: &[Transition], predictions: &Tensor, next_max: &[f32]) -> Tensor {
        debug_assert_eq!(predictions.rows(), batch.len());
        let mut targets = predictions.clone();
        let cols = targets.cols();
        let data = targets.write();

        for (i, transition) in batch.iter().enumerate() {
            let q_new = if transition.terminal {
                transition.reward
            } else {
                transition.reward + self.gamma * next_max[i]
            };
            data[i * cols + transition.action.index()] = q_new;
        }

        targets
    }
}
