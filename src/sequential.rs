pub mod tensor;
pub mod layer;
pub mod loss;
pub mod optimizer;

use tensor::Tensor;
use layer::Layer;
use loss::Loss;
use optimizer::Optimizer;

/// Layers run in order, trained against `loss` with `optimizer`.
pub struct Sequential {
    pub layers: Vec<Box<dyn Layer>>,
    pub loss: Box<dyn Loss>,
    pub optimizer: Box<dyn Optimizer>
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Layer>>, loss: Box<dyn Loss>, optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            layers,
            loss,
            optimizer
        }
    }

    pub fn predict(&mut self, input: &Tensor) -> Tensor {
        let mut output = input.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output);
        }
        output
    }

    /// One forward, backward and optimizer step. Returns the loss measured
    /// before the step.
    pub fn train_on_batch(&mut self, x_batch: &Tensor, y_batch: &Tensor) -> f32 {
        let y_pred = self.predict(x_batch);
        let loss = self.loss.calculate(&y_pred, y_batch);

        let mut d_output = self.loss.gradient(&y_pred, y_batch);
        for layer in self.layers.iter_mut().rev() {
            d_output = layer.backward(&d_output);
        }
        self.optimizer.step(&mut self.layers);

        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::layer::{Dense, ReLU};
    use crate::sequential::loss::MeanSquaredError;
    use crate::sequential::optimizer::Adam;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn regression_model() -> Sequential {
        let mut rng = StdRng::seed_from_u64(42);
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(Dense::new(2, 8, &mut rng)),
            Box::new(ReLU::new()),
            Box::new(Dense::new(8, 1, &mut rng)),
        ];
        Sequential::new(layers, Box::new(MeanSquaredError), Box::new(Adam::new(0.01)))
    }

    #[test]
    fn test_train_on_batch_updates_weights() {
        let mut model = regression_model();
        let initial_weights = model.layers[0].as_any().downcast_ref::<Dense>().unwrap().weights.clone();

        let x_batch = Tensor::from_vec(vec![1.0, 2.0], vec![1, 2]);
        let y_batch = Tensor::from_vec(vec![1.0], vec![1, 1]);
        model.train_on_batch(&x_batch, &y_batch);

        let final_weights = &model.layers[0].as_any().downcast_ref::<Dense>().unwrap().weights;
        assert_ne!(&initial_weights, final_weights, "weights did not update after a training step");
    }

    #[test]
    fn test_train_on_batch_reduces_loss() {
        let mut model = regression_model();
        let x = Tensor::from_vec(vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.5, 0.5], vec![4, 2]);
        let y = Tensor::from_vec(vec![1.0, -1.0, 0.5, 0.0], vec![4, 1]);

        let first = model.train_on_batch(&x, &y);
        let mut last = first;
        for _ in 0..300 {
            last = model.train_on_batch(&x, &y);
        }

        assert!(last < first, "loss went from {} to {}", first, last);
    }

    #[test]
    fn test_predict_batch_shape() {
        let mut model = regression_model();
        let out = model.predict(&Tensor::zeros(vec![5, 2]));
        assert_eq!(out.shape, vec![5, 1]);
    }
}
