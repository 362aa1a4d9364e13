use super::tensor::Tensor;
use std::any::Any;
use rand::Rng;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

/// A network stage. Only parameters are serialized; activation caches and
/// gradients are rebuilt by the next forward/backward pass.
#[typetag::serde]
pub trait Layer: Send {
    fn forward(&mut self, input: &Tensor) -> Tensor;
    fn backward(&mut self, d_output: &Tensor) -> Tensor;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
}


// dense layer

#[derive(Serialize, Deserialize, Clone)]
pub struct Dense {
    pub weights: Tensor,
    pub biases: Tensor,
    #[serde(skip)]
    cached_input: Option<Tensor>, // for back propagation
    #[serde(skip)]
    pub d_weights: Option<Tensor>,
    #[serde(skip)]
    pub d_biases: Option<Tensor>
}

impl Dense {
    /// He-initialised weights, zero biases.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let std_dev = (2.0 / input_size.max(1) as f32).sqrt();
        let weights = Tensor::random(vec![input_size, output_size], std_dev, rng);
        let biases = Tensor::zeros(vec![1, output_size]);
        Self {
            weights,
            biases,
            cached_input: None,
            d_weights: None,
            d_biases: None
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape[1]
    }
}

#[typetag::serde]
impl Layer for Dense {
    fn forward(&mut self, input: &Tensor) -> Tensor {
        self.cached_input = Some(input.clone());

        let mut output = input.matmul(&self.weights);

        // add biases
        let output_size = output.cols();
        if output_size > 0 {
            let biases_data = self.biases.read();
            output.write().par_chunks_mut(output_size).for_each(|row_chunk| {
                for (x, b) in row_chunk.iter_mut().zip(biases_data) {
                    *x += b;
                }
            });
        }

        output
    }

    fn backward(&mut self, d_output: &Tensor) -> Tensor {
        let cached_input = self.cached_input.as_ref().expect("complete forward pass first.");

        // dL/dW = input.T @ dL/dY
        self.d_weights = Some(cached_input.transpose().matmul(d_output));

        // dL/db = dL/dY.sum(axis=0)
        self.d_biases = Some(d_output.sum(0));

        // dL/dX = dL/dY @ weights.T
        d_output.matmul(&self.weights.transpose())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


// relu layer

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ReLU {
    #[serde(skip)]
    cached_input: Option<Tensor>
}

impl ReLU {
    pub fn new() -> Self {
        Self::default()
    }
}

#[typetag::serde]
impl Layer for ReLU {
    fn forward(&mut self, input: &Tensor) -> Tensor {
        self.cached_input = Some(input.clone());
        input.map(|x| x.max(0.0))
    }

    fn backward(&mut self, d_output: &Tensor) -> Tensor {
        let cached_input = self.cached_input.as_ref().expect("complete forward pass first.");
        cached_input.map2(d_output, |input_val, output_val| {
            if input_val > 0.0 {
                output_val
            } else {
                0.0
            }
        })
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
