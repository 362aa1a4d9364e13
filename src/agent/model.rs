use crate::error::{Result, SnakeError};
use crate::game::Action;
use crate::sequential::Sequential;
use crate::sequential::layer::{Dense, Layer, ReLU};
use crate::sequential::loss::MeanSquaredError;
use crate::sequential::optimizer::Adam;
use crate::sequential::tensor::Tensor;
use crate::state::{STATE_SIZE, StateVector};

use rand::Rng;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl NetworkShape {
    /// State features in, one value per relative action out.
    pub fn with_hidden(hidden: usize) -> Self {
        Self {
            input: STATE_SIZE,
            hidden,
            output: Action::ALL.len(),
        }
    }
}

impl Default for NetworkShape {
    fn default() -> Self {
        Self::with_hidden(256)
    }
}

/// Dense -> ReLU -> Dense value network.
pub struct QNetwork {
    model: Sequential,
    shape: NetworkShape,
}

impl QNetwork {
    pub fn new<R: Rng + ?Sized>(shape: NetworkShape, learning_rate: f32, rng: &mut R) -> Self {
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(Dense::new(shape.input, shape.hidden, rng)),
            Box::new(ReLU::new()),
            Box::new(Dense::new(shape.hidden, shape.output, rng)),
        ];
        Self::assemble(layers, shape, learning_rate)
    }

    fn assemble(layers: Vec<Box<dyn Layer>>, shape: NetworkShape, learning_rate: f32) -> Self {
        let model = Sequential::new(layers, Box::new(MeanSquaredError), Box::new(Adam::new(learning_rate)));
        Self { model, shape }
    }

    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    /// `states` is [n, input], the result [n, output].
    pub fn predict(&mut self, states: &Tensor) -> Tensor {
        self.model.predict(states)
    }

    pub fn predict_one(&mut self, state: &StateVector) -> Vec<f32> {
        self.predict(&Tensor::from_rows(&[*state])).read().to_vec()
    }

    /// One optimizer step toward `targets`; returns the loss before the step.
    pub fn train_on_batch(&mut self, states: &Tensor, targets: &Tensor) -> f32 {
        self.model.train_on_batch(states, targets)
    }

    /// Writes the layer parameters to `dir/file_name`, creating `dir` if
    /// needed and overwriting an older checkpoint.
    pub fn save(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| SnakeError::io(dir, e))?;
            info!(path = %dir.display(), "model folder not found, created one");
        }

        let path = dir.join(file_name);
        let file = File::create(&path).map_err(|e| SnakeError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &self.model.layers)?;
        writer.flush().map_err(|e| SnakeError::io(&path, e))?;

        info!(path = %path.display(), "saved model checkpoint");
        Ok(path)
    }

    /// Reads a checkpoint written by [`QNetwork::save`]. Fails if the stored
    /// layers do not match `shape`. Optimizer state starts fresh.
    pub fn load(path: &Path, shape: NetworkShape, learning_rate: f32) -> Result<Self> {
        let file = File::open(path).map_err(|e| SnakeError::io(path, e))?;
        let layers: Vec<Box<dyn Layer>> = bincode::deserialize_from(BufReader::new(file))?;
        check_layout(&layers, shape)?;

        info!(path = %path.display(), ?shape, "loaded model checkpoint");
        Ok(Self::assemble(layers, shape, learning_rate))
    }

    #[cfg(test)]
    pub(crate) fn dense_mut(&mut self, index: usize) -> &mut Dense {
        self.model.layers[index].as_any_mut().downcast_mut::<Dense>().unwrap()
    }
}

fn check_dense(layers: &[Box<dyn Layer>], index: usize, rows: usize, cols: usize) -> Result<()> {
    let dense = layers[index]
        .as_any()
        .downcast_ref::<Dense>()
        .ok_or(SnakeError::LayerKind(index))?;

    for (expected, found) in [(vec![rows, cols], &dense.weights.shape), (vec![1, cols], &dense.biases.shape)] {
        if &expected != found {
            return Err(SnakeError::ShapeMismatch {
                layer: index,
                expected,
                found: found.clone(),
            });
        }
    }
    Ok(())
}

fn check_layout(layers: &[Box<dyn Layer>], shape: NetworkShape) -> Result<()> {
    if layers.len() != 3 {
        return Err(SnakeError::LayerCount { expected: 3, found: layers.len() });
    }
    check_dense(layers, 0, shape.input, shape.hidden)?;
    if layers[1].as_any().downcast_ref::<ReLU>().is_none() {
        return Err(SnakeError::LayerKind(1));
    }
    check_dense(layers, 2, shape.hidden, shape.output)
}
