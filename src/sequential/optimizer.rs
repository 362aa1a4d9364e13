use super::layer::{Layer, Dense};

pub trait Optimizer: Send {
    /// Applies the gradients left on the layers by the last backward pass.
    fn step(&mut self, layers: &mut [Box<dyn Layer>]);
}


// Adam

#[derive(Clone, Debug)]
struct Moments {
    m_weights: Vec<f32>,
    v_weights: Vec<f32>,
    m_biases: Vec<f32>,
    v_biases: Vec<f32>,
}

impl Moments {
    fn for_layer(layer: &Dense) -> Self {
        let (w, b) = (layer.weights.read().len(), layer.biases.read().len());
        Self {
            m_weights: vec![0.0; w],
            v_weights: vec![0.0; w],
            m_biases: vec![0.0; b],
            v_biases: vec![0.0; b],
        }
    }
}

#[derive(Clone, Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    // one slot per layer index, filled on the first step that sees a Dense
    moments: Vec<Option<Moments>>,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self::with_betas(learning_rate, 0.9, 0.999, 1e-8)
    }

    pub fn with_betas(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            moments: Vec::new(),
        }
    }

    pub fn steps(&self) -> i32 {
        self.t
    }

    fn update(&self, params: &mut [f32], grads: &[f32], m: &mut [f32], v: &mut [f32]) {
        let bias_correction1 = 1.0 - self.beta1.powi(self.t);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t);

        for (((p, &g), m), v) in params.iter_mut().zip(grads).zip(m.iter_mut()).zip(v.iter_mut()) {
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / bias_correction1;
            let v_hat = *v / bias_correction2;
            *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        self.t += 1;
        if self.moments.len() < layers.len() {
            self.moments.resize(layers.len(), None);
        }

        for (index, layer) in layers.iter_mut().enumerate() {
            let Some(dense_layer) = layer.as_any_mut().downcast_mut::<Dense>() else {
                continue;
            };
            let (Some(d_weights), Some(d_biases)) = (dense_layer.d_weights.take(), dense_layer.d_biases.take()) else {
                continue;
            };

            let mut moments = self.moments[index]
                .take()
                .unwrap_or_else(|| Moments::for_layer(dense_layer));

            self.update(dense_layer.weights.write(), d_weights.read(), &mut moments.m_weights, &mut moments.v_weights);
            self.update(dense_layer.biases.write(), d_biases.read(), &mut moments.m_biases, &mut moments.v_biases);

            self.moments[index] = Some(moments);
        }
    }
}
