use std::sync::Arc;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use std::fmt;
use serde::{Serialize, Deserialize, Serializer, Deserializer};

/// Row-major tensor. Clones and transposes share the buffer; writing to a
/// shared buffer copies it first.
pub struct Tensor {
    pub data: Arc<Vec<f32>>,
    pub shape: Vec<usize>,
    pub strides: Vec<usize>
}

impl Tensor {
    pub fn zeros(shape: Vec<usize>) -> Self {
        let data: Vec<f32> = vec![0.0; shape.iter().product()];
        Tensor::from_vec(data, shape)
    }

    /// Samples every element from N(0, std_dev^2).
    pub fn random<R: Rng + ?Sized>(shape: Vec<usize>, std_dev: f32, rng: &mut R) -> Self {
        let data: Vec<f32> = (0..shape.iter().product())
            .map(|_| {
                let sample: f32 = StandardNormal.sample(rng);
                sample * std_dev
            })
            .collect();
        Tensor::from_vec(data, shape)
    }

    pub fn from_vec(data: Vec<f32>, shape: Vec<usize>) -> Self {
        assert_eq!(data.len(), shape.iter().product::<usize>(), "data does not fit shape {:?}", shape);
        Self {
            data: Arc::new(data),
            strides: Tensor::calc_strides(&shape),
            shape
        }
    }

    /// Stacks equally sized rows into a [rows.len(), width] tensor.
    pub fn from_rows<const N: usize>(rows: &[[f32; N]]) -> Self {
        let data: Vec<f32> = rows.iter().flat_map(|row| row.iter().copied()).collect();
        Tensor::from_vec(data, vec![rows.len(), N])
    }

    pub fn read(&self) -> &[f32] {
        &self.data
    }

    pub fn write(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Row `i` of a contiguous 2D tensor.
    pub fn row(&self, i: usize) -> &[f32] {
        let n = self.cols();
        &self.read()[i * n..(i + 1) * n]
    }

    pub fn transpose(&self) -> Self {
        let mut new_shape = self.shape.clone();
        new_shape.reverse();
        let mut new_strides = self.strides.clone();
        new_strides.reverse();

        Self {
            data: Arc::clone(&self.data),
            shape: new_shape,
            strides: new_strides
        }
    }

    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.shape.len(), 2, "self must be a 2D tensor.");
        assert_eq!(other.shape.len(), 2, "other must be a 2D tensor.");
        assert_eq!(self.shape[1], other.shape[0], "self columns must equal other rows");

        let m = self.shape[0];
        let k = self.shape[1];
        let n = other.shape[1];

        let mut c = vec![0.0; m * n];
        if n == 0 {
            return Tensor::from_vec(c, vec![m, n]);
        }

        let a_data = self.read();
        let b_data = other.read();
        let (a_strides, b_strides) = (&self.strides, &other.strides);

        c.par_chunks_mut(n).enumerate().for_each(|(m_idx, c_row)| {
            for k_idx in 0..k {
                let a_val = a_data[m_idx * a_strides[0] + k_idx * a_strides[1]];
                if a_val == 0.0 {
                    continue;
                }
                for n_idx in 0..n {
                    let b_val = b_data[k_idx * b_strides[0] + n_idx * b_strides[1]];
                    c_row[n_idx] += a_val * b_val;
                }
            }
        });

        Tensor::from_vec(c, vec![m, n])
    }

    pub fn sum(&self, axis: usize) -> Tensor {
        assert!(axis < self.shape.len(), "axis out of bounds");
        assert_eq!(self.shape.len(), 2, "sum only works for 2D tensors");

        let data = self.read();
        let m = self.shape[0];
        let n = self.shape[1];

        if axis == 0 {
            let mut acc = vec![0.0; n];
            for row in data.chunks(n.max(1)) {
                for (a, x) in acc.iter_mut().zip(row) {
                    *a += x;
                }
            }
            Tensor::from_vec(acc, vec![1, n])
        } else {
            let sums: Vec<f32> = data.par_chunks(n.max(1)).map(|row| row.iter().sum()).collect();
            Tensor::from_vec(sums, vec![m, 1])
        }
    }

    pub fn map<F>(&self, f: F) -> Tensor
    where F: Fn(f32) -> f32 + Sync + Send {
        let new_data: Vec<f32> = self.read().par_iter().map(|&x| f(x)).collect();
        Tensor::from_vec(new_data, self.shape.clone())
    }

    // map through self allowing access to second tensor
    pub fn map2<F>(&self, other: &Tensor, f: F) -> Tensor
    where F: Fn(f32, f32) -> f32 + Sync + Send {
        assert_eq!(self.shape, other.shape, "tensors must have the same shape");

        let new_data: Vec<f32> = self.read().par_iter()
            .zip(other.read().par_iter())
            .map(|(&x1, &x2)| f(x1, x2))
            .collect();
        Tensor::from_vec(new_data, self.shape.clone())
    }

    fn calc_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides: Vec<usize> = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i+1] * shape[i+1];
        }
        strides
    }
}

impl Clone for Tensor {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            shape: self.shape.clone(),
            strides: self.strides.clone()
        }
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
         .field("shape", &self.shape)
         .field("data", &self.data)
         .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct SerializableTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Serialize for Tensor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        let s_tensor = SerializableTensor {
            shape: self.shape.clone(),
            data: self.read().to_vec()
        };
        s_tensor.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tensor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        let s_tensor = SerializableTensor::deserialize(deserializer)?;
        if s_tensor.data.len() != s_tensor.shape.iter().product::<usize>() {
            return Err(serde::de::Error::custom(format!(
                "tensor of shape {:?} cannot hold {} values", s_tensor.shape, s_tensor.data.len()
            )));
        }
        Ok(Tensor::from_vec(s_tensor.data, s_tensor.shape))
    }
}
