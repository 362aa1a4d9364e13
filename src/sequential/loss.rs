use super::tensor::Tensor;

pub trait Loss: Send {
    fn calculate(&self, y_pred: &Tensor, y_true: &Tensor) -> f32;
    fn gradient(&self, y_pred: &Tensor, y_true: &Tensor) -> Tensor;
}


// mean squared error, averaged over every element of the batch

#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn calculate(&self, y_pred: &Tensor, y_true: &Tensor) -> f32 {
        let count = y_pred.read().len();
        if count == 0 {
            return 0.0;
        }
        let squared_errors = y_pred.map2(y_true, |pred_x, true_x| (pred_x - true_x).powi(2));
        squared_errors.read().iter().sum::<f32>() / count as f32
    }

    fn gradient(&self, y_pred: &Tensor, y_true: &Tensor) -> Tensor {
        let count = y_pred.read().len().max(1) as f32;
        y_pred.map2(y_true, |pred_x, true_x| 2.0 * (pred_x - true_x) / count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_approx_eq(a: &[f32], b: &[f32]) {
        let tolerance = 1e-6;
        assert_eq!(a.len(), b.len(), "vectors have different lengths");
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < tolerance, "mismatch at index {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_mse_calculation() {
        let y_pred = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let y_true = Tensor::from_vec(vec![1.0, 2.0, 5.0, 4.0, 5.0, 3.0], vec![2, 3]);

        // (0 + 0 + 4 + 0 + 0 + 9) / 6
        let loss = MeanSquaredError.calculate(&y_pred, &y_true);
        assert!((loss - 13.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_mse_gradient_is_zero_where_target_matches() {
        let y_pred = Tensor::from_vec(vec![0.5, 1.0, -1.0], vec![1, 3]);
        let y_true = Tensor::from_vec(vec![0.5, 4.0, -1.0], vec![1, 3]);

        let gradient = MeanSquaredError.gradient(&y_pred, &y_true);

        // 2 * (1 - 4) / 3
        assert_vec_approx_eq(gradient.read(), &[0.0, -2.0, 0.0]);
    }

    #[test]
    fn test_mse_empty_batch() {
        let empty = Tensor::zeros(vec![0, 3]);
        assert_eq!(MeanSquaredError.calculate(&empty, &empty), 0.0);
    }
}
