//! Dense (fully connected) layer implementation.
//!
//! This module provides the [`Dense`] layer, which performs a linear
//! transformation `y = xW + b` where W is the weight matrix and b is the
//! bias vector.

use crate::error::LayerError;
use crate::layer::Layer;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// A dense (fully connected) neural network layer.
///
/// Performs the transformation `y = xW + b` where:
/// - `x` is the input tensor of shape `[batch_size, in_features]`
/// - `W` is the weight matrix of shape `[in_features, out_features]`
/// - `b` is the bias vector of shape `[out_features]`
///
/// # Example
///
/// ```
/// use sibyl_layers::dense::Dense;
/// use sibyl_layers::layer::Layer;
/// use sibyl_layers::tensor::Tensor;
///
/// let layer = Dense::new(50, 1, 42);
/// let input = Tensor::zeros(&[8, 50]);
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[8, 1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    /// Weight matrix of shape [in_features, out_features]
    weights: Tensor,
    /// Bias vector of shape [out_features]
    bias: Tensor,
    /// Gradient of weights
    #[serde(skip)]
    weights_grad: Option<Tensor>,
    /// Gradient of bias
    #[serde(skip)]
    bias_grad: Option<Tensor>,
    /// Cached input for backward pass
    #[serde(skip)]
    cached_input: Option<Tensor>,
    /// Input feature dimension
    in_features: usize,
    /// Output feature dimension
    out_features: usize,
}

impl Dense {
    /// Creates a new dense layer with the specified input and output
    /// dimensions.
    ///
    /// Weights are initialized with Glorot uniform scaling driven by the
    /// given seed; biases start at zero.
    pub fn new(in_features: usize, out_features: usize, seed: u64) -> Self {
        let limit = (6.0 / (in_features + out_features) as f32).sqrt();
        Self {
            weights: Tensor::rand_uniform(&[in_features, out_features], limit, seed),
            bias: Tensor::zeros(&[out_features]),
            weights_grad: None,
            bias_grad: None,
            cached_input: None,
            in_features,
            out_features,
        }
    }

    /// Returns the input feature dimension.
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Returns the output feature dimension.
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Returns a reference to the weights tensor.
    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// Returns a reference to the bias tensor.
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    fn check_input(&self, input: &Tensor) -> Result<(), LayerError> {
        if input.ndim() != 2 {
            return Err(LayerError::ForwardError {
                message: format!("Dense expects 2D input, got {}D", input.ndim()),
            });
        }
        if input.shape()[1] != self.in_features {
            return Err(LayerError::InvalidInputDimension {
                expected: self.in_features,
                actual: input.shape()[1],
            });
        }
        Ok(())
    }
}

impl Layer for Dense {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        self.check_input(input)?;
        Ok(input.matmul(&self.weights).add(&self.bias))
    }

    fn forward_train(&mut self, input: &Tensor) -> Result<Tensor, LayerError> {
        self.check_input(input)?;
        self.cached_input = Some(input.clone());
        Ok(input.matmul(&self.weights).add(&self.bias))
    }

    fn backward(&mut self, grad: &Tensor) -> Result<Tensor, LayerError> {
        let input = self
            .cached_input
            .as_ref()
            .ok_or(LayerError::NotInitialized)?;

        if grad.ndim() != 2 || grad.shape()[1] != self.out_features {
            return Err(LayerError::ShapeMismatch {
                expected: vec![input.shape()[0], self.out_features],
                actual: grad.shape().to_vec(),
            });
        }

        // dL/dW = x^T @ dL/dy, dL/db = sum(dL/dy, axis=0)
        self.weights_grad = Some(input.transpose().matmul(grad));
        self.bias_grad = Some(grad.sum_axis(0));

        // dL/dx = dL/dy @ W^T
        Ok(grad.matmul(&self.weights.transpose()))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weights, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weights, &mut self.bias]
    }

    fn gradients(&self) -> Vec<&Tensor> {
        match (&self.weights_grad, &self.bias_grad) {
            (Some(w), Some(b)) => vec![w, b],
            _ => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "Dense"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_creation() {
        let layer = Dense::new(64, 32, 42);
        assert_eq!(layer.in_features(), 64);
        assert_eq!(layer.out_features(), 32);
        assert_eq!(layer.weights().shape(), &[64, 32]);
        assert_eq!(layer.bias().shape(), &[32]);
    }

    #[test]
    fn test_dense_forward() {
        let layer = Dense::new(10, 5, 42);
        let input = Tensor::ones(&[3, 10]);

        let output = layer.forward(&input).unwrap();
        assert_eq!(output.shape(), &[3, 5]);
    }

    #[test]
    fn test_dense_forward_invalid_input() {
        let layer = Dense::new(10, 5, 42);
        let input = Tensor::ones(&[3, 20]); // wrong input dimension

        let result = layer.forward(&input);
        assert!(result.is_err());
    }

    #[test]
    fn test_dense_backward() {
        let mut layer = Dense::new(10, 5, 42);
        let input = Tensor::ones(&[3, 10]);

        let _output = layer.forward_train(&input).unwrap();

        let grad = Tensor::ones(&[3, 5]);
        let input_grad = layer.backward(&grad).unwrap();

        assert_eq!(input_grad.shape(), &[3, 10]);
        assert_eq!(layer.gradients().len(), 2);
        assert_eq!(layer.gradients()[0].shape(), &[10, 5]);
        assert_eq!(layer.gradients()[1].shape(), &[5]);
    }

    #[test]
    fn test_dense_backward_without_forward() {
        let mut layer = Dense::new(4, 2, 42);
        let grad = Tensor::ones(&[1, 2]);
        assert!(matches!(
            layer.backward(&grad),
            Err(LayerError::NotInitialized)
        ));
    }

    #[test]
    fn test_dense_gradient_matches_finite_difference() {
        let mut layer = Dense::new(3, 1, 11);
        let input = Tensor::from_data(&[1, 3], vec![0.5, -1.0, 2.0]);

        let out = layer.forward_train(&input).unwrap();
        let grad = Tensor::ones(&[1, 1]);
        layer.backward(&grad).unwrap();
        let analytic = layer.gradients()[0].data()[0];

        // Perturb w[0,0] and compare against (f(w+e) - f(w-e)) / 2e.
        let eps = 1e-3;
        let base = layer.weights().data()[0];
        layer.parameters_mut()[0].data_mut()[0] = base + eps;
        let plus = layer.forward(&input).unwrap().data()[0];
        layer.parameters_mut()[0].data_mut()[0] = base - eps;
        let minus = layer.forward(&input).unwrap().data()[0];
        let numeric = (plus - minus) / (2.0 * eps);

        assert!((analytic - numeric).abs() < 1e-3);
        let _ = out;
    }
}
