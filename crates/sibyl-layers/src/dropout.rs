//! Inverted dropout layer.
//!
//! During training, each activation is zeroed with probability `rate` and
//! the survivors are scaled by `1 / (1 - rate)` so that the expected
//! activation magnitude is unchanged. During inference the layer is the
//! identity.

use crate::error::LayerError;
use crate::layer::Layer;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Inverted dropout over any tensor shape.
///
/// Masks are drawn from a seeded generator owned by the layer, so a model
/// built from the same seed trains identically run to run.
///
/// # Example
///
/// ```
/// use sibyl_layers::dropout::Dropout;
/// use sibyl_layers::layer::Layer;
/// use sibyl_layers::tensor::Tensor;
///
/// let layer = Dropout::new(0.2, 42).unwrap();
/// let input = Tensor::ones(&[4, 50]);
/// // Inference mode is the identity.
/// assert_eq!(layer.forward(&input).unwrap(), input);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dropout {
    /// Probability of zeroing each activation.
    rate: f32,
    /// Generator state for mask sampling.
    rng_state: u64,
    /// Mask from the most recent training forward pass.
    #[serde(skip)]
    cached_mask: Option<Tensor>,
}

impl Dropout {
    /// Creates a new dropout layer.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::ConfigError`] unless `0.0 <= rate < 1.0`.
    pub fn new(rate: f32, seed: u64) -> Result<Self, LayerError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(LayerError::ConfigError {
                message: format!("Dropout rate must be in [0, 1), got {}", rate),
            });
        }
        Ok(Self {
            rate,
            rng_state: seed.max(1),
            cached_mask: None,
        })
    }

    /// Returns the dropout rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    fn next_uniform(&mut self) -> f32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        ((self.rng_state >> 33) as f32) / (1u64 << 31) as f32
    }
}

impl Layer for Dropout {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        Ok(input.clone())
    }

    fn forward_train(&mut self, input: &Tensor) -> Result<Tensor, LayerError> {
        if self.rate == 0.0 {
            self.cached_mask = Some(Tensor::ones(input.shape()));
            return Ok(input.clone());
        }

        let keep = 1.0 - self.rate;
        let inv_keep = 1.0 / keep;
        let mask_data: Vec<f32> = (0..input.numel())
            .map(|_| if self.next_uniform() < keep { inv_keep } else { 0.0 })
            .collect();
        let mask = Tensor::from_data(input.shape(), mask_data);
        let output = input.mul(&mask);
        self.cached_mask = Some(mask);
        Ok(output)
    }

    fn backward(&mut self, grad: &Tensor) -> Result<Tensor, LayerError> {
        let mask = self.cached_mask.as_ref().ok_or(LayerError::NotInitialized)?;
        if mask.shape() != grad.shape() {
            return Err(LayerError::ShapeMismatch {
                expected: mask.shape().to_vec(),
                actual: grad.shape().to_vec(),
            });
        }
        Ok(grad.mul(mask))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    fn gradients(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "Dropout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropout_invalid_rate() {
        assert!(Dropout::new(1.0, 42).is_err());
        assert!(Dropout::new(-0.1, 42).is_err());
        assert!(Dropout::new(0.0, 42).is_ok());
    }

    #[test]
    fn test_dropout_inference_is_identity() {
        let layer = Dropout::new(0.5, 42).unwrap();
        let input = Tensor::ones(&[3, 4]);
        assert_eq!(layer.forward(&input).unwrap(), input);
    }

    #[test]
    fn test_dropout_training_masks_and_rescales() {
        let mut layer = Dropout::new(0.5, 42).unwrap();
        let input = Tensor::ones(&[10, 10]);
        let output = layer.forward_train(&input).unwrap();

        let zeros = output.data().iter().filter(|&&x| x == 0.0).count();
        let scaled = output.data().iter().filter(|&&x| (x - 2.0).abs() < 1e-6).count();
        assert_eq!(zeros + scaled, 100);
        assert!(zeros > 0, "expected some activations dropped");
        assert!(scaled > 0, "expected some activations kept");
    }

    #[test]
    fn test_dropout_backward_reuses_mask() {
        let mut layer = Dropout::new(0.5, 42).unwrap();
        let input = Tensor::ones(&[4, 4]);
        let output = layer.forward_train(&input).unwrap();

        let grad = Tensor::ones(&[4, 4]);
        let input_grad = layer.backward(&grad).unwrap();

        // Gradients flow exactly where activations survived.
        for (o, g) in output.data().iter().zip(input_grad.data().iter()) {
            assert_eq!(*o == 0.0, *g == 0.0);
        }
    }

    #[test]
    fn test_dropout_backward_without_forward() {
        let mut layer = Dropout::new(0.5, 42).unwrap();
        let grad = Tensor::ones(&[2, 2]);
        assert!(matches!(
            layer.backward(&grad),
            Err(LayerError::NotInitialized)
        ));
    }
}
