//! Layer trait definition for neural network layers.

use crate::error::LayerError;
use crate::tensor::Tensor;

/// A neural network layer that supports forward and backward propagation.
///
/// Each layer must be able to:
/// - Perform an inference forward pass
/// - Perform a training forward pass that caches intermediate activations
/// - Perform a backward pass that computes input and parameter gradients
/// - Expose its learnable parameters and their gradients
///
/// # Example
///
/// ```
/// use sibyl_layers::dense::Dense;
/// use sibyl_layers::layer::Layer;
/// use sibyl_layers::tensor::Tensor;
///
/// let layer = Dense::new(50, 1, 42);
/// let input = Tensor::zeros(&[32, 50]); // batch of 32
/// let output = layer.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[32, 1]);
/// ```
pub trait Layer: Send + Sync {
    /// Performs an inference forward pass through the layer.
    ///
    /// Stochastic layers (e.g. dropout) are inactive in this mode.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] if the input shape is incompatible with the
    /// layer.
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError>;

    /// Performs a training forward pass, caching whatever the backward pass
    /// will need.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] if the input shape is incompatible.
    fn forward_train(&mut self, input: &Tensor) -> Result<Tensor, LayerError>;

    /// Performs a backward pass through the layer.
    ///
    /// Takes the gradient of the loss with respect to the layer's output,
    /// stores the gradients of the layer's parameters, and returns the
    /// gradient with respect to the layer's input.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::NotInitialized`] if no training forward pass
    /// has been cached, or a shape error if the gradient is incompatible.
    fn backward(&mut self, grad: &Tensor) -> Result<Tensor, LayerError>;

    /// Returns references to the layer's learnable parameters.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Returns mutable references to the layer's learnable parameters.
    ///
    /// This is used by optimizers to update the layer's weights during
    /// training.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Returns the most recent parameter gradients, aligned with
    /// [`Layer::parameters`].
    ///
    /// Empty until [`Layer::backward`] has run.
    fn gradients(&self) -> Vec<&Tensor>;

    /// Returns the name of the layer for debugging and logging purposes.
    fn name(&self) -> &str {
        "Layer"
    }
}
