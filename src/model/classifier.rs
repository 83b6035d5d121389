//! Inference engine abstraction

use ndarray::Array4;
use thiserror::Error;

use super::InputSpec;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Input shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: [usize; 4],
        actual: Vec<usize>,
    },

    #[error("Inference failed: {0}")]
    Runtime(String),

    #[error("Model produced no output")]
    NoOutput,
}

/// Trait for inference engines (ONNX, stubs in tests, ...)
///
/// Implementations must be deterministic: the same batch yields the same scores.
pub trait Classifier: Send + Sync {
    /// Human readable identifier for logs
    fn name(&self) -> &str;

    /// Input the model expects
    fn input_spec(&self) -> InputSpec;

    /// Run one forward pass and return the class scores of the single batch element
    fn scores(&self, batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// Reject a batch whose shape differs from `spec`
pub fn check_shape(batch: &Array4<f32>, spec: &InputSpec) -> Result<(), ClassifierError> {
    let expected = spec.shape();
    if batch.shape() != expected {
        return Err(ClassifierError::Shape {
            expected,
            actual: batch.shape().to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shape() {
        let spec = InputSpec { size: 4, ..Default::default() };
        assert!(check_shape(&Array4::zeros((1, 4, 4, 3)), &spec).is_ok());

        let err = check_shape(&Array4::zeros((1, 3, 4, 4)), &spec).unwrap_err();
        assert!(err.to_string().contains("expected [1, 4, 4, 3]"));
    }
}
