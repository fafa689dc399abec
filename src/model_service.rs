use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelServiceError {
    #[error("onnx runtime error: {0}")]
    Runtime(#[from] ort::Error),
    #[error("model returned an empty output tensor")]
    EmptyOutput,
    #[error("model returned a non-finite score: {0}")]
    NonFiniteScore(f32),
}

/// A loaded binary classifier. Implementations must be safe to call from
/// several requests at once; the handlers only ever borrow them.
pub trait ModelService: Send + Sync + 'static {
    /// Runs a forward pass on a `[1, 60, 60, 3]` tensor and returns the
    /// dog probability.
    fn score(&self, input: &Array<f32, Ix4>) -> Result<f32, ModelServiceError>;
}
