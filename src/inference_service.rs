use crate::{
    classification::Prediction,
    model_service::{ModelService, ModelServiceError},
    preprocessing::transform_image_bytes,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("inference failed: {0}")]
    Model(#[from] ModelServiceError),
    #[error("inference task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct InferenceService<M: ModelService> {
    model_service: Arc<M>,
}

impl<M: ModelService> Clone for InferenceService<M> {
    fn clone(&self) -> Self {
        Self {
            model_service: self.model_service.clone(),
        }
    }
}

impl<M: ModelService> InferenceService<M> {
    pub fn new(model_service: M) -> Self {
        Self {
            model_service: Arc::new(model_service),
        }
    }

    /// Decodes, preprocesses and classifies one uploaded image.
    ///
    /// The work runs on the blocking pool; the forward pass is CPU bound.
    pub async fn predict(&self, image_data: Vec<u8>) -> Result<Prediction, InferenceError> {
        let model_service = self.model_service.clone();

        let score = tokio::task::spawn_blocking(move || -> Result<f32, InferenceError> {
            let input = transform_image_bytes(&image_data)?;
            Ok(model_service.score(&input)?)
        })
        .await??;

        let prediction = Prediction::from_score(score);
        tracing::debug!(
            "score={:.4}, label={}, confidence={}",
            score,
            prediction.label,
            prediction.confidence
        );

        Ok(prediction)
    }
}
