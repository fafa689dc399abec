use crate::{
    classification::Label, inference_service::InferenceError, model_service::ModelService,
    server::SharedState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

/// Name of the multipart form field carrying the upload.
pub const FILE_FIELD: &str = "file";

#[derive(Serialize, Debug)]
pub struct PredictionResponse {
    filename: String,
    predicted_class: Label,
    confidence: f64,
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Missing `file` field in form data")]
    MissingFile,
    #[error("Upload in `file` field has no filename")]
    MissingFilename,
    #[error("{0}")]
    Inference(#[from] InferenceError),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match &self {
            PredictError::Multipart(err) => err.status(),
            PredictError::MissingFile | PredictError::MissingFilename => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict<M: ModelService>(
    State(state): State<SharedState<M>>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, PredictError> {
    let (filename, image_data) = read_upload(&mut multipart).await?;
    tracing::debug!("Received {} ({} bytes)", filename, image_data.len());

    let prediction = state
        .inference_service
        .predict(image_data)
        .await
        .inspect_err(|e| tracing::error!("Prediction failed for {}: {}", filename, e))?;

    Ok(Json(PredictionResponse {
        filename,
        predicted_class: prediction.label,
        confidence: prediction.confidence,
    }))
}

/// Finds the `file` part. A part without a filename is a plain form value,
/// not an upload, and is rejected.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), PredictError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let filename = field
                .file_name()
                .map(str::to_owned)
                .ok_or(PredictError::MissingFilename)?;
            let data = field.bytes().await?;
            return Ok((filename, data.to_vec()));
        }
    }

    Err(PredictError::MissingFile)
}
