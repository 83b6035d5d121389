//! Prediction handler

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Prediction;
use crate::{AppError, AppResult, AppState};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_class: String,
    pub confidence: f64,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        Self {
            predicted_class: p.label,
            confidence: p.confidence,
        }
    }
}

/// Image received in the `file` field
#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// Classify the uploaded image
#[tracing::instrument(name = "predict", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictResponse>> {
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart).await?;

    tracing::info!("Receiving file: {} ({} bytes)", upload.file_name, upload.bytes.len());

    let predictor = state.predictor.clone();
    let span = tracing::Span::current();
    let prediction = tokio::task::spawn_blocking(move || {
        span.in_scope(|| predictor.predict(&upload.bytes))
    })
    .await??;

    Ok(Json(prediction.into()))
}

/// Pull the `file` part out of the form
async fn read_upload(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A part without a filename is a plain form value, not a file
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        if file_name.is_empty() {
            return Err(AppError::BadRequest("No file selected".to_string()));
        }

        let bytes = field.bytes().await?;
        return Ok(Upload { file_name, bytes });
    }

    Err(AppError::BadRequest("No file part in request".to_string()))
}
