//! Handlers for image and video inference.
//!
//! Uploads arrive as base64 (optionally a full data URL) in a JSON body. The
//! annotated result is returned the same way together with the head count.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use rollcall_core::data_url::{decode_data_url, encode_data_url};
use rollcall_pipeline::{MediaKind, ProcessedMedia};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for both predict endpoints.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Base64 payload or `data:<mime>;base64,<payload>` URL.
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Annotated media as a data URL.
    pub output: String,
    pub num_students: u64,
}

/// POST /predict_image
pub async fn predict_image(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    let processed = run_job(&state, MediaKind::Image, &input.file).await?;
    Ok(Json(into_response(processed)))
}

/// POST /predict_video
///
/// The count is the floor average of the per-frame counts.
pub async fn predict_video(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    let processed = run_job(&state, MediaKind::Video, &input.file).await?;
    Ok(Json(into_response(processed)))
}

/// Run one job on its own task.
///
/// If this request is dropped (client gone, request timeout) the drop guard
/// cancels the job, which then stops at the next frame and releases its
/// child processes and scratch files.
async fn run_job(state: &AppState, kind: MediaKind, file: &str) -> AppResult<ProcessedMedia> {
    let bytes = decode_data_url(file)?;
    tracing::debug!(?kind, input_bytes = bytes.len(), "Starting media job");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let pipeline = state.pipeline.clone();

    let job = tokio::spawn(async move { pipeline.process(kind, &bytes, &cancel).await });

    let processed = job
        .await
        .map_err(|e| AppError::InternalError(format!("media job task failed: {e}")))??;
    Ok(processed)
}

fn into_response(processed: ProcessedMedia) -> PredictResponse {
    PredictResponse {
        output: encode_data_url(processed.mime, &processed.output),
        num_students: processed.num_students,
    }
}
