//! Handlers for recording and listing attendance logs.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rollcall_core::attendance::{build_log, validate_new_log, NewAttendanceLog};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /log_attendance
///
/// Stamps the record with the current time and derives the absent count.
pub async fn log_attendance(
    State(state): State<AppState>,
    body: Result<Json<NewAttendanceLog>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    validate_new_log(&input)?;

    let log = build_log(input);
    state.store.append(&log).await?;

    tracing::info!(
        classroom_id = %log.classroom_id,
        module_name = %log.module_name,
        detected = log.num_students_detected,
        expected = log.total_students_expected,
        absent = log.absent_students,
        "Attendance logged",
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Attendance logged successfully",
        }),
    ))
}

/// GET /get_logs/{classroom_id}
///
/// Newest first. An unknown classroom yields an empty list.
pub async fn logs_by_classroom(
    State(state): State<AppState>,
    Path(classroom_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_by_classroom(&classroom_id).await?;
    Ok(Json(logs))
}
