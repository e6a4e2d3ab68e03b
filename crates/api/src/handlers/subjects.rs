//! Handlers for per-subject listings and analytics.
//!
//! A subject is the `module_name` of a log. Summary and trend are computed
//! on the fly from the stored logs.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rollcall_core::analytics::{summarize, trend};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /get_subjects
pub async fn list_subjects(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let subjects = state.store.list_subjects().await?;
    Ok(Json(subjects))
}

/// GET /get_logs_by_subject/{subject}
pub async fn logs_by_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_by_subject(&subject).await?;
    Ok(Json(logs))
}

/// GET /get_summary_by_subject/{subject}
///
/// 404 when the subject has no logs.
pub async fn summary_by_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_by_subject(&subject).await?;
    let summary = summarize(&subject, &logs)?;
    Ok(Json(summary))
}

/// GET /get_chart_data_by_subject/{subject}
///
/// Oldest first; logs with no expected students are left out.
pub async fn chart_by_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_by_subject(&subject).await?;
    Ok(Json(trend(&logs)))
}
