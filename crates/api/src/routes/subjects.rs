//! Route definitions for per-subject analytics.

use axum::routing::get;
use axum::Router;

use crate::handlers::subjects;
use crate::state::AppState;

/// ```text
/// GET    /get_subjects                          -> list_subjects
/// GET    /get_logs_by_subject/{subject}         -> logs_by_subject
/// GET    /get_summary_by_subject/{subject}      -> summary_by_subject
/// GET    /get_chart_data_by_subject/{subject}   -> chart_by_subject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get_subjects", get(subjects::list_subjects))
        .route("/get_logs_by_subject/{subject}", get(subjects::logs_by_subject))
        .route(
            "/get_summary_by_subject/{subject}",
            get(subjects::summary_by_subject),
        )
        .route(
            "/get_chart_data_by_subject/{subject}",
            get(subjects::chart_by_subject),
        )
}
