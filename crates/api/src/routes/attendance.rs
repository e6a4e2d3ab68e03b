//! Route definitions for attendance logging.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// ```text
/// POST   /log_attendance              -> log_attendance
/// GET    /get_logs/{classroom_id}     -> logs_by_classroom
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/log_attendance", post(attendance::log_attendance))
        .route("/get_logs/{classroom_id}", get(attendance::logs_by_classroom))
}
