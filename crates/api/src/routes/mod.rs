pub mod attendance;
pub mod health;
pub mod predict;
pub mod subjects;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const BANNER: &str = "Rollcall attendance API is running";

/// Build the application route tree.
///
/// Paths are kept flat at the root; existing dashboard clients call them
/// directly.
///
/// ```text
/// /                                       banner (GET)
///
/// /predict_image                          count people in an image (POST)
/// /predict_video                          count people in a clip (POST)
///
/// /log_attendance                         record a lecture (POST)
/// /get_logs/{classroom_id}                logs for one classroom (GET)
///
/// /get_subjects                           distinct module names (GET)
/// /get_logs_by_subject/{subject}          logs for one module (GET)
/// /get_summary_by_subject/{subject}       aggregate summary (GET)
/// /get_chart_data_by_subject/{subject}    attendance trend (GET)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .merge(predict::router())
        .merge(attendance::router())
        .merge(subjects::router())
}
