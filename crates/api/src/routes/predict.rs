//! Route definitions for media inference.

use axum::routing::post;
use axum::Router;

use crate::handlers::predict;
use crate::state::AppState;

/// ```text
/// POST   /predict_image     -> predict_image
/// POST   /predict_video     -> predict_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict_image", post(predict::predict_image))
        .route("/predict_video", post(predict::predict_video))
}
