use std::sync::Arc;

use rollcall_db::AttendanceStore;
use rollcall_pipeline::Pipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Attendance log persistence (Postgres or in-memory).
    pub store: Arc<dyn AttendanceStore>,
    /// Media pipeline with its injected detector and annotator.
    pub pipeline: Arc<Pipeline>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
