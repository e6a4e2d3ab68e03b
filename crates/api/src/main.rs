use std::net::SocketAddr;
use std::sync::Arc;

use rollcall_db::{AttendanceStore, MemoryAttendanceStore, PgAttendanceStore};
use rollcall_pipeline::ffmpeg::MediaTools;
use rollcall_pipeline::{BoxOutlineAnnotator, HttpDetector, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rollcall_api=debug,rollcall_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store: Arc<dyn AttendanceStore> = match &config.database_url {
        Some(database_url) => {
            let pool = rollcall_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            rollcall_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            rollcall_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgAttendanceStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, attendance logs are kept in memory only");
            Arc::new(MemoryAttendanceStore::new())
        }
    };

    // --- Media pipeline ---
    let tools = MediaTools {
        ffmpeg: config.ffmpeg_path.clone(),
        ffprobe: config.ffprobe_path.clone(),
        scratch_dir: config.scratch_dir.clone(),
    };
    if !tools.ffmpeg_available().await {
        tracing::warn!(ffmpeg = %tools.ffmpeg, "ffmpeg not runnable, video requests will fail");
    }

    let detector = HttpDetector::new(config.detector_url.clone(), config.detector_confidence);
    tracing::info!(
        url = %detector.url(),
        confidence = config.detector_confidence,
        depth = config.pipeline_depth,
        "Media pipeline configured"
    );

    let pipeline = Pipeline::new(
        Arc::new(detector),
        Arc::new(BoxOutlineAnnotator::default()),
        tools,
        config.pipeline_depth,
    );

    // --- App state ---
    let state = AppState {
        store,
        pipeline: Arc::new(pipeline),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
