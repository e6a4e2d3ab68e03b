use std::path::PathBuf;

use rollcall_pipeline::detection::DEFAULT_CONFIDENCE_THRESHOLD;
use rollcall_pipeline::DEFAULT_PIPELINE_DEPTH;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Video jobs are slow.
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 200 MiB).
    pub max_upload_bytes: usize,
    /// Decoded frames allowed to queue ahead of detection (default: `4`).
    pub pipeline_depth: usize,
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Inference service endpoint frames are posted to.
    pub detector_url: String,
    /// Boxes below this confidence are discarded (default: `0.25`).
    pub detector_confidence: f32,
    /// `ffmpeg` executable (default: looked up on `PATH`).
    pub ffmpeg_path: String,
    /// `ffprobe` executable (default: looked up on `PATH`).
    pub ffprobe_path: String,
    /// Directory for uploaded clips and encoder output (default: system temp dir).
    pub scratch_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `5000`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                            |
    /// | `MAX_UPLOAD_BYTES`     | `209715200`                      |
    /// | `PIPELINE_DEPTH`       | `4`                              |
    /// | `DATABASE_URL`         | unset (in-memory store)          |
    /// | `DETECTOR_URL`         | `http://127.0.0.1:8000/detect`   |
    /// | `DETECTOR_CONFIDENCE`  | `0.25`                           |
    /// | `FFMPEG_PATH`          | `ffmpeg`                         |
    /// | `FFPROBE_PATH`         | `ffprobe`                        |
    /// | `SCRATCH_DIR`          | system temp dir                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "209715200".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let pipeline_depth: usize = std::env::var("PIPELINE_DEPTH")
            .map(|v| v.parse().expect("PIPELINE_DEPTH must be a valid usize"))
            .unwrap_or(DEFAULT_PIPELINE_DEPTH);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let detector_url = std::env::var("DETECTOR_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/detect".into());

        let detector_confidence: f32 = std::env::var("DETECTOR_CONFIDENCE")
            .map(|v| v.parse().expect("DETECTOR_CONFIDENCE must be a valid f32"))
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        let ffmpeg_path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".into());
        let ffprobe_path = std::env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".into());

        let scratch_dir = std::env::var_os("SCRATCH_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            pipeline_depth,
            database_url,
            detector_url,
            detector_confidence,
            ffmpeg_path,
            ffprobe_path,
            scratch_dir,
        }
    }
}
