use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Node configuration, from flags or environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "radiology-jobs", about = "Medical image processing job service")]
pub struct Config {
    /// Address of the HTTP server
    #[arg(long, default_value = "0.0.0.0:8000", env = "RADIOLOGY_BIND")]
    pub bind: SocketAddr,

    /// Root directory for uploads and processed outputs
    #[arg(long, default_value = "uploads", env = "RADIOLOGY_UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Number of in-process task workers (ignored with --executor-url)
    #[arg(long, default_value_t = 4, env = "RADIOLOGY_WORKERS")]
    pub workers: usize,

    /// Maximum number of pending tasks before submissions are refused
    #[arg(long, default_value_t = 1024, env = "RADIOLOGY_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Base URL of a worker node. Without it, tasks run in this process.
    /// Example: --executor-url http://10.0.0.5:8000
    #[arg(long, env = "RADIOLOGY_EXECUTOR_URL")]
    pub executor_url: Option<String>,

    /// Per-request timeout towards the remote executor, in milliseconds
    #[arg(long, default_value_t = 2000, env = "RADIOLOGY_EXECUTOR_TIMEOUT_MS")]
    pub executor_timeout_ms: u64,

    /// Maximum request body size in bytes for uploads (default: 512MB)
    #[arg(long, default_value_t = 512 * 1024 * 1024, env = "RADIOLOGY_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Front-end origin allowed by CORS
    #[arg(long, default_value = "http://localhost:3000", env = "RADIOLOGY_CORS_ORIGIN")]
    pub cors_origin: String,

    /// Log filter, e.g. `info` or `radiology_jobs=debug,tower_http=info`
    #[arg(long, default_value = "info", env = "RADIOLOGY_LOG")]
    pub log_level: String,
}

impl Config {
    pub fn executor_timeout(&self) -> Duration {
        Duration::from_millis(self.executor_timeout_ms)
    }
}
