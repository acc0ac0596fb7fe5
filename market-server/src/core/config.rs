//! Server configuration
//!
//! All settings come from environment variables with sane defaults:
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | WORK_DIR | ./data | working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | LOG_LEVEL | info | tracing level |
//! | LOG_DIR | (unset) | daily-rotated log files when set |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | DELIVERY_WINDOW_MINUTES | 120 | default estimated-arrival window |

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Tracing level
    pub log_level: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
    /// Default delivery window in minutes when no estimate is supplied
    pub delivery_window_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            delivery_window_minutes: std::env::var("DELIVERY_WINDOW_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(120),
        }
    }

    /// Override work dir and port; used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Database file path under the working directory.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("market.db")
    }

    /// Create the working directory if missing.
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
