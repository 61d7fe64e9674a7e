use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use tokio::time::Instant;
use tracing::level_filters::LevelFilter;

use crate::errors::AppError;
use crate::services::expiry::DEFAULT_TTL;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    pub server_version: String,

    /// How long (seconds) each observation stays counted.
    #[serde(default = "default_expiry_seconds")]
    pub expiry_seconds: u64,
}

fn default_expiry_seconds() -> u64 {
    DEFAULT_TTL.as_secs()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let file = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&file)
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let cfg = serde_json::from_str::<AppConfig>(json)?;

        // Every observation's deadline is its timestamp plus this window.
        if Instant::now().checked_add(cfg.expiry()).is_none() {
            return Err(AppError::ExpiryOutOfRange(cfg.expiry_seconds));
        }

        Ok(cfg)
    }

    /// Look for config.json next to the executable, then one directory up.
    pub fn locate(exe_dir: &Path) -> Result<std::path::PathBuf, AppError> {
        let primary = exe_dir.join("config.json");
        if primary.exists() {
            return Ok(primary);
        }

        let fallback = exe_dir.join("..").join("config.json");
        if fallback.exists() {
            return Ok(fallback);
        }

        Err(AppError::ConfigMissing(exe_dir.display().to_string()))
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_seconds)
    }

    /// Unknown levels fall back to INFO.
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info"  => LevelFilter::INFO,
            "warn"  => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        }
    }
}
