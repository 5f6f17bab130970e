//! Configuration module for the DonorOps backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

/// Default storage quota, matching the usual per-origin browser storage limit.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// `DONOROPS_DB_PATH` value that selects process-local storage instead of SQLite.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid DONOROPS_LOG_FORMAT '{}', expected text or json",
                other
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for admin API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file backing the blob storage
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Run the seed step before serving
    pub seed_on_start: bool,
    /// Maximum size of one stored blob
    pub storage_quota_bytes: usize,
    /// Optional remote dashboard API base URL
    pub dashboard_api_url: Option<String>,
    /// Timeout for the remote dashboard request
    pub dashboard_timeout: Duration,
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_psk = lookup("DONOROPS_API_PSK").filter(|psk| !psk.is_empty());

        let db_path = lookup("DONOROPS_DB_PATH")
            .unwrap_or_else(|| "./data/donorops.sqlite".to_string())
            .into();

        let bind_addr = parse_var(&lookup, "DONOROPS_BIND_ADDR", "127.0.0.1:8080")?;

        let log_level = lookup("DONOROPS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = parse_var(&lookup, "DONOROPS_LOG_FORMAT", "text")?;
        let seed_on_start = parse_var(&lookup, "DONOROPS_SEED_ON_START", "true")?;

        let storage_quota_bytes = match lookup("DONOROPS_STORAGE_QUOTA_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::Config(format!("Invalid DONOROPS_STORAGE_QUOTA_BYTES '{}'", raw))
            })?,
            None => DEFAULT_STORAGE_QUOTA_BYTES,
        };

        let dashboard_api_url = lookup("DONOROPS_DASHBOARD_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let timeout_secs: u64 = parse_var(&lookup, "DONOROPS_DASHBOARD_TIMEOUT_SECS", "5")?;

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_format,
            seed_on_start,
            storage_quota_bytes,
            dashboard_api_url,
            dashboard_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Whether data lives only in this process.
    pub fn uses_memory_storage(&self) -> bool {
        self.db_path.as_os_str() == MEMORY_DB_PATH
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid {} value '{}'", name, raw)))
}
