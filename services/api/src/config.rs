//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    /// Interval between reminder scheduler polls.
    pub reminder_poll: Duration,
    /// How long a recitation cue asks the client to play, in milliseconds.
    pub audio_duration_ms: u64,
    pub recitation_base_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Scheduler and Audio Settings ---
        let poll_secs_str =
            std::env::var("REMINDER_POLL_SECS").unwrap_or_else(|_| "30".to_string());
        let poll_secs = poll_secs_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "REMINDER_POLL_SECS".to_string(),
                format!("'{}' is not a number of seconds", poll_secs_str),
            )
        })?;
        if poll_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REMINDER_POLL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let audio_ms_str =
            std::env::var("AUDIO_DURATION_MS").unwrap_or_else(|_| "8000".to_string());
        let audio_duration_ms = audio_ms_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "AUDIO_DURATION_MS".to_string(),
                format!("'{}' is not a number of milliseconds", audio_ms_str),
            )
        })?;

        let recitation_base_url = std::env::var("RECITATION_BASE_URL")
            .unwrap_or_else(|_| "https://everyayah.com/data/Alafasy_128kbps".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            reminder_poll: Duration::from_secs(poll_secs),
            audio_duration_ms,
            recitation_base_url,
        })
    }
}
