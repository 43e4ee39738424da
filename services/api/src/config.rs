//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. There is no ambient global client state:
//! everything the adapters need is constructed from this object and injected.

use std::net::SocketAddr;
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
    pub openai_api_key: Option<String>,
    pub query_model: String,
    pub query_temperature: f32,
    pub query_max_tokens: u32,
    pub allowed_origin: String,
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
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Generation-backend Settings ---
        let query_model =
            std::env::var("QUERY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let query_temperature_str =
            std::env::var("QUERY_TEMPERATURE").unwrap_or_else(|_| "0.1".to_string());
        let query_temperature = query_temperature_str.parse::<f32>().map_err(|e| {
            ConfigError::InvalidValue("QUERY_TEMPERATURE".to_string(), e.to_string())
        })?;

        let query_max_tokens_str =
            std::env::var("QUERY_MAX_TOKENS").unwrap_or_else(|_| "1000".to_string());
        let query_max_tokens = query_max_tokens_str.parse::<u32>().map_err(|e| {
            ConfigError::InvalidValue("QUERY_MAX_TOKENS".to_string(), e.to_string())
        })?;

        let allowed_origin = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            query_model,
            query_temperature,
            query_max_tokens,
            allowed_origin,
        })
    }
}
