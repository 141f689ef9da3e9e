use parley_core::SessionConfig;
use std::net::SocketAddr;
use tracing::Level;
use vapi_web::DEFAULT_API_BASE;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// The voice credentials are optional: a server without them
/// still serves the page, which then reports the missing values when the
/// user tries to start a conversation.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub api_base: String,
    pub session: SessionConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let api_base =
            std::env::var("VAPI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "VAPI_API_BASE".to_string(),
                format!("'{}' is not an http(s) URL", api_base),
            ));
        }

        let session = SessionConfig::new(
            std::env::var("VAPI_PUBLIC_KEY").ok(),
            std::env::var("VAPI_AGENT_ID").ok(),
        );

        Ok(Self {
            bind_address,
            log_level,
            api_base,
            session,
        })
    }
}
