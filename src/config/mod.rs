//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Process configuration loaded from environment variables. Game tuning
/// lives in [`crate::game::GameConfig`]; this covers the process-level
/// knobs only.
#[derive(Clone, Debug)]
pub struct Config {
    /// Relay binding address (`relay` mode).
    pub relay_addr: SocketAddr,
    /// Relay WebSocket URL (`host`/`join` modes).
    pub relay_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Viewport the authoritative peer generates terrain for.
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let relay_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("RELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        Ok(Self {
            relay_addr: relay_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            relay_url: env::var("RELAY_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            viewport_width: parse_dimension("VIEWPORT_WIDTH", 1280.0)?,
            viewport_height: parse_dimension("VIEWPORT_HEIGHT", 720.0)?,
        })
    }
}

fn parse_dimension(var: &'static str, default: f32) -> Result<f32, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<f32>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or(ConfigError::InvalidDimension(var)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid relay address format")]
    InvalidAddress,

    #[error("Invalid viewport dimension in {0}")]
    InvalidDimension(&'static str),
}
