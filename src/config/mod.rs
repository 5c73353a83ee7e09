//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::util::time::DEFAULT_LATENCY_MS;

const DEFAULT_PORT: u16 = 3000;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Artificial one-way latency applied to every message
    pub latency: Duration,
    /// Directory of static client assets
    pub static_dir: PathBuf,
    /// Arena RNG seed; random when unset
    pub arena_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT wins, then SERVER_ADDR, then the default port
        let server_addr = match (lookup("PORT"), lookup("SERVER_ADDR")) {
            (Some(port), _) => {
                let port: u16 = port
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PORT"))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, Some(addr)) => addr.parse().map_err(|_| ConfigError::InvalidAddress)?,
            (None, None) => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        };

        let latency_ms = match lookup("LATENCY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("LATENCY_MS"))?,
            None => DEFAULT_LATENCY_MS,
        };

        let arena_seed = lookup("ARENA_SEED")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("ARENA_SEED"))?;

        let log_json = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => false,
            Some("json") => true,
            Some(_) => return Err(ConfigError::Invalid("LOG_FORMAT")),
        };

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json,
            latency: Duration::from_millis(latency_ms),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            arena_seed,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
