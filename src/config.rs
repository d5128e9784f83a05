use std::env;

use crate::notify::DEFAULT_TOAST_TTL_MS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the shell's configuration. Immutable once loaded; `main` consumes it while
/// assembling the server.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and how strict loading is.
    pub env: Env,
    // Socket address the HTTP surface binds to.
    pub bind_addr: String,
    // How long a toast stays on screen, in milliseconds.
    pub toast_ttl_ms: u64,
}

/// Env
///
/// Runtime context: pretty logs and permissive defaults locally, JSON logs and explicit
/// settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Startup configuration problems. Loading fails fast instead of running half-configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test setup, without touching the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `BIND_ADDR` and `TOAST_TTL_MS` from the environment.
    ///
    /// # Errors
    /// `BIND_ADDR` is mandatory in production; `TOAST_TTL_MS` must parse when present.
    pub fn load() -> Result<Self, ConfigError> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = match env {
            Env::Production => {
                env::var("BIND_ADDR").map_err(|_| ConfigError::Missing("BIND_ADDR"))?
            }
            Env::Local => env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        };

        let toast_ttl_ms = match env::var("TOAST_TTL_MS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "TOAST_TTL_MS",
                    value,
                })?,
            Err(_) => DEFAULT_TOAST_TTL_MS,
        };

        Ok(Self {
            env,
            bind_addr,
            toast_ttl_ms,
        })
    }
}
