use std::time::Duration;

use crate::error::{AppError, Result};

pub const UPSTREAM_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

/// Inbound listen port when API_PORT is unset.
pub const DEFAULT_API_PORT: u16 = 9876;

/// Hard deadline for a single upstream fetch. Past this the request is dropped
/// and the category's fallback numbers are served instead.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 500;

/// Capacity of the shared sliding window.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_base_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Upstream deadline in milliseconds (UPSTREAM_TIMEOUT_MS)
    pub upstream_timeout_ms: u64,
    /// Max unique numbers kept in the window (WINDOW_SIZE), always >= 1
    pub window_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?;

        let upstream_timeout_ms = lookup("UPSTREAM_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Config("UPSTREAM_TIMEOUT_MS must be a whole number of milliseconds".to_string())
            })?;

        let window_size = lookup("WINDOW_SIZE")
            .unwrap_or_else(|| DEFAULT_WINDOW_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| AppError::Config("WINDOW_SIZE must be a positive integer".to_string()))?;
        if window_size == 0 {
            return Err(AppError::Config("WINDOW_SIZE must be at least 1".to_string()));
        }

        Ok(Self {
            upstream_base_url: lookup("UPSTREAM_BASE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UPSTREAM_BASE_URL.to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            api_port,
            upstream_timeout_ms,
            window_size,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}
