use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 20;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_CACHE_TTL_SEC: u64 = 30 * 60;

/// Process configuration, resolved once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openrouter_api_key: Option<String>,
    pub api_base: String,
    pub model_name: Option<String>,
    pub max_input_chars: usize,
    pub request_timeout: Duration,
    pub summary_language: String,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(var("PORT"), "PORT", 3000u16)?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            api_base: var("LLM_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model_name: var("MODEL_NAME"),
            max_input_chars: parse_or(var("MAX_INPUT_CHARS"), "MAX_INPUT_CHARS", DEFAULT_MAX_INPUT_CHARS)?,
            request_timeout: Duration::from_secs(parse_or(
                var("REQUEST_TIMEOUT_SEC"),
                "REQUEST_TIMEOUT_SEC",
                DEFAULT_REQUEST_TIMEOUT_SEC,
            )?),
            summary_language: var("SUMMARY_LANGUAGE").unwrap_or_else(|| "Russian".to_string()),
            cache_capacity: parse_or(var("CACHE_CAPACITY"), "CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
            cache_ttl: Duration::from_secs(parse_or(
                var("CACHE_TTL_SEC"),
                "CACHE_TTL_SEC",
                DEFAULT_CACHE_TTL_SEC,
            )?),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
