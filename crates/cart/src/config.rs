//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_STORAGE_KEY` - Key the cart blob is stored under (default: `@GoMarketplace:products`)
//! - `CART_DATA_DIR` - Root directory for the file storage backend (default: `./data`)
//! - `CART_STRICT_DECODE` - Fail startup on a malformed stored cart instead of
//!   starting empty (default: false)
//! - `CART_PERSIST_MAX_ATTEMPTS` - Write attempts per snapshot before giving up (default: 3)
//! - `CART_PERSIST_BACKOFF_MS` - Initial retry delay, doubled per attempt (default: 50)
//! - `CART_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Storage key used by the mobile app since its first release.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 50;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Retry policy for persistence writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Attempts per snapshot, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry. Doubles on every further retry.
    pub initial_backoff: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Root directory for [`FileStore`](crate::storage::FileStore)
    pub data_dir: PathBuf,
    /// Treat a malformed stored cart as a startup error
    pub strict_decode: bool,
    /// Persistence retry policy
    pub persist: PersistConfig,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            strict_decode: false,
            persist: PersistConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_key = lookup("CART_STORAGE_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let data_dir = lookup("CART_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let strict_decode = lookup("CART_STRICT_DECODE")
            .map(|value| parse_bool("CART_STRICT_DECODE", &value))
            .transpose()?
            .unwrap_or(false);

        let max_attempts = lookup("CART_PERSIST_MAX_ATTEMPTS")
            .map(|value| parse_number::<u32>("CART_PERSIST_MAX_ATTEMPTS", &value))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_PERSIST_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let backoff_ms = lookup("CART_PERSIST_BACKOFF_MS")
            .map(|value| parse_number::<u64>("CART_PERSIST_BACKOFF_MS", &value))
            .transpose()?
            .unwrap_or(DEFAULT_BACKOFF_MS);

        let log_format = lookup("CART_LOG_FORMAT")
            .map(|value| parse_log_format(&value))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            storage_key,
            data_dir,
            strict_decode,
            persist: PersistConfig {
                max_attempts,
                initial_backoff: Duration::from_millis(backoff_ms),
            },
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "CART_LOG_FORMAT".to_string(),
            format!("expected 'pretty' or 'json', got '{other}'"),
        )),
    }
}
