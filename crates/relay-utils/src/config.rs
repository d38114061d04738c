//! Environment-driven configuration helpers
//!
//! Config structs across the workspace read their values through an
//! [`EnvSource`] so that tests can feed a plain map instead of mutating the
//! process environment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set (or is empty)
    #[error("{0} not set")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Source of configuration variables
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| (*v).to_string())
    }
}

/// Load a `.env` file from the working directory (or its parents), if any
///
/// Variables already present in the environment are not overridden.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Non-empty value of `key`
pub fn optional_env(env: &impl EnvSource, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First non-empty value among `keys`, in order
pub fn first_env(env: &impl EnvSource, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| optional_env(env, key))
}

/// Value of `key`, or [`ConfigError::Missing`]
pub fn required_env(env: &impl EnvSource, key: &str) -> Result<String, ConfigError> {
    optional_env(env, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Value of `key`, or `default` when unset
pub fn env_or(env: &impl EnvSource, key: &str, default: &str) -> String {
    optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse `key` with [`FromStr`], falling back to `default` when unset
pub fn env_parse<T>(env: &impl EnvSource, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(env, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse a boolean switch such as `RELAY_SUPPORT_INLINE=off`
pub fn env_flag(env: &impl EnvSource, key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = optional_env(env, key) else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got '{raw}'"),
        }),
    }
}
