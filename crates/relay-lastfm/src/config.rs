//! Last.fm client configuration

use relay_utils::config::{ConfigError, EnvSource, ProcessEnv, env_or, env_parse, first_env};

pub const DEFAULT_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Last.fm client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastFmConfig {
    /// API key issued by Last.fm
    pub api_key: String,

    /// Endpoint all methods are called on (default: "https://ws.audioscrobbler.com/2.0/")
    pub api_base: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl LastFmConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the key from `API_KEY` (or `LASTFM_API_KEY`), and optionally
    /// `LASTFM_API_BASE` and `LASTFM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let api_key = first_env(env, &["API_KEY", "LASTFM_API_KEY"])
            .ok_or_else(|| ConfigError::Missing("API_KEY".to_string()))?;

        let config = Self {
            api_key,
            api_base: env_or(env, "LASTFM_API_BASE", DEFAULT_API_BASE),
            timeout_secs: env_parse(env, "LASTFM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "LASTFM_TIMEOUT_SECS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
