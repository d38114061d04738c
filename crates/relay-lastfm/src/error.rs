//! Error types for Last.fm calls

use relay_core::RelayError;
use relay_utils::ConfigError;
use thiserror::Error;

/// Last.fm error codes that mean "the service or our credentials are the
/// problem", as opposed to a bad request about a particular user
///
/// 4 auth failed, 8 operation failed, 9 invalid session, 10 invalid key,
/// 11 offline, 14 unauthorized token, 16 temporary error, 26 suspended key,
/// 29 rate limited.
const SERVICE_ERROR_CODES: [u32; 9] = [4, 8, 9, 10, 11, 14, 16, 26, 29];

/// Last.fm client errors
#[derive(Debug, Error)]
pub enum LastFmError {
    /// Network, TLS or timeout failure
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a Last.fm error body
    #[error("Last.fm HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Last.fm reported an error in its JSON body
    #[error("Last.fm error {code}: {message}")]
    Api { code: u32, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode Last.fm response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LastFmError {
    /// Whether the failure lies with the service rather than the request
    pub fn is_service_failure(&self) -> bool {
        match self {
            LastFmError::Api { code, .. } => SERVICE_ERROR_CODES.contains(code),
            LastFmError::Config(_) => false,
            LastFmError::Http(_) | LastFmError::Status { .. } | LastFmError::Decode(_) => true,
        }
    }
}

/// Result type alias for Last.fm operations
pub type Result<T> = std::result::Result<T, LastFmError>;

impl From<LastFmError> for RelayError {
    fn from(err: LastFmError) -> Self {
        if err.is_service_failure() {
            return RelayError::UpstreamUnavailable(err.to_string());
        }
        match err {
            LastFmError::Api { message, .. } => RelayError::Unknown(message),
            other => RelayError::Unknown(other.to_string()),
        }
    }
}
