//! Error types for relay operations

use crate::port::{DeliveryError, DeliveryErrorKind};
use std::fmt;
use thiserror::Error;

/// Relay failures, one variant per way a request can end badly
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Input is not a usable username
    #[error("Invalid username: {0}")]
    ValidationError(String),

    /// The listening-history provider could not be reached, refused our
    /// credentials or sent something we could not decode
    #[error("Listening history unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered with nothing to show
    #[error("No listening history")]
    UpstreamEmpty,

    /// The recipient blocked the bot or no longer exists
    #[error("Recipient unreachable: {0}")]
    DeliveryBlocked(String),

    /// Transport-level send failure
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// Anything else; the text is shown to the user
    #[error("{0}")]
    Unknown(String),
}

/// Discriminant of [`RelayError`], cheap to copy into state values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationError,
    UpstreamUnavailable,
    UpstreamEmpty,
    DeliveryBlocked,
    DeliveryFailed,
    Unknown,
}

impl RelayError {
    /// Tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::ValidationError(_) => ErrorKind::ValidationError,
            RelayError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            RelayError::UpstreamEmpty => ErrorKind::UpstreamEmpty,
            RelayError::DeliveryBlocked(_) => ErrorKind::DeliveryBlocked,
            RelayError::DeliveryFailed(_) => ErrorKind::DeliveryFailed,
            RelayError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::UpstreamEmpty => "upstream_empty",
            ErrorKind::DeliveryBlocked => "delivery_blocked",
            ErrorKind::DeliveryFailed => "delivery_failed",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl From<DeliveryError> for RelayError {
    fn from(err: DeliveryError) -> Self {
        match err.kind {
            DeliveryErrorKind::Blocked => RelayError::DeliveryBlocked(err.message),
            DeliveryErrorKind::Failed => RelayError::DeliveryFailed(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::ValidationError("bad name!".to_string());
        assert_eq!(err.to_string(), "Invalid username: bad name!");

        let err = RelayError::Unknown("User not found".to_string());
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(RelayError::UpstreamEmpty.kind(), ErrorKind::UpstreamEmpty);
        assert_eq!(
            RelayError::UpstreamUnavailable("timeout".to_string()).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(ErrorKind::DeliveryBlocked.to_string(), "delivery_blocked");
    }

    #[test]
    fn test_delivery_error_conversion() {
        let err: RelayError =
            DeliveryError::blocked("Forbidden: bot was blocked by the user").into();
        assert_eq!(err.kind(), ErrorKind::DeliveryBlocked);

        let err: RelayError = DeliveryError::failed("Bad Request: message is too long").into();
        match err {
            RelayError::DeliveryFailed(msg) => assert!(msg.contains("too long")),
            other => panic!("Expected DeliveryFailed, got {other:?}"),
        }
    }
}
