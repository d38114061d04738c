//! Seams between the relay and the outside world
//!
//! The relay talks to exactly two collaborators: a listening-history
//! provider it reads from and a messaging transport it writes to. Both are
//! traits so platforms and providers can be swapped (and faked in tests).

use crate::error::Result;
use crate::formatter::InlineResult;
use crate::track::Track;
use crate::validator::Username;
use async_trait::async_trait;
use std::fmt;

/// Read access to a listening-history provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListeningHistory: Send + Sync {
    /// Track playing right now, if any
    ///
    /// `Ok(None)` means the provider answered and nothing is playing.
    async fn current_track(&self, username: &Username) -> Result<Option<Track>>;

    /// Up to `limit` tracks, most recent first
    ///
    /// A user without history yields an empty vector, not an error.
    async fn recent_tracks(&self, username: &Username, limit: usize) -> Result<Vec<Track>>;
}

/// How a delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// Recipient blocked the bot or cannot be reached at all
    Blocked,
    /// Anything else the transport reported
    Failed,
}

/// Failure reported by a [`DeliveryPort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    pub message: String,
}

impl DeliveryError {
    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::Blocked,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::Failed,
            message: message.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.kind == DeliveryErrorKind::Blocked
    }
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DeliveryErrorKind::Blocked => write!(f, "recipient unreachable: {}", self.message),
            DeliveryErrorKind::Failed => write!(f, "send failed: {}", self.message),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Where a reply goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    pub chat_id: i64,
    /// Inbound message, quoted by replies that ask for it
    pub message_id: Option<i32>,
}

/// Outbound HTML message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// `false` sends the text without a parse mode
    pub html: bool,
    pub quote: bool,
}

impl Reply {
    /// HTML reply posted as a new message
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: true,
            quote: false,
        }
    }

    /// Plain-text reply, used when markup itself may be the problem
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
            quote: false,
        }
    }

    /// Quote the inbound message
    pub fn quoting(mut self) -> Self {
        self.quote = true;
        self
    }
}

/// Outbound side of the messaging transport
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Send one message to a chat
    async fn send_reply(
        &self,
        target: ReplyTarget,
        reply: &Reply,
    ) -> std::result::Result<(), DeliveryError>;

    /// Answer an inline query with an ordered batch of results
    async fn answer_inline(
        &self,
        query_id: &str,
        results: &[InlineResult],
    ) -> std::result::Result<(), DeliveryError>;
}
