//! Inbound events, independent of the transport that produced them

use crate::port::ReplyTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who sent an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl Sender {
    pub fn new(id: u64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// First and last name joined, as shown in logs
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(handle) => write!(f, "{} (@{handle}) ID: {}", self.display_name(), self.id),
            None => write!(f, "{} ID: {}", self.display_name(), self.id),
        }
    }
}

/// A text message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: Option<i32>,
    pub text: String,
    pub sender: Option<Sender>,
}

impl IncomingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id: None,
            text: text.into(),
            sender: None,
        }
    }

    pub fn with_message_id(mut self, message_id: i32) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn target(&self) -> ReplyTarget {
        ReplyTarget {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

/// An inline query typed after the bot's handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingInlineQuery {
    pub id: String,
    pub query: String,
    pub sender: Option<Sender>,
}

impl IncomingInlineQuery {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_display() {
        let sender = Sender::new(42, "Ada").with_last_name("Lovelace").with_username("ada");
        assert_eq!(sender.display_name(), "Ada Lovelace");
        assert_eq!(sender.to_string(), "Ada Lovelace (@ada) ID: 42");

        let sender = Sender::new(7, "Bob");
        assert_eq!(sender.to_string(), "Bob ID: 7");
    }

    #[test]
    fn test_message_target() {
        let msg = IncomingMessage::new(100, "rj").with_message_id(5);
        assert_eq!(
            msg.target(),
            ReplyTarget {
                chat_id: 100,
                message_id: Some(5)
            }
        );
    }
}
