//! Telegram front end for the listening-history relay
//!
//! Wires the Last.fm provider and a messaging platform into a
//! [`relay_core::RelayService`].
//!
//! # Platforms
//!
//! - [`platforms::telegram`]: the production bot (long polling or webhook)
//! - [`platforms::console`]: writes replies to stdout for one-off runs

pub mod error;
pub mod platforms;

pub use error::{BotError, Result};
pub use platforms::{ConsolePort, TelegramBot, TelegramConfig, TelegramPort, WebhookConfig};
