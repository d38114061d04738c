//! Platform-specific delivery and update intake

pub mod console;
pub mod telegram;

pub use console::ConsolePort;
pub use telegram::{TelegramBot, TelegramConfig, TelegramPort, WebhookConfig};
