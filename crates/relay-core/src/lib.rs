//! Core of the listening-history relay
//!
//! A user sends a username; the relay validates it, reads the user's recent
//! and now-playing tracks from a listening-history provider, renders them as
//! HTML and hands the result to a messaging transport. Inline queries take
//! the same path and come back as one selectable result per track.
//!
//! # Architecture
//!
//! - [`validator`]: username validation
//! - [`formatter`]: HTML rendering of replies and inline results
//! - [`port`]: the [`ListeningHistory`] and [`DeliveryPort`] seams
//! - [`relay`]: [`RelayService`], the per-request state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_core::{IncomingMessage, RelayOptions, RelayService};
//! use std::sync::Arc;
//!
//! let relay = RelayService::new(history, delivery, RelayOptions::default());
//! let state = relay.handle_message(&IncomingMessage::new(chat_id, "rj")).await;
//! assert!(state.is_done());
//! ```

pub mod command;
pub mod error;
pub mod formatter;
pub mod message;
pub mod port;
pub mod relay;
pub mod track;
pub mod validator;

pub use command::Command;
pub use error::{ErrorKind, RelayError, Result};
pub use formatter::{InlineResult, ResponseFormatter, escape_html};
pub use message::{IncomingInlineQuery, IncomingMessage, Sender};
pub use port::{
    DeliveryError, DeliveryErrorKind, DeliveryPort, ListeningHistory, Reply, ReplyTarget,
};
pub use relay::{RelayOptions, RelayOptionsBuilder, RelayService, RelayState};
pub use track::Track;
pub use validator::{Username, validate};
