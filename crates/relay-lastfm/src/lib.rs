//! Last.fm listening-history provider
//!
//! Implements [`relay_core::ListeningHistory`] on top of the Last.fm REST API
//! and adds a paged history stream for exports.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::{LastFmClient, MAX_PAGE_SIZE};
pub use config::{DEFAULT_API_BASE, LastFmConfig};
pub use error::{LastFmError, Result};
pub use model::RecentPage;
