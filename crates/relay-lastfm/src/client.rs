//! Last.fm API client
//!
//! Reads `user.getRecentTracks`, which covers both "what played recently" and
//! "what is playing now" (the latter is flagged with `@attr.nowplaying`).
//! Calls are single-shot: a failure is returned as is, never retried.
//!
//! ```no_run
//! use relay_lastfm::{LastFmClient, LastFmConfig};
//!
//! # async fn run() -> Result<(), relay_lastfm::LastFmError> {
//! let client = LastFmClient::with_config(LastFmConfig::new("api-key"))?;
//! let tracks = client.get_recent_tracks("rj", 5).await?;
//! for track in tracks {
//!     println!("{} by {}", track.title, track.artist);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::LastFmConfig;
use crate::error::{LastFmError, Result};
use crate::model::{ApiErrorBody, RecentPage, RecentTracksEnvelope};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use relay_core::{ListeningHistory, Track, Username};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

const RECENT_TRACKS_METHOD: &str = "user.getrecenttracks";

/// Largest page Last.fm serves for recent tracks
pub const MAX_PAGE_SIZE: usize = 200;

/// Last.fm client
#[derive(Debug, Clone)]
pub struct LastFmClient {
    client: Client,
    config: LastFmConfig,
}

impl LastFmClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: LastFmConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new client with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(LastFmConfig::new(api_key))
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(LastFmConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &LastFmConfig {
        &self.config
    }

    /// Fetch one page of recent tracks, now-playing entry included
    #[instrument(skip(self), fields(api_base = %self.config.api_base))]
    pub async fn recent_page(&self, user: &str, limit: usize, page: u32) -> Result<RecentPage> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let page = page.max(1).to_string();

        let response = self
            .client
            .get(&self.config.api_base)
            .query(&[
                ("method", RECENT_TRACKS_METHOD),
                ("user", user),
                ("api_key", self.config.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Last.fm reports errors in the body, sometimes with a 200
        if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
            return Err(LastFmError::Api {
                code: api_error.error,
                message: api_error.message,
            });
        }
        if !status.is_success() {
            return Err(LastFmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: RecentTracksEnvelope = serde_json::from_str(&body)?;
        let page = RecentPage::from(envelope.recenttracks);
        debug!(
            tracks = page.tracks.len(),
            page = page.page,
            total_pages = page.total_pages,
            "recent tracks page received"
        );
        Ok(page)
    }

    /// Up to `limit` tracks, most recent first
    ///
    /// While something is playing Last.fm returns it on top of the `limit`
    /// played tracks; the list is cut back to `limit`.
    pub async fn get_recent_tracks(&self, user: &str, limit: usize) -> Result<Vec<Track>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut tracks = self.recent_page(user, limit, 1).await?.tracks;
        tracks.truncate(limit);
        Ok(tracks)
    }

    /// The track playing right now, if any
    pub async fn get_current_track(&self, user: &str) -> Result<Option<Track>> {
        let page = self.recent_page(user, 1, 1).await?;
        Ok(page
            .tracks
            .into_iter()
            .next()
            .filter(|track| track.is_currently_playing))
    }

    /// Every scrobbled track, newest first, one page at a time
    ///
    /// The stream ends when Last.fm reports the last page (or an empty one).
    /// The now-playing entry is skipped since it has not been scrobbled yet.
    /// Cap it with [`StreamExt::take`] to export only part of a history.
    pub fn history<'a>(
        &'a self,
        user: &'a str,
        page_size: usize,
    ) -> impl Stream<Item = Result<Track>> + 'a {
        stream::try_unfold(Some(1_u32), move |next| async move {
            let Some(page_number) = next else {
                return Ok(None);
            };
            let page = self.recent_page(user, page_size, page_number).await?;
            let next = if page.is_last() {
                None
            } else {
                Some(page_number + 1)
            };
            Ok::<_, LastFmError>(Some((page.tracks, next)))
        })
        .map_ok(|tracks| {
            stream::iter(
                tracks
                    .into_iter()
                    .filter(|track| !track.is_currently_playing)
                    .map(Ok::<Track, LastFmError>),
            )
        })
        .try_flatten()
        .boxed()
    }
}

#[async_trait]
impl ListeningHistory for LastFmClient {
    async fn current_track(&self, username: &Username) -> relay_core::Result<Option<Track>> {
        Ok(self.get_current_track(username.as_str()).await?)
    }

    async fn recent_tracks(
        &self,
        username: &Username,
        limit: usize,
    ) -> relay_core::Result<Vec<Track>> {
        Ok(self.get_recent_tracks(username.as_str(), limit).await?)
    }
}
