//! Track records as handed over by a listening-history provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One played (or playing) track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub url: Option<String>,
    /// Set when the provider reports the track as playing right now
    pub is_currently_playing: bool,
    /// Scrobble time; absent for the now-playing entry
    pub played_at: Option<DateTime<Utc>>,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            url: None,
            is_currently_playing: false,
            played_at: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn now_playing(mut self) -> Self {
        self.is_currently_playing = true;
        self
    }

    pub fn played_at(mut self, at: DateTime<Utc>) -> Self {
        self.played_at = Some(at);
        self
    }
}
