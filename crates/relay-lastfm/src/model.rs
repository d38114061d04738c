//! Wire types for `user.getRecentTracks`
//!
//! Last.fm's JSON has a few quirks handled here: numbers arrive as strings,
//! `track` collapses to a bare object when there is exactly one, and
//! missing values are sent as empty strings.

use chrono::DateTime;
use relay_core::Track;
use serde::Deserialize;

/// Body of a failed call, e.g. `{"error": 6, "message": "User not found"}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: u32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentTracksEnvelope {
    pub recenttracks: RecentTracks,
}

#[derive(Debug, Deserialize)]
pub struct RecentTracks {
    #[serde(default)]
    pub track: Option<OneOrMany>,
    #[serde(rename = "@attr")]
    pub attr: Option<PageAttr>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<RawTrack>),
    One(Box<RawTrack>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<RawTrack> {
        match self {
            OneOrMany::Many(tracks) => tracks,
            OneOrMany::One(track) => vec![*track],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageAttr {
    #[serde(default)]
    pub page: String,
    #[serde(rename = "totalPages", default)]
    pub total_pages: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTrack {
    pub name: String,
    pub artist: TextField,
    pub album: Option<TextField>,
    pub url: Option<String>,
    #[serde(rename = "@attr")]
    pub attr: Option<TrackAttr>,
    pub date: Option<DateField>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextField {
    #[serde(rename = "#text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackAttr {
    pub nowplaying: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateField {
    pub uts: String,
}

/// One decoded page of recent tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPage {
    pub tracks: Vec<Track>,
    pub page: u32,
    pub total_pages: u32,
}

impl RecentPage {
    /// No page follows this one
    pub fn is_last(&self) -> bool {
        self.tracks.is_empty() || self.page >= self.total_pages
    }
}

impl From<RecentTracks> for RecentPage {
    fn from(raw: RecentTracks) -> Self {
        let (page, total_pages) = raw
            .attr
            .map(|attr| (parse_count(&attr.page), parse_count(&attr.total_pages)))
            .unwrap_or((1, 1));

        Self {
            tracks: raw
                .track
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(Track::from)
                .collect(),
            page,
            total_pages,
        }
    }
}

fn parse_count(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let is_currently_playing = raw
            .attr
            .and_then(|attr| attr.nowplaying)
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
        let played_at = raw
            .date
            .and_then(|date| date.uts.trim().parse::<i64>().ok())
            .and_then(|uts| DateTime::from_timestamp(uts, 0));

        Track {
            title: raw.name,
            artist: raw.artist.text,
            album: raw.album.and_then(|album| non_empty(album.text)),
            url: raw.url.and_then(non_empty),
            is_currently_playing,
            played_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> RecentPage {
        serde_json::from_value::<RecentTracksEnvelope>(value)
            .unwrap()
            .recenttracks
            .into()
    }

    #[test]
    fn test_decode_page_with_now_playing() {
        let page = decode(json!({
            "recenttracks": {
                "track": [
                    {
                        "artist": {"mbid": "", "#text": "Band"},
                        "name": "Live",
                        "album": {"mbid": "", "#text": "Record"},
                        "url": "https://www.last.fm/music/Band/_/Live",
                        "@attr": {"nowplaying": "true"}
                    },
                    {
                        "artist": {"mbid": "", "#text": "X"},
                        "name": "A",
                        "album": {"mbid": "", "#text": ""},
                        "url": "",
                        "date": {"uts": "1700000000", "#text": "14 Nov 2023, 22:13"}
                    }
                ],
                "@attr": {"user": "rj", "page": "1", "perPage": "5", "totalPages": "20", "total": "100"}
            }
        }));

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 20);
        assert!(!page.is_last());
        assert_eq!(page.tracks.len(), 2);

        let live = &page.tracks[0];
        assert!(live.is_currently_playing);
        assert_eq!(live.album.as_deref(), Some("Record"));
        assert!(live.played_at.is_none());

        let played = &page.tracks[1];
        assert!(!played.is_currently_playing);
        assert_eq!(played.album, None);
        assert_eq!(played.url, None);
        assert_eq!(played.played_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_decode_single_track_object() {
        let page = decode(json!({
            "recenttracks": {
                "track": {"artist": {"#text": "X"}, "name": "A"},
                "@attr": {"page": "1", "totalPages": "1"}
            }
        }));
        assert_eq!(page.tracks, vec![Track::new("A", "X")]);
        assert!(page.is_last());
    }

    #[test]
    fn test_decode_empty_history() {
        let page = decode(json!({
            "recenttracks": {
                "track": [],
                "@attr": {"page": "1", "totalPages": "0", "total": "0"}
            }
        }));
        assert!(page.tracks.is_empty());
        assert!(page.is_last());
    }

    #[test]
    fn test_decode_api_error_body() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({"message": "User not found", "error": 6})).unwrap();
        assert_eq!(body.error, 6);
        assert_eq!(body.message, "User not found");
    }
}
