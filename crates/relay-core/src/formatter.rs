//! Response formatting
//!
//! Everything the bot says is rendered here as Telegram-flavoured HTML
//! (`<b>`, `<i>`, `<a href>`). Text that comes from users or from the
//! provider goes through [`escape_html`] before it is embedded.

use crate::track::Track;
use crate::validator::Username;
use serde::{Deserialize, Serialize};

const DEFAULT_PROFILE_BASE: &str = "https://www.last.fm/user/";

/// Escape `&`, `<`, `>` and `"` so the text is inert inside HTML markup,
/// attribute values included
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One selectable entry of an inline answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineResult {
    /// Position within its batch
    pub id: u32,
    /// Shown in the result list as plain text
    pub title: String,
    /// Shown under the title as plain text
    pub description: String,
    /// HTML body posted when the result is picked
    pub rendered_message: String,
}

/// Renders replies and inline results
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    profile_base: String,
    bot_handle: Option<String>,
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self {
            profile_base: DEFAULT_PROFILE_BASE.to_string(),
            bot_handle: None,
        }
    }
}

impl ResponseFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL that a username is appended to for profile links
    pub fn with_profile_base(mut self, base: impl Into<String>) -> Self {
        self.profile_base = base.into();
        self
    }

    /// Bot handle (without `@`), mentioned in the welcome text as inline usage
    pub fn with_bot_handle(mut self, handle: impl Into<String>) -> Self {
        self.bot_handle = Some(handle.into());
        self
    }

    pub fn profile_url(&self, username: &Username) -> String {
        format!("{}{}", self.profile_base, username.as_str())
    }

    /// Header linking to the profile, then one `"<title> by <artist>"` line
    /// per track in input order
    pub fn format_recent(&self, username: &Username, tracks: &[Track]) -> String {
        let name = escape_html(username.as_str());
        let mut text = format!(
            "<b>🎶 Here are <a href=\"{}\">{name}'s</a> recent listens:</b>",
            escape_html(&self.profile_url(username)),
        );
        for track in tracks {
            text.push('\n');
            text.push_str(&track_line(track));
        }
        text
    }

    pub fn format_current(&self, track: &Track) -> String {
        format!("<b>🎧 Currently listening to: {}</b>", track_line(track))
    }

    /// Build the inline result for one track
    pub fn format_inline_result(
        &self,
        username: &Username,
        track: &Track,
        id: u32,
    ) -> InlineResult {
        let title = escape_html(&track.title);
        let linked_title = match &track.url {
            Some(url) => format!("<a href=\"{}\">{title}</a>", escape_html(url)),
            None => title,
        };

        let mut body = format!(
            "{} is listening to {linked_title} by {}",
            escape_html(username.as_str()),
            escape_html(&track.artist),
        );
        if let Some(album) = &track.album {
            body.push_str(&format!("\n<i>Album: {}</i>", escape_html(album)));
        }

        InlineResult {
            id,
            title: track.title.clone(),
            description: track.artist.clone(),
            rendered_message: body,
        }
    }

    /// One result per track; ids count up from 0 within the batch
    pub fn format_inline_batch(
        &self,
        username: &Username,
        tracks: &[Track],
    ) -> Vec<InlineResult> {
        tracks
            .iter()
            .zip(0_u32..)
            .map(|(track, id)| self.format_inline_result(username, track, id))
            .collect()
    }

    /// Single result shown while the query is still empty
    pub fn inline_placeholder(&self) -> InlineResult {
        InlineResult {
            id: 0,
            title: "Type a Last.fm username".to_string(),
            description: "Recent listens will show up here".to_string(),
            rendered_message: "<i>Send a Last.fm username to see its recent listens.</i>"
                .to_string(),
        }
    }

    /// Single result shown when the query cannot be a username
    pub fn inline_invalid(&self) -> InlineResult {
        InlineResult {
            id: 0,
            title: "Send a valid Last.fm username".to_string(),
            description: "Letters, digits, _ and - only".to_string(),
            rendered_message: self.validation_notice(),
        }
    }

    pub fn welcome(&self, inline_enabled: bool) -> String {
        let mut text = String::from(
            "<b>Welcome!</b> ✨\n<i>Send a Last.fm username to get recent plays.",
        );
        if inline_enabled {
            match &self.bot_handle {
                Some(handle) => text.push_str(&format!(
                    "\nYou can also use inline by @{} &lt;username&gt;.",
                    escape_html(handle)
                )),
                None => text.push_str("\nYou can also use the bot inline."),
            }
        }
        text.push_str("</i>");
        text
    }

    pub fn help(&self) -> String {
        "<b>Recent listens bot</b>\n\n<i>This bot sends the recent listens for a Last.fm profile.\nSend a username to try it out!</i>"
            .to_string()
    }

    pub fn validation_notice(&self) -> String {
        "<b>Send a valid Last.fm username.</b>".to_string()
    }

    pub fn upstream_notice(&self) -> String {
        "<b>Error contacting Last.fm.</b>".to_string()
    }

    pub fn unknown_error_notice(&self, error: &str) -> String {
        format!(
            "<b>An error occurred. Are you sure you sent a valid Last.fm username?</b>\n<i>Error: {}</i>",
            escape_html(error)
        )
    }

    /// Plain text; sent after a failed delivery, so it carries no markup
    pub fn delivery_failed_notice(&self) -> String {
        "An error occurred".to_string()
    }
}

fn track_line(track: &Track) -> String {
    format!("{} by {}", escape_html(&track.title), escape_html(&track.artist))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Username {
        Username::parse(name).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_html("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_recent_empty_renders_header_only() {
        let formatter = ResponseFormatter::new();
        let text = formatter.format_recent(&user("rj"), &[]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("rj's"));
        assert!(text.contains("href=\"https://www.last.fm/user/rj\""));
    }

    #[test]
    fn test_format_recent_one_line_per_track_in_order() {
        let formatter = ResponseFormatter::new();
        let tracks = vec![Track::new("A", "X"), Track::new("B", "Y")];
        let text = formatter.format_recent(&user("rj"), &tracks);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("rj"));
        assert_eq!(lines[1], "A by X");
        assert_eq!(lines[2], "B by Y");
    }

    #[test]
    fn test_custom_profile_base() {
        let formatter = ResponseFormatter::new().with_profile_base("https://www.last.fm/ja/user/");
        assert_eq!(formatter.profile_url(&user("rj")), "https://www.last.fm/ja/user/rj");
        let text = formatter.format_recent(&user("rj"), &[]);
        assert!(text.contains("href=\"https://www.last.fm/ja/user/rj\""));
    }

    #[test]
    fn test_header_is_identical_regardless_of_track_count() {
        let formatter = ResponseFormatter::new();
        let empty = formatter.format_recent(&user("rj"), &[]);
        let full = formatter.format_recent(&user("rj"), &[Track::new("A", "X")]);
        assert_eq!(full.lines().next(), Some(empty.as_str()));
    }

    #[test]
    fn test_format_recent_escapes_provider_text() {
        let formatter = ResponseFormatter::new();
        let tracks = vec![Track::new("<Intro>", "Simon & Garfunkel")];
        let text = formatter.format_recent(&user("rj"), &tracks);
        assert!(text.ends_with("&lt;Intro&gt; by Simon &amp; Garfunkel"));
    }

    #[test]
    fn test_format_current() {
        let formatter = ResponseFormatter::new();
        let text = formatter.format_current(&Track::new("Song", "Band").now_playing());
        assert_eq!(text, "<b>🎧 Currently listening to: Song by Band</b>");
    }

    #[test]
    fn test_inline_result_with_link_and_album() {
        let formatter = ResponseFormatter::new();
        let track = Track::new("Song", "Band")
            .with_url("https://www.last.fm/music/Band/_/Song")
            .with_album("Record");
        let result = formatter.format_inline_result(&user("rj"), &track, 3);

        assert_eq!(result.id, 3);
        assert_eq!(result.title, "Song");
        assert_eq!(result.description, "Band");
        assert_eq!(
            result.rendered_message,
            "rj is listening to <a href=\"https://www.last.fm/music/Band/_/Song\">Song</a> by Band\n<i>Album: Record</i>"
        );
    }

    #[test]
    fn test_inline_result_without_link() {
        let formatter = ResponseFormatter::new();
        let result = formatter.format_inline_result(&user("rj"), &Track::new("A & B", "X"), 0);
        assert_eq!(result.rendered_message, "rj is listening to A &amp; B by X");
        // titles are shown as plain text by the client
        assert_eq!(result.title, "A & B");
    }

    #[test]
    fn test_inline_url_cannot_break_attribute() {
        let formatter = ResponseFormatter::new();
        let track = Track::new("A", "X").with_url("https://x.test/\"><script>");
        let result = formatter.format_inline_result(&user("rj"), &track, 0);
        assert!(
            result
                .rendered_message
                .contains("href=\"https://x.test/&quot;&gt;&lt;script&gt;\"")
        );
    }

    #[test]
    fn test_inline_batch_ids_strictly_increase() {
        let formatter = ResponseFormatter::new();
        let tracks: Vec<Track> = (0..5).map(|i| Track::new(format!("T{i}"), "A")).collect();
        let results = formatter.format_inline_batch(&user("rj"), &tracks);

        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(results[0].id, 0);
        assert_eq!(results[4].title, "T4");
    }

    #[test]
    fn test_placeholder_has_id_zero() {
        let formatter = ResponseFormatter::new();
        assert_eq!(formatter.inline_placeholder().id, 0);
        assert_eq!(formatter.inline_invalid().id, 0);
    }

    #[test]
    fn test_welcome_mentions_inline_handle() {
        let formatter = ResponseFormatter::new().with_bot_handle("recentplaybot");
        assert!(formatter.welcome(true).contains("@recentplaybot &lt;username&gt;"));
        assert!(!formatter.welcome(false).contains("inline"));
    }

    #[test]
    fn test_unknown_error_notice_escapes() {
        let formatter = ResponseFormatter::new();
        let text = formatter.unknown_error_notice("bad <input>");
        assert!(text.contains("Error: bad &lt;input&gt;"));
    }
}
