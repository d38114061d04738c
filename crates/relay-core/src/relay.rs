//! The relay pipeline: validate, fetch, format, deliver
//!
//! [`RelayService`] handles one inbound event at a time and always resolves it
//! to a terminal [`RelayState`]. Failures never escape a handler; they are
//! mapped to a user notice (when someone can receive it) and logged.

use crate::command::Command;
use crate::error::{ErrorKind, RelayError};
use crate::formatter::ResponseFormatter;
use crate::message::{IncomingInlineQuery, IncomingMessage};
use crate::port::{DeliveryError, DeliveryPort, ListeningHistory, Reply, ReplyTarget};
use crate::track::Track;
use crate::validator::Username;
use relay_utils::config::{ConfigError, EnvSource, ProcessEnv, env_flag, env_parse};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_RECENT_LIMIT: usize = 5;
const MAX_RECENT_LIMIT: usize = 50;

/// Feature switches for a relay deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOptions {
    /// Follow the recent-tracks reply with a now-playing reply
    pub include_current_track: bool,
    /// Answer inline queries
    pub support_inline: bool,
    /// Tracks per reply or inline answer
    pub recent_limit: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            include_current_track: true,
            support_inline: true,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl RelayOptions {
    /// Create a builder
    pub fn builder() -> RelayOptionsBuilder {
        RelayOptionsBuilder::default()
    }

    /// Read `RELAY_INCLUDE_CURRENT_TRACK`, `RELAY_SUPPORT_INLINE` and
    /// `RELAY_RECENT_LIMIT` from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let options = Self {
            include_current_track: env_flag(env, "RELAY_INCLUDE_CURRENT_TRACK", true)?,
            support_inline: env_flag(env, "RELAY_SUPPORT_INLINE", true)?,
            recent_limit: env_parse(env, "RELAY_RECENT_LIMIT", DEFAULT_RECENT_LIMIT)?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RECENT_LIMIT).contains(&self.recent_limit) {
            return Err(ConfigError::Invalid {
                key: "RELAY_RECENT_LIMIT".to_string(),
                reason: format!(
                    "must be between 1 and {MAX_RECENT_LIMIT}, got {}",
                    self.recent_limit
                ),
            });
        }
        Ok(())
    }
}

/// Builder for RelayOptions
#[derive(Debug, Default)]
pub struct RelayOptionsBuilder {
    include_current_track: Option<bool>,
    support_inline: Option<bool>,
    recent_limit: Option<usize>,
}

impl RelayOptionsBuilder {
    pub fn include_current_track(mut self, include: bool) -> Self {
        self.include_current_track = Some(include);
        self
    }

    pub fn support_inline(mut self, support: bool) -> Self {
        self.support_inline = Some(support);
        self
    }

    pub fn recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<RelayOptions, ConfigError> {
        let defaults = RelayOptions::default();
        let options = RelayOptions {
            include_current_track: self
                .include_current_track
                .unwrap_or(defaults.include_current_track),
            support_inline: self.support_inline.unwrap_or(defaults.support_inline),
            recent_limit: self.recent_limit.unwrap_or(defaults.recent_limit),
        };
        options.validate()?;
        Ok(options)
    }
}

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Received,
    Validating,
    Fetching,
    Formatting,
    Delivering,
    Done,
    Failed(ErrorKind),
}

impl RelayState {
    pub fn is_done(&self) -> bool {
        *self == RelayState::Done
    }
}

fn enter(state: RelayState) {
    debug!(?state, "relay state");
}

/// Orchestrates one request from inbound event to delivered reply
pub struct RelayService {
    history: Arc<dyn ListeningHistory>,
    delivery: Arc<dyn DeliveryPort>,
    formatter: ResponseFormatter,
    options: RelayOptions,
}

impl RelayService {
    pub fn new(
        history: Arc<dyn ListeningHistory>,
        delivery: Arc<dyn DeliveryPort>,
        options: RelayOptions,
    ) -> Self {
        Self {
            history,
            delivery,
            formatter: ResponseFormatter::default(),
            options,
        }
    }

    pub fn with_formatter(mut self, formatter: ResponseFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    pub fn formatter(&self) -> &ResponseFormatter {
        &self.formatter
    }

    /// Handle a direct message
    #[instrument(skip_all, fields(chat_id = message.chat_id))]
    pub async fn handle_message(&self, message: &IncomingMessage) -> RelayState {
        enter(RelayState::Received);
        if let Some(sender) = &message.sender {
            info!(from = %sender, text = %message.text, "message received");
        }
        let target = message.target();

        let candidate = match Command::parse(&message.text) {
            Command::Start => {
                let text = self.formatter.welcome(self.options.support_inline);
                return self.deliver_static(target, Reply::html(text)).await;
            }
            Command::Help => {
                return self.deliver_static(target, Reply::html(self.formatter.help())).await;
            }
            Command::Lookup { candidate } => candidate,
        };

        enter(RelayState::Validating);
        let username = match Username::parse(&candidate) {
            Ok(username) => username,
            Err(err) => return self.fail(target, &err).await,
        };

        enter(RelayState::Fetching);
        let (recent, current) = match self.fetch(&username).await {
            Ok(fetched) => fetched,
            Err(err) => return self.fail(target, &err).await,
        };

        enter(RelayState::Formatting);
        let mut replies = vec![Reply::html(self.formatter.format_recent(&username, &recent))];
        if let Some(track) = &current {
            replies.push(Reply::html(self.formatter.format_current(track)));
        }

        enter(RelayState::Delivering);
        for reply in &replies {
            if let Err(err) = self.delivery.send_reply(target, reply).await {
                return self.delivery_failed(target, err).await;
            }
        }

        info!(
            username = %username,
            tracks = recent.len(),
            now_playing = current.is_some(),
            "recent listens sent"
        );
        enter(RelayState::Done);
        RelayState::Done
    }

    /// Handle an inline query
    #[instrument(skip_all, fields(query_id = %query.id))]
    pub async fn handle_inline_query(&self, query: &IncomingInlineQuery) -> RelayState {
        enter(RelayState::Received);
        if !self.options.support_inline {
            debug!("inline mode disabled, ignoring query");
            return RelayState::Done;
        }
        if let Some(sender) = &query.sender {
            info!(from = %sender, query = %query.query, "inline query received");
        }

        if query.query.is_empty() {
            let placeholder = [self.formatter.inline_placeholder()];
            return match self.delivery.answer_inline(&query.id, &placeholder).await {
                Ok(()) => RelayState::Done,
                Err(err) => inline_delivery_failed(&err),
            };
        }

        enter(RelayState::Validating);
        let username = match Username::parse(&query.query) {
            Ok(username) => username,
            Err(err) => {
                debug!(error = %err, "inline query is not a username");
                let invalid = [self.formatter.inline_invalid()];
                if let Err(delivery_err) = self.delivery.answer_inline(&query.id, &invalid).await {
                    inline_delivery_failed(&delivery_err);
                }
                return RelayState::Failed(err.kind());
            }
        };

        enter(RelayState::Fetching);
        let tracks = match self
            .history
            .recent_tracks(&username, self.options.recent_limit)
            .await
        {
            Ok(tracks) => tracks,
            Err(err) => {
                log_upstream_failure(&err);
                return RelayState::Failed(err.kind());
            }
        };

        enter(RelayState::Formatting);
        let results = self.formatter.format_inline_batch(&username, &tracks);

        enter(RelayState::Delivering);
        if let Err(err) = self.delivery.answer_inline(&query.id, &results).await {
            return inline_delivery_failed(&err);
        }

        info!(username = %username, results = results.len(), "inline answer sent");
        enter(RelayState::Done);
        RelayState::Done
    }

    async fn fetch(&self, username: &Username) -> Result<(Vec<Track>, Option<Track>), RelayError> {
        let recent = self
            .history
            .recent_tracks(username, self.options.recent_limit)
            .await?;
        if recent.is_empty() {
            debug!(username = %username, "no listening history");
        }

        let current = if self.options.include_current_track {
            self.history.current_track(username).await?
        } else {
            None
        };

        Ok((recent, current))
    }

    async fn deliver_static(&self, target: ReplyTarget, reply: Reply) -> RelayState {
        enter(RelayState::Delivering);
        match self.delivery.send_reply(target, &reply).await {
            Ok(()) => RelayState::Done,
            Err(err) => self.delivery_failed(target, err).await,
        }
    }

    /// Report a validation or upstream failure to the user
    async fn fail(&self, target: ReplyTarget, err: &RelayError) -> RelayState {
        let notice = match err {
            RelayError::ValidationError(input) => {
                debug!(input = %input, "rejected username");
                Some(self.formatter.validation_notice())
            }
            RelayError::UpstreamUnavailable(_) => {
                log_upstream_failure(err);
                Some(self.formatter.upstream_notice())
            }
            RelayError::Unknown(detail) => {
                log_upstream_failure(err);
                Some(self.formatter.unknown_error_notice(detail))
            }
            RelayError::UpstreamEmpty
            | RelayError::DeliveryBlocked(_)
            | RelayError::DeliveryFailed(_) => {
                warn!(error = %err, "unexpected failure before delivery");
                None
            }
        };

        if let Some(text) = notice {
            let reply = Reply::html(text).quoting();
            if let Err(delivery_err) = self.delivery.send_reply(target, &reply).await {
                if delivery_err.is_blocked() {
                    info!(error = %delivery_err, "bot was blocked by the user");
                } else {
                    warn!(error = %delivery_err, "could not send error notice");
                }
            }
        }

        RelayState::Failed(err.kind())
    }

    /// Classify a failed send; one best-effort notice unless the recipient
    /// is unreachable
    async fn delivery_failed(&self, target: ReplyTarget, err: DeliveryError) -> RelayState {
        let err = RelayError::from(err);
        match &err {
            RelayError::DeliveryBlocked(detail) => {
                info!(detail = %detail, "bot was blocked by the user");
            }
            _ => {
                warn!(error = %err, "error sending message");
                let notice = Reply::plain(self.formatter.delivery_failed_notice());
                if let Err(notice_err) = self.delivery.send_reply(target, &notice).await {
                    debug!(error = %notice_err, "error notice not delivered either");
                }
            }
        }
        RelayState::Failed(err.kind())
    }
}

fn log_upstream_failure(err: &RelayError) {
    match err {
        RelayError::UpstreamUnavailable(detail) => {
            warn!(detail = %detail, "listening history unavailable");
        }
        other => error!(error = ?other, "listening history request failed"),
    }
}

fn inline_delivery_failed(err: &DeliveryError) -> RelayState {
    let err = RelayError::from(err.clone());
    if err.kind() == ErrorKind::DeliveryBlocked {
        info!(error = %err, "inline answer rejected, recipient unreachable");
    } else {
        warn!(error = %err, "could not answer inline query");
    }
    RelayState::Failed(err.kind())
}
