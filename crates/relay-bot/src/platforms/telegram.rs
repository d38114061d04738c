//! Telegram bot implementation
//!
//! [`TelegramPort`] delivers relay output through the Bot API and
//! [`TelegramBot`] feeds incoming messages and inline queries into a
//! [`RelayService`], by long polling or through a webhook.

use crate::error::Result;
use async_trait::async_trait;
use relay_core::{
    Command, DeliveryError, DeliveryPort, IncomingInlineQuery, IncomingMessage, InlineResult,
    RelayService, Reply, ReplyTarget, Sender,
};
use relay_utils::config::{ConfigError, EnvSource, ProcessEnv, env_parse, first_env, optional_env};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText, MessageId, ParseMode, ReplyParameters, User,
};
use teloxide::update_listeners::webhooks;
use teloxide::{ApiError, RequestError};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;

const DEFAULT_WEBHOOK_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8443);

/// Where Telegram pushes updates in webhook mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Public HTTPS URL registered with Telegram
    pub url: Url,
    /// Local address the webhook server binds to
    pub addr: SocketAddr,
}

/// Telegram bot configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,

    /// Webhook settings (None = long polling)
    pub webhook: Option<WebhookConfig>,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            webhook: None,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `BOT_TOKEN` (or `TELEGRAM_BOT_TOKEN`); webhook mode is enabled by
    /// `TELEGRAM_WEBHOOK_URL`, bound on `TELEGRAM_WEBHOOK_ADDR`.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> std::result::Result<Self, ConfigError> {
        let token = first_env(env, &["BOT_TOKEN", "TELEGRAM_BOT_TOKEN"])
            .ok_or_else(|| ConfigError::Missing("BOT_TOKEN".to_string()))?;

        let webhook = match optional_env(env, "TELEGRAM_WEBHOOK_URL") {
            None => None,
            Some(raw) => {
                let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    key: "TELEGRAM_WEBHOOK_URL".to_string(),
                    reason: e.to_string(),
                })?;
                let addr = env_parse(
                    env,
                    "TELEGRAM_WEBHOOK_ADDR",
                    SocketAddr::from(DEFAULT_WEBHOOK_ADDR),
                )?;
                Some(WebhookConfig { url, addr })
            }
        };

        Ok(Self { token, webhook })
    }

    pub fn with_webhook(mut self, url: Url, addr: SocketAddr) -> Self {
        self.webhook = Some(WebhookConfig { url, addr });
        self
    }
}

/// Sender details carried by a Telegram user
pub fn sender_from_user(user: &User) -> Sender {
    let mut sender = Sender::new(user.id.0, user.first_name.clone());
    if let Some(last_name) = &user.last_name {
        sender = sender.with_last_name(last_name.clone());
    }
    if let Some(username) = &user.username {
        sender = sender.with_username(username.clone());
    }
    sender
}

/// Text messages only; stickers, photos and service messages yield None
pub fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
    let text = msg.text()?;
    let mut incoming = IncomingMessage::new(msg.chat.id.0, text).with_message_id(msg.id.0);
    if let Some(user) = &msg.from {
        incoming = incoming.with_sender(sender_from_user(user));
    }
    Some(incoming)
}

pub fn incoming_inline_query(query: &InlineQuery) -> IncomingInlineQuery {
    IncomingInlineQuery::new(query.id.clone(), query.query.clone())
        .with_sender(sender_from_user(&query.from))
}

/// An inline result as a Telegram article sending HTML
pub fn article(result: &InlineResult) -> InlineQueryResult {
    let content = InputMessageContent::Text(
        InputMessageContentText::new(result.rendered_message.clone()).parse_mode(ParseMode::Html),
    );
    InlineQueryResult::Article(
        InlineQueryResultArticle::new(result.id.to_string(), result.title.clone(), content)
            .description(result.description.clone()),
    )
}

/// Failures meaning the bot can no longer reach the chat
pub fn delivery_error(err: RequestError) -> DeliveryError {
    match err {
        RequestError::Api(
            ApiError::BotBlocked
            | ApiError::UserDeactivated
            | ApiError::ChatNotFound
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup,
        ) => DeliveryError::blocked(err.to_string()),
        other => DeliveryError::failed(other.to_string()),
    }
}

/// Delivers relay output through the Telegram Bot API
#[derive(Clone)]
pub struct TelegramPort {
    bot: Bot,
}

impl TelegramPort {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl DeliveryPort for TelegramPort {
    async fn send_reply(
        &self,
        target: ReplyTarget,
        reply: &Reply,
    ) -> std::result::Result<(), DeliveryError> {
        let mut request = self.bot.send_message(ChatId(target.chat_id), reply.text.clone());
        if reply.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let (true, Some(message_id)) = (reply.quote, target.message_id) {
            request = request.reply_parameters(ReplyParameters::new(MessageId(message_id)));
        }

        request.await.map(|_| ()).map_err(delivery_error)
    }

    async fn answer_inline(
        &self,
        query_id: &str,
        results: &[InlineResult],
    ) -> std::result::Result<(), DeliveryError> {
        let results: Vec<InlineQueryResult> = results.iter().map(article).collect();
        self.bot
            .answer_inline_query(query_id, results)
            .await
            .map(|_| ())
            .map_err(delivery_error)
    }
}

/// Telegram bot
pub struct TelegramBot {
    bot: Bot,
    config: TelegramConfig,
}

impl TelegramBot {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.token),
            config,
        }
    }

    /// Port for wiring into a [`RelayService`]
    pub fn port(&self) -> TelegramPort {
        TelegramPort::new(self.bot.clone())
    }

    /// The bot's @handle, used in the welcome text
    pub async fn handle(&self) -> Option<String> {
        match self.bot.get_me().await {
            Ok(me) => me.user.username.clone(),
            Err(e) => {
                warn!("Failed to fetch bot identity: {}", e);
                None
            }
        }
    }

    /// Register the command menu, then dispatch updates until Ctrl-C
    pub async fn run(self, relay: Arc<RelayService>) -> Result<()> {
        let commands =
            Command::menu().map(|(command, description)| BotCommand::new(command, description));
        if let Err(e) = self.bot.set_my_commands(commands).await {
            warn!("Failed to set Telegram bot commands: {}", e);
        }

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_inline_query().endpoint(on_inline_query));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {})
            .dependencies(dptree::deps![relay])
            .enable_ctrlc_handler()
            .build();

        match &self.config.webhook {
            Some(webhook) => {
                info!(url = %webhook.url, addr = %webhook.addr, "Starting Telegram bot (webhook)");
                let options = webhooks::Options::new(webhook.addr, webhook.url.clone());
                let listener = webhooks::axum(self.bot.clone(), options).await?;
                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text("An error from the update listener"),
                    )
                    .await;
            }
            None => {
                info!("Starting Telegram bot (long polling)");
                dispatcher.dispatch().await;
            }
        }

        info!("Telegram bot stopped");
        Ok(())
    }
}

async fn on_message(msg: Message, relay: Arc<RelayService>) -> ResponseResult<()> {
    let Some(incoming) = incoming_message(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return respond(());
    };

    let span = info_span!(
        "update",
        kind = "message",
        sender_id = incoming.sender.as_ref().map(|s| s.id)
    );
    async move {
        let started = Instant::now();
        let state = relay.handle_message(&incoming).await;
        info!(?state, elapsed_ms = elapsed_ms(started), "update handled");
    }
    .instrument(span)
    .await;

    respond(())
}

async fn on_inline_query(query: InlineQuery, relay: Arc<RelayService>) -> ResponseResult<()> {
    let incoming = incoming_inline_query(&query);

    let span = info_span!("update", kind = "inline_query", sender_id = query.from.id.0);
    async move {
        let started = Instant::now();
        let state = relay.handle_inline_query(&incoming).await;
        info!(?state, elapsed_ms = elapsed_ms(started), "update handled");
    }
    .instrument(span)
    .await;

    respond(())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
