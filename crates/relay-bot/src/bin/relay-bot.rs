//! Listening-history relay bot
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables (or put them in .env)
//! export BOT_TOKEN="123456:telegram-token"
//! export API_KEY="lastfm-api-key"
//!
//! # Run the Telegram bot
//! cargo run --bin relay-bot -p relay-bot
//!
//! # One-off lookup printed to the terminal
//! cargo run --bin relay-bot -p relay-bot -- recent rj
//!
//! # Dump scrobble history
//! cargo run --bin relay-bot -p relay-bot -- export rj --limit 500
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::{StreamExt, TryStreamExt};
use relay_bot::{ConsolePort, TelegramBot, TelegramConfig};
use relay_core::{IncomingMessage, RelayOptions, RelayService, ResponseFormatter, Username};
use relay_lastfm::{LastFmClient, MAX_PAGE_SIZE};
use relay_utils::{LogFormat, ProcessEnv, env_parse, init_tracing, load_dotenv};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_LOG_DIRECTIVE: &str = "warn,relay_core=info,relay_lastfm=info,relay_bot=info";

#[derive(Parser, Debug)]
#[command(name = "relay-bot", version)]
#[command(about = "Relay Last.fm listening history to Telegram", long_about = None)]
struct Cli {
    /// Log output format: pretty or json (default: RELAY_LOG_FORMAT, then pretty)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot
    Serve,

    /// Look up a user once and print the replies
    Recent {
        /// Last.fm username
        username: String,
    },

    /// Print a user's scrobble history, newest first
    Export {
        /// Last.fm username
        username: String,

        /// Stop after this many tracks
        #[arg(short, long)]
        limit: Option<usize>,

        /// Tracks fetched per request
        #[arg(long, default_value_t = MAX_PAGE_SIZE)]
        page_size: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = load_dotenv();
    let cli = Cli::parse();

    let log_format = match cli.log_format {
        Some(format) => format,
        None => env_parse(&ProcessEnv, "RELAY_LOG_FORMAT", LogFormat::default())?,
    };
    init_tracing(log_format, DEFAULT_LOG_DIRECTIVE);
    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "loaded environment file");
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Recent { username } => recent(&username).await,
        Commands::Export {
            username,
            limit,
            page_size,
        } => export(&username, limit, page_size).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    let telegram_config = TelegramConfig::from_env().context("Telegram configuration")?;
    let history = LastFmClient::from_env().context("Last.fm configuration")?;
    let options = RelayOptions::from_env().context("relay options")?;

    let bot = TelegramBot::new(telegram_config);
    let mut formatter = ResponseFormatter::default();
    if let Some(handle) = bot.handle().await {
        formatter = formatter.with_bot_handle(handle);
    }

    info!(
        include_current_track = options.include_current_track,
        support_inline = options.support_inline,
        recent_limit = options.recent_limit,
        "Relay configured"
    );

    let relay = RelayService::new(Arc::new(history), Arc::new(bot.port()), options)
        .with_formatter(formatter);
    bot.run(Arc::new(relay)).await?;
    Ok(())
}

async fn recent(username: &str) -> anyhow::Result<()> {
    let history = LastFmClient::from_env().context("Last.fm configuration")?;
    let options = RelayOptions::from_env().context("relay options")?;

    let relay = RelayService::new(Arc::new(history), Arc::new(ConsolePort::stdout()), options);
    let state = relay.handle_message(&IncomingMessage::new(0, username)).await;
    if !state.is_done() {
        anyhow::bail!("lookup for '{username}' ended in {state:?}");
    }
    Ok(())
}

async fn export(username: &str, limit: Option<usize>, page_size: usize) -> anyhow::Result<()> {
    let username = Username::parse(username)?;
    let client = LastFmClient::from_env().context("Last.fm configuration")?;

    let history = client.history(username.as_str(), page_size);
    let mut history = match limit {
        Some(limit) => history.take(limit).boxed(),
        None => history.boxed(),
    };

    let mut stdout = io::stdout().lock();
    let mut count = 0_usize;
    while let Some(track) = history.try_next().await? {
        let played_at = track
            .played_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(stdout, "{played_at}\t{}\t{}", track.artist, track.title)?;
        count += 1;
    }
    stdout.flush()?;

    info!(username = %username, tracks = count, "export finished");
    Ok(())
}
