use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use tgbot_client::{GetUpdates, TelegramBot};
use tgbot_core::{
    config::Config,
    types::{Message, ParseMode},
};

/// Talk to the Telegram Bot API with the token from `TELEGRAM_BOT_TOKEN`.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test the bot token.
    GetMe,

    /// Send a text message.
    SendMessage {
        /// Chat id or `@channelusername`.
        chat_id: String,
        text: String,

        #[arg(long)]
        html: bool,

        #[arg(long)]
        silent: bool,
    },

    /// Fetch pending updates once.
    GetUpdates {
        #[arg(long)]
        offset: Option<i64>,

        #[arg(long)]
        limit: Option<u32>,

        /// Long polling timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tgbot_core::logging::init("tgbot")?;

    let cfg = Config::load()?;
    let bot = TelegramBot::new(cfg)?;

    match cli.command {
        Command::GetMe => {
            let me = bot.get_me().await.context("getMe failed")?;
            info!(id = me.id, username = ?me.username, "token is valid");
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        Command::SendMessage {
            chat_id,
            text,
            html,
            silent,
        } => {
            let mut msg = Message {
                parse_mode: html.then_some(ParseMode::Html),
                disable_notification: silent.then_some(true),
                ..Message::text(chat_id, text)
            };
            bot.send_message(&mut msg)
                .await
                .context("sendMessage failed")?;
            info!(message_id = ?msg.message_id, sent_at = ?msg.sent_at(), "message sent");
            println!("{}", serde_json::to_string_pretty(&msg)?);
        }
        Command::GetUpdates {
            offset,
            limit,
            timeout_secs,
        } => {
            let updates = bot
                .get_updates(&GetUpdates {
                    offset,
                    limit,
                    timeout_secs,
                    allowed_updates: None,
                })
                .await
                .context("getUpdates failed")?;
            let next_offset = updates.last().map(|u| u.update_id + 1);
            info!(n = updates.len(), ?next_offset, "received updates");
            println!("{}", serde_json::to_string_pretty(&updates)?);
        }
    }

    Ok(())
}
