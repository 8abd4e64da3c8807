// This is the entry point of the relay/moderation bot pair.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (Telegram Bot API client)
// - `telegram/` = Telegram-specific adapters (update handlers, keyboards)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the long-polling loop for the selected mode
//
// The two modes run as independent processes sharing no memory; the
// moderation chat is their only coordination point.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "telegram/telegram_layer.rs"]
mod telegram;

mod config;

use crate::config::{Config, Mode};
use crate::core::approval::ApprovalService;
use crate::core::queue::PendingQueue;
use crate::core::relay::RelayService;
use crate::core::restriction::RestrictionPolicy;
use crate::infra::telegram::{TelegramApiClient, TelegramModerationGateway, TelegramRelayTransport};
use crate::telegram::moderator_handlers::ModeratorHandler;
use crate::telegram::polling::UpdatePoller;
use crate::telegram::relay_handlers::RelayHandler;
use anyhow::{bail, Context};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let mode: Mode = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => bail!("usage: relay_moderation_bot <relay|moderator>"),
    };

    let config = Config::from_env(mode).context("configuration error")?;

    tracing::info!(
        ?mode,
        approvers = config.approver_ids.len(),
        targets = config.target_channels.len(),
        sources = config.source_channel_ids.len(),
        moderation_chat_id = config.moderation_chat_id,
        "configuration loaded"
    );

    match mode {
        Mode::Relay => run_relay(config).await,
        Mode::Moderator => run_moderator(config).await,
    }

    Ok(())
}

async fn run_relay(config: Config) {
    let client = TelegramApiClient::new(config.bot_token.clone());
    let transport = TelegramRelayTransport::new(client.clone(), config.moderation_chat_id);
    let relay = RelayService::new(transport, RestrictionPolicy::default());
    let handler = RelayHandler::new(relay, config.source_channel_ids);

    UpdatePoller::new(client).run(&handler).await;
}

async fn run_moderator(config: Config) {
    let client = TelegramApiClient::new(config.bot_token.clone());

    // The pending-post table lives only in this process's memory; a restart
    // loses unresolved posts (explicit non-goal: durability).
    let queue = Arc::new(PendingQueue::new());

    let gateway = TelegramModerationGateway::new(client.clone());
    let approval = ApprovalService::new(
        gateway,
        config.approver_ids.clone(),
        config.target_channels.clone(),
        Arc::clone(&queue),
    );

    let handler = ModeratorHandler::new(
        client.clone(),
        approval,
        queue,
        config.approver_ids,
        config.target_channels,
        config.relay_bot_id,
    );

    UpdatePoller::new(client).run(&handler).await;
}
