// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden serve` command implementation.
//!
//! Wires the event store, the Bot API client, and the update pipeline
//! together, then hands the pipeline to the webhook server. Also hosts
//! the `sync-roster` subcommand, which runs one roster sync and exits.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{error, info, warn};

use warden_config::WardenConfig;
use warden_core::WardenError;
use warden_storage::EventSink;
use warden_telegram::{Pipeline, TelegramControl};
use warden_webhook::WebhookState;

/// Runs the `warden serve` command.
///
/// Fatal setup failures (store unreachable, bad bot token) abort
/// startup; a missing webhook secret or editors space only degrades.
pub async fn run_serve(config: WardenConfig) -> Result<(), WardenError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting warden serve");

    if config.telegram.webhook_secret.is_none() {
        warn!("telegram.webhook_secret is not set -- secret header check disabled");
    }
    if config
        .telegram
        .editors_chat_id
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .is_empty()
    {
        warn!("telegram.editors_chat_id is not set -- removal cascade disabled");
    }

    let pipeline = build_pipeline(&config).await?;

    // Give the platform a moment to settle before the first sync so a
    // restart loop does not hammer get_chat_administrators.
    let sync_pipeline = pipeline.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        let (count, error) = sync_pipeline.sync_roster().await;
        match error {
            None => info!(count, "initial roster sync complete"),
            Some(error) => warn!(%error, "initial roster sync failed"),
        }
    });

    let state = WebhookState {
        pipeline,
        secret: config.telegram.webhook_secret.clone(),
    };
    warden_webhook::start_server(&config.webhook, state).await
}

/// Runs the `warden sync-roster` subcommand: one sync, then exit.
pub async fn run_sync_roster(config: WardenConfig) -> Result<(), WardenError> {
    init_tracing(&config.agent.log_level);

    let pipeline = build_pipeline(&config).await?;
    let (count, error) = pipeline.sync_roster().await;
    match error {
        None => {
            println!("Roster synchronized: {count} editors.");
            Ok(())
        }
        Some(error) => Err(WardenError::Internal(format!(
            "roster sync failed: {error}"
        ))),
    }
}

/// Open the store, verify the bot token, and assemble the pipeline.
async fn build_pipeline(config: &WardenConfig) -> Result<Pipeline, WardenError> {
    let store = warden_storage::open_store(&config.storage).await?;
    let sink = EventSink::new(store);
    sink.apply_schema().await.inspect_err(|e| {
        error!(error = %e, driver = %config.storage.driver, "failed to apply the storage schema");
    })?;
    info!(driver = %config.storage.driver, "event store ready");

    let bot = warden_telegram::build_bot(&config.telegram)?;
    let me = bot
        .get_me()
        .await
        .map_err(|e| WardenError::platform("bot token verification failed", e))?;
    info!(bot = %me.username(), "authenticated with the Bot API");

    let control = Arc::new(TelegramControl::new(bot));
    Ok(Pipeline::new(&config.telegram, control, sink))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warden={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
