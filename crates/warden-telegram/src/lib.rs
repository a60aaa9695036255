// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram side of the Warden relay.
//!
//! Classifies raw Bot API updates into tagged inbound events, filters
//! them against the chat allow-list, persists them through the event
//! sink, and runs the two security workflows: the removal cascade on an
//! editors-space exit and the roster sync.

pub mod cascade;
pub mod classify;
pub mod control;
pub mod filter;
pub mod pipeline;
pub mod roster;

use teloxide::prelude::*;

use warden_config::model::TelegramConfig;
use warden_core::WardenError;

pub use classify::{classify, InboundEvent, MembershipSignal};
pub use control::TelegramControl;
pub use filter::AllowList;
pub use pipeline::Pipeline;

/// Build the Bot API client from configuration.
///
/// Requires `telegram.bot_token`.
pub fn build_bot(config: &TelegramConfig) -> Result<Bot, WardenError> {
    let token = config.bot_token.as_deref().ok_or_else(|| {
        WardenError::Config("telegram.bot_token is required".into())
    })?;
    if token.is_empty() {
        return Err(WardenError::Config(
            "telegram.bot_token cannot be empty".into(),
        ));
    }
    Ok(Bot::new(token))
}
