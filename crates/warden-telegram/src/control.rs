// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot API implementation of the ChatControl trait.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMember, ChatMemberKind, UserId};
use tracing::debug;

use warden_core::types::AdminInfo;
use warden_core::{ChatControl, WardenError};

/// Outbound platform calls via teloxide.
#[derive(Clone)]
pub struct TelegramControl {
    bot: Bot,
}

impl TelegramControl {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId, WardenError> {
    chat_id
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| WardenError::Platform {
            message: format!("invalid chat id `{chat_id}`"),
            source: None,
        })
}

/// Custom admin titles exist only for the administrator and owner
/// status payloads.
fn custom_title(kind: &ChatMemberKind) -> Option<String> {
    match kind {
        ChatMemberKind::Administrator(admin) => admin.custom_title.clone(),
        ChatMemberKind::Owner(owner) => owner.custom_title.clone(),
        _ => None,
    }
}

pub(crate) fn admin_info(member: &ChatMember) -> AdminInfo {
    AdminInfo {
        user_id: member.user.id.0 as i64,
        username: member.user.username.clone(),
        first_name: member.user.first_name.clone(),
        is_bot: member.user.is_bot,
        custom_title: custom_title(&member.kind),
    }
}

#[async_trait]
impl ChatControl for TelegramControl {
    async fn kick_member(&self, chat_id: &str, user_id: i64) -> Result<(), WardenError> {
        let chat = parse_chat_id(chat_id)?;
        let user = UserId(user_id as u64);

        self.bot
            .ban_chat_member(chat, user)
            .await
            .map_err(|e| WardenError::platform(format!("ban failed in {chat_id}"), e))?;
        // Immediate unban turns the ban into a kick; only_if_banned
        // keeps a racing manual unban from re-adding the user.
        self.bot
            .unban_chat_member(chat, user)
            .only_if_banned(true)
            .await
            .map_err(|e| WardenError::platform(format!("unban failed in {chat_id}"), e))?;

        debug!(chat_id, user_id, "kicked member");
        Ok(())
    }

    async fn chat_title(&self, chat_id: &str) -> Result<Option<String>, WardenError> {
        let chat = parse_chat_id(chat_id)?;
        let info = self
            .bot
            .get_chat(chat)
            .await
            .map_err(|e| WardenError::platform(format!("get_chat failed for {chat_id}"), e))?;
        Ok(info.title().map(str::to_string))
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), WardenError> {
        let chat = parse_chat_id(chat_id)?;
        self.bot
            .send_message(chat, text)
            .await
            .map_err(|e| WardenError::platform(format!("send failed to {chat_id}"), e))?;
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: &str) -> Result<Vec<AdminInfo>, WardenError> {
        let chat = parse_chat_id(chat_id)?;
        let members = self
            .bot
            .get_chat_administrators(chat)
            .await
            .map_err(|e| {
                WardenError::platform(format!("get_chat_administrators failed for {chat_id}"), e)
            })?;
        Ok(members.iter().map(admin_info).collect())
    }
}
