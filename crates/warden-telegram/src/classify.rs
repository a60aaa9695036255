// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event classification: raw Telegram updates into tagged inbound events.
//!
//! Each supported update kind maps to exactly one variant carrying only
//! the fields valid for that kind. New messages and channel posts share
//! a shape, as do their edited counterparts. Everything else is not our
//! traffic and classifies to `None`.

use teloxide::types::{
    ChatMemberKind, ChatMemberUpdated, Message, MessageKind, MessageOrigin, Update, UpdateKind,
};

use warden_core::types::{
    EditSnapshot, MemberStatus, MembershipChange, MembershipEvent, MessageEdit, MessageRecord,
};

/// A classified inbound event.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    MessageCreated(MessageRecord),
    MessageEdited(MessageEdit),
    Membership(MembershipSignal),
}

/// Membership transition with enough raw status to drive the cascade.
///
/// The logged `change` can be `Unknown` (promotion, restriction) and is
/// discarded at the logging step, but the cascade triggers on the new
/// status alone: a restricted editor who then leaves still left.
#[derive(Debug, Clone)]
pub struct MembershipSignal {
    pub event: MembershipEvent,
    pub old_status: MemberStatus,
    pub new_status: MemberStatus,
}

/// Classify one update. Unsupported kinds return `None`.
pub fn classify(update: &Update) -> Option<InboundEvent> {
    match &update.kind {
        UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => {
            Some(InboundEvent::MessageCreated(message_record(msg)))
        }
        UpdateKind::EditedMessage(msg) | UpdateKind::EditedChannelPost(msg) => {
            Some(InboundEvent::MessageEdited(message_edit(msg)))
        }
        UpdateKind::ChatMember(member) => {
            Some(InboundEvent::Membership(membership_signal(member)))
        }
        _ => None,
    }
}

/// The chat id an event belongs to, for allow-list filtering.
pub fn event_chat_id(event: &InboundEvent) -> i64 {
    match event {
        InboundEvent::MessageCreated(record) => record.chat_id,
        InboundEvent::MessageEdited(edit) => edit.chat_id,
        InboundEvent::Membership(signal) => signal.event.chat_id,
    }
}

fn chat_type(msg: &Message) -> String {
    if msg.chat.is_private() {
        "private"
    } else if msg.chat.is_group() {
        "group"
    } else if msg.chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
    .to_string()
}

fn common(msg: &Message) -> Option<&teloxide::types::MessageCommon> {
    match &msg.kind {
        MessageKind::Common(common) => Some(common),
        _ => None,
    }
}

/// Content kind plus the platform file id for media kinds. Telegram
/// sends photos as a size ladder; the last entry is the original.
fn content_and_file(msg: &Message) -> (String, Option<String>) {
    if msg.text().is_some() {
        ("text".to_string(), None)
    } else if let Some(photos) = msg.photo() {
        (
            "photo".to_string(),
            photos.last().map(|p| p.file.id.to_string()),
        )
    } else if let Some(video) = msg.video() {
        ("video".to_string(), Some(video.file.id.to_string()))
    } else if let Some(doc) = msg.document() {
        ("document".to_string(), Some(doc.file.id.to_string()))
    } else if let Some(audio) = msg.audio() {
        ("audio".to_string(), Some(audio.file.id.to_string()))
    } else if let Some(voice) = msg.voice() {
        ("voice".to_string(), Some(voice.file.id.to_string()))
    } else if let Some(sticker) = msg.sticker() {
        ("sticker".to_string(), Some(sticker.file.id.to_string()))
    } else if msg.location().is_some() {
        ("location".to_string(), None)
    } else if msg.contact().is_some() {
        ("contact".to_string(), None)
    } else {
        ("unknown".to_string(), None)
    }
}

fn topic_fields(msg: &Message) -> (Option<i64>, Option<String>) {
    if !msg.is_topic_message {
        return (None, None);
    }
    let topic_id = msg.thread_id.map(|t| i64::from(t.0 .0));
    // Topic messages reply to the topic's creation service message;
    // without one we are in the implicit General topic.
    let topic_name = msg
        .reply_to_message()
        .and_then(|reply| match &reply.kind {
            MessageKind::ForumTopicCreated(created) => {
                Some(created.forum_topic_created.name.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| "General".to_string());
    (topic_id, Some(topic_name))
}

fn forward_fields(msg: &Message) -> (Option<i64>, Option<i64>) {
    match common(msg).and_then(|c| c.forward_origin.as_ref()) {
        Some(MessageOrigin::Channel {
            chat, message_id, ..
        }) => (Some(chat.id.0), Some(i64::from(message_id.0))),
        Some(MessageOrigin::Chat { sender_chat, .. }) => (Some(sender_chat.id.0), None),
        _ => (None, None),
    }
}

fn message_record(msg: &Message) -> MessageRecord {
    let text = msg
        .text()
        .or_else(|| msg.caption())
        .map(str::to_string);
    let (content_type, file_id) = content_and_file(msg);
    let (topic_id, topic_name) = topic_fields(msg);
    let (forward_from_chat_id, forward_from_message_id) = forward_fields(msg);

    // Anonymous channel posts carry no user; the signature line is the
    // closest thing to an author name.
    let author_signature = common(msg).and_then(|c| c.author_signature.clone());

    MessageRecord {
        message_id: i64::from(msg.id.0),
        chat_id: msg.chat.id.0,
        chat_type: chat_type(msg),
        chat_title: msg.chat.title().map(str::to_string),
        topic_id,
        topic_name,
        author_user_id: msg.from.as_ref().map(|u| u.id.0 as i64),
        author_username: msg.from.as_ref().and_then(|u| u.username.clone()),
        author_first_name: msg
            .from
            .as_ref()
            .map(|u| u.first_name.clone())
            .or(author_signature),
        author_is_bot: msg.from.as_ref().map(|u| u.is_bot),
        text: text.clone(),
        content_type,
        file_id,
        reply_to_message_id: msg.reply_to_message().map(|r| i64::from(r.id.0)),
        forward_from_chat_id,
        forward_from_message_id,
        created_at: msg.date,
        edit_history: vec![EditSnapshot {
            timestamp: msg.date,
            text,
        }],
    }
}

fn message_edit(msg: &Message) -> MessageEdit {
    MessageEdit {
        chat_id: msg.chat.id.0,
        message_id: i64::from(msg.id.0),
        text: msg.text().or_else(|| msg.caption()).map(str::to_string),
        edited_at: common(msg).and_then(|c| c.edit_date).unwrap_or(msg.date),
    }
}

fn member_status(kind: &ChatMemberKind) -> MemberStatus {
    if kind.is_owner() {
        MemberStatus::Owner
    } else if kind.is_administrator() {
        MemberStatus::Administrator
    } else if kind.is_restricted() {
        MemberStatus::Restricted
    } else if kind.is_banned() {
        MemberStatus::Banned
    } else if kind.is_left() {
        MemberStatus::Left
    } else {
        MemberStatus::Member
    }
}

fn membership_signal(update: &ChatMemberUpdated) -> MembershipSignal {
    let old_status = member_status(&update.old_chat_member.kind);
    let new_status = member_status(&update.new_chat_member.kind);
    let subject = &update.new_chat_member.user;

    MembershipSignal {
        event: MembershipEvent {
            timestamp: update.date,
            chat_id: update.chat.id.0,
            chat_title: update.chat.title().map(str::to_string),
            user_id: subject.id.0 as i64,
            user_first_name: subject.first_name.clone(),
            user_username: subject.username.clone(),
            change: MembershipChange::classify(old_status, new_status),
            actor_user_id: Some(update.from.id.0 as i64),
        },
        old_status,
        new_status,
    }
}
