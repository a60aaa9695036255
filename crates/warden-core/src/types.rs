// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records persisted by the gateway and the pure membership
//! transition classification.
//!
//! Chat ids are `i64` inside records (the stores use BIGINT/INTEGER
//! columns); configuration carries the string form and comparisons
//! normalize through `i64::to_string()`. That one rule is applied
//! everywhere a chat id crosses a boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One snapshot in a message's edit history.
///
/// The first entry is written at creation time; every subsequent edit
/// appends one entry. Entries are never replaced or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSnapshot {
    pub timestamp: DateTime<Utc>,
    pub text: Option<String>,
}

/// A normalized message record, extracted once per message-created event.
///
/// `(chat_id, message_id)` is the natural key; submitting the same
/// record twice must be a no-op at the store, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: i64,
    pub chat_id: i64,
    pub chat_type: String,
    pub chat_title: Option<String>,
    pub topic_id: Option<i64>,
    pub topic_name: Option<String>,
    pub author_user_id: Option<i64>,
    pub author_username: Option<String>,
    pub author_first_name: Option<String>,
    pub author_is_bot: Option<bool>,
    pub text: Option<String>,
    pub content_type: String,
    pub file_id: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub forward_from_chat_id: Option<i64>,
    pub forward_from_message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub edit_history: Vec<EditSnapshot>,
}

/// Delta applied when an already-logged message is edited.
///
/// Applied as a conditional update: a store that finds no matching
/// `(chat_id, message_id)` row treats the edit as a silent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEdit {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: Option<String>,
    pub edited_at: DateTime<Utc>,
}

impl MessageEdit {
    /// The edit-history entry this delta appends.
    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            timestamp: self.edited_at,
            text: self.text.clone(),
        }
    }
}

/// Membership status universe used by transition classification.
///
/// A restricted user is neither cleanly present nor absent, so any
/// transition touching `Restricted` classifies as
/// [`MembershipChange::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Member,
    Administrator,
    Owner,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    /// True for statuses that count as "in the chat".
    pub fn is_present(self) -> bool {
        matches!(
            self,
            MemberStatus::Member | MemberStatus::Administrator | MemberStatus::Owner
        )
    }

    /// True for statuses that count as "out of the chat".
    pub fn is_absent(self) -> bool {
        matches!(self, MemberStatus::Left | MemberStatus::Banned)
    }
}

/// Semantic membership change derived from an old/new status pair.
///
/// `Unknown` events are discarded before persistence and never trigger
/// the security cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    Joined,
    Left,
    Unknown,
}

impl MembershipChange {
    /// Classify an old/new status transition.
    ///
    /// `joined`: absent -> present. `left`: present -> absent. Every
    /// other pair (including promotions, demotions, and anything
    /// involving `Restricted`) is `Unknown`.
    pub fn classify(old: MemberStatus, new: MemberStatus) -> Self {
        if old.is_absent() && new.is_present() {
            MembershipChange::Joined
        } else if old.is_present() && new.is_absent() {
            MembershipChange::Left
        } else {
            MembershipChange::Unknown
        }
    }
}

/// A classified chat-membership event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipEvent {
    pub timestamp: DateTime<Utc>,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub user_id: i64,
    pub user_first_name: String,
    pub user_username: Option<String>,
    pub change: MembershipChange,
    pub actor_user_id: Option<i64>,
}

/// Role assigned to an editors-space administrator during roster sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EditorRole {
    Editor,
    Executor,
}

/// One row of the persisted editors roster.
///
/// The roster is replaced wholesale on every sync, except `is_inactive`,
/// which is carried forward by `user_id` lookup before the replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub role: EditorRole,
    pub is_inactive: bool,
    pub added_at: DateTime<Utc>,
}

/// A chat administrator as reported by the platform.
///
/// This is the [`crate::ChatControl`] view of an admin, before roster
/// sync filters bots and derives roles.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminInfo {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub is_bot: bool,
    pub custom_title: Option<String>,
}

/// The user a security cascade acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectUser {
    pub user_id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

impl SubjectUser {
    /// Handle for report rendering: `@name` or `N/A`.
    pub fn handle(&self) -> String {
        match &self.username {
            Some(name) => format!("@{name}"),
            None => "N/A".to_string(),
        }
    }
}

/// Per-target outcomes of one cascade run. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    /// Display titles (or raw ids) of spaces the user was removed from,
    /// in target order.
    pub succeeded: Vec<String>,
    /// Raw ids of spaces where removal failed, in target order.
    pub failed: Vec<String>,
}

/// Outcome of an idempotent store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write changed a row.
    Applied,
    /// The write matched nothing (duplicate create, edit of an
    /// unlogged message). Success, not an error.
    Noop,
}
