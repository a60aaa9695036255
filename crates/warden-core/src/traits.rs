// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between event processing and the outside world.
//!
//! The classifier and the security cascade depend only on these traits,
//! never on a concrete transport or the platform client.

use async_trait::async_trait;

use crate::error::WardenError;
use crate::types::{
    AdminInfo, EditorRecord, MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
};

/// Persistence gateway: one logical store behind interchangeable
/// transports (direct SQLite, remote HTTP API).
///
/// Implementations return errors; the fire-and-forget policy for record
/// operations lives one layer up, in the event sink. Single attempt per
/// call, no retries, no queueing.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create or verify the backing schema. Fatal at startup on failure.
    async fn apply_schema(&self) -> Result<(), WardenError>;

    /// Insert a message record. Duplicate `(chat_id, message_id)` pairs
    /// are a [`WriteOutcome::Noop`], not an error.
    async fn create_message(&self, record: &MessageRecord) -> Result<WriteOutcome, WardenError>;

    /// Apply an edit to an already-logged message, appending to its
    /// edit history. Zero matched rows is a [`WriteOutcome::Noop`].
    async fn edit_message(&self, edit: &MessageEdit) -> Result<WriteOutcome, WardenError>;

    /// Append one membership event row.
    async fn log_membership_event(&self, event: &MembershipEvent) -> Result<(), WardenError>;

    /// Replace the editors roster wholesale, preserving each existing
    /// row's `is_inactive` flag by user id. Runs as a single
    /// transaction: failure must leave the previous roster intact.
    /// Returns the number of rows written.
    async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError>;
}

/// Outbound platform calls used by the security cascade and roster sync.
///
/// Chat ids are passed in canonical string form and parsed by the
/// implementation.
#[async_trait]
pub trait ChatControl: Send + Sync {
    /// Remove a user from a chat. Ban followed by an immediate
    /// unban-if-banned, the portable "kick" that works for both groups
    /// and broadcast channels.
    async fn kick_member(&self, chat_id: &str, user_id: i64) -> Result<(), WardenError>;

    /// Resolve a chat's display title, if it has one.
    async fn chat_title(&self, chat_id: &str) -> Result<Option<String>, WardenError>;

    /// Send a plain-text message to a chat.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), WardenError>;

    /// Fetch the chat's current administrator list.
    async fn chat_administrators(&self, chat_id: &str) -> Result<Vec<AdminInfo>, WardenError>;
}
