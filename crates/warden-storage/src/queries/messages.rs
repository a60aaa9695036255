// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log operations: idempotent create and history-appending edit.

use rusqlite::params;

use warden_core::types::{MessageEdit, MessageRecord, WriteOutcome};
use warden_core::WardenError;

use crate::database::Database;
use crate::queries::format_ts;

/// Insert a message record.
///
/// Duplicate `(chat_id, message_id)` pairs hit the unique constraint
/// and resolve to [`WriteOutcome::Noop`]. The platform redelivers
/// updates after a 500, so creates must tolerate replays.
pub async fn create_message(
    db: &Database,
    record: &MessageRecord,
) -> Result<WriteOutcome, WardenError> {
    let record = record.clone();
    let edit_history =
        serde_json::to_string(&record.edit_history).map_err(WardenError::storage)?;
    let conn = db.acquire().await?;
    let changed = conn
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "INSERT INTO message_log (message_id, chat_id, chat_type, chat_title, \
                 topic_id, topic_name, author_user_id, author_username, author_first_name, \
                 author_is_bot, text, content_type, file_id, reply_to_message_id, \
                 forward_from_chat_id, forward_from_message_id, created_at, last_edited_at, \
                 edit_history, logged_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                 ?16, ?17, NULL, ?18, ?19) \
                 ON CONFLICT (chat_id, message_id) DO NOTHING",
                params![
                    record.message_id,
                    record.chat_id,
                    record.chat_type,
                    record.chat_title,
                    record.topic_id,
                    record.topic_name,
                    record.author_user_id,
                    record.author_username,
                    record.author_first_name,
                    record.author_is_bot,
                    record.text,
                    record.content_type,
                    record.file_id,
                    record.reply_to_message_id,
                    record.forward_from_chat_id,
                    record.forward_from_message_id,
                    format_ts(record.created_at),
                    edit_history,
                    format_ts(chrono::Utc::now()),
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(if changed == 0 {
        WriteOutcome::Noop
    } else {
        WriteOutcome::Applied
    })
}

/// Apply an edit to an already-logged message.
///
/// Appends the edit snapshot to the JSON `edit_history` array and
/// refreshes `text` and `last_edited_at`. An edit whose original was
/// never logged matches zero rows and is a [`WriteOutcome::Noop`].
pub async fn edit_message(db: &Database, edit: &MessageEdit) -> Result<WriteOutcome, WardenError> {
    let snapshot = serde_json::to_string(&edit.snapshot()).map_err(WardenError::storage)?;
    let edit = edit.clone();
    let conn = db.acquire().await?;
    let changed = conn
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE message_log SET text = ?1, last_edited_at = ?2, \
                 edit_history = json_insert(edit_history, '$[#]', json(?3)) \
                 WHERE chat_id = ?4 AND message_id = ?5",
                params![
                    edit.text,
                    format_ts(edit.edited_at),
                    snapshot,
                    edit.chat_id,
                    edit.message_id,
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(if changed == 0 {
        WriteOutcome::Noop
    } else {
        WriteOutcome::Applied
    })
}
