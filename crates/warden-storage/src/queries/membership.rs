// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only membership event log.

use rusqlite::params;

use warden_core::types::MembershipEvent;
use warden_core::WardenError;

use crate::database::Database;
use crate::queries::format_ts;

/// Append one membership event row.
pub async fn log_membership_event(
    db: &Database,
    event: &MembershipEvent,
) -> Result<(), WardenError> {
    let event = event.clone();
    let conn = db.acquire().await?;
    conn.call(move |conn| -> Result<usize, rusqlite::Error> {
        conn.execute(
            "INSERT INTO chat_member_log (event_timestamp, chat_id, chat_title, user_id, \
             user_first_name, user_username, event_type, actor_user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                format_ts(event.timestamp),
                event.chat_id,
                event.chat_title,
                event.user_id,
                event.user_first_name,
                event.user_username,
                event.change.to_string(),
                event.actor_user_id,
            ],
        )
    })
    .await
    .map_err(crate::database::map_tr_err)?;
    Ok(())
}
