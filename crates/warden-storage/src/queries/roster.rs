// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Editors roster replacement.

use std::collections::HashMap;

use rusqlite::params;

use warden_core::types::EditorRecord;
use warden_core::WardenError;

use crate::database::Database;
use crate::queries::format_ts;

/// Replace the roster wholesale inside one transaction.
///
/// Existing rows contribute their `is_inactive` flag by user id, so an
/// operator-set inactive marker survives re-sync. A failed insert rolls
/// the whole replacement back and leaves the previous roster intact.
/// Returns the number of rows written.
pub async fn replace_roster(db: &Database, roster: &[EditorRecord]) -> Result<usize, WardenError> {
    let roster = roster.to_vec();
    let conn = db.acquire().await?;
    conn.call(move |conn| -> Result<usize, rusqlite::Error> {
        let tx = conn.transaction()?;

        let mut preserved: HashMap<i64, bool> = HashMap::new();
        {
            let mut stmt = tx.prepare("SELECT user_id, is_inactive FROM editors")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?))
            })?;
            for row in rows {
                let (user_id, is_inactive) = row?;
                preserved.insert(user_id, is_inactive);
            }
        }

        tx.execute("DELETE FROM editors", [])?;

        let mut written = 0;
        for editor in &roster {
            let is_inactive = preserved
                .get(&editor.user_id)
                .copied()
                .unwrap_or(editor.is_inactive);
            written += tx.execute(
                "INSERT INTO editors (user_id, username, first_name, role, is_inactive, added_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    editor.user_id,
                    editor.username,
                    editor.first_name,
                    editor.role.to_string(),
                    is_inactive,
                    format_ts(editor.added_at),
                ],
            )?;
        }

        tx.commit()?;
        Ok(written)
    })
    .await
    .map_err(crate::database::map_tr_err)
}
