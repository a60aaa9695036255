// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat allow-list.
//!
//! Membership is decided on the canonical string form of the numeric
//! chat id. Configured entries are trimmed and empties dropped, so a
//! trailing comma in the config never admits every chat.

/// Compiled allow-list of chat ids.
#[derive(Debug, Clone)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    /// Compile from the comma-separated target list plus the editors
    /// space id, when configured.
    pub fn compile(editors_chat_id: Option<&str>, allowed_chat_ids: &str) -> Self {
        let mut entries: Vec<String> = allowed_chat_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(editors) = editors_chat_id {
            let editors = editors.trim();
            if !editors.is_empty() && !entries.iter().any(|e| e == editors) {
                entries.push(editors.to_string());
            }
        }
        Self { entries }
    }

    /// Exact membership check on the canonical representation.
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        let canonical = chat_id.to_string();
        self.entries.iter().any(|e| *e == canonical)
    }

    /// The configured target ids, editors space included.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
