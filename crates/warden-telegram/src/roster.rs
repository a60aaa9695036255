// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster sync: reconcile the persisted editors roster with the live
//! administrator list of the editors space.

use chrono::Utc;
use tracing::{info, warn};

use warden_core::types::{AdminInfo, EditorRecord, EditorRole};
use warden_core::ChatControl;
use warden_storage::EventSink;

/// Derive the roster role from an admin's custom title.
///
/// A title containing the executor keyword (case-insensitive) marks an
/// executor; everyone else is a plain editor.
pub fn editor_role(admin: &AdminInfo, executor_keyword: &str) -> EditorRole {
    let keyword = executor_keyword.to_lowercase();
    match &admin.custom_title {
        Some(title) if !keyword.is_empty() && title.to_lowercase().contains(&keyword) => {
            EditorRole::Executor
        }
        _ => EditorRole::Editor,
    }
}

/// Fetch the editors space admins and replace the persisted roster.
///
/// Returns the number of editors written, plus an error string for the
/// operator reply when the sync could not complete. Bots are filtered
/// out; an admin list with no humans is reported as an error, not an
/// empty replace.
pub async fn sync_editors(
    control: &dyn ChatControl,
    sink: &EventSink,
    editors_chat_id: Option<&str>,
    executor_keyword: &str,
) -> (usize, Option<String>) {
    let editors_chat_id = match editors_chat_id {
        Some(id) if !id.trim().is_empty() => id.trim(),
        _ => {
            warn!("roster sync requested but the editors space is not configured");
            return (0, Some("the editors space is not configured".to_string()));
        }
    };

    let admins = match control.chat_administrators(editors_chat_id).await {
        Ok(admins) => admins,
        Err(e) => {
            return (0, Some(format!("failed to fetch administrators: {e}")));
        }
    };

    let now = Utc::now();
    let roster: Vec<EditorRecord> = admins
        .iter()
        .filter(|admin| !admin.is_bot)
        .map(|admin| EditorRecord {
            user_id: admin.user_id,
            username: admin.username.clone(),
            first_name: admin.first_name.clone(),
            role: editor_role(admin, executor_keyword),
            is_inactive: false,
            added_at: now,
        })
        .collect();

    if roster.is_empty() {
        return (
            0,
            Some("no human administrators found in the editors space".to_string()),
        );
    }

    match sink.replace_roster(&roster).await {
        Ok(count) => {
            info!(count, "editors roster synchronized");
            (count, None)
        }
        Err(e) => (0, Some(format!("failed to store the roster: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use warden_core::types::{
        MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
    };
    use warden_core::{EventStore, WardenError};

    #[derive(Default)]
    struct MockStore {
        replaced: Mutex<Vec<Vec<EditorRecord>>>,
        fail_replace: bool,
    }

    #[async_trait]
    impl EventStore for MockStore {
        async fn apply_schema(&self) -> Result<(), WardenError> {
            Ok(())
        }

        async fn create_message(
            &self,
            _record: &MessageRecord,
        ) -> Result<WriteOutcome, WardenError> {
            Ok(WriteOutcome::Applied)
        }

        async fn edit_message(&self, _edit: &MessageEdit) -> Result<WriteOutcome, WardenError> {
            Ok(WriteOutcome::Applied)
        }

        async fn log_membership_event(
            &self,
            _event: &MembershipEvent,
        ) -> Result<(), WardenError> {
            Ok(())
        }

        async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError> {
            if self.fail_replace {
                return Err(WardenError::Internal("store down".into()));
            }
            self.replaced.lock().unwrap().push(roster.to_vec());
            Ok(roster.len())
        }
    }

    struct MockControl {
        admins: Result<Vec<AdminInfo>, String>,
    }

    #[async_trait]
    impl ChatControl for MockControl {
        async fn kick_member(&self, _chat_id: &str, _user_id: i64) -> Result<(), WardenError> {
            Ok(())
        }

        async fn chat_title(&self, _chat_id: &str) -> Result<Option<String>, WardenError> {
            Ok(None)
        }

        async fn send_message(&self, _chat_id: &str, _text: &str) -> Result<(), WardenError> {
            Ok(())
        }

        async fn chat_administrators(
            &self,
            _chat_id: &str,
        ) -> Result<Vec<AdminInfo>, WardenError> {
            self.admins.clone().map_err(WardenError::Internal)
        }
    }

    fn admin(user_id: i64, first_name: &str, is_bot: bool, title: Option<&str>) -> AdminInfo {
        AdminInfo {
            user_id,
            username: Some(first_name.to_lowercase()),
            first_name: first_name.to_string(),
            is_bot,
            custom_title: title.map(str::to_string),
        }
    }

    #[test]
    fn executor_keyword_matches_case_insensitively() {
        let keyword = "исполнитель";
        assert_eq!(
            editor_role(&admin(1, "Alice", false, Some("Исполнитель проекта")), keyword),
            EditorRole::Executor
        );
        assert_eq!(
            editor_role(&admin(2, "Bob", false, Some("редактор")), keyword),
            EditorRole::Editor
        );
        assert_eq!(
            editor_role(&admin(3, "Carol", false, None), keyword),
            EditorRole::Editor
        );
    }

    #[tokio::test]
    async fn sync_filters_bots_and_assigns_roles() {
        let control = MockControl {
            admins: Ok(vec![
                admin(1, "Alice", false, Some("Исполнитель")),
                admin(2, "Bot", true, None),
                admin(3, "Carol", false, None),
            ]),
        };
        let store = Arc::new(MockStore::default());
        let sink = EventSink::new(store.clone());

        let (count, error) = sync_editors(&control, &sink, Some("-100500"), "исполнитель").await;
        assert_eq!(count, 2);
        assert!(error.is_none());

        let replaced = store.replaced.lock().unwrap();
        let roster = &replaced[0];
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].role, EditorRole::Executor);
        assert_eq!(roster[1].role, EditorRole::Editor);
        assert!(roster.iter().all(|e| !e.is_inactive));
    }

    #[tokio::test]
    async fn sync_without_configured_space_errors() {
        let control = MockControl { admins: Ok(vec![]) };
        let sink = EventSink::new(Arc::new(MockStore::default()));

        let (count, error) = sync_editors(&control, &sink, None, "исполнитель").await;
        assert_eq!(count, 0);
        assert!(error.unwrap().contains("not configured"));

        let (_, error) = sync_editors(&control, &sink, Some("  "), "исполнитель").await;
        assert!(error.is_some());
    }

    #[tokio::test]
    async fn sync_with_only_bots_errors() {
        let control = MockControl {
            admins: Ok(vec![admin(2, "Bot", true, None)]),
        };
        let store = Arc::new(MockStore::default());
        let sink = EventSink::new(store.clone());

        let (count, error) = sync_editors(&control, &sink, Some("-100500"), "исполнитель").await;
        assert_eq!(count, 0);
        assert!(error.unwrap().contains("no human administrators"));
        assert!(store.replaced.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_failure_is_reported_as_error_text() {
        let control = MockControl {
            admins: Err("api down".to_string()),
        };
        let sink = EventSink::new(Arc::new(MockStore::default()));

        let (count, error) = sync_editors(&control, &sink, Some("-100500"), "исполнитель").await;
        assert_eq!(count, 0);
        assert!(error.unwrap().contains("failed to fetch administrators"));
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_error_text() {
        let control = MockControl {
            admins: Ok(vec![admin(1, "Alice", false, None)]),
        };
        let sink = EventSink::new(Arc::new(MockStore {
            fail_replace: true,
            ..MockStore::default()
        }));

        let (count, error) = sync_editors(&control, &sink, Some("-100500"), "исполнитель").await;
        assert_eq!(count, 0);
        assert!(error.unwrap().contains("failed to store the roster"));
    }
}
