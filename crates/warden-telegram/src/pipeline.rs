// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update pipeline: operator commands, classification, filtering,
//! persistence, and the security cascade, in that order.

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{Update, UpdateKind};
use tracing::{debug, info};

use warden_config::model::TelegramConfig;
use warden_core::types::{MembershipChange, SubjectUser};
use warden_core::{ChatControl, WardenError};
use warden_storage::EventSink;

use crate::cascade;
use crate::classify::{classify, event_chat_id, InboundEvent, MembershipSignal};
use crate::filter::AllowList;
use crate::roster;

const SYNC_COMMAND: &str = "/sync_editors";

/// Wired-up event pipeline shared by the webhook handlers.
#[derive(Clone)]
pub struct Pipeline {
    allow: AllowList,
    control: Arc<dyn ChatControl>,
    sink: EventSink,
    editors_chat_id: Option<String>,
    executor_user_id: Option<i64>,
    executor_keyword: String,
    cascade_delay: Duration,
}

impl Pipeline {
    pub fn new(config: &TelegramConfig, control: Arc<dyn ChatControl>, sink: EventSink) -> Self {
        let editors_chat_id = config
            .editors_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            allow: AllowList::compile(editors_chat_id.as_deref(), &config.allowed_chat_ids),
            control,
            sink,
            editors_chat_id,
            executor_user_id: config.executor_user_id,
            executor_keyword: config.executor_title_keyword.clone(),
            cascade_delay: Duration::from_millis(config.cascade_delay_ms),
        }
    }

    /// Process one inbound update end to end.
    pub async fn handle_update(&self, update: &Update) -> Result<(), WardenError> {
        if self.try_operator_command(update).await? {
            return Ok(());
        }

        let Some(event) = classify(update) else {
            return Ok(());
        };

        let chat_id = event_chat_id(&event);
        if !self.allow.is_allowed(chat_id) {
            debug!(chat_id, "chat not on the allow-list, ignoring");
            return Ok(());
        }

        match event {
            InboundEvent::MessageCreated(record) => {
                self.sink.record_message(&record).await;
            }
            InboundEvent::MessageEdited(edit) => {
                self.sink.record_edit(&edit).await;
            }
            InboundEvent::Membership(signal) => {
                self.handle_membership(signal).await;
            }
        }
        Ok(())
    }

    async fn handle_membership(&self, signal: MembershipSignal) {
        // Promotions, restrictions and other in-place status moves are
        // not loggable transitions.
        if signal.event.change != MembershipChange::Unknown {
            self.sink.record_membership(&signal.event).await;
        }

        let Some(editors_chat_id) = self.editors_chat_id.as_deref() else {
            return;
        };
        let is_editors_space = signal.event.chat_id.to_string() == editors_chat_id;
        if !is_editors_space || !signal.new_status.is_absent() {
            return;
        }

        let subject = SubjectUser {
            user_id: signal.event.user_id,
            first_name: signal.event.user_first_name.clone(),
            username: signal.event.user_username.clone(),
        };
        let report = cascade::run_cascade(
            self.control.as_ref(),
            &subject,
            self.allow.entries(),
            editors_chat_id,
            self.cascade_delay,
        )
        .await;
        let text = cascade::render_report(&subject, &report);
        cascade::send_report(self.control.as_ref(), editors_chat_id, &text).await;
    }

    /// Handle `/sync_editors` from the configured executor in a private
    /// chat. Returns true when the update was consumed as a command.
    async fn try_operator_command(&self, update: &Update) -> Result<bool, WardenError> {
        let UpdateKind::Message(msg) = &update.kind else {
            return Ok(false);
        };
        if !msg.chat.is_private() {
            return Ok(false);
        }
        let Some(text) = msg.text() else {
            return Ok(false);
        };
        if !text.starts_with(SYNC_COMMAND) {
            return Ok(false);
        }

        let sender = msg.from.as_ref().map(|u| u.id.0 as i64);
        let Some(executor) = self.executor_user_id else {
            debug!("sync command received but no executor is configured");
            return Ok(true);
        };
        if sender != Some(executor) {
            debug!(?sender, "sync command from a non-executor, ignoring");
            return Ok(true);
        }

        info!(executor, "manual roster sync requested");
        let (count, error) = roster::sync_editors(
            self.control.as_ref(),
            &self.sink,
            self.editors_chat_id.as_deref(),
            &self.executor_keyword,
        )
        .await;

        let reply = match error {
            None => format!("Roster synchronized: {count} editors."),
            Some(error) => format!("Roster sync failed: {error}"),
        };
        self.control
            .send_message(&msg.chat.id.0.to_string(), &reply)
            .await?;
        Ok(true)
    }

    /// Run the roster sync outside of a command context (startup task,
    /// CLI subcommand).
    pub async fn sync_roster(&self) -> (usize, Option<String>) {
        roster::sync_editors(
            self.control.as_ref(),
            &self.sink,
            self.editors_chat_id.as_deref(),
            &self.executor_keyword,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use warden_core::types::{
        AdminInfo, EditorRecord, MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
    };
    use warden_core::EventStore;

    #[derive(Default)]
    struct MockStore {
        created: Mutex<Vec<MessageRecord>>,
        edited: Mutex<Vec<MessageEdit>>,
        membership: Mutex<Vec<MembershipEvent>>,
        rosters: Mutex<Vec<Vec<EditorRecord>>>,
    }

    #[async_trait]
    impl EventStore for MockStore {
        async fn apply_schema(&self) -> Result<(), WardenError> {
            Ok(())
        }

        async fn create_message(
            &self,
            record: &MessageRecord,
        ) -> Result<WriteOutcome, WardenError> {
            self.created.lock().unwrap().push(record.clone());
            Ok(WriteOutcome::Applied)
        }

        async fn edit_message(&self, edit: &MessageEdit) -> Result<WriteOutcome, WardenError> {
            self.edited.lock().unwrap().push(edit.clone());
            Ok(WriteOutcome::Applied)
        }

        async fn log_membership_event(
            &self,
            event: &MembershipEvent,
        ) -> Result<(), WardenError> {
            self.membership.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError> {
            self.rosters.lock().unwrap().push(roster.to_vec());
            Ok(roster.len())
        }
    }

    #[derive(Default)]
    struct MockControl {
        kicked: Mutex<Vec<(String, i64)>>,
        sent: Mutex<Vec<(String, String)>>,
        admins: Vec<AdminInfo>,
    }

    #[async_trait]
    impl ChatControl for MockControl {
        async fn kick_member(&self, chat_id: &str, user_id: i64) -> Result<(), WardenError> {
            self.kicked
                .lock()
                .unwrap()
                .push((chat_id.to_string(), user_id));
            Ok(())
        }

        async fn chat_title(&self, _chat_id: &str) -> Result<Option<String>, WardenError> {
            Ok(None)
        }

        async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), WardenError> {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn chat_administrators(
            &self,
            _chat_id: &str,
        ) -> Result<Vec<AdminInfo>, WardenError> {
            Ok(self.admins.clone())
        }
    }

    fn test_config() -> TelegramConfig {
        TelegramConfig {
            editors_chat_id: Some("-100500".to_string()),
            allowed_chat_ids: "-1001,-1002".to_string(),
            executor_user_id: Some(777),
            cascade_delay_ms: 0,
            ..TelegramConfig::default()
        }
    }

    fn make_pipeline(
        config: TelegramConfig,
        control: Arc<MockControl>,
        store: Arc<MockStore>,
    ) -> Pipeline {
        Pipeline::new(&config, control, EventSink::new(store))
    }

    fn parse_update(value: serde_json::Value) -> Update {
        // Update's deserializer needs borrowed map keys; going through
        // from_value yields UpdateKind::Error, so round-trip via a string.
        serde_json::from_str(&value.to_string()).expect("failed to deserialize mock update")
    }

    fn group_message(chat_id: i64, text: &str) -> Update {
        parse_update(json!({
            "update_id": 1,
            "message": {
                "message_id": 7,
                "date": 1_700_000_000i64,
                "chat": { "id": chat_id, "type": "supergroup", "title": "Some Space" },
                "from": { "id": 42, "is_bot": false, "first_name": "Alice" },
                "text": text,
            }
        }))
    }

    fn member_left(chat_id: i64) -> Update {
        parse_update(json!({
            "update_id": 2,
            "chat_member": {
                "chat": { "id": chat_id, "type": "supergroup", "title": "Editors" },
                "from": { "id": 7, "is_bot": false, "first_name": "Admin" },
                "date": 1_700_000_000i64,
                "old_chat_member": {
                    "status": "member",
                    "user": { "id": 42, "is_bot": false, "first_name": "Alice", "username": "alice" }
                },
                "new_chat_member": {
                    "status": "left",
                    "user": { "id": 42, "is_bot": false, "first_name": "Alice", "username": "alice" }
                },
            }
        }))
    }

    fn private_message(user_id: i64, text: &str) -> Update {
        parse_update(json!({
            "update_id": 3,
            "message": {
                "message_id": 8,
                "date": 1_700_000_000i64,
                "chat": { "id": user_id, "type": "private", "first_name": "Op" },
                "from": { "id": user_id, "is_bot": false, "first_name": "Op" },
                "text": text,
            }
        }))
    }

    #[tokio::test]
    async fn allowed_message_is_persisted() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control, store.clone());

        pipeline
            .handle_update(&group_message(-1001, "hello"))
            .await
            .unwrap();

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].chat_id, -1001);
    }

    #[tokio::test]
    async fn disallowed_chat_is_ignored() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control, store.clone());

        pipeline
            .handle_update(&group_message(-9999, "hello"))
            .await
            .unwrap();

        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn editors_space_messages_are_persisted_too() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control, store.clone());

        pipeline
            .handle_update(&group_message(-100500, "editor talk"))
            .await
            .unwrap();

        assert_eq!(store.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn editor_exit_triggers_cascade_and_report() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control.clone(), store.clone());

        pipeline.handle_update(&member_left(-100500)).await.unwrap();

        // Membership event logged.
        assert_eq!(store.membership.lock().unwrap().len(), 1);

        // Both targets kicked; the editors space itself is not.
        let kicked = control.kicked.lock().unwrap();
        assert_eq!(
            *kicked,
            vec![("-1001".to_string(), 42), ("-1002".to_string(), 42)]
        );

        // Report went back to the editors space.
        let sent = control.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "-100500");
        assert!(sent[0].1.contains("Alice"));
    }

    #[tokio::test]
    async fn exit_from_ordinary_space_does_not_cascade() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control.clone(), store.clone());

        pipeline.handle_update(&member_left(-1001)).await.unwrap();

        assert_eq!(store.membership.lock().unwrap().len(), 1);
        assert!(control.kicked.lock().unwrap().is_empty());
        assert!(control.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cascade_without_editors_config_never_fires() {
        let mut config = test_config();
        config.editors_chat_id = None;
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(config, control.clone(), store.clone());

        pipeline.handle_update(&member_left(-1001)).await.unwrap();
        assert!(control.kicked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_command_from_executor_replies_with_count() {
        let control = Arc::new(MockControl {
            admins: vec![AdminInfo {
                user_id: 1,
                username: Some("alice".to_string()),
                first_name: "Alice".to_string(),
                is_bot: false,
                custom_title: None,
            }],
            ..MockControl::default()
        });
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control.clone(), store.clone());

        pipeline
            .handle_update(&private_message(777, "/sync_editors"))
            .await
            .unwrap();

        assert_eq!(store.rosters.lock().unwrap().len(), 1);
        let sent = control.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "777");
        assert!(sent[0].1.contains("Roster synchronized: 1"));
    }

    #[tokio::test]
    async fn sync_command_from_stranger_is_ignored() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control.clone(), store.clone());

        pipeline
            .handle_update(&private_message(123, "/sync_editors"))
            .await
            .unwrap();

        assert!(store.rosters.lock().unwrap().is_empty());
        assert!(control.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_command_in_group_chat_is_not_a_command() {
        let control = Arc::new(MockControl::default());
        let store = Arc::new(MockStore::default());
        let pipeline = make_pipeline(test_config(), control.clone(), store.clone());

        // Treated as a normal group message, persisted like any other.
        pipeline
            .handle_update(&group_message(-1001, "/sync_editors"))
            .await
            .unwrap();

        assert!(store.rosters.lock().unwrap().is_empty());
        assert_eq!(store.created.lock().unwrap().len(), 1);
    }
}
