// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget wrapper over the event store.
//!
//! Record operations (create, edit, membership) log failures at error
//! severity and report "no effect" instead of propagating, so a dead
//! store never takes down the webhook handler. Schema application and
//! roster replacement still propagate: the first is a startup gate, the
//! second feeds a user-visible reply.

use std::sync::Arc;

use tracing::error;

use warden_core::types::{
    EditorRecord, MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
};
use warden_core::{EventStore, WardenError};

/// Shared handle that absorbs store failures for record traffic.
#[derive(Clone)]
pub struct EventSink {
    store: Arc<dyn EventStore>,
}

impl EventSink {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Persist a new message; a store failure drops the record.
    pub async fn record_message(&self, record: &MessageRecord) -> WriteOutcome {
        match self.store.create_message(record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    chat_id = record.chat_id,
                    message_id = record.message_id,
                    error = %e,
                    "failed to persist message, record dropped"
                );
                WriteOutcome::Noop
            }
        }
    }

    /// Persist an edit; a store failure drops the record.
    pub async fn record_edit(&self, edit: &MessageEdit) -> WriteOutcome {
        match self.store.edit_message(edit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    chat_id = edit.chat_id,
                    message_id = edit.message_id,
                    error = %e,
                    "failed to persist edit, record dropped"
                );
                WriteOutcome::Noop
            }
        }
    }

    /// Persist a membership event; a store failure drops the record.
    pub async fn record_membership(&self, event: &MembershipEvent) {
        if let Err(e) = self.store.log_membership_event(event).await {
            error!(
                chat_id = event.chat_id,
                user_id = event.user_id,
                error = %e,
                "failed to persist membership event, record dropped"
            );
        }
    }

    /// Replace the roster. Propagates failure so the operator sees it.
    pub async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError> {
        self.store.replace_roster(roster).await
    }

    /// Apply the backing schema. Propagates failure, fatal at startup.
    pub async fn apply_schema(&self) -> Result<(), WardenError> {
        self.store.apply_schema().await
    }
}
