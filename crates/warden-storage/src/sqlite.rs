// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct SQLite implementation of the EventStore trait.

use async_trait::async_trait;
use tracing::debug;

use warden_config::model::StorageConfig;
use warden_core::types::{
    EditorRecord, MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
};
use warden_core::{EventStore, WardenError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed event store.
///
/// Wraps a [`Database`] handle and delegates to the typed query
/// modules. Opening the store runs migrations.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store at the configured database path.
    pub async fn open(config: &StorageConfig) -> Result<Self, WardenError> {
        let db = Database::open(&config.database_path).await?;
        debug!(path = %config.database_path, "sqlite event store opened");
        Ok(Self { db })
    }

    /// Checkpoint and release the underlying connection.
    pub async fn close(&self) -> Result<(), WardenError> {
        self.db.close().await
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn apply_schema(&self) -> Result<(), WardenError> {
        // Migrations ran on open; acquire re-checks the connection and
        // re-runs them if the file was swapped out underneath us.
        self.db.acquire().await?;
        Ok(())
    }

    async fn create_message(&self, record: &MessageRecord) -> Result<WriteOutcome, WardenError> {
        queries::messages::create_message(&self.db, record).await
    }

    async fn edit_message(&self, edit: &MessageEdit) -> Result<WriteOutcome, WardenError> {
        queries::messages::edit_message(&self.db, edit).await
    }

    async fn log_membership_event(&self, event: &MembershipEvent) -> Result<(), WardenError> {
        queries::membership::log_membership_event(&self.db, event).await
    }

    async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError> {
        queries::roster::replace_roster(&self.db, roster).await
    }
}
