// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence gateway for the Warden relay.
//!
//! One logical store, two interchangeable transports: WAL-mode SQLite
//! with embedded migrations and a single-writer model via
//! `tokio-rusqlite`, or a remote HTTP log API. The [`EventSink`]
//! wrapper gives record traffic its drop-on-failure policy.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod remote;
pub mod sink;
pub mod sqlite;

use std::sync::Arc;

use warden_config::model::StorageConfig;
use warden_core::{EventStore, WardenError};

pub use database::Database;
pub use remote::RemoteStore;
pub use sink::EventSink;
pub use sqlite::SqliteStore;

/// Build the event store selected by `storage.driver`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn EventStore>, WardenError> {
    match config.driver.as_str() {
        "sqlite" => Ok(Arc::new(SqliteStore::open(config).await?)),
        "remote" => Ok(Arc::new(RemoteStore::new(config)?)),
        other => Err(WardenError::Config(format!(
            "unknown storage driver `{other}`"
        ))),
    }
}
