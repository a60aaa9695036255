// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! The handle keeps one connection behind a lock and re-opens it transparently
//! when a health probe fails, so callers never observe a stale connection.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use warden_core::WardenError;

use crate::migrations;

/// Convert a tokio-rusqlite error into WardenError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WardenError {
    WardenError::Storage {
        source: Box::new(e),
    }
}

/// Owned handle to the SQLite database file.
///
/// The inner connection is lazily re-established: [`Database::acquire`]
/// probes the current connection with `SELECT 1` and opens a fresh one
/// if the probe fails or no connection exists yet.
pub struct Database {
    path: String,
    conn: Mutex<Option<tokio_rusqlite::Connection>>,
}

impl Database {
    /// Open the database at `path`, applying PRAGMAs and running all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, WardenError> {
        let conn = Self::open_connection(path).await?;
        Ok(Self {
            path: path.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Get a healthy connection, re-opening the database if the current
    /// connection fails its health probe.
    pub async fn acquire(&self) -> Result<tokio_rusqlite::Connection, WardenError> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            let healthy = conn
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("SELECT 1;")
                })
                .await
                .is_ok();
            if healthy {
                return Ok(conn.clone());
            }
            warn!(path = %self.path, "database connection failed health probe, reopening");
            *guard = None;
        }
        let conn = Self::open_connection(&self.path).await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(&self) -> Result<(), WardenError> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.take() {
            conn.call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    async fn open_connection(path: &str) -> Result<tokio_rusqlite::Connection, WardenError> {
        // Migrations need a blocking &mut Connection; run them on a
        // short-lived connection before handing the file to the async pool.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), WardenError> {
            let mut conn =
                rusqlite::Connection::open(&migrate_path).map_err(WardenError::storage)?;
            migrations::run_migrations(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| WardenError::Internal(format!("migration task panicked: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(WardenError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL; \
                 PRAGMA synchronous=NORMAL; \
                 PRAGMA foreign_keys=ON; \
                 PRAGMA busy_timeout=5000;",
            )
        })
        .await
        .map_err(map_tr_err)?;
        debug!(path, "database opened");
        Ok(conn)
    }
}
