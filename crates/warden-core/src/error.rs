// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Warden relay.

use thiserror::Error;

/// The primary error type used across all Warden crates.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Configuration errors (missing token, invalid chat id, bad driver name).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, remote API status).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Telegram platform errors (API failure, invalid chat id, send failure).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Webhook server errors (bind failure, serve failure).
    #[error("webhook error: {message}")]
    Webhook {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Wrap an arbitrary error as a storage failure.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(source: E) -> Self {
        WardenError::Storage {
            source: Box::new(source),
        }
    }

    /// Build a platform error with a source.
    pub fn platform<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        WardenError::Platform {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
