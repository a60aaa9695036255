// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote HTTP implementation of the EventStore trait.
//!
//! Posts each record as a JSON payload to a log API. One attempt per
//! call with a configured timeout; the caller decides whether a failed
//! record is dropped or fatal.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use warden_config::model::StorageConfig;
use warden_core::types::{
    EditorRecord, MembershipEvent, MessageEdit, MessageRecord, WriteOutcome,
};
use warden_core::{EventStore, WardenError};

/// Schema statement shipped to `/execute_schema`. The remote API runs
/// it against its own Postgres instance.
const REMOTE_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS message_log (
    internal_id BIGSERIAL PRIMARY KEY,
    message_id BIGINT NOT NULL,
    chat_id BIGINT NOT NULL,
    chat_type TEXT,
    chat_title TEXT,
    topic_id BIGINT,
    topic_name TEXT,
    author_user_id BIGINT,
    author_username TEXT,
    author_first_name TEXT,
    author_is_bot BOOLEAN,
    text TEXT,
    content_type TEXT,
    file_id TEXT,
    reply_to_message_id BIGINT,
    forward_from_chat_id BIGINT,
    forward_from_message_id BIGINT,
    created_at TIMESTAMPTZ,
    last_edited_at TIMESTAMPTZ,
    edit_history JSONB,
    logged_at TIMESTAMPTZ,
    UNIQUE (chat_id, message_id)
);
CREATE TABLE IF NOT EXISTS chat_member_log (
    log_id BIGSERIAL PRIMARY KEY,
    event_timestamp TIMESTAMPTZ NOT NULL,
    chat_id BIGINT NOT NULL,
    chat_title TEXT,
    user_id BIGINT NOT NULL,
    user_first_name TEXT,
    user_username TEXT,
    event_type TEXT NOT NULL,
    actor_user_id BIGINT
);
CREATE TABLE IF NOT EXISTS editors (
    user_id BIGINT PRIMARY KEY,
    username TEXT,
    first_name TEXT,
    role TEXT NOT NULL DEFAULT 'editor',
    is_inactive BOOLEAN NOT NULL DEFAULT FALSE,
    added_at TIMESTAMPTZ
);";

#[derive(Debug, thiserror::Error)]
#[error("remote log API returned {status} for {endpoint}")]
struct RemoteStatusError {
    endpoint: String,
    status: reqwest::StatusCode,
}

/// Event store backed by a remote log API.
#[derive(Debug)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl RemoteStore {
    /// Build the client from the storage section. Requires
    /// `api_base_url`; the bearer token is optional.
    pub fn new(config: &StorageConfig) -> Result<Self, WardenError> {
        let base_url = config
            .api_base_url
            .clone()
            .ok_or_else(|| {
                WardenError::Config("storage.api_base_url is required for the remote driver".into())
            })?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WardenError::Storage {
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// POST one JSON payload. Success is exactly HTTP 200-class; any
    /// other status or a network error surfaces as a storage error.
    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> Result<(), WardenError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| WardenError::Storage {
            source: Box::new(e),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(WardenError::Storage {
                source: Box::new(RemoteStatusError {
                    endpoint: endpoint.to_string(),
                    status,
                }),
            });
        }
        debug!(endpoint, %status, "remote log API call ok");
        Ok(())
    }
}

#[async_trait]
impl EventStore for RemoteStore {
    async fn apply_schema(&self) -> Result<(), WardenError> {
        self.post("/execute_schema", &json!({ "sql": REMOTE_SCHEMA }))
            .await
    }

    async fn create_message(&self, record: &MessageRecord) -> Result<WriteOutcome, WardenError> {
        let body = serde_json::to_value(record).map_err(WardenError::storage)?;
        self.post("/log_new_message", &body).await?;
        // The API applies its own conflict handling; a 200 covers both
        // the insert and the duplicate case.
        Ok(WriteOutcome::Applied)
    }

    async fn edit_message(&self, edit: &MessageEdit) -> Result<WriteOutcome, WardenError> {
        let body = serde_json::to_value(edit).map_err(WardenError::storage)?;
        self.post("/log_edited_message", &body).await?;
        Ok(WriteOutcome::Applied)
    }

    async fn log_membership_event(&self, event: &MembershipEvent) -> Result<(), WardenError> {
        let body = serde_json::to_value(event).map_err(WardenError::storage)?;
        self.post("/log_chat_member_update", &body).await
    }

    async fn replace_roster(&self, roster: &[EditorRecord]) -> Result<usize, WardenError> {
        self.post("/update_editors", &json!({ "editors": roster }))
            .await?;
        Ok(roster.len())
    }
}
