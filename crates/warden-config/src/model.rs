// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Warden relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject
//! unrecognized config keys at startup with actionable errors.

use serde::{Deserialize, Serialize};

/// Top-level Warden configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to
/// sensible values; semantic requirements (e.g. a bot token when
/// serving) are enforced by post-deserialization validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram platform and security-automation settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Persistence gateway settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inbound webhook server settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the relay process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required for `serve` and `sync-roster`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Shared secret checked against the
    /// `X-Telegram-Bot-Api-Secret-Token` header. Unset disables the
    /// check (the serve command logs a warning).
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Chat id of the editors space. Exits from it trigger the
    /// security cascade; unset disables the cascade and roster sync.
    #[serde(default)]
    pub editors_chat_id: Option<String>,

    /// Comma-separated ids of the other project spaces. Together with
    /// `editors_chat_id` these form the processing allow-list, and they
    /// are the cascade's removal targets.
    #[serde(default)]
    pub allowed_chat_ids: String,

    /// User id allowed to run the `/sync_editors` operator command
    /// from a private chat.
    #[serde(default)]
    pub executor_user_id: Option<i64>,

    /// Case-insensitive substring of an admin's custom title that
    /// assigns the `executor` role during roster sync.
    #[serde(default = "default_executor_keyword")]
    pub executor_title_keyword: String,

    /// Delay between cascade targets, in milliseconds.
    #[serde(default = "default_cascade_delay_ms")]
    pub cascade_delay_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            webhook_secret: None,
            editors_chat_id: None,
            allowed_chat_ids: String::new(),
            executor_user_id: None,
            executor_title_keyword: default_executor_keyword(),
            cascade_delay_ms: default_cascade_delay_ms(),
        }
    }
}

/// Persistence gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Transport driver: `sqlite` (direct structured store) or
    /// `remote` (HTTP log API).
    #[serde(default = "default_storage_driver")]
    pub driver: String,

    /// SQLite database path (sqlite driver).
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Base URL of the remote log API (remote driver).
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Bearer token for the remote log API (remote driver).
    #[serde(default)]
    pub api_token: Option<String>,

    /// Remote request timeout in seconds. One attempt, no retries.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: default_storage_driver(),
            database_path: default_database_path(),
            api_base_url: None,
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Inbound webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Host address to bind.
    #[serde(default = "default_webhook_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_webhook_port")]
    pub port: u16,

    /// Route path the platform POSTs updates to.
    #[serde(default = "default_webhook_path")]
    pub path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
            path: default_webhook_path(),
        }
    }
}

fn default_agent_name() -> String {
    "warden".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_executor_keyword() -> String {
    "исполнитель".to_string()
}

fn default_cascade_delay_ms() -> u64 {
    1000
}

fn default_storage_driver() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    "warden.db".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/telegram/webhook".to_string()
}
