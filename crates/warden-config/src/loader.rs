// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./warden.toml` > `~/.config/warden/warden.toml`
//! > `/etc/warden/warden.toml`, with environment variable overrides via the
//! `WARDEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::WardenConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/warden/warden.toml` (system-wide)
/// 3. `~/.config/warden/warden.toml` (user XDG config)
/// 4. `./warden.toml` (local directory)
/// 5. `WARDEN_*` environment variables
pub fn load_config() -> Result<WardenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<WardenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::file("/etc/warden/warden.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("warden/warden.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("warden.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses explicit `Env::map()` rather than `Env::split("_")` so that
/// underscore-containing key names stay unambiguous:
/// `WARDEN_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`, not
/// `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("WARDEN_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. WARDEN_TELEGRAM_BOT_TOKEN -> "telegram_bot_token".
        // Only the leading section prefix is rewritten: the rest of the
        // key may legitimately contain section names (telegram_webhook_secret).
        let key_str = key.as_str();
        let mapped = ["agent", "telegram", "storage", "webhook"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(&format!("{section}_"))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
