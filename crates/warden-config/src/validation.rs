// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints serde attributes cannot express:
//! required credentials, recognized driver names, well-formed chat ids.
//! A missing webhook secret is deliberately NOT an error here -- the
//! serve command degrades with a warning instead.

use crate::diagnostic::ConfigError;
use crate::model::WardenConfig;

/// Drivers the persistence gateway knows how to build.
pub const KNOWN_DRIVERS: &[&str] = &["sqlite", "remote"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all failures rather than failing fast.
pub fn validate_config(config: &WardenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config
        .telegram
        .bot_token
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .is_empty()
    {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }

    if let Some(id) = config.telegram.editors_chat_id.as_deref()
        && !id.trim().is_empty()
        && id.trim().parse::<i64>().is_err()
    {
        errors.push(ConfigError::Validation {
            message: format!("telegram.editors_chat_id `{id}` is not a numeric chat id"),
        });
    }

    for id in config.telegram.allowed_chat_ids.split(',') {
        let id = id.trim();
        if !id.is_empty() && id.parse::<i64>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.allowed_chat_ids entry `{id}` is not a numeric chat id"),
            });
        }
    }

    if config.telegram.executor_title_keyword.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "telegram.executor_title_keyword must not be empty".to_string(),
        });
    }

    match config.storage.driver.as_str() {
        "sqlite" => {
            if config.storage.database_path.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: "storage.database_path must not be empty".to_string(),
                });
            }
        }
        "remote" => {
            if config
                .storage
                .api_base_url
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
            {
                errors.push(ConfigError::MissingKey {
                    key: "storage.api_base_url".to_string(),
                });
            }
            if config
                .storage
                .api_token
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
            {
                errors.push(ConfigError::MissingKey {
                    key: "storage.api_token".to_string(),
                });
            }
        }
        other => {
            errors.push(ConfigError::Validation {
                message: format!(
                    "storage.driver `{other}` is not recognized (known drivers: {})",
                    KNOWN_DRIVERS.join(", ")
                ),
            });
        }
    }

    if config.webhook.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "webhook.host must not be empty".to_string(),
        });
    }

    if !config.webhook.path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!("webhook.path `{}` must start with `/`", config.webhook.path),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn valid_toml() -> &'static str {
        r#"
[telegram]
bot_token = "123:ABC"
editors_chat_id = "-1001"
allowed_chat_ids = "-1002, -1003"
"#
    }

    #[test]
    fn minimal_valid_config_passes() {
        let config = load_config_from_str(valid_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn missing_bot_token_is_an_error() {
        let config = load_config_from_str("").unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "telegram.bot_token")));
    }

    #[test]
    fn missing_webhook_secret_is_not_an_error() {
        let config = load_config_from_str(valid_toml()).unwrap();
        assert!(config.telegram.webhook_secret.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_numeric_chat_ids_are_rejected() {
        let toml = r#"
[telegram]
bot_token = "123:ABC"
editors_chat_id = "editors"
allowed_chat_ids = "-1002,oops"
"#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn remote_driver_requires_url_and_token() {
        let toml = r#"
[telegram]
bot_token = "123:ABC"

[storage]
driver = "remote"
"#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_driver_is_rejected() {
        let toml = r#"
[telegram]
bot_token = "123:ABC"

[storage]
driver = "tunnel"
"#;
        let config = load_config_from_str(toml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("tunnel"))
        ));
    }
}
