// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as well-formed gateway URLs and positive timeouts.
//! An absent gateway URL or anon key is deliberately NOT an error: the
//! demo sign-in path must keep working with no backend configured.

use crate::diagnostic::ConfigError;
use crate::model::CasetraceConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CasetraceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(base_url) = &config.gateway.base_url {
        match url::Url::parse(base_url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.base_url must use http or https, got scheme `{}`",
                    parsed.scheme()
                ),
            }),
            Err(e) => errors.push(ConfigError::Validation {
                message: format!("gateway.base_url `{base_url}` is not a valid URL: {e}"),
            }),
        }
    }

    if config.gateway.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.gateway.records_table.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.records_table must not be empty".to_string(),
        });
    }

    if config.demo.enabled {
        if config.demo.email.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "demo.email must not be empty when demo.enabled is true".to_string(),
            });
        }
        if config.demo.password.is_empty() {
            errors.push(ConfigError::Validation {
                message: "demo.password must not be empty when demo.enabled is true".to_string(),
            });
        }
        if config.demo.user_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "demo.user_id must not be empty when demo.enabled is true".to_string(),
            });
        }
        if config.demo.session_hours == 0 {
            errors.push(ConfigError::Validation {
                message: "demo.session_hours must be at least 1".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
