// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a well-formed base URL and positive timeouts.

use crate::diagnostic::ConfigError;
use crate::model::ShiftswapConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ShiftswapConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.depot_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.depot_id must not be empty".to_string(),
        });
    }

    if config.api.timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_ms must be positive".to_string(),
        });
    }

    if config.exchange.max_counter_proposals == 0 {
        errors.push(ConfigError::Validation {
            message: "exchange.max_counter_proposals must be at least 1".to_string(),
        });
    }

    if let Some(path) = &config.session.token_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "session.token_path must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
