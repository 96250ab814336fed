// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the shiftswap exchange client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level shiftswap configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftswapConfig {
    /// Exchange API endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Exchange-request validation limits.
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// Session persistence settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Client behavior settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Exchange API endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the exchange server; relative request paths are resolved
    /// against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Depot (tenant) identifier sent as the `x-depot-id` header on every
    /// request.
    #[serde(default = "default_depot_id")]
    pub depot_id: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            depot_id: default_depot_id(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_depot_id() -> String {
    "main".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Exchange-request validation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeConfig {
    /// Maximum number of counter-proposals per request.
    #[serde(default = "default_max_counter_proposals")]
    pub max_counter_proposals: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_counter_proposals: default_max_counter_proposals(),
        }
    }
}

fn default_max_counter_proposals() -> usize {
    5
}

/// Session persistence configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Path of the persisted session document. Defaults to
    /// `<data_dir>/shiftswap/session.json` when unset.
    #[serde(default)]
    pub token_path: Option<String>,
}

/// Client behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
