// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shiftswap.toml` > `~/.config/shiftswap/shiftswap.toml`
//! > `/etc/shiftswap/shiftswap.toml` with environment variable overrides via
//! the `SHIFTSWAP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShiftswapConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shiftswap/shiftswap.toml` (system-wide)
/// 3. `~/.config/shiftswap/shiftswap.toml` (user XDG config)
/// 4. `./shiftswap.toml` (local directory)
/// 5. `SHIFTSWAP_*` environment variables
pub fn load_config() -> Result<ShiftswapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShiftswapConfig::default()))
        .merge(Toml::file("/etc/shiftswap/shiftswap.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("shiftswap/shiftswap.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("shiftswap.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ShiftswapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShiftswapConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShiftswapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShiftswapConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `SHIFTSWAP_API_BASE_URL` must map to
/// `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("SHIFTSWAP_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("exchange_", "exchange.", 1)
            .replacen("session_", "session.", 1)
            .replacen("client_", "client.", 1);
        mapped.into()
    })
}
