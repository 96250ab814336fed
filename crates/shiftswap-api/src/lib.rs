// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed domain clients for the shiftswap exchange API.
//!
//! Thin per-resource wrappers over [`shiftswap_transport::Transport`]:
//! they resolve an explicit token argument or fall back to the persisted
//! session token, reject blank identifiers before any network call, and
//! decode responses into the core wire types. No wrapper retries on its
//! own -- retry is a state-store concern.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use shiftswap_core::{ErrorCode, ExchangeError, SessionTokenStore};

pub mod auth;
pub mod conversations;
pub mod requests;

pub use auth::AuthApi;
pub use conversations::ConversationsApi;
pub use requests::RequestsApi;

/// Resolves the bearer token for a call: an explicit non-blank argument
/// wins, otherwise the persisted session token is consulted.
pub(crate) async fn resolve_token(
    tokens: &Arc<dyn SessionTokenStore>,
    explicit: Option<&str>,
) -> Result<Option<String>, ExchangeError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some(token.to_string()));
    }
    Ok(tokens.load().await?.map(|session| session.token))
}

/// Rejects a blank identifier before any network call.
pub(crate) fn require_id(
    raw: &str,
    code: ErrorCode,
    what: &str,
) -> Result<String, ExchangeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExchangeError::new(code, format!("a {what} id is required")));
    }
    Ok(trimmed.to_string())
}

/// Decodes a transport-level JSON value into a typed response.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ExchangeError> {
    serde_json::from_value(value).map_err(|e| {
        ExchangeError::new(
            ErrorCode::InvalidJsonResponse,
            format!("unexpected {what} response shape: {e}"),
        )
    })
}
