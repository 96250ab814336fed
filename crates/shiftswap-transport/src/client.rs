// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single request executor behind every exchange API call.
//!
//! Builds the absolute URL, injects the `Accept` and depot headers plus the
//! bearer token, serializes the JSON body, races the request against a
//! cooperative cancellation signal tied to the configured timeout, and maps
//! HTTP failures to the stable error taxonomy -- overridden field-by-field
//! by any structured `error` object the server supplied.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use shiftswap_core::{ErrorCode, ExchangeError};

/// Depot (tenant) identifier header attached to every request.
pub const DEPOT_HEADER: &str = "x-depot-id";

/// One exchange API call, as handed to [`Transport::execute`].
#[derive(Debug)]
pub struct ApiCall<'a> {
    pub method: Method,
    pub path: &'a str,
    pub body: Option<Value>,
    /// When set, a usable bearer token must be present or the call fails
    /// locally with `AUTH_TOKEN_MISSING` before any network activity.
    pub auth_required: bool,
    pub token: Option<&'a str>,
    /// Optional caller-owned cancellation signal; it races the timeout and
    /// the network future, first to settle wins.
    pub cancel: Option<CancellationToken>,
}

impl<'a> ApiCall<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
            auth_required: true,
            token: None,
            cancel: None,
        }
    }

    pub fn post(path: &'a str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
            auth_required: true,
            token: None,
            cancel: None,
        }
    }

    /// POST without a body (action endpoints like choose/accept).
    pub fn post_empty(path: &'a str) -> Self {
        Self {
            method: Method::POST,
            path,
            body: None,
            auth_required: true,
            token: None,
            cancel: None,
        }
    }

    /// Marks the call as unauthenticated (register/login).
    pub fn public(mut self) -> Self {
        self.auth_required = false;
        self
    }

    pub fn token(mut self, token: Option<&'a str>) -> Self {
        self.token = token;
        self
    }

    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// HTTP executor for the exchange API.
///
/// Cheap to clone; holds the connection pool, the configured base URL, the
/// depot identifier, and the per-request timeout.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    depot_id: String,
    timeout: Duration,
}

impl Transport {
    /// Creates a new executor against `base_url`.
    ///
    /// The timeout is enforced by this type's own cancellation race, not by
    /// the underlying client.
    pub fn new(
        base_url: impl Into<String>,
        depot_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExchangeError> {
        let depot_id = depot_id.into();
        HeaderValue::from_str(&depot_id).map_err(|e| {
            ExchangeError::new(
                ErrorCode::NetworkError,
                format!("invalid depot identifier for header value: {e}"),
            )
        })?;

        let http = reqwest::Client::builder().build().map_err(|e| {
            ExchangeError::new(
                ErrorCode::NetworkError,
                format!("failed to build HTTP client: {e}"),
            )
        })?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            depot_id,
            timeout,
        })
    }

    /// The configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes one call and returns the parsed JSON body.
    ///
    /// A 2xx response with an empty body yields `{}`. Every failure path
    /// returns an [`ExchangeError`]; nothing panics.
    pub async fn execute(&self, call: ApiCall<'_>) -> Result<Value, ExchangeError> {
        let token = call.token.map(str::trim).filter(|t| !t.is_empty());
        if call.auth_required && token.is_none() {
            return Err(ExchangeError::new(
                ErrorCode::AuthTokenMissing,
                "no usable session token for an authenticated call",
            ));
        }

        let url = self.absolute_url(call.path);
        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(DEPOT_HEADER, self.depot_id.as_str());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        debug!(method = %call.method, path = call.path, "issuing exchange API request");

        // One cooperative signal per call: the timeout fires it, and a
        // caller-owned parent token may fire it early. An externally
        // abandoned call maps to NETWORK_ERROR so a message send stays on
        // the queueable path.
        let cancel = call
            .cancel
            .map(|parent| parent.child_token())
            .unwrap_or_default();

        let attempt = async {
            let response = request.send().await.map_err(|e| {
                ExchangeError::new(ErrorCode::NetworkError, format!("network failure: {e}"))
            })?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                ExchangeError::new(
                    ErrorCode::NetworkError,
                    format!("failed to read response body: {e}"),
                )
            })?;
            Ok::<(u16, String), ExchangeError>((status, body))
        };

        let (status, body) = tokio::select! {
            () = cancel.cancelled() => {
                warn!(path = call.path, "exchange API request cancelled");
                return Err(ExchangeError::new(ErrorCode::NetworkError, "request cancelled"));
            }
            () = tokio::time::sleep(self.timeout) => {
                cancel.cancel();
                warn!(path = call.path, timeout_ms = self.timeout.as_millis() as u64, "exchange API request timed out");
                return Err(ExchangeError::new(
                    ErrorCode::RequestTimeout,
                    format!("request timed out after {} ms", self.timeout.as_millis()),
                ));
            }
            result = attempt => result?,
        };

        debug!(status, path = call.path, "exchange API response received");

        if (200..300).contains(&status) {
            if body.trim().is_empty() {
                return Ok(Value::Object(Map::new()));
            }
            return serde_json::from_str(&body).map_err(|e| {
                ExchangeError::new(
                    ErrorCode::InvalidJsonResponse,
                    format!("response body was not valid JSON: {e}"),
                )
            });
        }

        Err(map_failure(status, &body))
    }

    fn absolute_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builds the error for a non-2xx response: status-derived defaults,
/// overridden field-by-field by a structured `{"error": {...}}` body.
fn map_failure(status: u16, body: &str) -> ExchangeError {
    let mut err = ExchangeError::new(ErrorCode::from_status(status), default_status_message(status));

    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(wire) = value.get("error")
    {
        if let Some(code) = wire.get("code").and_then(Value::as_str)
            && let Ok(code) = code.parse::<ErrorCode>()
        {
            err.code = code;
        }
        if let Some(message) = wire.get("message").and_then(Value::as_str) {
            err.message = message.to_string();
        }
        if let Some(field) = wire.get("field").and_then(Value::as_str) {
            err.field = Some(field.to_string());
        }
    }

    err
}

fn default_status_message(status: u16) -> String {
    match status {
        400 => "the server rejected the request as malformed".into(),
        401 => "the session is not authorized".into(),
        403 => "the caller may not perform this action".into(),
        404 => "the resource does not exist".into(),
        409 => "the resource changed underneath this request".into(),
        410 => "the resource is no longer available".into(),
        429 => "the server is rate limiting this client".into(),
        other => format!("server returned HTTP {other}"),
    }
}
