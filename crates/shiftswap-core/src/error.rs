// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the shiftswap exchange core.
//!
//! Every fallible operation on the public surface returns
//! [`ExchangeError`]: a stable `code`, a human-readable `message`, and an
//! optional `field` path naming the offending input. Errors are values,
//! never panics -- stores additionally record them in observable state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Stable machine-readable error codes.
///
/// The closed set covers local validation, auth pre-flight, transport
/// failures, and the named HTTP status mappings. Unmapped statuses render
/// as `HTTP_<status>`; server-supplied codes outside the known set are
/// carried verbatim in [`ErrorCode::Other`] rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Service value validation.
    ServiceKindInvalid,
    ServiceCodeRequired,
    ServiceCodeForbidden,
    ServiceRestCodeInvalid,
    ServiceTextRequired,
    ServiceTextForbidden,

    // Exchange request validation.
    RequestOfferedDateInvalid,
    RequestCounterProposalsRequired,
    RequestCounterProposalsTooMany,
    RequestCounterProposalDateInvalid,
    RequestCounterProposalDuplicate,
    RequestIdRequired,

    // Conversation machine.
    ConversationChooseNotAllowed,
    ConversationAcceptNotAllowed,
    ConversationAcceptWhoInvalid,
    ConversationIdRequired,

    // Message validation.
    MessageClientIdRequired,
    MessageClientIdTooLong,
    MessageBodyRequired,
    MessageBodyTooLong,

    // Selection.
    SelectionParticipantsInvalid,

    // Auth pre-flight (local, no network call issued).
    AuthRequired,
    AuthTokenMissing,

    /// Local session persistence failed (read, write, or corrupt document).
    SessionStorage,

    // Transport.
    NetworkError,
    RequestTimeout,
    InvalidJsonResponse,

    // Mapped HTTP statuses.
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Gone,
    TooManyRequests,
    /// Any other HTTP status, rendered as `HTTP_<status>`.
    Http(u16),

    /// A server-supplied code outside the known set, carried verbatim.
    Other(String),
}

impl ErrorCode {
    /// Maps a non-2xx HTTP status to its default code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCode::BadRequest,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            410 => ErrorCode::Gone,
            429 => ErrorCode::TooManyRequests,
            other => ErrorCode::Http(other),
        }
    }

    /// True for transient transport conditions eligible for the
    /// pending-queue retry path.
    pub fn is_queueable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError | ErrorCode::RequestTimeout)
    }

    /// True for the auth conditions that clear a persisted session during
    /// bootstrap (server 401 or a locally missing token).
    pub fn clears_session(&self) -> bool {
        matches!(self, ErrorCode::Unauthorized | ErrorCode::AuthTokenMissing)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ServiceKindInvalid => "SERVICE_KIND_INVALID",
            ErrorCode::ServiceCodeRequired => "SERVICE_CODE_REQUIRED",
            ErrorCode::ServiceCodeForbidden => "SERVICE_CODE_FORBIDDEN",
            ErrorCode::ServiceRestCodeInvalid => "SERVICE_REST_CODE_INVALID",
            ErrorCode::ServiceTextRequired => "SERVICE_TEXT_REQUIRED",
            ErrorCode::ServiceTextForbidden => "SERVICE_TEXT_FORBIDDEN",
            ErrorCode::RequestOfferedDateInvalid => "REQUEST_OFFERED_DATE_INVALID",
            ErrorCode::RequestCounterProposalsRequired => "REQUEST_COUNTER_PROPOSALS_REQUIRED",
            ErrorCode::RequestCounterProposalsTooMany => "REQUEST_COUNTER_PROPOSALS_TOO_MANY",
            ErrorCode::RequestCounterProposalDateInvalid => "REQUEST_COUNTER_PROPOSAL_DATE_INVALID",
            ErrorCode::RequestCounterProposalDuplicate => "REQUEST_COUNTER_PROPOSAL_DUPLICATE",
            ErrorCode::RequestIdRequired => "REQUEST_ID_REQUIRED",
            ErrorCode::ConversationChooseNotAllowed => "CONVERSATION_CHOOSE_NOT_ALLOWED",
            ErrorCode::ConversationAcceptNotAllowed => "CONVERSATION_ACCEPT_NOT_ALLOWED",
            ErrorCode::ConversationAcceptWhoInvalid => "CONVERSATION_ACCEPT_WHO_INVALID",
            ErrorCode::ConversationIdRequired => "CONVERSATION_ID_REQUIRED",
            ErrorCode::MessageClientIdRequired => "MESSAGE_CLIENT_ID_REQUIRED",
            ErrorCode::MessageClientIdTooLong => "MESSAGE_CLIENT_ID_TOO_LONG",
            ErrorCode::MessageBodyRequired => "MESSAGE_BODY_REQUIRED",
            ErrorCode::MessageBodyTooLong => "MESSAGE_BODY_TOO_LONG",
            ErrorCode::SelectionParticipantsInvalid => "SELECTION_PARTICIPANTS_INVALID",
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::AuthTokenMissing => "AUTH_TOKEN_MISSING",
            ErrorCode::SessionStorage => "SESSION_STORAGE",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::RequestTimeout => "REQUEST_TIMEOUT",
            ErrorCode::InvalidJsonResponse => "INVALID_JSON_RESPONSE",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Gone => "GONE",
            ErrorCode::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorCode::Http(status) => return write!(f, "HTTP_{status}"),
            ErrorCode::Other(code) => code,
        };
        f.write_str(s)
    }
}

impl ErrorCode {
    /// Total parse: unknown codes land in [`ErrorCode::Other`].
    fn parse_code(s: &str) -> Self {
        match s {
            "SERVICE_KIND_INVALID" => ErrorCode::ServiceKindInvalid,
            "SERVICE_CODE_REQUIRED" => ErrorCode::ServiceCodeRequired,
            "SERVICE_CODE_FORBIDDEN" => ErrorCode::ServiceCodeForbidden,
            "SERVICE_REST_CODE_INVALID" => ErrorCode::ServiceRestCodeInvalid,
            "SERVICE_TEXT_REQUIRED" => ErrorCode::ServiceTextRequired,
            "SERVICE_TEXT_FORBIDDEN" => ErrorCode::ServiceTextForbidden,
            "REQUEST_OFFERED_DATE_INVALID" => ErrorCode::RequestOfferedDateInvalid,
            "REQUEST_COUNTER_PROPOSALS_REQUIRED" => ErrorCode::RequestCounterProposalsRequired,
            "REQUEST_COUNTER_PROPOSALS_TOO_MANY" => ErrorCode::RequestCounterProposalsTooMany,
            "REQUEST_COUNTER_PROPOSAL_DATE_INVALID" => ErrorCode::RequestCounterProposalDateInvalid,
            "REQUEST_COUNTER_PROPOSAL_DUPLICATE" => ErrorCode::RequestCounterProposalDuplicate,
            "REQUEST_ID_REQUIRED" => ErrorCode::RequestIdRequired,
            "CONVERSATION_CHOOSE_NOT_ALLOWED" => ErrorCode::ConversationChooseNotAllowed,
            "CONVERSATION_ACCEPT_NOT_ALLOWED" => ErrorCode::ConversationAcceptNotAllowed,
            "CONVERSATION_ACCEPT_WHO_INVALID" => ErrorCode::ConversationAcceptWhoInvalid,
            "CONVERSATION_ID_REQUIRED" => ErrorCode::ConversationIdRequired,
            "MESSAGE_CLIENT_ID_REQUIRED" => ErrorCode::MessageClientIdRequired,
            "MESSAGE_CLIENT_ID_TOO_LONG" => ErrorCode::MessageClientIdTooLong,
            "MESSAGE_BODY_REQUIRED" => ErrorCode::MessageBodyRequired,
            "MESSAGE_BODY_TOO_LONG" => ErrorCode::MessageBodyTooLong,
            "SELECTION_PARTICIPANTS_INVALID" => ErrorCode::SelectionParticipantsInvalid,
            "AUTH_REQUIRED" => ErrorCode::AuthRequired,
            "AUTH_TOKEN_MISSING" => ErrorCode::AuthTokenMissing,
            "SESSION_STORAGE" => ErrorCode::SessionStorage,
            "NETWORK_ERROR" => ErrorCode::NetworkError,
            "REQUEST_TIMEOUT" => ErrorCode::RequestTimeout,
            "INVALID_JSON_RESPONSE" => ErrorCode::InvalidJsonResponse,
            "BAD_REQUEST" => ErrorCode::BadRequest,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "CONFLICT" => ErrorCode::Conflict,
            "GONE" => ErrorCode::Gone,
            "TOO_MANY_REQUESTS" => ErrorCode::TooManyRequests,
            other => {
                if let Some(status) = other
                    .strip_prefix("HTTP_")
                    .and_then(|n| n.parse::<u16>().ok())
                {
                    ErrorCode::Http(status)
                } else {
                    ErrorCode::Other(other.to_string())
                }
            }
        }
    }
}

impl FromStr for ErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ErrorCode::parse_code(s))
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ErrorCode::parse_code(&s))
    }
}

/// The error value returned by every fallible exchange-core operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ExchangeError {
    pub code: ErrorCode,
    pub message: String,
    /// Path of the offending input field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
}

impl ExchangeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// A validation error naming the offending field path.
    pub fn validation(
        code: ErrorCode,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// See [`ErrorCode::is_queueable`].
    pub fn is_queueable(&self) -> bool {
        self.code.is_queueable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display_round_trips() {
        let codes = [
            ErrorCode::ServiceTextForbidden,
            ErrorCode::RequestCounterProposalDuplicate,
            ErrorCode::ConversationAcceptWhoInvalid,
            ErrorCode::MessageBodyTooLong,
            ErrorCode::AuthTokenMissing,
            ErrorCode::NetworkError,
            ErrorCode::RequestTimeout,
            ErrorCode::InvalidJsonResponse,
            ErrorCode::TooManyRequests,
        ];
        for code in codes {
            let parsed: ErrorCode = code.to_string().parse().unwrap();
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn unmapped_status_renders_and_parses_as_http_code() {
        let code = ErrorCode::from_status(502);
        assert_eq!(code, ErrorCode::Http(502));
        assert_eq!(code.to_string(), "HTTP_502");
        assert_eq!("HTTP_502".parse::<ErrorCode>().unwrap(), ErrorCode::Http(502));
    }

    #[test]
    fn named_statuses_map_to_named_codes() {
        assert_eq!(ErrorCode::from_status(400), ErrorCode::BadRequest);
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(403), ErrorCode::Forbidden);
        assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(409), ErrorCode::Conflict);
        assert_eq!(ErrorCode::from_status(410), ErrorCode::Gone);
        assert_eq!(ErrorCode::from_status(429), ErrorCode::TooManyRequests);
    }

    #[test]
    fn unknown_server_code_is_carried_verbatim() {
        let parsed: ErrorCode = "SHIFT_ALREADY_TAKEN".parse().unwrap();
        assert_eq!(parsed, ErrorCode::Other("SHIFT_ALREADY_TAKEN".into()));
        assert_eq!(parsed.to_string(), "SHIFT_ALREADY_TAKEN");
    }

    #[test]
    fn only_transient_transport_codes_are_queueable() {
        assert!(ErrorCode::NetworkError.is_queueable());
        assert!(ErrorCode::RequestTimeout.is_queueable());
        assert!(!ErrorCode::InvalidJsonResponse.is_queueable());
        assert!(!ErrorCode::BadRequest.is_queueable());
        assert!(!ErrorCode::AuthRequired.is_queueable());
    }

    #[test]
    fn exchange_error_serializes_with_optional_field() {
        let err = ExchangeError::validation(
            ErrorCode::ServiceTextForbidden,
            "text must not be set",
            "offeredService.text",
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SERVICE_TEXT_FORBIDDEN");
        assert_eq!(json["field"], "offeredService.text");

        let bare = ExchangeError::new(ErrorCode::NetworkError, "connection refused");
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("field").is_none());
    }
}
