// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of a single chat message payload.

use shiftswap_core::{ErrorCode, ExchangeError, OutboundMessage, SendMessageInput};

/// Maximum length of the client-generated idempotency key, in characters.
pub const MAX_CLIENT_MESSAGE_ID_LEN: usize = 80;

/// Maximum message body length, in characters.
pub const MAX_BODY_LEN: usize = 1000;

/// Validate a send payload, returning the trimmed pair.
pub fn validate_send_message(input: &SendMessageInput) -> Result<OutboundMessage, ExchangeError> {
    let client_message_id = input.client_message_id.trim();
    if client_message_id.is_empty() {
        return Err(ExchangeError::validation(
            ErrorCode::MessageClientIdRequired,
            "a client message id is required",
            "clientMessageId",
        ));
    }
    if client_message_id.chars().count() > MAX_CLIENT_MESSAGE_ID_LEN {
        return Err(ExchangeError::validation(
            ErrorCode::MessageClientIdTooLong,
            format!("client message id exceeds {MAX_CLIENT_MESSAGE_ID_LEN} characters"),
            "clientMessageId",
        ));
    }

    let body = input.body.trim();
    if body.is_empty() {
        return Err(ExchangeError::validation(
            ErrorCode::MessageBodyRequired,
            "a message body is required",
            "body",
        ));
    }
    if body.chars().count() > MAX_BODY_LEN {
        return Err(ExchangeError::validation(
            ErrorCode::MessageBodyTooLong,
            format!("message body exceeds {MAX_BODY_LEN} characters"),
            "body",
        ));
    }

    Ok(OutboundMessage {
        client_message_id: client_message_id.to_string(),
        body: body.to_string(),
    })
}
