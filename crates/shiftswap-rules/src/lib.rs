// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure validation rules and the conversation state machine for the
//! shiftswap exchange core.
//!
//! Everything in this crate is a pure function: no I/O, no clock access
//! (transitions take an explicit `now`), no global state.

pub mod conversation;
pub mod message;
pub mod request;
pub mod service;

pub use conversation::{
    AcceptOutcome, apply_accept, apply_choose, can_accept_conversation, can_choose_conversation,
    participant_role,
};
pub use message::{MAX_BODY_LEN, MAX_CLIENT_MESSAGE_ID_LEN, validate_send_message};
pub use request::{RequestLimits, validate_counter_proposal, validate_create_exchange_request};
pub use service::normalize_service_value;
