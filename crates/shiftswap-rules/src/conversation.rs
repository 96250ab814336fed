// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure transition functions for the two-party negotiation state machine.
//!
//! The machine runs `active -> locked -> closed`. Role A (the request
//! owner) locks a conversation by choosing it; both parties then accept,
//! and the second acceptance closes it. Every transition takes an explicit
//! `now` so callers (and tests) control the clock. The initial state of a
//! conversation is whatever the server reports -- some conversations are
//! created already locked and never pass through `active`.

use chrono::{DateTime, Utc};
use shiftswap_core::{
    Conversation, ConversationStatus, ErrorCode, ExchangeError, ParticipantRole,
};

/// Outcome of an acceptance: the updated conversation and whether this call
/// completed the handshake (so closure-only side effects run exactly once).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    pub conversation: Conversation,
    pub both_accepted: bool,
}

/// True iff `role` may lock this conversation: only role A, only while
/// `active`.
pub fn can_choose_conversation(conversation: &Conversation, role: ParticipantRole) -> bool {
    role == ParticipantRole::A && conversation.status == ConversationStatus::Active
}

/// Lock an active conversation.
///
/// Resets both acceptance flags and stamps `locked_at`/`updated_at`.
pub fn apply_choose(
    conversation: &Conversation,
    now: DateTime<Utc>,
) -> Result<Conversation, ExchangeError> {
    if conversation.status != ConversationStatus::Active {
        return Err(ExchangeError::new(
            ErrorCode::ConversationChooseNotAllowed,
            format!(
                "conversation `{}` is {}, only an active conversation can be chosen",
                conversation.id, conversation.status
            ),
        ));
    }

    let mut next = conversation.clone();
    next.status = ConversationStatus::Locked;
    next.accepted_by_a = false;
    next.accepted_by_b = false;
    next.locked_at = Some(now);
    next.updated_at = now;
    Ok(next)
}

/// True iff the conversation can still take an acceptance: `locked` and not
/// already accepted by both sides.
pub fn can_accept_conversation(conversation: &Conversation) -> bool {
    conversation.status == ConversationStatus::Locked
        && !(conversation.accepted_by_a && conversation.accepted_by_b)
}

/// Record an acceptance by `who`.
///
/// The second acceptance transitions to `closed` and stamps `closed_at`;
/// the outcome reports `both_accepted = true` on exactly that call.
pub fn apply_accept(
    conversation: &Conversation,
    who: ParticipantRole,
    now: DateTime<Utc>,
) -> Result<AcceptOutcome, ExchangeError> {
    if !can_accept_conversation(conversation) {
        return Err(ExchangeError::new(
            ErrorCode::ConversationAcceptNotAllowed,
            format!(
                "conversation `{}` is {} and cannot take an acceptance",
                conversation.id, conversation.status
            ),
        ));
    }

    let mut next = conversation.clone();
    match who {
        ParticipantRole::A => next.accepted_by_a = true,
        ParticipantRole::B => next.accepted_by_b = true,
    }

    let both_accepted = next.accepted_by_a && next.accepted_by_b;
    if both_accepted {
        next.status = ConversationStatus::Closed;
        next.closed_at = Some(now);
    }
    next.updated_at = now;

    Ok(AcceptOutcome {
        conversation: next,
        both_accepted,
    })
}

/// Parse an externally supplied acceptance role.
///
/// The wire/UI boundary hands roles in as strings; anything other than `A`
/// or `B` is rejected here so [`apply_accept`] itself only ever sees a
/// valid participant.
pub fn participant_role(who: &str) -> Result<ParticipantRole, ExchangeError> {
    match who.trim() {
        "A" => Ok(ParticipantRole::A),
        "B" => Ok(ParticipantRole::B),
        other => Err(ExchangeError::new(
            ErrorCode::ConversationAcceptWhoInvalid,
            format!("`{other}` is not a conversation participant role"),
        )),
    }
}
