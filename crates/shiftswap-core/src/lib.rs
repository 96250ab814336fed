// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the shiftswap exchange client.
//!
//! This crate provides the error taxonomy, domain and wire types, and the
//! trait seams used throughout the shiftswap workspace. It performs no I/O.

pub mod error;
pub mod observable;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorCode, ExchangeError};
pub use observable::{Observable, SubscriptionId};
pub use traits::SessionTokenStore;
pub use types::{
    AuthGrant, AuthStatus, ChatMessage, Conversation, ConversationStatus, CounterProposal,
    CounterProposalInput, CreateExchangeRequest, CreateExchangeRequestInput, ExchangeRequest,
    LoginInput, OutboundMessage, Page, Pagination, ParticipantRole, RegisterInput, RequestStatus,
    SendMessageInput, ServiceValue, ServiceValueInput, StoredSession, User,
};
