// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable resource stores for the shiftswap exchange client.
//!
//! Each store is an explicit object owned by the composition root and
//! shared by reference -- no hidden singletons. State changes go through
//! the core [`shiftswap_core::Observable`] container, which notifies every
//! subscriber synchronously with a cloned snapshot. Reads flow domain
//! client -> store -> subscribers; writes flow action -> domain client ->
//! transport, and a successful write re-reads through the same path.
//!
//! Failures keep prior state (stale-while-error): an action records its
//! error in observable state and leaves the cached items alone.

use shiftswap_core::{AuthStatus, ErrorCode, ExchangeError};
use shiftswap_session::AuthStore;
use strum::Display;

pub mod conversations;
pub mod messages;
pub mod requests;
pub mod selection;

pub use conversations::ConversationsStore;
pub use messages::{MessagesState, MessagesStore, SendOutcome, ThreadState, new_client_message_id};
pub use requests::RequestsStore;
pub use selection::{SelectionState, SelectionStore};

/// Fetch lifecycle of a cached resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Cached listing state for a paginated resource.
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    pub status: StoreStatus,
    pub items: Vec<T>,
    pub page: u32,
    pub has_next: bool,
    pub error: Option<ExchangeError>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            status: StoreStatus::Idle,
            items: Vec::new(),
            page: 1,
            has_next: false,
            error: None,
        }
    }
}

/// Local pre-flight gate: network-touching store actions require an
/// authenticated session and fail with `AUTH_REQUIRED` without issuing a
/// network call otherwise.
pub(crate) fn require_authenticated(auth: &AuthStore) -> Result<(), ExchangeError> {
    if auth.status() == AuthStatus::Authenticated {
        Ok(())
    } else {
        Err(ExchangeError::new(
            ErrorCode::AuthRequired,
            "sign in before using the exchange",
        ))
    }
}
