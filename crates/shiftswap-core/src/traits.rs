// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the exchange core and its environment.

use async_trait::async_trait;

use crate::error::ExchangeError;
use crate::types::StoredSession;

/// Durable storage for the bearer session token.
///
/// The token is the only state that survives a restart. Domain clients read
/// it per call; only the auth session store writes it (login, register,
/// logout, bootstrap) -- single-writer discipline.
#[async_trait]
pub trait SessionTokenStore: Send + Sync {
    /// Returns the persisted session, or `None` when signed out.
    async fn load(&self) -> Result<Option<StoredSession>, ExchangeError>;

    /// Replaces the persisted session.
    async fn save(&self, session: &StoredSession) -> Result<(), ExchangeError>;

    /// Removes the persisted session. Clearing an absent session is not an
    /// error.
    async fn clear(&self) -> Result<(), ExchangeError>;
}
