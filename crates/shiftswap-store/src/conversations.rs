// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable cache of the caller's conversation listing.

use std::sync::Arc;

use tracing::debug;

use shiftswap_api::ConversationsApi;
use shiftswap_core::{Conversation, ErrorCode, ExchangeError, Observable, SubscriptionId};
use shiftswap_rules::{can_accept_conversation, can_choose_conversation};
use shiftswap_session::AuthStore;

use crate::{ResourceState, StoreStatus, require_authenticated};

/// Cached, observable view of `/exchanges/conversations`.
pub struct ConversationsStore {
    state: Observable<ResourceState<Conversation>>,
    api: ConversationsApi,
    auth: Arc<AuthStore>,
}

impl ConversationsStore {
    pub fn new(api: ConversationsApi, auth: Arc<AuthStore>) -> Self {
        Self {
            state: Observable::default(),
            api,
            auth,
        }
    }

    pub fn state(&self) -> ResourceState<Conversation> {
        self.state.get()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&ResourceState<Conversation>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id)
    }

    /// Loads one page of the caller's conversations.
    pub async fn fetch_conversations(&self, page: u32) -> Result<(), ExchangeError> {
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_error(err.clone());
            return Err(err);
        }

        self.state.patch(|s| {
            s.status = StoreStatus::Loading;
            s.error = None;
        });

        match self.api.list(page, None).await {
            Ok(listing) => {
                debug!(page, count = listing.items.len(), "conversation page loaded");
                self.state.patch(|s| {
                    s.status = StoreStatus::Ready;
                    s.items = listing.items;
                    s.page = page;
                    s.has_next = listing.pagination.has_next;
                });
                Ok(())
            }
            Err(err) => {
                self.record_error(err.clone());
                Err(err)
            }
        }
    }

    /// Locks a conversation (request owner only) and folds the server's
    /// updated copy back into the cache.
    ///
    /// When the conversation is cached and the caller's role is known, a
    /// transition the state machine forbids fails locally instead of
    /// issuing a doomed network call. The server stays authoritative for
    /// anything not in the cache.
    pub async fn choose_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Conversation, ExchangeError> {
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_error(err.clone());
            return Err(err);
        }

        if let Some(cached) = self.cached(conversation_id)
            && let Some(role) = self
                .auth
                .current_user()
                .and_then(|user| cached.role_of(&user.id))
            && !can_choose_conversation(&cached, role)
        {
            let err = ExchangeError::new(
                ErrorCode::ConversationChooseNotAllowed,
                format!(
                    "conversation `{}` is {} and role {} cannot choose it",
                    cached.id, cached.status, role
                ),
            );
            self.record_error(err.clone());
            return Err(err);
        }

        match self.api.choose(conversation_id, None).await {
            Ok(conversation) => {
                self.merge(conversation.clone());
                Ok(conversation)
            }
            Err(err) => {
                self.record_error(err.clone());
                Err(err)
            }
        }
    }

    /// Records the caller's acceptance and folds the server's updated copy
    /// back into the cache. Same local pre-flight rule as
    /// [`ConversationsStore::choose_conversation`].
    pub async fn accept_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Conversation, ExchangeError> {
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_error(err.clone());
            return Err(err);
        }

        if let Some(cached) = self.cached(conversation_id)
            && !can_accept_conversation(&cached)
        {
            let err = ExchangeError::new(
                ErrorCode::ConversationAcceptNotAllowed,
                format!(
                    "conversation `{}` is {} and cannot take an acceptance",
                    cached.id, cached.status
                ),
            );
            self.record_error(err.clone());
            return Err(err);
        }

        match self.api.accept(conversation_id, None).await {
            Ok(conversation) => {
                self.merge(conversation.clone());
                Ok(conversation)
            }
            Err(err) => {
                self.record_error(err.clone());
                Err(err)
            }
        }
    }

    fn cached(&self, conversation_id: &str) -> Option<Conversation> {
        let id = conversation_id.trim();
        self.state.get().items.into_iter().find(|c| c.id == id)
    }

    /// Replaces the cached copy of a conversation with a newer one.
    fn merge(&self, conversation: Conversation) {
        self.state.patch(|s| {
            match s.items.iter_mut().find(|c| c.id == conversation.id) {
                Some(slot) => *slot = conversation.clone(),
                None => s.items.push(conversation.clone()),
            }
            s.error = None;
        });
    }

    fn record_error(&self, error: ExchangeError) {
        self.state.patch(|s| {
            s.status = StoreStatus::Error;
            s.error = Some(error);
        });
    }
}
