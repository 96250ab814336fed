// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime wiring for the exchange client.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use shiftswap_api::{AuthApi, ConversationsApi, RequestsApi};
use shiftswap_config::ShiftswapConfig;
use shiftswap_core::{ExchangeError, SessionTokenStore};
use shiftswap_rules::RequestLimits;
use shiftswap_session::{AuthStore, FileTokenStore};
use shiftswap_store::{ConversationsStore, MessagesStore, RequestsStore, SelectionStore};
use shiftswap_transport::Transport;

/// Owns every store of the exchange client.
///
/// Built once at startup from a validated configuration; everything shares
/// one [`Transport`] and one token store, and the auth store remains the
/// only writer of the persisted token.
pub struct ExchangeRuntime {
    pub auth: Arc<AuthStore>,
    pub requests: Arc<RequestsStore>,
    pub conversations: Arc<ConversationsStore>,
    pub messages: Arc<MessagesStore>,
    pub selection: Arc<SelectionStore>,
}

impl ExchangeRuntime {
    /// Builds the runtime with the configured (or default) on-disk token
    /// store.
    pub fn new(config: &ShiftswapConfig) -> Result<Self, ExchangeError> {
        let tokens: Arc<dyn SessionTokenStore> = match &config.session.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(FileTokenStore::new(FileTokenStore::default_path()?)),
        };
        Self::with_token_store(config, tokens)
    }

    /// Builds the runtime around an explicit token store (tests, ephemeral
    /// sessions).
    pub fn with_token_store(
        config: &ShiftswapConfig,
        tokens: Arc<dyn SessionTokenStore>,
    ) -> Result<Self, ExchangeError> {
        let transport = Arc::new(Transport::new(
            &config.api.base_url,
            &config.api.depot_id,
            Duration::from_millis(config.api.timeout_ms),
        )?);
        debug!(
            base_url = %config.api.base_url,
            depot_id = %config.api.depot_id,
            "exchange runtime wired"
        );

        let auth = Arc::new(AuthStore::new(
            AuthApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&tokens),
        ));

        let limits = RequestLimits {
            max_counter_proposals: config.exchange.max_counter_proposals,
        };
        let requests = Arc::new(RequestsStore::new(
            RequestsApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&auth),
            limits,
        ));
        let conversations = Arc::new(ConversationsStore::new(
            ConversationsApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&auth),
        ));
        let messages = Arc::new(MessagesStore::new(
            ConversationsApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&auth),
        ));
        let selection = Arc::new(SelectionStore::new());

        Ok(Self {
            auth,
            requests,
            conversations,
            messages,
            selection,
        })
    }
}
