// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The auth session store.
//!
//! Holds `{status, current_user, error}` in memory and owns every write to
//! the persisted token (login, register, logout, bootstrap). Other
//! components only ever read the token, so the single-writer discipline
//! lives entirely in this file.

use std::sync::Arc;

use tracing::{debug, info, warn};

use shiftswap_api::AuthApi;
use shiftswap_core::{
    AuthStatus, ExchangeError, LoginInput, Observable, RegisterInput, SessionTokenStore,
    StoredSession, SubscriptionId, User,
};

/// Observable auth state.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub status: AuthStatus,
    pub current_user: Option<User>,
    pub error: Option<ExchangeError>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            status: AuthStatus::Anonymous,
            current_user: None,
            error: None,
        }
    }
}

/// Orchestrates login, register, logout, and startup bootstrap.
pub struct AuthStore {
    state: Observable<AuthState>,
    api: AuthApi,
    tokens: Arc<dyn SessionTokenStore>,
}

impl AuthStore {
    pub fn new(api: AuthApi, tokens: Arc<dyn SessionTokenStore>) -> Self {
        Self {
            state: Observable::default(),
            api,
            tokens,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn status(&self) -> AuthStatus {
        self.state.get().status
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.get().current_user
    }

    pub fn subscribe(&self, callback: impl Fn(&AuthState) + Send + Sync + 'static) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id)
    }

    /// Rebuilds the in-memory session from the persisted token at startup.
    ///
    /// No token: `anonymous`. A token the server rejects as unauthorized:
    /// the token is removed and the session ends `anonymous`, not `error`.
    /// Any other failure: `error`, with the previous user cleared and the
    /// token left in place for a later retry.
    pub async fn bootstrap(&self) -> Result<AuthStatus, ExchangeError> {
        let session = match self.tokens.load().await {
            Ok(session) => session,
            Err(err) => {
                self.enter_error(err.clone());
                return Err(err);
            }
        };

        let Some(session) = session else {
            debug!("no persisted session, starting anonymous");
            self.enter_anonymous();
            return Ok(AuthStatus::Anonymous);
        };

        self.enter_loading();
        match self.api.me(Some(&session.token)).await {
            Ok(user) => {
                info!(user_id = %user.id, "session restored from persisted token");
                self.enter_authenticated(user);
                Ok(AuthStatus::Authenticated)
            }
            Err(err) if err.code.clears_session() => {
                info!(code = %err.code, "persisted token rejected, clearing session");
                self.clear_token_best_effort().await;
                self.enter_anonymous();
                Ok(AuthStatus::Anonymous)
            }
            Err(err) => {
                self.enter_error(err.clone());
                Err(err)
            }
        }
    }

    /// Signs in, persists the granted token, then populates the current
    /// user via "who am I" (same unauthorized-vs-other split as bootstrap).
    pub async fn login(&self, input: &LoginInput) -> Result<AuthStatus, ExchangeError> {
        self.enter_loading();
        let grant = match self.api.login(input).await {
            Ok(grant) => grant,
            Err(err) => {
                self.enter_error(err.clone());
                return Err(err);
            }
        };
        self.finish_sign_in(grant.token, grant.expires_at).await
    }

    /// Registers a new account; otherwise identical to [`AuthStore::login`].
    pub async fn register(&self, input: &RegisterInput) -> Result<AuthStatus, ExchangeError> {
        self.enter_loading();
        let grant = match self.api.register(input).await {
            Ok(grant) => grant,
            Err(err) => {
                self.enter_error(err.clone());
                return Err(err);
            }
        };
        self.finish_sign_in(grant.token, grant.expires_at).await
    }

    /// Signs out. The persisted token and local state are cleared even when
    /// the server-side call fails -- logout never leaves the client
    /// authenticated.
    pub async fn logout(&self) -> Result<AuthStatus, ExchangeError> {
        if let Err(err) = self.api.logout(None).await {
            warn!(code = %err.code, "server-side logout failed, clearing local session anyway");
        }
        self.clear_token_best_effort().await;
        self.enter_anonymous();
        Ok(AuthStatus::Anonymous)
    }

    async fn finish_sign_in(
        &self,
        token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<AuthStatus, ExchangeError> {
        let session = StoredSession {
            token,
            expires_at,
        };
        if let Err(err) = self.tokens.save(&session).await {
            self.enter_error(err.clone());
            return Err(err);
        }

        match self.api.me(Some(&session.token)).await {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                self.enter_authenticated(user);
                Ok(AuthStatus::Authenticated)
            }
            Err(err) if err.code.clears_session() => {
                warn!(code = %err.code, "fresh token rejected by the server, clearing session");
                self.clear_token_best_effort().await;
                self.enter_anonymous();
                Ok(AuthStatus::Anonymous)
            }
            Err(err) => {
                self.enter_error(err.clone());
                Err(err)
            }
        }
    }

    async fn clear_token_best_effort(&self) {
        if let Err(err) = self.tokens.clear().await {
            warn!(code = %err.code, "failed to remove persisted token: {}", err.message);
        }
    }

    fn enter_anonymous(&self) {
        self.state.patch(|s| {
            s.status = AuthStatus::Anonymous;
            s.current_user = None;
            s.error = None;
        });
    }

    fn enter_loading(&self) {
        self.state.patch(|s| {
            s.status = AuthStatus::Loading;
            s.error = None;
        });
    }

    fn enter_authenticated(&self, user: User) {
        self.state.patch(|s| {
            s.status = AuthStatus::Authenticated;
            s.current_user = Some(user);
            s.error = None;
        });
    }

    fn enter_error(&self, error: ExchangeError) {
        self.state.patch(|s| {
            s.status = AuthStatus::Error;
            s.current_user = None;
            s.error = Some(error);
        });
    }
}
