// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the auth endpoints: register, login, logout, "who am I".

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shiftswap_core::{
    AuthGrant, ExchangeError, LoginInput, RegisterInput, SessionTokenStore, User,
};
use shiftswap_transport::{ApiCall, Transport};

use crate::{decode, resolve_token};

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

/// Typed wrapper for `/auth/*` and `/me`.
#[derive(Clone)]
pub struct AuthApi {
    transport: Arc<Transport>,
    tokens: Arc<dyn SessionTokenStore>,
}

impl AuthApi {
    pub fn new(transport: Arc<Transport>, tokens: Arc<dyn SessionTokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// Registers a new account. Unauthenticated.
    pub async fn register(&self, input: &RegisterInput) -> Result<AuthGrant, ExchangeError> {
        let value = self
            .transport
            .execute(ApiCall::post("/auth/register", json!(input)).public())
            .await?;
        decode(value, "register")
    }

    /// Signs in. Unauthenticated.
    pub async fn login(&self, input: &LoginInput) -> Result<AuthGrant, ExchangeError> {
        let value = self
            .transport
            .execute(ApiCall::post("/auth/login", json!(input)).public())
            .await?;
        decode(value, "login")
    }

    /// Invalidates the server-side session. Best-effort from the caller's
    /// perspective -- the auth store clears local state regardless.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), ExchangeError> {
        let token = resolve_token(&self.tokens, token).await?;
        self.transport
            .execute(ApiCall::post_empty("/auth/logout").token(token.as_deref()))
            .await?;
        debug!("server-side logout acknowledged");
        Ok(())
    }

    /// Fetches the signed-in user for the current token.
    pub async fn me(&self, token: Option<&str>) -> Result<User, ExchangeError> {
        let token = resolve_token(&self.tokens, token).await?;
        let value = self
            .transport
            .execute(ApiCall::get("/me").token(token.as_deref()))
            .await?;
        let response: MeResponse = decode(value, "me")?;
        Ok(response.user)
    }
}
