// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the public exchange-request endpoints.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shiftswap_core::{
    CounterProposal, CreateExchangeRequest, ErrorCode, ExchangeError, ExchangeRequest, Page,
    SessionTokenStore,
};
use shiftswap_transport::{ApiCall, Transport};

use crate::{decode, require_id, resolve_token};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespondResponse {
    conversation_id: String,
}

/// Typed wrapper for `/exchanges/requests`.
#[derive(Clone)]
pub struct RequestsApi {
    transport: Arc<Transport>,
    tokens: Arc<dyn SessionTokenStore>,
}

impl RequestsApi {
    pub fn new(transport: Arc<Transport>, tokens: Arc<dyn SessionTokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// Lists one page of public exchange requests.
    pub async fn list(
        &self,
        page: u32,
        token: Option<&str>,
    ) -> Result<Page<ExchangeRequest>, ExchangeError> {
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/requests?page={page}");
        let value = self
            .transport
            .execute(ApiCall::get(&path).token(token.as_deref()))
            .await?;
        decode(value, "request listing")
    }

    /// Publishes a new exchange request from an already-validated payload.
    pub async fn create(
        &self,
        payload: &CreateExchangeRequest,
        token: Option<&str>,
    ) -> Result<ExchangeRequest, ExchangeError> {
        let token = resolve_token(&self.tokens, token).await?;
        let value = self
            .transport
            .execute(ApiCall::post("/exchanges/requests", json!(payload)).token(token.as_deref()))
            .await?;
        let created: ExchangeRequest = decode(value, "request creation")?;
        debug!(request_id = %created.id, "exchange request published");
        Ok(created)
    }

    /// Responds to another user's request by picking one of its proposals.
    ///
    /// Returns the identifier of the conversation the server opened.
    pub async fn respond(
        &self,
        request_id: &str,
        proposal: &CounterProposal,
        token: Option<&str>,
    ) -> Result<String, ExchangeError> {
        let request_id = require_id(request_id, ErrorCode::RequestIdRequired, "request")?;
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/requests/{request_id}/respond");
        let value = self
            .transport
            .execute(ApiCall::post(&path, json!(proposal)).token(token.as_deref()))
            .await?;
        let response: RespondResponse = decode(value, "request response")?;
        debug!(request_id = %request_id, conversation_id = %response.conversation_id, "responded to exchange request");
        Ok(response.conversation_id)
    }
}
