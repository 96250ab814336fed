// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the conversation endpoints: listing, the choose/accept
//! handshake, and the message thread.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shiftswap_core::{
    ChatMessage, Conversation, ErrorCode, ExchangeError, OutboundMessage, Page, SessionTokenStore,
};
use shiftswap_transport::{ApiCall, Transport};

use crate::{decode, require_id, resolve_token};

#[derive(Deserialize)]
struct MessagesResponse {
    items: Vec<ChatMessage>,
}

/// Typed wrapper for `/exchanges/conversations`.
#[derive(Clone)]
pub struct ConversationsApi {
    transport: Arc<Transport>,
    tokens: Arc<dyn SessionTokenStore>,
}

impl ConversationsApi {
    pub fn new(transport: Arc<Transport>, tokens: Arc<dyn SessionTokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// Lists one page of the caller's conversations.
    pub async fn list(
        &self,
        page: u32,
        token: Option<&str>,
    ) -> Result<Page<Conversation>, ExchangeError> {
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/conversations?page={page}");
        let value = self
            .transport
            .execute(ApiCall::get(&path).token(token.as_deref()))
            .await?;
        decode(value, "conversation listing")
    }

    /// Locks a conversation (request owner only). Returns the updated
    /// conversation as reported by the server.
    pub async fn choose(
        &self,
        conversation_id: &str,
        token: Option<&str>,
    ) -> Result<Conversation, ExchangeError> {
        let id = require_id(conversation_id, ErrorCode::ConversationIdRequired, "conversation")?;
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/conversations/{id}/choose");
        let value = self
            .transport
            .execute(ApiCall::post_empty(&path).token(token.as_deref()))
            .await?;
        let conversation: Conversation = decode(value, "conversation choose")?;
        debug!(conversation_id = %id, status = %conversation.status, "conversation chosen");
        Ok(conversation)
    }

    /// Records the caller's acceptance. Returns the updated conversation.
    pub async fn accept(
        &self,
        conversation_id: &str,
        token: Option<&str>,
    ) -> Result<Conversation, ExchangeError> {
        let id = require_id(conversation_id, ErrorCode::ConversationIdRequired, "conversation")?;
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/conversations/{id}/accept");
        let value = self
            .transport
            .execute(ApiCall::post_empty(&path).token(token.as_deref()))
            .await?;
        let conversation: Conversation = decode(value, "conversation accept")?;
        debug!(conversation_id = %id, status = %conversation.status, "conversation accepted");
        Ok(conversation)
    }

    /// Delivers one already-validated message. The server deduplicates on
    /// `clientMessageId`, so retrying a failed send is safe.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &OutboundMessage,
        token: Option<&str>,
    ) -> Result<ChatMessage, ExchangeError> {
        let id = require_id(conversation_id, ErrorCode::ConversationIdRequired, "conversation")?;
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/conversations/{id}/message");
        let value = self
            .transport
            .execute(ApiCall::post(&path, json!(message)).token(token.as_deref()))
            .await?;
        let stored: ChatMessage = decode(value, "message send")?;
        debug!(
            conversation_id = %id,
            client_message_id = %message.client_message_id,
            "message delivered"
        );
        Ok(stored)
    }

    /// Fetches the full message thread of a conversation.
    pub async fn messages(
        &self,
        conversation_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<ChatMessage>, ExchangeError> {
        let id = require_id(conversation_id, ErrorCode::ConversationIdRequired, "conversation")?;
        let token = resolve_token(&self.tokens, token).await?;
        let path = format!("/exchanges/conversations/{id}/messages");
        let value = self
            .transport
            .execute(ApiCall::get(&path).token(token.as_deref()))
            .await?;
        let response: MessagesResponse = decode(value, "message listing")?;
        Ok(response.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubTokenStore;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> ConversationsApi {
        let transport =
            Transport::new(server.uri(), "depot-north", Duration::from_millis(500)).unwrap();
        ConversationsApi::new(
            Arc::new(transport),
            Arc::new(StubTokenStore::with_token("tok-1")),
        )
    }

    fn conversation_body(status: &str) -> serde_json::Value {
        json!({
            "id": "conv-1",
            "userA": "u-1",
            "userB": "u-2",
            "status": status,
            "acceptedByA": false,
            "acceptedByB": false,
            "updatedAt": "2026-02-10T08:00:00Z"
        })
    }

    #[tokio::test]
    async fn choose_posts_and_decodes_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/choose"))
            .respond_with(ResponseTemplate::new(200).set_body_json(conversation_body("locked")))
            .mount(&server)
            .await;

        let conversation = api(&server).choose("conv-1", None).await.unwrap();
        assert_eq!(
            conversation.status,
            shiftswap_core::ConversationStatus::Locked
        );
    }

    #[tokio::test]
    async fn accept_posts_and_decodes_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/accept"))
            .respond_with(ResponseTemplate::new(200).set_body_json(conversation_body("locked")))
            .mount(&server)
            .await;

        let conversation = api(&server).accept("conv-1", None).await.unwrap();
        assert_eq!(conversation.id, "conv-1");
    }

    #[tokio::test]
    async fn send_message_posts_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(json!({"clientMessageId": "c-1", "body": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "serverId": "m-1",
                "clientMessageId": "c-1",
                "senderUserId": "u-1",
                "body": "hello"
            })))
            .mount(&server)
            .await;

        let stored = api(&server)
            .send_message(
                "conv-1",
                &OutboundMessage {
                    client_message_id: "c-1".into(),
                    body: "hello".into(),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(stored.server_id.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn messages_unwraps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchanges/conversations/conv-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"clientMessageId": "c-1", "senderUserId": "u-1", "body": "hello", "serverId": "m-1"}
                ]
            })))
            .mount(&server)
            .await;

        let items = api(&server).messages("conv-1", None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].client_message_id, "c-1");
    }

    #[tokio::test]
    async fn blank_conversation_id_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = api(&server).messages("  ", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationIdRequired);
    }
}
