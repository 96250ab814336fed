// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation message threads and the pending outbound queue.
//!
//! Delivery is at-least-once: the client-generated `clientMessageId` is the
//! idempotency key, so a send may be retried freely. A send that fails on a
//! transient transport condition (`NETWORK_ERROR`, `REQUEST_TIMEOUT`) lands
//! in that conversation's pending queue instead of being lost;
//! [`MessagesStore::flush_pending`] later drains the queue strictly in
//! enqueue order and halts on the first failure, so messages are never
//! reordered around an undelivered one.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use shiftswap_api::ConversationsApi;
use shiftswap_core::{
    ChatMessage, ErrorCode, ExchangeError, Observable, OutboundMessage, SendMessageInput,
    SubscriptionId,
};
use shiftswap_rules::validate_send_message;
use shiftswap_session::AuthStore;

use crate::{StoreStatus, require_authenticated};

/// Generates a fresh client message id (the idempotency key).
pub fn new_client_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Cached state of one conversation's thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadState {
    pub status: StoreStatus,
    pub items: Vec<ChatMessage>,
    pub error: Option<ExchangeError>,
}

/// All message state, keyed by conversation id.
#[derive(Debug, Clone, Default)]
pub struct MessagesState {
    pub threads: HashMap<String, ThreadState>,
    /// Not-yet-acknowledged outbound messages, FIFO per conversation,
    /// deduplicated by `clientMessageId`.
    pub pending: HashMap<String, Vec<OutboundMessage>>,
}

/// Result of a send action that did not hard-fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The server acknowledged the message.
    Sent(ChatMessage),
    /// A transient transport failure; the message now sits in the pending
    /// queue and will be retried by a flush.
    Queued { error: ExchangeError },
}

/// Observable store of message threads plus the pending queue.
pub struct MessagesStore {
    state: Observable<MessagesState>,
    api: ConversationsApi,
    auth: Arc<AuthStore>,
}

impl MessagesStore {
    pub fn new(api: ConversationsApi, auth: Arc<AuthStore>) -> Self {
        Self {
            state: Observable::default(),
            api,
            auth,
        }
    }

    pub fn state(&self) -> MessagesState {
        self.state.get()
    }

    /// The cached thread for a conversation (default empty).
    pub fn thread(&self, conversation_id: &str) -> ThreadState {
        self.state
            .get()
            .threads
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The pending queue for a conversation, in delivery order.
    pub fn pending(&self, conversation_id: &str) -> Vec<OutboundMessage> {
        self.state
            .get()
            .pending
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&MessagesState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id)
    }

    /// Loads the full thread of a conversation.
    pub async fn fetch_messages(&self, conversation_id: &str) -> Result<(), ExchangeError> {
        let conversation_id = non_blank_id(conversation_id)?;
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_thread_error(&conversation_id, err.clone());
            return Err(err);
        }

        self.state.patch(|s| {
            let thread = s.threads.entry(conversation_id.clone()).or_default();
            thread.status = StoreStatus::Loading;
            thread.error = None;
        });

        match self.api.messages(&conversation_id, None).await {
            Ok(items) => {
                debug!(conversation_id = %conversation_id, count = items.len(), "message thread loaded");
                self.state.patch(|s| {
                    let thread = s.threads.entry(conversation_id.clone()).or_default();
                    thread.status = StoreStatus::Ready;
                    thread.items = items;
                });
                Ok(())
            }
            Err(err) => {
                self.record_thread_error(&conversation_id, err.clone());
                Err(err)
            }
        }
    }

    /// Validates and delivers one message.
    ///
    /// On acknowledgment, any pending entry with the same idempotency key
    /// is dropped and the thread is re-read. On a *queueable* transport
    /// failure the message is parked in the pending queue (deduplicated)
    /// and the error is reported in the outcome, not returned as `Err`.
    /// Validation, auth, and server-rejected failures return `Err` and do
    /// not queue.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        input: &SendMessageInput,
    ) -> Result<SendOutcome, ExchangeError> {
        let conversation_id = non_blank_id(conversation_id)?;
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_thread_error(&conversation_id, err.clone());
            return Err(err);
        }
        let message = match validate_send_message(input) {
            Ok(message) => message,
            Err(err) => {
                self.record_thread_error(&conversation_id, err.clone());
                return Err(err);
            }
        };

        match self.api.send_message(&conversation_id, &message, None).await {
            Ok(stored) => {
                self.state.patch(|s| {
                    if let Some(queue) = s.pending.get_mut(&conversation_id) {
                        queue.retain(|m| m.client_message_id != message.client_message_id);
                        if queue.is_empty() {
                            s.pending.remove(&conversation_id);
                        }
                    }
                });
                if let Err(err) = self.fetch_messages(&conversation_id).await {
                    warn!(code = %err.code, "message delivered but thread refresh failed");
                }
                Ok(SendOutcome::Sent(stored))
            }
            Err(err) if err.is_queueable() => {
                info!(
                    conversation_id = %conversation_id,
                    client_message_id = %message.client_message_id,
                    code = %err.code,
                    "transient send failure, parking message in the pending queue"
                );
                self.push_pending(&conversation_id, message);
                self.record_thread_error(&conversation_id, err.clone());
                Ok(SendOutcome::Queued { error: err })
            }
            Err(err) => {
                self.record_thread_error(&conversation_id, err.clone());
                Err(err)
            }
        }
    }

    /// Parks a message in the pending queue without attempting delivery
    /// (composing while offline). Same validation and dedup rule as a
    /// failed send.
    pub fn enqueue_pending(
        &self,
        conversation_id: &str,
        input: &SendMessageInput,
    ) -> Result<OutboundMessage, ExchangeError> {
        let conversation_id = non_blank_id(conversation_id)?;
        let message = validate_send_message(input)?;
        self.push_pending(&conversation_id, message.clone());
        Ok(message)
    }

    /// Drains a conversation's pending queue strictly in FIFO order, one
    /// message at a time.
    ///
    /// Stops at the first failure, leaving the failed entry and everything
    /// behind it queued, and returns that failure. On full success the
    /// thread is re-read and the number of delivered messages returned.
    pub async fn flush_pending(&self, conversation_id: &str) -> Result<usize, ExchangeError> {
        let conversation_id = non_blank_id(conversation_id)?;
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_thread_error(&conversation_id, err.clone());
            return Err(err);
        }

        let queued = self
            .state
            .get()
            .pending
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default();
        if queued.is_empty() {
            return Ok(0);
        }

        let mut flushed = 0usize;
        for message in queued {
            match self.api.send_message(&conversation_id, &message, None).await {
                Ok(_) => {
                    flushed += 1;
                    self.state.patch(|s| {
                        if let Some(queue) = s.pending.get_mut(&conversation_id) {
                            queue.retain(|m| m.client_message_id != message.client_message_id);
                            if queue.is_empty() {
                                s.pending.remove(&conversation_id);
                            }
                        }
                    });
                }
                Err(err) => {
                    warn!(
                        conversation_id = %conversation_id,
                        client_message_id = %message.client_message_id,
                        code = %err.code,
                        flushed,
                        "flush halted, leaving the rest of the queue in place"
                    );
                    self.record_thread_error(&conversation_id, err.clone());
                    return Err(err);
                }
            }
        }

        info!(conversation_id = %conversation_id, flushed, "pending queue drained");
        if let Err(err) = self.fetch_messages(&conversation_id).await {
            warn!(code = %err.code, "queue drained but thread refresh failed");
        }
        Ok(flushed)
    }

    /// Appends to the pending queue unless the idempotency key is already
    /// queued.
    fn push_pending(&self, conversation_id: &str, message: OutboundMessage) {
        self.state.patch(|s| {
            let queue = s.pending.entry(conversation_id.to_string()).or_default();
            if queue
                .iter()
                .all(|m| m.client_message_id != message.client_message_id)
            {
                queue.push(message.clone());
            }
        });
    }

    fn record_thread_error(&self, conversation_id: &str, error: ExchangeError) {
        self.state.patch(|s| {
            let thread = s.threads.entry(conversation_id.to_string()).or_default();
            thread.error = Some(error);
        });
    }
}

fn non_blank_id(conversation_id: &str) -> Result<String, ExchangeError> {
    let trimmed = conversation_id.trim();
    if trimmed.is_empty() {
        return Err(ExchangeError::new(
            ErrorCode::ConversationIdRequired,
            "a conversation id is required",
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftswap_api::AuthApi;
    use shiftswap_core::{SessionTokenStore, StoredSession};
    use shiftswap_session::MemoryTokenStore;
    use shiftswap_transport::Transport;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authenticated_store(server: &MockServer) -> MessagesStore {
        authenticated_store_with_timeout(server, Duration::from_millis(500)).await
    }

    async fn authenticated_store_with_timeout(
        server: &MockServer,
        timeout: Duration,
    ) -> MessagesStore {
        let transport =
            Arc::new(Transport::new(server.uri(), "depot-north", timeout).unwrap());
        let tokens: Arc<dyn SessionTokenStore> =
            Arc::new(MemoryTokenStore::with_session(StoredSession {
                token: "tok-1".into(),
                expires_at: None,
            }));
        let auth = Arc::new(AuthStore::new(
            AuthApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&tokens),
        ));

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"id": "u-1", "displayName": "Mara", "email": "mara@example.test"}
            })))
            .mount(server)
            .await;
        auth.bootstrap().await.unwrap();

        MessagesStore::new(ConversationsApi::new(transport, tokens), auth)
    }

    fn input(id: &str, body: &str) -> SendMessageInput {
        SendMessageInput {
            client_message_id: id.to_string(),
            body: body.to_string(),
        }
    }

    fn stored_message(id: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "serverId": format!("srv-{id}"),
            "clientMessageId": id,
            "senderUserId": "u-1",
            "body": body
        })
    }

    #[tokio::test]
    async fn send_success_refreshes_the_thread() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-1", "body": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_message("c-1", "hello")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/conversations/conv-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [stored_message("c-1", "hello")]
            })))
            .mount(&server)
            .await;

        let outcome = store.send_message("conv-1", &input("c-1", "hello")).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Sent(_)));

        let thread = store.thread("conv-1");
        assert_eq!(thread.status, StoreStatus::Ready);
        assert_eq!(thread.items.len(), 1);
        assert!(store.pending("conv-1").is_empty());
    }

    #[tokio::test]
    async fn transient_failure_queues_instead_of_failing() {
        let server = MockServer::start().await;
        // Short timeout; the mock delays far longer, forcing REQUEST_TIMEOUT.
        let store = authenticated_store_with_timeout(&server, Duration::from_millis(80)).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let outcome = store.send_message("conv-1", &input("c-1", "hello")).await.unwrap();
        let SendOutcome::Queued { error } = outcome else {
            panic!("expected a queued outcome");
        };
        assert_eq!(error.code, ErrorCode::RequestTimeout);

        let pending = store.pending("conv-1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].client_message_id, "c-1");

        // Retrying the same idempotency key keeps one entry, not two.
        store.send_message("conv-1", &input("c-1", "hello")).await.unwrap();
        assert_eq!(store.pending("conv-1").len(), 1);
    }

    #[tokio::test]
    async fn server_rejection_does_not_queue() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = store
            .send_message("conv-1", &input("c-1", "hello"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(store.pending("conv-1").is_empty());
        assert!(store.thread("conv-1").error.is_some());
    }

    #[tokio::test]
    async fn validation_failure_does_not_queue() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;

        let err = store
            .send_message("conv-1", &input("c-1", "   "))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageBodyRequired);
        assert!(store.pending("conv-1").is_empty());
    }

    #[tokio::test]
    async fn enqueue_pending_dedups_by_client_id() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;

        store.enqueue_pending("conv-1", &input("c-1", "first")).unwrap();
        store.enqueue_pending("conv-1", &input("c-2", "second")).unwrap();
        store.enqueue_pending("conv-1", &input("c-1", "first again")).unwrap();

        let pending = store.pending("conv-1");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].client_message_id, "c-1");
        assert_eq!(pending[1].client_message_id, "c-2");
        // The original body wins; the duplicate enqueue was a no-op.
        assert_eq!(pending[0].body, "first");
    }

    #[tokio::test]
    async fn flush_delivers_in_fifo_order() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        store.enqueue_pending("conv-1", &input("c-1", "first")).unwrap();
        store.enqueue_pending("conv-1", &input("c-2", "second")).unwrap();

        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-1", "body": "first"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_message("c-1", "first")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-2", "body": "second"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_message("c-2", "second")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/conversations/conv-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [stored_message("c-1", "first"), stored_message("c-2", "second")]
            })))
            .mount(&server)
            .await;

        let flushed = store.flush_pending("conv-1").await.unwrap();
        assert_eq!(flushed, 2);
        assert!(store.pending("conv-1").is_empty());
        assert_eq!(store.thread("conv-1").items.len(), 2);
    }

    #[tokio::test]
    async fn flush_halts_on_first_failure_and_keeps_the_tail() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        store.enqueue_pending("conv-1", &input("c-1", "first")).unwrap();
        store.enqueue_pending("conv-1", &input("c-2", "second")).unwrap();
        store.enqueue_pending("conv-1", &input("c-3", "third")).unwrap();

        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-1", "body": "first"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_message("c-1", "first")))
            .mount(&server)
            .await;
        // c-2 hard-fails; c-3 must never be attempted.
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-2", "body": "second"})))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/exchanges/conversations/conv-1/message"))
            .and(body_json(serde_json::json!({"clientMessageId": "c-3", "body": "third"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = store.flush_pending("conv-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Http(500));

        let pending = store.pending("conv-1");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].client_message_id, "c-2", "failed entry stays queued");
        assert_eq!(pending[1].client_message_id, "c-3");
    }

    #[tokio::test]
    async fn flush_of_an_empty_queue_is_a_no_op() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        assert_eq!(store.flush_pending("conv-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fetch_sets_loading_before_the_result() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("GET"))
            .and(path("/exchanges/conversations/conv-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": []
            })))
            .mount(&server)
            .await;

        let observed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        store.subscribe(move |s| {
            if let Some(thread) = s.threads.get("conv-1") {
                sink.lock().unwrap().push(thread.status);
            }
        });

        store.fetch_messages("conv-1").await.unwrap();
        assert_eq!(
            *observed.lock().unwrap(),
            vec![StoreStatus::Loading, StoreStatus::Ready]
        );
    }

    #[tokio::test]
    async fn threads_are_tracked_per_conversation() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        store.enqueue_pending("conv-1", &input("c-1", "one")).unwrap();
        store.enqueue_pending("conv-2", &input("c-1", "other thread")).unwrap();

        assert_eq!(store.pending("conv-1").len(), 1);
        assert_eq!(store.pending("conv-2").len(), 1);
        assert_eq!(store.pending("conv-1")[0].body, "one");
        assert_eq!(store.pending("conv-2")[0].body, "other thread");
    }

    #[tokio::test]
    async fn blank_conversation_id_is_rejected() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        let err = store.fetch_messages("  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationIdRequired);
        let err = store.enqueue_pending("", &input("c-1", "x")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationIdRequired);
    }
}
