// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable cache of the public exchange-request listing.

use std::sync::Arc;

use tracing::{debug, warn};

use shiftswap_api::RequestsApi;
use shiftswap_core::{
    CounterProposalInput, CreateExchangeRequestInput, ExchangeError, ExchangeRequest, Observable,
    SubscriptionId,
};
use shiftswap_rules::{RequestLimits, validate_counter_proposal, validate_create_exchange_request};
use shiftswap_session::AuthStore;

use crate::{ResourceState, StoreStatus, require_authenticated};

/// Cached, observable view of `/exchanges/requests`.
pub struct RequestsStore {
    state: Observable<ResourceState<ExchangeRequest>>,
    api: RequestsApi,
    auth: Arc<AuthStore>,
    limits: RequestLimits,
}

impl RequestsStore {
    pub fn new(api: RequestsApi, auth: Arc<AuthStore>, limits: RequestLimits) -> Self {
        Self {
            state: Observable::default(),
            api,
            auth,
            limits,
        }
    }

    pub fn state(&self) -> ResourceState<ExchangeRequest> {
        self.state.get()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&ResourceState<ExchangeRequest>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id)
    }

    /// Loads one page of the listing, replacing the cached items.
    ///
    /// Subscribers observe `loading` strictly before the call resolves and
    /// `ready`/`error` strictly after.
    pub async fn fetch_requests(&self, page: u32) -> Result<(), ExchangeError> {
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
                debug!(page, count = listing.items.len(), "exchange request page loaded");
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

    /// Validates and publishes a new exchange request, then re-reads the
    /// first listing page so subscribers see it.
    pub async fn create_request(
        &self,
        input: &CreateExchangeRequestInput,
    ) -> Result<ExchangeRequest, ExchangeError> {
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_error(err.clone());
            return Err(err);
        }

        let payload = match validate_create_exchange_request(input, self.limits) {
            Ok(payload) => payload,
            Err(err) => {
                self.record_error(err.clone());
                return Err(err);
            }
        };

        let created = match self.api.create(&payload, None).await {
            Ok(created) => created,
            Err(err) => {
                self.record_error(err.clone());
                return Err(err);
            }
        };

        if let Err(err) = self.fetch_requests(1).await {
            warn!(code = %err.code, "request published but listing refresh failed");
        }
        Ok(created)
    }

    /// Responds to a request by picking one alternative; returns the
    /// identifier of the conversation the server opened.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        proposal: &CounterProposalInput,
    ) -> Result<String, ExchangeError> {
        if let Err(err) = require_authenticated(&self.auth) {
            self.record_error(err.clone());
            return Err(err);
        }

        let proposal = match validate_counter_proposal(proposal, "") {
            Ok(proposal) => proposal,
            Err(err) => {
                self.record_error(err.clone());
                return Err(err);
            }
        };

        let current_page = self.state.get().page;
        let conversation_id = match self.api.respond(request_id, &proposal, None).await {
            Ok(id) => id,
            Err(err) => {
                self.record_error(err.clone());
                return Err(err);
            }
        };

        if let Err(err) = self.fetch_requests(current_page).await {
            warn!(code = %err.code, "responded but listing refresh failed");
        }
        Ok(conversation_id)
    }

    /// Records a failure without discarding cached items.
    fn record_error(&self, error: ExchangeError) {
        self.state.patch(|s| {
            s.status = StoreStatus::Error;
            s.error = Some(error);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftswap_api::AuthApi;
    use shiftswap_core::{ErrorCode, ServiceValueInput, SessionTokenStore, StoredSession};
    use shiftswap_session::MemoryTokenStore;
    use shiftswap_transport::Transport;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authenticated_store(server: &MockServer) -> RequestsStore {
        let transport = Arc::new(
            Transport::new(server.uri(), "depot-north", Duration::from_millis(500)).unwrap(),
        );
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

        RequestsStore::new(
            RequestsApi::new(transport, tokens),
            auth,
            RequestLimits::default(),
        )
    }

    fn anonymous_store(server: &MockServer) -> RequestsStore {
        let transport = Arc::new(
            Transport::new(server.uri(), "depot-north", Duration::from_millis(500)).unwrap(),
        );
        let tokens: Arc<dyn SessionTokenStore> = Arc::new(MemoryTokenStore::new());
        let auth = Arc::new(AuthStore::new(
            AuthApi::new(Arc::clone(&transport), Arc::clone(&tokens)),
            Arc::clone(&tokens),
        ));
        RequestsStore::new(
            RequestsApi::new(transport, tokens),
            auth,
            RequestLimits::default(),
        )
    }

    fn request_body(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "owner": "u-2",
            "offeredDateISO": "2026-02-10",
            "offeredService": {"kind": "CATALOG", "code": "2910"},
            "counterProposals": [
                {"wantedDateISO": "2026-02-11", "wantedService": {"kind": "REST", "code": "REST"}}
            ],
            "status": "open"
        })
    }

    #[tokio::test]
    async fn fetch_requires_authentication_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = anonymous_store(&server);
        let err = store.fetch_requests(1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        assert_eq!(store.state().status, StoreStatus::Error);
    }

    #[tokio::test]
    async fn fetch_sets_loading_before_ready() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [request_body("req-1")],
                "pagination": {"hasNext": false}
            })))
            .mount(&server)
            .await;

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        store.subscribe(move |s| sink.lock().unwrap().push(s.status));

        store.fetch_requests(1).await.unwrap();

        assert_eq!(
            *observed.lock().unwrap(),
            vec![StoreStatus::Loading, StoreStatus::Ready]
        );
        let state = store.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.page, 1);
        assert!(!state.has_next);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_stale_items() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [request_body("req-1")],
                "pagination": {"hasNext": true}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        store.fetch_requests(1).await.unwrap();
        let err = store.fetch_requests(2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Http(503));

        let state = store.state();
        assert_eq!(state.status, StoreStatus::Error);
        // Page 1 items survive the failed page 2 fetch.
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.page, 1);
    }

    #[tokio::test]
    async fn create_validates_before_any_network_call() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/requests"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let input = CreateExchangeRequestInput {
            offered_date_iso: "2026-02-10".into(),
            offered_service: ServiceValueInput {
                kind: "CATALOG".into(),
                code: Some("2910".into()),
                text: None,
            },
            counter_proposals: vec![], // invalid: at least one required
        };
        let err = store.create_request(&input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestCounterProposalsRequired);
    }

    #[tokio::test]
    async fn create_success_refreshes_the_listing() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/requests"))
            .respond_with(ResponseTemplate::new(201).set_body_json(request_body("req-9")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [request_body("req-9")],
                "pagination": {"hasNext": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = CreateExchangeRequestInput {
            offered_date_iso: "2026-02-10".into(),
            offered_service: ServiceValueInput {
                kind: "CATALOG".into(),
                code: Some("2910".into()),
                text: None,
            },
            counter_proposals: vec![CounterProposalInput {
                wanted_date_iso: "2026-02-11".into(),
                wanted_service: ServiceValueInput {
                    kind: "REST".into(),
                    code: Some("REST".into()),
                    text: None,
                },
            }],
        };
        let created = store.create_request(&input).await.unwrap();
        assert_eq!(created.id, "req-9");
        assert_eq!(store.state().items.len(), 1);
        assert_eq!(store.state().status, StoreStatus::Ready);
    }

    #[tokio::test]
    async fn respond_returns_the_new_conversation_id() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;
        Mock::given(method("POST"))
            .and(path("/exchanges/requests/req-1/respond"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"conversationId": "conv-7"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [], "pagination": {"hasNext": false}
            })))
            .mount(&server)
            .await;

        let proposal = CounterProposalInput {
            wanted_date_iso: "2026-02-11".into(),
            wanted_service: ServiceValueInput {
                kind: "REST".into(),
                code: Some("REST".into()),
                text: None,
            },
        };
        let conversation_id = store.respond_to_request("req-1", &proposal).await.unwrap();
        assert_eq!(conversation_id, "conv-7");
    }

    #[tokio::test]
    async fn respond_validation_error_names_unprefixed_fields() {
        let server = MockServer::start().await;
        let store = authenticated_store(&server).await;

        let proposal = CounterProposalInput {
            wanted_date_iso: "2026-02-31".into(),
            wanted_service: ServiceValueInput {
                kind: "REST".into(),
                code: Some("REST".into()),
                text: None,
            },
        };
        let err = store.respond_to_request("req-1", &proposal).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestCounterProposalDateInvalid);
        assert_eq!(err.field.as_deref(), Some("wantedDateISO"));
    }
}
