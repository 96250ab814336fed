// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain and wire types for the shift-exchange core.
//!
//! Wire shapes follow the server contract: camelCase field names, ISO
//! calendar dates, RFC 3339 timestamps. Loose `*Input` types mirror what a
//! caller (form, CLI) hands in before validation; the corresponding strict
//! types only exist as the output of the rules layer or a decoded server
//! response.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// The service unit referenced by offers and counter-proposals.
///
/// Exactly one payload is populated per kind: `Catalog` carries a roster
/// catalog code, `Rest` is the fixed rest-day marker (wire code `"REST"`),
/// `FreeText` carries a free-form description. Anything else on the wire is
/// rejected, not coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceValue {
    Catalog { code: String },
    Rest,
    FreeText { text: String },
}

impl ServiceValue {
    /// The wire tag for this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceValue::Catalog { .. } => "CATALOG",
            ServiceValue::Rest => "REST",
            ServiceValue::FreeText { .. } => "FREE_TEXT",
        }
    }

    /// The catalog code, if this kind carries one (`Rest` reads `"REST"`).
    pub fn code(&self) -> Option<&str> {
        match self {
            ServiceValue::Catalog { code } => Some(code),
            ServiceValue::Rest => Some(REST_CODE),
            ServiceValue::FreeText { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ServiceValue::FreeText { text } => Some(text),
            _ => None,
        }
    }
}

/// Fixed wire code carried by the `REST` kind.
pub const REST_CODE: &str = "REST";

#[derive(Serialize, Deserialize)]
struct ServiceValueWire {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

impl Serialize for ServiceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            ServiceValue::Catalog { code } => ServiceValueWire {
                kind: "CATALOG".into(),
                code: Some(code.clone()),
                text: None,
            },
            ServiceValue::Rest => ServiceValueWire {
                kind: "REST".into(),
                code: Some(REST_CODE.into()),
                text: None,
            },
            ServiceValue::FreeText { text } => ServiceValueWire {
                kind: "FREE_TEXT".into(),
                code: None,
                text: Some(text.clone()),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ServiceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = ServiceValueWire::deserialize(deserializer)?;
        match (wire.kind.as_str(), wire.code, wire.text) {
            ("CATALOG", Some(code), None) => Ok(ServiceValue::Catalog { code }),
            ("REST", _, None) => Ok(ServiceValue::Rest),
            ("FREE_TEXT", None, Some(text)) => Ok(ServiceValue::FreeText { text }),
            (kind, _, _) => Err(D::Error::custom(format!(
                "unrecognized service value shape for kind `{kind}`"
            ))),
        }
    }
}

/// Loose service value shape as handed in by a caller, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceValueInput {
    #[serde(default)]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

// --- Exchange requests ---

/// Server-owned lifecycle status of a public exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Matched,
    Closed,
    /// Tolerated on decode so a newer server does not break listing.
    #[serde(other)]
    Unknown,
}

/// One alternative (date, service) the requester would accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterProposal {
    #[serde(rename = "wantedDateISO")]
    pub wanted_date: NaiveDate,
    pub wanted_service: ServiceValue,
}

/// A published offer to swap one worked day for an alternative.
///
/// Created by the offering user; read-only to everyone else until a
/// response arrives. The client never mutates one in place -- it creates
/// and re-reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub id: String,
    pub owner: String,
    #[serde(rename = "offeredDateISO")]
    pub offered_date: NaiveDate,
    pub offered_service: ServiceValue,
    pub counter_proposals: Vec<CounterProposal>,
    pub status: RequestStatus,
}

/// Loose creation payload, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExchangeRequestInput {
    #[serde(rename = "offeredDateISO", default)]
    pub offered_date_iso: String,
    #[serde(default)]
    pub offered_service: ServiceValueInput,
    #[serde(default)]
    pub counter_proposals: Vec<CounterProposalInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterProposalInput {
    #[serde(rename = "wantedDateISO", default)]
    pub wanted_date_iso: String,
    #[serde(default)]
    pub wanted_service: ServiceValueInput,
}

/// Validated, normalized creation payload -- the POST body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExchangeRequest {
    #[serde(rename = "offeredDateISO")]
    pub offered_date: NaiveDate,
    pub offered_service: ServiceValue,
    pub counter_proposals: Vec<CounterProposal>,
}

// --- Conversations ---

/// Two-party negotiation state: `active -> locked -> closed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Locked,
    Closed,
}

/// Which side of a conversation is acting. Role A is the request owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum ParticipantRole {
    A,
    B,
}

/// The private two-party thread created once a counterparty responds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_a: String,
    pub user_b: String,
    pub status: ConversationStatus,
    pub accepted_by_a: bool,
    pub accepted_by_b: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// The role `user_id` plays in this conversation, if a participant.
    pub fn role_of(&self, user_id: &str) -> Option<ParticipantRole> {
        if self.user_a == user_id {
            Some(ParticipantRole::A)
        } else if self.user_b == user_id {
            Some(ParticipantRole::B)
        } else {
            None
        }
    }
}

// --- Messages ---

/// A chat message as stored by the server.
///
/// `client_message_id` is the sender-generated idempotency key: resending
/// the same id never creates a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub server_id: Option<String>,
    pub client_message_id: String,
    pub sender_user_id: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Loose send payload, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    #[serde(default)]
    pub client_message_id: String,
    #[serde(default)]
    pub body: String,
}

/// Validated, trimmed send payload -- also the pending-queue entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub client_message_id: String,
    pub body: String,
}

// --- Auth & session ---

/// A known user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// Bearer token material persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response of login/register: token material plus the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

/// In-memory auth lifecycle, rebuilt from the persisted token at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Anonymous,
    Loading,
    Authenticated,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
}

// --- Pagination ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next: bool,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}
