// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of public exchange-request creation payloads.

use std::collections::HashSet;

use chrono::NaiveDate;
use shiftswap_core::{
    CounterProposal, CounterProposalInput, CreateExchangeRequest, CreateExchangeRequestInput,
    ErrorCode, ExchangeError, ServiceValue,
};

use crate::service::normalize_service_value;

/// Limits applied when validating a creation payload.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    /// Maximum number of counter-proposals per request.
    pub max_counter_proposals: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_counter_proposals: 5,
        }
    }
}

/// Validate a creation payload and return the normalized POST body.
///
/// Short-circuits on the first violation: offered date, offered service,
/// proposal count, then each proposal in order (date, service, duplicate
/// signature). Two proposals are duplicates when they share
/// `(wantedDateISO, kind, code, lowercased-trimmed text)`.
pub fn validate_create_exchange_request(
    input: &CreateExchangeRequestInput,
    limits: RequestLimits,
) -> Result<CreateExchangeRequest, ExchangeError> {
    let offered_date = parse_date(&input.offered_date_iso).ok_or_else(|| {
        ExchangeError::validation(
            ErrorCode::RequestOfferedDateInvalid,
            format!("`{}` is not a valid calendar date", input.offered_date_iso),
            "offeredDateISO",
        )
    })?;

    let offered_service = normalize_service_value(&input.offered_service, "offeredService")?;

    if input.counter_proposals.is_empty() {
        return Err(ExchangeError::validation(
            ErrorCode::RequestCounterProposalsRequired,
            "at least one counter-proposal is required",
            "counterProposals",
        ));
    }
    if input.counter_proposals.len() > limits.max_counter_proposals {
        return Err(ExchangeError::validation(
            ErrorCode::RequestCounterProposalsTooMany,
            format!(
                "at most {} counter-proposals are allowed, got {}",
                limits.max_counter_proposals,
                input.counter_proposals.len()
            ),
            "counterProposals",
        ));
    }

    let mut proposals = Vec::with_capacity(input.counter_proposals.len());
    let mut seen = HashSet::new();

    for (i, proposal) in input.counter_proposals.iter().enumerate() {
        let normalized = validate_counter_proposal(proposal, &format!("counterProposals[{i}]"))?;

        if !seen.insert(proposal_signature(normalized.wanted_date, &normalized.wanted_service)) {
            return Err(ExchangeError::validation(
                ErrorCode::RequestCounterProposalDuplicate,
                "counter-proposals must be distinct",
                format!("counterProposals[{i}]"),
            ));
        }

        proposals.push(normalized);
    }

    Ok(CreateExchangeRequest {
        offered_date,
        offered_service,
        counter_proposals: proposals,
    })
}

/// Validate a single counter-proposal, as submitted when creating a request
/// or when responding to one.
///
/// `field_prefix` positions error field paths: empty for a standalone
/// response body, `counterProposals[i]` inside a creation payload.
pub fn validate_counter_proposal(
    input: &CounterProposalInput,
    field_prefix: &str,
) -> Result<CounterProposal, ExchangeError> {
    let wanted_date = parse_date(&input.wanted_date_iso).ok_or_else(|| {
        ExchangeError::validation(
            ErrorCode::RequestCounterProposalDateInvalid,
            format!("`{}` is not a valid calendar date", input.wanted_date_iso),
            join_field(field_prefix, "wantedDateISO"),
        )
    })?;

    let wanted_service =
        normalize_service_value(&input.wanted_service, &join_field(field_prefix, "wantedService"))?;

    Ok(CounterProposal {
        wanted_date,
        wanted_service,
    })
}

fn join_field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    raw.trim().parse().ok()
}

/// Duplicate signature: date plus the normalized service identity.
fn proposal_signature(date: NaiveDate, service: &ServiceValue) -> (NaiveDate, &'static str, String) {
    let payload = match service {
        ServiceValue::Catalog { code } => code.clone(),
        ServiceValue::Rest => String::new(),
        ServiceValue::FreeText { text } => text.trim().to_lowercase(),
    };
    (date, service.kind(), payload)
}
