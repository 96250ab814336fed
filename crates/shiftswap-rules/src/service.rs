// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of the service unit referenced by offers and proposals.
//!
//! A service is either a roster catalog code, the fixed rest-day marker, or
//! free text. Exactly one payload may be populated per kind; everything
//! else is rejected with an error naming the offending sub-field.

use shiftswap_core::types::REST_CODE;
use shiftswap_core::{ErrorCode, ExchangeError, ServiceValue, ServiceValueInput};

/// Validate and normalize a loose service value.
///
/// `field_prefix` names the position of the value in the surrounding
/// payload (for example `offeredService`); error field paths are formed as
/// `{field_prefix}.kind` / `.code` / `.text`. Kind matching is
/// case-insensitive; payloads are trimmed. A blank `code`/`text` counts as
/// absent.
pub fn normalize_service_value(
    input: &ServiceValueInput,
    field_prefix: &str,
) -> Result<ServiceValue, ExchangeError> {
    let kind = input.kind.trim().to_ascii_uppercase();
    let code = non_blank(input.code.as_deref());
    let text = non_blank(input.text.as_deref());

    match kind.as_str() {
        "CATALOG" => {
            if text.is_some() {
                return Err(ExchangeError::validation(
                    ErrorCode::ServiceTextForbidden,
                    "a catalog service must not carry free text",
                    format!("{field_prefix}.text"),
                ));
            }
            let code = code.ok_or_else(|| {
                ExchangeError::validation(
                    ErrorCode::ServiceCodeRequired,
                    "a catalog service requires a code",
                    format!("{field_prefix}.code"),
                )
            })?;
            Ok(ServiceValue::Catalog { code: code.to_string() })
        }
        "REST" => {
            if text.is_some() {
                return Err(ExchangeError::validation(
                    ErrorCode::ServiceTextForbidden,
                    "a rest service must not carry free text",
                    format!("{field_prefix}.text"),
                ));
            }
            if code != Some(REST_CODE) {
                return Err(ExchangeError::validation(
                    ErrorCode::ServiceRestCodeInvalid,
                    format!("a rest service requires code `{REST_CODE}`"),
                    format!("{field_prefix}.code"),
                ));
            }
            Ok(ServiceValue::Rest)
        }
        "FREE_TEXT" => {
            if code.is_some() {
                return Err(ExchangeError::validation(
                    ErrorCode::ServiceCodeForbidden,
                    "a free-text service must not carry a code",
                    format!("{field_prefix}.code"),
                ));
            }
            let text = text.ok_or_else(|| {
                ExchangeError::validation(
                    ErrorCode::ServiceTextRequired,
                    "a free-text service requires text",
                    format!("{field_prefix}.text"),
                )
            })?;
            Ok(ServiceValue::FreeText { text: text.to_string() })
        }
        other => Err(ExchangeError::validation(
            ErrorCode::ServiceKindInvalid,
            format!("unknown service kind `{other}`"),
            format!("{field_prefix}.kind"),
        )),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
