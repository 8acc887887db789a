//! Turns transport failures and response bodies into typed outcomes.

use serde_json::{Map, Value};

use crate::error::KodikError;
use crate::record::RawRecord;
use crate::transport::TransportFailure;

pub const CONNECT_FAILED: &str = "cannot connect to Kodik";
pub const UNEXPECTED_API_RESPONSE: &str = "unexpected Kodik API response";
pub const UNPROCESSABLE_RESPONSE: &str = "cannot process Kodik response";
pub const NOTHING_FOUND: &str = "no material found for this query";

/// What a recognized server-side `error` message means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidToken,
    NotFound,
}

/// Server `error` messages, matched by exact value. The API answers in Russian;
/// the English wording is accepted too.
pub const API_ERRORS: &[(&str, ApiErrorKind)] = &[
    ("Отсутствует или неверный токен", ApiErrorKind::InvalidToken),
    ("missing or invalid token", ApiErrorKind::InvalidToken),
    ("Неправильный формат: id", ApiErrorKind::NotFound),
    ("invalid format: id", ApiErrorKind::NotFound),
];

/// Total mapping from a transport failure to the error the caller sees.
pub fn translate_failure(failure: TransportFailure) -> KodikError {
    match failure {
        TransportFailure::Connect(_) => KodikError::unexpected(CONNECT_FAILED),
        TransportFailure::Client { status } => KodikError::unexpected(format!("unexpected Kodik response code: {}", status)),
        TransportFailure::Server { body, .. } => classify_api_error(api_error_message(&body).as_deref()),
        TransportFailure::Other(err) => KodikError::Other(err),
    }
}

/// The `error` field of a server error body, when there is a string one.
pub fn api_error_message(body: &[u8]) -> Option<String> {
    let mut parsed: Map<String, Value> = serde_json::from_slice(body).ok()?;
    match parsed.remove("error")? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

pub fn classify_api_error(message: Option<&str>) -> KodikError {
    let known = message.and_then(|m| API_ERRORS.iter().find(|(text, _)| *text == m)).map(|(_, kind)| *kind);
    match known {
        Some(ApiErrorKind::InvalidToken) => KodikError::InvalidToken("invalid Kodik API token".to_string()),
        Some(ApiErrorKind::NotFound) => KodikError::NotFound("requested material not found".to_string()),
        None => KodikError::unexpected(UNEXPECTED_API_RESPONSE),
    }
}

/// The `results` array of a search body.
pub fn results(body: &[u8]) -> Result<Vec<Value>, KodikError> {
    let mut parsed: Map<String, Value> = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "undecodable search body");
        KodikError::unexpected(UNPROCESSABLE_RESPONSE)
    })?;
    match parsed.remove("results") {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(KodikError::unexpected(UNPROCESSABLE_RESPONSE)),
    }
}

/// Usable records in API order; at least one or `NotFound`.
pub fn usable_records(items: Vec<Value>) -> Result<Vec<RawRecord>, KodikError> {
    let total = items.len();
    let records: Vec<RawRecord> = items.into_iter().filter_map(RawRecord::from_value).collect();
    if records.len() < total {
        tracing::debug!(dropped = total - records.len(), kept = records.len(), "filtered unusable records");
    }
    if records.is_empty() {
        return Err(KodikError::NotFound(NOTHING_FOUND.to_string()));
    }
    Ok(records)
}

/// The first record, which must be usable.
pub fn first_record(items: Vec<Value>) -> Result<RawRecord, KodikError> {
    items
        .into_iter()
        .next()
        .and_then(RawRecord::from_value)
        .ok_or_else(|| KodikError::unexpected(UNPROCESSABLE_RESPONSE))
}
