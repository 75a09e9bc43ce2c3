//! Protocol dialects.
//!
//! A [`Dialect`] knows one protocol version's endpoint templates, how to
//! serialize a canonical [`LookupRequest`], and how to parse that version's
//! lookup and query responses into the uniform [`Outcome`] types. Dialects
//! are pure: they never perform I/O, so they are unit-testable with literal
//! payloads.
//!
//! # Response classification
//!
//! Every parse goes through the same total decision:
//!
//! 1. A body that is not a JSON object is malformed.
//! 2. An object carrying `error_number` is a declared [`ServiceError`].
//! 3. Anything else must deserialize into the dialect's success shape, or
//!    the call fails with [`MpiError::MalformedResponse`].
//!
//! # Adding a version
//!
//! Implement [`Dialect`] and register a factory in a [`DialectRegistry`].
//! The [`MpiService`](crate::service::MpiService) never matches on versions.

mod registry;
pub mod v1;
pub mod v2;

use std::fmt::Debug;

use mpi_proto::{ERROR_NUMBER_FIELD, ErrorPayload, SettlementRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoint::{EndpointSet, Operation};
use crate::error::MpiError;
use crate::model::{LookupRequest, TransactionId, UpdatedTransaction};
use crate::outcome::{LookupResult, Outcome, QueryResult, ServiceError, UpdateResult};
use crate::version::ProtocolVersion;

pub use registry::{DialectFactory, DialectRegistry, select};
pub use v1::V1Dialect;
pub use v2::V2Dialect;

/// Version-specific request/response mapping strategy.
pub trait Dialect: Send + Sync + Debug {
    /// The version this dialect speaks.
    fn version(&self) -> ProtocolVersion;

    /// Endpoint templates of this version.
    fn endpoints(&self) -> EndpointSet;

    /// Path of the lookup endpoint.
    fn lookup_endpoint(&self) -> &'static str {
        self.endpoints().lookup()
    }

    /// Path of the query endpoint for a transaction.
    fn query_endpoint(&self, id: &TransactionId) -> String {
        self.endpoints().query(id)
    }

    /// Path of the update endpoint for a transaction.
    fn update_endpoint(&self, id: &TransactionId) -> String {
        self.endpoints().update(id)
    }

    /// Maps a canonical lookup request to this version's wire body.
    ///
    /// # Errors
    ///
    /// Returns [`MpiError::Encode`] if the body cannot be serialized.
    fn serialize_lookup(&self, request: &LookupRequest) -> Result<Value, MpiError>;

    /// Parses a lookup response body.
    ///
    /// # Errors
    ///
    /// Returns [`MpiError::MalformedResponse`] when the body is neither a
    /// success nor a declared error.
    fn parse_lookup_response(&self, body: Value) -> Result<LookupResult, MpiError>;

    /// Parses a query response body for the transaction `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MpiError::MalformedResponse`] when the body is neither a
    /// success nor a declared error.
    fn parse_query_response(&self, body: Value, id: &TransactionId)
    -> Result<QueryResult, MpiError>;
}

/// Classifies a response body as a declared error or the success shape `T`.
///
/// # Errors
///
/// Returns [`MpiError::MalformedResponse`] when the body is not an object,
/// when its error payload is invalid, or when it does not match `T`.
pub fn classify<T: DeserializeOwned>(
    operation: Operation,
    body: Value,
) -> Result<Outcome<T>, MpiError> {
    let Value::Object(fields) = &body else {
        return Err(MpiError::malformed(
            operation,
            format!("expected a JSON object, got {}", json_kind(&body)),
        ));
    };

    if fields.contains_key(ERROR_NUMBER_FIELD) {
        let payload: ErrorPayload = serde_json::from_value(body)
            .map_err(|e| MpiError::malformed(operation, format!("invalid error payload: {e}")))?;
        return Ok(Outcome::ServiceError(ServiceError::from(payload)));
    }

    serde_json::from_value::<T>(body)
        .map(Outcome::Success)
        .map_err(|e| MpiError::malformed(operation, e.to_string()))
}

/// Parses the settlement record returned by the update endpoint.
///
/// The update endpoint is shared by all versions, so this is not part of
/// [`Dialect`].
///
/// # Errors
///
/// Returns [`MpiError::MalformedResponse`] when the body is not an object or
/// carries an invalid error payload.
pub fn parse_update_response(body: Value, id: &TransactionId) -> Result<UpdateResult, MpiError> {
    Ok(
        classify::<SettlementRecord>(Operation::Update, body)?.map(|record| UpdatedTransaction {
            id: id.clone(),
            record,
        }),
    )
}

pub(crate) fn encode<T: serde::Serialize>(
    operation: Operation,
    wire: &T,
) -> Result<Value, MpiError> {
    serde_json::to_value(wire).map_err(|source| MpiError::Encode { operation, source })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, serde::Deserialize)]
    struct Shape {
        #[allow(dead_code)]
        token: String,
    }

    #[test]
    fn test_classify_declared_error_wins() {
        let body = json!({ "token": "t", "error_number": 1004, "error_description": "x" });
        let outcome = classify::<Shape>(Operation::Lookup, body).unwrap();
        assert_eq!(outcome.service_error().unwrap().error_number, 1004);
    }

    #[test]
    fn test_classify_success() {
        let outcome = classify::<Shape>(Operation::Lookup, json!({ "token": "t" })).unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn test_classify_neither_is_malformed() {
        let err = classify::<Shape>(Operation::Query, json!({})).unwrap_err();
        assert!(matches!(
            err,
            MpiError::MalformedResponse { operation: Operation::Query, .. }
        ));
    }

    #[test]
    fn test_classify_non_object_is_malformed() {
        for body in [json!(null), json!([1]), json!("ok"), json!(3)] {
            let err = classify::<Shape>(Operation::Lookup, body).unwrap_err();
            assert!(matches!(err, MpiError::MalformedResponse { .. }));
        }
    }

    #[test]
    fn test_classify_invalid_error_number_is_malformed() {
        let body = json!({ "error_number": null, "error_description": "x" });
        let err = classify::<Shape>(Operation::Lookup, body).unwrap_err();
        assert!(err.to_string().contains("invalid error payload"));
    }

    #[test]
    fn test_update_response_echoes_id() {
        let id = TransactionId::from("9");
        let outcome = parse_update_response(json!({ "reference": "Test reference" }), &id).unwrap();
        let updated = outcome.success().unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.record.reference(), Some("Test reference"));
    }
}
