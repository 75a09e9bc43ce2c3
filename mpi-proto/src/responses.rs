//! Payloads shared by both MPI dialects.
//!
//! Declared service errors, the transaction update body and the settlement
//! record returned by the update endpoint have the same shape whatever the
//! protocol version.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, OneOrMany, PickFirst, serde_as, skip_serializing_none};

use crate::OpaqueId;

/// Field-level validation messages keyed by wire field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A business-level failure declared by the service inside a response body.
///
/// # JSON Format
///
/// ```json
/// {
///   "error_number": 1011,
///   "error_description": "Invalid arguments to initiate the authentication request",
///   "errors": { "acctNumber": ["The card number is invalid"] }
/// }
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Service error code. Accepted as a number or a numeric string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub error_number: i64,

    /// Human-readable description.
    #[serde(default)]
    pub error_description: String,

    /// Per-field validation messages. A single message is accepted in place
    /// of a list, and `[]` or `null` in place of an empty object.
    #[serde(
        default,
        deserialize_with = "deserialize_field_errors",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub errors: FieldErrors,
}

/// Body of a `PATCH /api/transactions/{id}` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTransactionPayload {
    /// Payment-processor metadata. Absent keys are omitted.
    pub payment: PaymentUpdate,
}

/// Payment-processor metadata attached to a transaction.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentUpdate {
    /// Processor that handled the payment.
    pub processor: Option<String>,
    /// Authorization code.
    pub authorization: Option<String>,
    /// Payment provider.
    pub provider: Option<String>,
    /// Base24 reference.
    pub base24: Option<String>,
    /// ISO reference.
    pub iso: Option<String>,
}

/// Settlement context returned by the update endpoint.
///
/// The record is passed through untouched: the client checks that the body
/// is an object and never interprets the values. Accessors read the common
/// keys without assuming their JSON types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementRecord(Map<String, Value>);

impl SettlementRecord {
    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `key` when it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Merchant reference.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.get_str("reference")
    }

    /// Transaction identifier as echoed by the service.
    #[must_use]
    pub fn id(&self) -> Option<OpaqueId> {
        self.get("id")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Whether the authentication signature was validated.
    #[must_use]
    pub fn validated_signature(&self) -> Option<bool> {
        self.get("validated_signature").and_then(Value::as_bool)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the underlying object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SettlementRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Field errors in the shapes the service emits: an object of messages, or
/// `[]`/`null` when there are none.
fn deserialize_field_errors<'de, D>(deserializer: D) -> Result<FieldErrors, D::Error>
where
    D: Deserializer<'de>,
{
    #[serde_as]
    #[derive(Deserialize)]
    struct Messages(#[serde_as(as = "BTreeMap<_, OneOrMany<_>>")] FieldErrors);

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(FieldErrors::new()),
        Some(Value::Array(items)) if items.is_empty() => Ok(FieldErrors::new()),
        Some(value) => serde_json::from_value::<Messages>(value)
            .map(|messages| messages.0)
            .map_err(de::Error::custom),
    }
}
