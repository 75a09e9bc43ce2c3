//! Legacy (V1) dialect wire types.
//!
//! V1 speaks snake_case field names and exposes lookups at `/api/lookup` and
//! status queries at `/api/transactions/{id}`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::OpaqueId;

/// V1 lookup endpoint.
pub const LOOKUP_PATH: &str = "/api/lookup";

/// V1 query endpoint prefix; the transaction id is appended.
pub const QUERY_PATH: &str = "/api/transactions/";

/// Body of a V1 lookup request.
///
/// # JSON Format
///
/// ```json
/// {
///   "pan": "4532840681197602",
///   "expiration_month": "12",
///   "expiration_year": "2030",
///   "amount": "125.00",
///   "currency": "COP",
///   "redirect_uri": "https://merchant.test/return"
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Primary account number.
    pub pan: String,
    /// Two-digit expiration month.
    pub expiration_month: String,
    /// Four-digit expiration year.
    pub expiration_year: String,
    /// Purchase amount as a decimal string.
    pub amount: String,
    /// ISO 4217 alphabetic currency code.
    pub currency: String,
    /// Where the cardholder returns after the challenge.
    pub redirect_uri: String,
    /// Merchant reference.
    pub reference: Option<String>,
    /// Number of installments.
    pub installments: Option<u32>,
}

/// Successful V1 lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Session token for the authentication attempt.
    pub session_token: OpaqueId,
    /// URL the cardholder must be redirected to.
    pub redirect_url: String,
    /// Transaction identifier used by later queries.
    pub id: OpaqueId,
}

/// V1 authentication status response.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Authentication outcome code.
    pub authentication_status: String,
    /// Reason code for a non-authenticated outcome.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Electronic Commerce Indicator.
    pub eci: String,
    /// Cardholder Authentication Verification Value.
    #[serde(default)]
    pub cavv: Option<String>,
    /// 3-D Secure 1 transaction identifier.
    #[serde(default)]
    pub xid: Option<String>,
    /// Whether the PARes signature was validated by the service.
    #[serde(default)]
    pub validated_signature: Option<bool>,
}
