//! EMV 3-D Secure 2 (V2) dialect wire types.
//!
//! V2 uses the camelCase field names of the EMV 3DS specification and
//! exposes sessions at `/api/threeds/v2/sessions` and status queries at
//! `/api/threeds/v2/transactions/{id}`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::OpaqueId;

/// V2 lookup endpoint.
pub const LOOKUP_PATH: &str = "/api/threeds/v2/sessions";

/// V2 query endpoint prefix; the transaction id is appended.
pub const QUERY_PATH: &str = "/api/threeds/v2/transactions/";

/// Body of a V2 session (lookup) request.
///
/// # JSON Format
///
/// ```json
/// {
///   "acctNumber": "4532840681197602",
///   "cardExpiryDate": "3012",
///   "purchaseAmount": "125.00",
///   "purchaseCurrency": "COP",
///   "redirectURI": "https://merchant.test/return"
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Primary account number.
    pub acct_number: String,
    /// Expiry date in `YYMM` form.
    pub card_expiry_date: String,
    /// Purchase amount as a decimal string.
    pub purchase_amount: String,
    /// ISO 4217 alphabetic currency code.
    pub purchase_currency: String,
    /// Where the cardholder returns after the challenge.
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
    /// Merchant reference.
    pub reference: Option<String>,
    /// Maximum number of authorisations permitted for installment payments.
    pub purchase_instal_data: Option<u32>,
    /// 3DS requestor authentication indicator (`"02"` recurring, `"03"` installment).
    #[serde(rename = "threeDSRequestorAuthenticationInd")]
    pub three_ds_requestor_authentication_ind: Option<String>,
    /// Browser `Accept` header.
    pub browser_accept_header: Option<String>,
    /// Browser IP address.
    #[serde(rename = "browserIP")]
    pub browser_ip: Option<String>,
    /// Browser language (IETF BCP 47).
    pub browser_language: Option<String>,
    /// Screen colour depth in bits.
    pub browser_color_depth: Option<u8>,
    /// Screen height in pixels.
    pub browser_screen_height: Option<u32>,
    /// Screen width in pixels.
    pub browser_screen_width: Option<u32>,
    /// Offset between UTC and browser local time, in minutes.
    #[serde(rename = "browserTZ")]
    pub browser_tz: Option<i32>,
    /// Whether the browser can execute Java.
    pub browser_java_enabled: Option<bool>,
    /// Browser user agent.
    pub browser_user_agent: Option<String>,
}

/// Successful V2 session response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Session token for the authentication attempt.
    #[serde(rename = "sessionToken")]
    pub session_token: OpaqueId,
    /// URL the cardholder must be redirected to.
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    /// Transaction identifier used by later queries.
    #[serde(rename = "transactionID")]
    pub transaction_id: OpaqueId,
}

/// V2 authentication status response.
///
/// # JSON Format
///
/// ```json
/// {
///   "transStatus": "Y",
///   "eci": "05",
///   "acsTransID": "37a7b6e0-fd58-4e38-98de-79c70c526a47",
///   "dsTransID": "de018c08-bd14-426a-9d52-46500a17091e",
///   "threeDSServerTransID": "eadd3a60-b870-41d0-977f-921b3dbe6323",
///   "authenticationValue": "AAABBZEEBgAAAAAAAAQGAAAAAAA="
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Transaction status code.
    pub trans_status: String,
    /// Reason code accompanying a non-`Y` status.
    #[serde(default)]
    pub trans_status_reason: Option<String>,
    /// Electronic Commerce Indicator.
    pub eci: String,
    /// ACS transaction identifier.
    #[serde(rename = "acsTransID")]
    pub acs_trans_id: String,
    /// Directory server transaction identifier.
    #[serde(rename = "dsTransID")]
    pub ds_trans_id: String,
    /// 3DS server transaction identifier.
    #[serde(rename = "threeDSServerTransID")]
    pub three_ds_server_trans_id: String,
    /// Cryptographic authentication value, opaque to the client.
    #[serde(default)]
    pub authentication_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_request_uses_emv_names_and_omits_absent() {
        let request = LookupRequest {
            acct_number: "4532840681197602".into(),
            card_expiry_date: "3012".into(),
            purchase_amount: "125.00".into(),
            purchase_currency: "COP".into(),
            redirect_uri: "https://merchant.test/return".into(),
            reference: None,
            purchase_instal_data: None,
            three_ds_requestor_authentication_ind: Some("02".into()),
            browser_accept_header: None,
            browser_ip: Some("127.0.0.1".into()),
            browser_language: None,
            browser_color_depth: None,
            browser_screen_height: None,
            browser_screen_width: None,
            browser_tz: None,
            browser_java_enabled: None,
            browser_user_agent: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "acctNumber": "4532840681197602",
                "cardExpiryDate": "3012",
                "purchaseAmount": "125.00",
                "purchaseCurrency": "COP",
                "redirectURI": "https://merchant.test/return",
                "threeDSRequestorAuthenticationInd": "02",
                "browserIP": "127.0.0.1",
            })
        );
    }

    #[test]
    fn test_query_response_requires_identifiers() {
        let missing_ds = json!({
            "transStatus": "Y",
            "eci": "05",
            "acsTransID": "a",
            "threeDSServerTransID": "c",
        });
        assert!(serde_json::from_value::<QueryResponse>(missing_ds).is_err());
    }
}
