//! EMV 3-D Secure 2 dialect.

use mpi_proto::v2;
use serde_json::Value;

use super::{Dialect, classify, encode};
use crate::endpoint::{EndpointSet, Operation};
use crate::error::MpiError;
use crate::model::{AuthenticationStatus, LookupRequest, LookupSession, TransStatus, TransactionId};
use crate::outcome::{LookupResult, QueryResult};
use crate::version::ProtocolVersion;

/// Dialect for `/api/threeds/v2/...` endpoints.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct V2Dialect;

impl V2Dialect {
    /// Builds the V2 wire body for a canonical request.
    #[must_use]
    pub fn wire_request(request: &LookupRequest) -> v2::LookupRequest {
        let browser = request.browser.as_ref();
        let transaction_type = request.transaction_type;

        v2::LookupRequest {
            acct_number: request.card.number.clone(),
            card_expiry_date: request.card.expiry_yymm(),
            purchase_amount: request.amount.to_string(),
            purchase_currency: request.currency.clone(),
            redirect_uri: request.redirect_uri.clone(),
            reference: request.reference.clone(),
            purchase_instal_data: request.installments,
            three_ds_requestor_authentication_ind: transaction_type
                .requires_authentication_indicator()
                .then(|| transaction_type.code().to_owned()),
            browser_accept_header: browser.and_then(|b| b.accept_header.clone()),
            browser_ip: browser.and_then(|b| b.ip.clone()),
            browser_language: browser.and_then(|b| b.language.clone()),
            browser_color_depth: browser.and_then(|b| b.color_depth),
            browser_screen_height: browser.and_then(|b| b.screen_height),
            browser_screen_width: browser.and_then(|b| b.screen_width),
            browser_tz: browser.and_then(|b| b.time_zone),
            browser_java_enabled: browser.and_then(|b| b.java_enabled),
            browser_user_agent: request.user_agent.clone(),
        }
    }
}

impl Dialect for V2Dialect {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V2
    }

    fn endpoints(&self) -> EndpointSet {
        EndpointSet::V2
    }

    fn serialize_lookup(&self, request: &LookupRequest) -> Result<Value, MpiError> {
        encode(Operation::Lookup, &Self::wire_request(request))
    }

    fn parse_lookup_response(&self, body: Value) -> Result<LookupResult, MpiError> {
        Ok(
            classify::<v2::LookupResponse>(Operation::Lookup, body)?.map(|wire| LookupSession {
                session_token: wire.session_token,
                redirect_url: wire.redirect_url,
                transaction_id: wire.transaction_id,
            }),
        )
    }

    fn parse_query_response(
        &self,
        body: Value,
        id: &TransactionId,
    ) -> Result<QueryResult, MpiError> {
        Ok(
            classify::<v2::QueryResponse>(Operation::Query, body)?.map(|wire| {
                AuthenticationStatus {
                    transaction_id: id.clone(),
                    trans_status: TransStatus::new(wire.trans_status),
                    trans_status_reason: wire.trans_status_reason,
                    eci: wire.eci,
                    acs_trans_id: Some(wire.acs_trans_id),
                    ds_trans_id: Some(wire.ds_trans_id),
                    three_ds_server_trans_id: Some(wire.three_ds_server_trans_id),
                    authentication_value: wire.authentication_value,
                    xid: None,
                    validated_signature: None,
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrowserInfo, Card, TransactionType};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn request() -> LookupRequest {
        LookupRequest::new(
            Card::new("4532840681197602", 12, 2030),
            Decimal::new(12_500, 2),
            "COP",
            "https://merchant.test/return",
        )
    }

    #[test]
    fn test_endpoints() {
        let dialect = V2Dialect;
        assert_eq!(dialect.lookup_endpoint(), "/api/threeds/v2/sessions");
        assert_eq!(
            dialect.query_endpoint(&TransactionId::from("1")),
            "/api/threeds/v2/transactions/1"
        );
    }

    #[test]
    fn test_serialize_minimal_lookup() {
        let body = V2Dialect.serialize_lookup(&request()).unwrap();
        assert_eq!(
            body,
            json!({
                "acctNumber": "4532840681197602",
                "cardExpiryDate": "3012",
                "purchaseAmount": "125.00",
                "purchaseCurrency": "COP",
                "redirectURI": "https://merchant.test/return",
            })
        );
    }

    #[test]
    fn test_serialize_recurring_with_browser() {
        let lookup = request()
            .with_transaction_type(TransactionType::Recurring)
            .with_user_agent("Mozilla/5.0")
            .with_browser(BrowserInfo {
                language: Some("es-CO".into()),
                java_enabled: Some(false),
                time_zone: Some(300),
                ..BrowserInfo::default()
            });
        let body = V2Dialect.serialize_lookup(&lookup).unwrap();
        assert_eq!(body["threeDSRequestorAuthenticationInd"], json!("02"));
        assert_eq!(body["browserLanguage"], json!("es-CO"));
        assert_eq!(body["browserJavaEnabled"], json!(false));
        assert_eq!(body["browserTZ"], json!(300));
        assert_eq!(body["browserUserAgent"], json!("Mozilla/5.0"));
        assert!(body.get("browserIP").is_none());
    }

    #[test]
    fn test_payment_has_no_authentication_indicator() {
        let body = V2Dialect.serialize_lookup(&request()).unwrap();
        assert!(body.get("threeDSRequestorAuthenticationInd").is_none());
    }

    #[test]
    fn test_parse_lookup_success_with_numeric_token() {
        let outcome = V2Dialect
            .parse_lookup_response(json!({
                "sessionToken": 60,
                "redirectURL": "https://merchant.test/return",
                "transactionID": "12",
            }))
            .unwrap();
        let session = outcome.success().unwrap();
        assert_eq!(session.session_token, "60");
        assert_eq!(session.redirect_url, "https://merchant.test/return");
        assert_eq!(session.transaction_id, "12");
    }

    #[test]
    fn test_parse_lookup_partial_success_is_malformed() {
        let err = V2Dialect
            .parse_lookup_response(json!({ "sessionToken": 60, "transactionID": "12" }))
            .unwrap_err();
        assert!(matches!(
            err,
            MpiError::MalformedResponse { operation: Operation::Lookup, .. }
        ));
    }

    #[test]
    fn test_parse_lookup_declared_error() {
        let outcome = V2Dialect
            .parse_lookup_response(json!({
                "error_number": 1011,
                "error_description": "Invalid arguments to initiate the authentication request",
                "errors": { "acctNumber": ["The card number doesn't pass validation"] },
            }))
            .unwrap();
        let error = outcome.service_error().unwrap();
        assert_eq!(error.error_number, 1011);
        assert_eq!(
            error.field_errors("acctNumber"),
            ["The card number doesn't pass validation"]
        );
    }

    #[test]
    fn test_parse_lookup_declared_error_with_empty_errors_list() {
        let outcome = V2Dialect
            .parse_lookup_response(json!({
                "error_number": 1004,
                "error_description": "There is no subscription associated",
                "errors": [],
            }))
            .unwrap();
        let error = outcome.service_error().unwrap();
        assert_eq!(error.error_number, 1004);
        assert!(error.errors.is_empty());
    }

    #[test]
    fn test_parse_query_passes_codes_through() {
        let id = TransactionId::from("2");
        let outcome = V2Dialect
            .parse_query_response(
                json!({
                    "transStatus": "U",
                    "transStatusReason": "22",
                    "eci": "07",
                    "acsTransID": "155222d5-3933-475b-a153-db899eee38b2",
                    "dsTransID": "51e8bbbb-5316-4a6b-a301-726a46a02dc5",
                    "threeDSServerTransID": "515ba5ef-100e-4040-8028-df915f9fcdab",
                }),
                &id,
            )
            .unwrap();
        let status = outcome.success().unwrap();
        assert_eq!(status.transaction_id, id);
        assert_eq!(status.trans_status, "U");
        assert_eq!(status.trans_status_reason.as_deref(), Some("22"));
        assert_eq!(status.eci, "07");
        assert_eq!(status.authentication_value, None);
        assert_eq!(
            status.ds_trans_id.as_deref(),
            Some("51e8bbbb-5316-4a6b-a301-726a46a02dc5")
        );
    }

    #[test]
    fn test_parse_query_missing_status_is_malformed() {
        let err = V2Dialect
            .parse_query_response(json!({ "eci": "07" }), &TransactionId::from("1"))
            .unwrap_err();
        assert!(matches!(
            err,
            MpiError::MalformedResponse { operation: Operation::Query, .. }
        ));
    }
}
