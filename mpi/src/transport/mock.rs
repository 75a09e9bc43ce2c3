//! Deterministic in-memory transport.
//!
//! [`MockTransport`] answers from fixed fixture tables keyed by account
//! number (lookup) and transaction id (query). It never touches the
//! network and records every request it receives.

use std::future;
use std::sync::{Mutex, PoisonError};

use http::Method;
use serde_json::{Value, json};

use super::{BoxFuture, Transport, TransportRequest};
use crate::endpoint::EndpointSet;
use crate::error::TransportError;
use crate::version::ProtocolVersion;

/// Account that authenticates successfully.
pub const ENROLLED_ACCOUNT: &str = "4532840681197602";
/// Account without a subscription (error 1004).
pub const UNSUBSCRIBED_ACCOUNT: &str = "5554575520765108";
/// Account that fails validation (error 1011).
pub const UNVALIDATED_ACCOUNT: &str = "4716036206946551";
/// Account with an invalid number (error 1011).
pub const INVALID_ACCOUNT: &str = "6011499026766178";

const SESSION_TOKEN: u64 = 60;
const AUTHENTICATION_VALUE: &str = "AAABBZEEBgAAAAAAAAQGAAAAAAA=";
const INVALID_ARGUMENTS: &str = "Invalid arguments to initiate the authentication request";

struct QueryFixture {
    status: &'static str,
    reason: Option<&'static str>,
    eci: &'static str,
    acs_trans_id: &'static str,
    ds_trans_id: &'static str,
    server_trans_id: &'static str,
    authentication_value: Option<&'static str>,
}

const QUERY_TABLE: [QueryFixture; 6] = [
    QueryFixture {
        status: "Y",
        reason: None,
        eci: "05",
        acs_trans_id: "37a7b6e0-fd58-4e38-98de-79c70c526a47",
        ds_trans_id: "de018c08-bd14-426a-9d52-46500a17091e=",
        server_trans_id: "eadd3a60-b870-41d0-977f-921b3dbe6323/MkGJDl2Y5E=",
        authentication_value: Some(AUTHENTICATION_VALUE),
    },
    QueryFixture {
        status: "U",
        reason: Some("22"),
        eci: "07",
        acs_trans_id: "155222d5-3933-475b-a153-db899eee38b2",
        ds_trans_id: "51e8bbbb-5316-4a6b-a301-726a46a02dc5",
        server_trans_id: "515ba5ef-100e-4040-8028-df915f9fcdab",
        authentication_value: None,
    },
    QueryFixture {
        status: "N",
        reason: Some("01"),
        eci: "07",
        acs_trans_id: "52afc3e7-84fd-4420-bdc4-236901fbf09f",
        ds_trans_id: "e11cb28d-470b-4a7b-96ca-86ad813fa16d",
        server_trans_id: "d27082af-6c3f-4664-95a2-319b07f1ba8b",
        authentication_value: None,
    },
    QueryFixture {
        status: "R",
        reason: Some("11"),
        eci: "07",
        acs_trans_id: "fb068cda-a161-4c8c-86e9-78433f3b69c0",
        ds_trans_id: "38148c14-9cc6-4e91-a78a-005d7b6f8d51",
        server_trans_id: "728ac7b6-136b-4a5f-a32a-04bab37b5796",
        authentication_value: None,
    },
    QueryFixture {
        status: "I",
        reason: None,
        eci: "07",
        acs_trans_id: "5c5814d5-8cdd-44b2-bd1c-3f50b7e8e699",
        ds_trans_id: "dee10bd1-7139-46c4-a5ec-40948af1c591",
        server_trans_id: "d98a3261-7da3-4b1a-98cc-e14a07edfdc6",
        authentication_value: Some(AUTHENTICATION_VALUE),
    },
    QueryFixture {
        status: "A",
        reason: None,
        eci: "06",
        acs_trans_id: "42e4727a-77ac-44a3-8b8c-c58b48e48cc8",
        ds_trans_id: "a59c5a5d-f041-4c23-ad22-eca4ee9060b6",
        server_trans_id: "b5723933-f822-43af-b82f-b48b4983da81",
        authentication_value: Some(AUTHENTICATION_VALUE),
    },
];

impl QueryFixture {
    fn to_wire(&self, version: ProtocolVersion) -> Value {
        let mut body = match version {
            ProtocolVersion::V1 => json!({
                "authentication_status": self.status,
                "eci": self.eci,
                "xid": self.ds_trans_id,
                "validated_signature": true,
            }),
            ProtocolVersion::V2 => json!({
                "transStatus": self.status,
                "eci": self.eci,
                "acsTransID": self.acs_trans_id,
                "dsTransID": self.ds_trans_id,
                "threeDSServerTransID": self.server_trans_id,
            }),
        };
        let (reason_key, value_key) = match version {
            ProtocolVersion::V1 => ("status_reason", "cavv"),
            ProtocolVersion::V2 => ("transStatusReason", "authenticationValue"),
        };
        if let Some(fields) = body.as_object_mut() {
            if let Some(reason) = self.reason {
                fields.insert(reason_key.to_owned(), json!(reason));
            }
            if let Some(value) = self.authentication_value {
                fields.insert(value_key.to_owned(), json!(value));
            }
        }
        body
    }
}

/// Fixture-driven [`Transport`] speaking one protocol version.
///
/// Dispatch depends only on the URL path and method:
///
/// | path        | method  | answer                                      |
/// |-------------|---------|---------------------------------------------|
/// | lookup      | `POST`  | account-number table                        |
/// | lookup      | other   | [`TransportError::MethodMismatch`]          |
/// | other       | `PATCH` | settlement record echoing the id            |
/// | other       | `GET`   | query table (ids `1..=6`)                   |
/// | other       | other   | [`TransportError::MethodMismatch`]          |
///
/// Unknown accounts and ids yield an empty object.
#[derive(Debug)]
pub struct MockTransport {
    version: ProtocolVersion,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    /// Creates a mock speaking `version`.
    #[must_use]
    pub const fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Version whose wire names the fixtures use.
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Computes the fixture answer for `request` without recording it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MethodMismatch`] when the method does not
    /// fit the endpoint.
    pub fn respond(&self, request: &TransportRequest) -> Result<Value, TransportError> {
        let path = request.url.path();
        let lookup = EndpointSet::for_version(self.version).lookup();

        if path.contains(lookup) {
            if request.method != Method::POST {
                return Err(mismatch(request));
            }
            let body = request.body.as_ref().unwrap_or(&Value::Null);
            return Ok(self.lookup(body));
        }

        let id = path.rsplit('/').next().unwrap_or_default();
        match request.method {
            Method::PATCH => Ok(settlement_record(id)),
            Method::GET => Ok(self.query(id)),
            _ => Err(mismatch(request)),
        }
    }

    fn lookup(&self, body: &Value) -> Value {
        let (account_key, redirect_key, expiry_key) = match self.version {
            ProtocolVersion::V1 => ("pan", "redirect_uri", "expiration_month"),
            ProtocolVersion::V2 => ("acctNumber", "redirectURI", "cardExpiryDate"),
        };
        let text = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default();

        match text(account_key) {
            ENROLLED_ACCOUNT => {
                let expiry = text(expiry_key);
                let id = expiry
                    .char_indices()
                    .rev()
                    .nth(1)
                    .map_or(expiry, |(at, _)| &expiry[at..]);
                match self.version {
                    ProtocolVersion::V1 => json!({
                        "session_token": SESSION_TOKEN,
                        "redirect_url": text(redirect_key),
                        "id": id,
                    }),
                    ProtocolVersion::V2 => json!({
                        "sessionToken": SESSION_TOKEN,
                        "redirectURL": text(redirect_key),
                        "transactionID": id,
                    }),
                }
            }
            UNSUBSCRIBED_ACCOUNT => json!({
                "error_number": 1004,
                "error_description": "There is no subscription associated",
            }),
            UNVALIDATED_ACCOUNT => json!({
                "error_number": 1011,
                "error_description": INVALID_ARGUMENTS,
                "errors": { account_key: ["The card number doesn't pass validation"] },
            }),
            INVALID_ACCOUNT => json!({
                "error_number": 1011,
                "error_description": INVALID_ARGUMENTS,
                "errors": { account_key: ["The card number is invalid"] },
            }),
            _ => json!({}),
        }
    }

    fn query(&self, id: &str) -> Value {
        id.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| QUERY_TABLE.get(index))
            .map_or_else(|| json!({}), |fixture| fixture.to_wire(self.version))
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<Value, TransportError>> {
        let response = self.respond(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        Box::pin(future::ready(response))
    }
}

fn mismatch(request: &TransportRequest) -> TransportError {
    TransportError::MethodMismatch {
        method: request.method.clone(),
        url: request.url.to_string(),
    }
}

fn settlement_record(id: &str) -> Value {
    json!({
        "id": id,
        "reference": "Test reference",
        "created_at": "2019-08-28 14:34:23",
        "merchant": {
            "id": 1,
            "name": "EGM Ingenería sin Fronteras",
            "brand": "PlacetoPay",
        },
        "truncated_pan": "401200******1112",
        "amount": "75000.00",
        "amount_formatted": "$750.00",
        "protocol": "1.0.2",
        "currency": {
            "currency": "US Dollar",
            "alphabetic_code": "USD",
            "numeric_code": "840",
            "minor_unit": 2,
        },
        "payment": {
            "processor": "processorTest",
            "authorization": "autorizationCode",
            "provider": "Interdin",
            "base24": "xid",
            "iso": null,
        },
        "verification_response": { "status": "Y", "text": "Card enrolled" },
        "authentication_response": { "status": "Y", "text": "Full Authentication" },
        "eci_response": { "status": "success", "code": "05", "text": "Eci => 05" },
        "validated_signature": true,
        "franchise": { "brand": "visa" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use url::Url;

    fn call(method: Method, url: &str, body: Option<Value>) -> TransportRequest {
        TransportRequest {
            url: Url::parse(url).unwrap(),
            method,
            body,
            headers: HeaderMap::new(),
        }
    }

    #[tokio::test]
    async fn test_v2_enrolled_account() {
        let mock = MockTransport::new(ProtocolVersion::V2);
        let body = mock
            .execute(call(
                Method::POST,
                "https://mpi.test/api/threeds/v2/sessions",
                Some(json!({
                    "acctNumber": ENROLLED_ACCOUNT,
                    "cardExpiryDate": "2512",
                    "redirectURI": "https://shop.test/return",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(
            body,
            json!({
                "sessionToken": 60,
                "redirectURL": "https://shop.test/return",
                "transactionID": "12",
            })
        );
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_v1_field_errors_use_v1_names() {
        let mock = MockTransport::new(ProtocolVersion::V1);
        let body = mock
            .execute(call(
                Method::POST,
                "https://mpi.test/api/lookup",
                Some(json!({ "pan": UNVALIDATED_ACCOUNT })),
            ))
            .await
            .unwrap();
        assert_eq!(body["error_number"], 1011);
        assert_eq!(body["errors"]["pan"][0], "The card number doesn't pass validation");
    }

    #[tokio::test]
    async fn test_unknown_account_is_empty() {
        let mock = MockTransport::new(ProtocolVersion::V2);
        let body = mock
            .execute(call(
                Method::POST,
                "https://mpi.test/api/threeds/v2/sessions",
                Some(json!({ "acctNumber": "4111111111111111" })),
            ))
            .await
            .unwrap();
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_lookup_requires_post() {
        let mock = MockTransport::new(ProtocolVersion::V1);
        let err = mock
            .execute(call(Method::GET, "https://mpi.test/api/lookup", None))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incorrect HTTP Method GET ON https://mpi.test/api/lookup"
        );
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_query_table_by_version() {
        let v1 = MockTransport::new(ProtocolVersion::V1);
        let v2 = MockTransport::new(ProtocolVersion::V2);
        for (id, status) in ["Y", "U", "N", "R", "I", "A"].iter().enumerate() {
            let id = id + 1;
            let first = v1
                .respond(&call(Method::GET, &format!("https://mpi.test/api/transactions/{id}"), None))
                .unwrap();
            let second = v2
                .respond(&call(
                    Method::GET,
                    &format!("https://mpi.test/api/threeds/v2/transactions/{id}"),
                    None,
                ))
                .unwrap();
            assert_eq!(first["authentication_status"], *status);
            assert_eq!(second["transStatus"], *status);
        }
    }

    #[test]
    fn test_query_unknown_id_is_empty() {
        let mock = MockTransport::new(ProtocolVersion::V2);
        for id in ["0", "7", "abc"] {
            let body = mock
                .respond(&call(
                    Method::GET,
                    &format!("https://mpi.test/api/threeds/v2/transactions/{id}"),
                    None,
                ))
                .unwrap();
            assert_eq!(body, json!({}));
        }
    }

    #[test]
    fn test_update_echoes_id_and_rejects_put() {
        let mock = MockTransport::new(ProtocolVersion::V2);
        let record = mock
            .respond(&call(Method::PATCH, "https://mpi.test/api/transactions/42", None))
            .unwrap();
        assert_eq!(record["id"], "42");
        assert_eq!(record["reference"], "Test reference");

        let err = mock
            .respond(&call(Method::PUT, "https://mpi.test/api/transactions/42", None))
            .unwrap_err();
        assert!(matches!(err, TransportError::MethodMismatch { .. }));
    }
}
