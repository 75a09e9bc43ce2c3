//! Legacy 3-D Secure 1 dialect.

use mpi_proto::v1;
use serde_json::Value;

use super::{Dialect, classify, encode};
use crate::endpoint::{EndpointSet, Operation};
use crate::error::MpiError;
use crate::model::{AuthenticationStatus, LookupRequest, LookupSession, TransStatus, TransactionId};
use crate::outcome::{LookupResult, QueryResult};
use crate::version::ProtocolVersion;

/// Dialect for the `/api/lookup` family of endpoints.
///
/// Browser metadata has no V1 counterpart and is not sent.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct V1Dialect;

impl V1Dialect {
    /// Builds the V1 wire body for a canonical request.
    #[must_use]
    pub fn wire_request(request: &LookupRequest) -> v1::LookupRequest {
        v1::LookupRequest {
            pan: request.card.number.clone(),
            expiration_month: request.card.month_mm(),
            expiration_year: request.card.full_year().to_string(),
            amount: request.amount.to_string(),
            currency: request.currency.clone(),
            redirect_uri: request.redirect_uri.clone(),
            reference: request.reference.clone(),
            installments: request.installments,
        }
    }
}

impl Dialect for V1Dialect {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V1
    }

    fn endpoints(&self) -> EndpointSet {
        EndpointSet::V1
    }

    fn serialize_lookup(&self, request: &LookupRequest) -> Result<Value, MpiError> {
        encode(Operation::Lookup, &Self::wire_request(request))
    }

    fn parse_lookup_response(&self, body: Value) -> Result<LookupResult, MpiError> {
        Ok(
            classify::<v1::LookupResponse>(Operation::Lookup, body)?.map(|wire| LookupSession {
                session_token: wire.session_token,
                redirect_url: wire.redirect_url,
                transaction_id: wire.id,
            }),
        )
    }

    fn parse_query_response(
        &self,
        body: Value,
        id: &TransactionId,
    ) -> Result<QueryResult, MpiError> {
        Ok(
            classify::<v1::QueryResponse>(Operation::Query, body)?.map(|wire| {
                AuthenticationStatus {
                    transaction_id: id.clone(),
                    trans_status: TransStatus::new(wire.authentication_status),
                    trans_status_reason: wire.status_reason,
                    eci: wire.eci,
                    acs_trans_id: None,
                    ds_trans_id: None,
                    three_ds_server_trans_id: None,
                    authentication_value: wire.cavv,
                    xid: wire.xid,
                    validated_signature: wire.validated_signature,
                }
            }),
        )
    }
}
