//! Endpoint path templates per protocol version.
//!
//! Lookup paths are fixed; query and update paths take a transaction
//! identifier appended verbatim. The update path is shared by every version.

use std::fmt;

use http::Method;
use mpi_proto::{v1, v2};

use crate::model::TransactionId;
use crate::version::ProtocolVersion;

/// Update endpoint prefix, identical for every protocol version.
pub const UPDATE_PATH: &str = "/api/transactions/";

/// The three operations exposed by the service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Start an authentication attempt.
    Lookup,
    /// Poll the status of an authentication attempt.
    Query,
    /// Attach settlement metadata to a transaction.
    Update,
}

impl Operation {
    /// The HTTP method the operation is issued with.
    #[must_use]
    pub const fn method(&self) -> Method {
        match self {
            Self::Lookup => Method::POST,
            Self::Query => Method::GET,
            Self::Update => Method::PATCH,
        }
    }

    /// Lower-case operation name, used in logs and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::Query => "query",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path templates for one protocol version.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    lookup: &'static str,
    query: &'static str,
    update: &'static str,
}

impl EndpointSet {
    /// V1 endpoints.
    pub const V1: Self = Self::new(v1::LOOKUP_PATH, v1::QUERY_PATH);

    /// V2 endpoints.
    pub const V2: Self = Self::new(v2::LOOKUP_PATH, v2::QUERY_PATH);

    /// Creates an endpoint set with the shared update path.
    #[must_use]
    pub const fn new(lookup: &'static str, query: &'static str) -> Self {
        Self {
            lookup,
            query,
            update: UPDATE_PATH,
        }
    }

    /// Returns the endpoints of a built-in version.
    #[must_use]
    pub const fn for_version(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V1 => Self::V1,
            ProtocolVersion::V2 => Self::V2,
        }
    }

    /// Returns the raw template for an operation. Query and update templates
    /// end where the identifier is appended.
    #[must_use]
    pub const fn template(&self, operation: Operation) -> &'static str {
        match operation {
            Operation::Lookup => self.lookup,
            Operation::Query => self.query,
            Operation::Update => self.update,
        }
    }

    /// Lookup path.
    #[must_use]
    pub const fn lookup(&self) -> &'static str {
        self.lookup
    }

    /// Query path for a transaction.
    #[must_use]
    pub fn query(&self, id: &TransactionId) -> String {
        format!("{}{id}", self.query)
    }

    /// Update path for a transaction.
    #[must_use]
    pub fn update(&self, id: &TransactionId) -> String {
        format!("{}{id}", self.update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_templates() {
        let id = TransactionId::from(1_u64);
        assert_eq!(EndpointSet::V1.lookup(), "/api/lookup");
        assert_eq!(EndpointSet::V1.query(&id), "/api/transactions/1");
        assert_eq!(EndpointSet::V1.update(&id), "/api/transactions/1");
    }

    #[test]
    fn test_v2_templates() {
        let id = TransactionId::from("abc");
        assert_eq!(EndpointSet::V2.lookup(), "/api/threeds/v2/sessions");
        assert_eq!(EndpointSet::V2.query(&id), "/api/threeds/v2/transactions/abc");
        assert_eq!(EndpointSet::V2.update(&id), "/api/transactions/abc");
    }

    #[test]
    fn test_update_path_is_version_independent() {
        for version in ProtocolVersion::ALL {
            assert_eq!(
                EndpointSet::for_version(version).template(Operation::Update),
                UPDATE_PATH
            );
        }
    }

    #[test]
    fn test_operation_methods() {
        assert_eq!(Operation::Lookup.method(), Method::POST);
        assert_eq!(Operation::Query.method(), Method::GET);
        assert_eq!(Operation::Update.method(), Method::PATCH);
    }
}
