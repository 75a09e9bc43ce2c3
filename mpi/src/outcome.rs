//! Tagged results: success or a declared service error.
//!
//! A response body either parses fully into the success shape or resolves
//! into a [`ServiceError`]. Bodies matching neither are reported as
//! [`MpiError::MalformedResponse`](crate::error::MpiError::MalformedResponse)
//! and never reach this type.

use std::fmt;

use mpi_proto::{ErrorPayload, FieldErrors};
use serde::{Deserialize, Serialize};

use crate::model::{AuthenticationStatus, LookupSession, UpdatedTransaction};

/// Result of a lookup.
pub type LookupResult = Outcome<LookupSession>;

/// Result of a status query.
pub type QueryResult = Outcome<AuthenticationStatus>;

/// Result of a transaction update.
pub type UpdateResult = Outcome<UpdatedTransaction>;

/// Either the success shape of an operation or the error the service
/// declared in its response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The service accepted the request.
    Success(T),
    /// The service rejected the request with a declared error.
    ServiceError(ServiceError),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::ServiceError(_) => None,
        }
    }

    /// Returns the declared error, if any.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Success(_) => None,
            Self::ServiceError(error) => Some(error),
        }
    }

    /// Converts into a `Result`, treating the declared error as `Err`.
    ///
    /// # Errors
    ///
    /// Returns the [`ServiceError`] when the service rejected the request.
    pub fn into_result(self) -> Result<T, ServiceError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::ServiceError(error) => Err(error),
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::ServiceError(error) => Outcome::ServiceError(error),
        }
    }
}

/// A business-level failure declared by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Service error code (e.g., `1004`).
    pub error_number: i64,
    /// Human-readable description.
    pub description: String,
    /// Validation messages keyed by wire field name.
    pub errors: FieldErrors,
}

impl ServiceError {
    /// Messages reported against a field; empty when there are none.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }
}

impl From<ErrorPayload> for ServiceError {
    fn from(payload: ErrorPayload) -> Self {
        Self {
            error_number: payload.error_number,
            description: payload.error_description,
            errors: payload.errors,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error {}: {}", self.error_number, self.description)
    }
}

impl std::error::Error for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn declined() -> ServiceError {
        ServiceError {
            error_number: 1011,
            description: "Invalid arguments".into(),
            errors: FieldErrors::from([(
                "acctNumber".to_owned(),
                vec!["The card number is invalid".to_owned()],
            )]),
        }
    }

    #[test]
    fn test_outcome_accessors() {
        let ok: Outcome<u8> = Outcome::Success(1);
        assert!(ok.is_success());
        assert_eq!(ok.success(), Some(&1));
        assert!(ok.service_error().is_none());

        let err: Outcome<u8> = Outcome::ServiceError(declined());
        assert!(!err.is_success());
        assert_eq!(err.service_error().unwrap().error_number, 1011);
        assert_eq!(err.into_result().unwrap_err().error_number, 1011);
    }

    #[test]
    fn test_field_errors_lookup() {
        let error = declined();
        assert_eq!(error.field_errors("acctNumber").len(), 1);
        assert!(error.field_errors("cardExpiryDate").is_empty());
        assert_eq!(error.to_string(), "service error 1011: Invalid arguments");
    }
}
