//! Error types for the MPI client.
//!
//! Declared service errors are not errors at this level: they are returned
//! as [`Outcome::ServiceError`](crate::outcome::Outcome::ServiceError). The
//! types here cover configuration mistakes, transport failures, method
//! mismatches and responses that cannot be classified.

use http::{Method, StatusCode};

use crate::endpoint::Operation;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building an [`MpiService`](crate::service::MpiService).
///
/// These are fatal and never retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// No base URL was provided.
    #[error("URL is required in order to instantiate the service")]
    MissingUrl,
    /// The base URL is not a valid absolute URL with a host.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// No dialect is registered for the version tag.
    #[error("unsupported protocol version {0:?}")]
    UnsupportedVersion(String),
    /// No transport was injected and the `http` feature is disabled.
    #[error("no transport configured")]
    MissingTransport,
    /// A header configured at build time is not a valid HTTP header.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// Header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The endpoint does not accept the method used.
    #[error("Incorrect HTTP Method {method} ON {url}")]
    MethodMismatch {
        /// Method that was used.
        method: Method,
        /// Full request URL.
        url: String,
    },
    /// The request did not complete in time.
    #[error("request to {url} timed out")]
    Timeout {
        /// Full request URL.
        url: String,
    },
    /// Connection-level failure.
    #[error("request to {url} failed: {source}")]
    Network {
        /// Full request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: BoxError,
    },
    /// Non-success status with a body that is not JSON.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    Status {
        /// Full request URL.
        url: String,
        /// Response status.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },
    /// Success status with a body that is not JSON.
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// Full request URL.
        url: String,
        /// Decoder message.
        reason: String,
    },
}

/// Errors returned by the facade operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MpiError {
    /// The service could not be configured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The transport call failed. Not retried.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    /// The endpoint rejected the HTTP method.
    #[error("Incorrect HTTP Method {method} ON {url}")]
    MethodMismatch {
        /// Method that was used.
        method: Method,
        /// Full request URL.
        url: String,
    },
    /// The body matches neither the success nor the declared-error shape.
    #[error("malformed {operation} response: {reason}")]
    MalformedResponse {
        /// Operation whose response failed to parse.
        operation: Operation,
        /// What was wrong with it.
        reason: String,
    },
    /// A header name or value cannot be sent.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The request body could not be encoded.
    #[error("failed to encode {operation} request: {source}")]
    Encode {
        /// Operation being encoded.
        operation: Operation,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// An endpoint URL could not be built from the base URL and path.
    #[error("invalid endpoint URL {url:?}: {source}")]
    InvalidEndpoint {
        /// The URL that failed to parse.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

impl MpiError {
    /// Shorthand for [`MpiError::MalformedResponse`].
    pub fn malformed(operation: Operation, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }
}

impl From<TransportError> for MpiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::MethodMismatch { method, url } => Self::MethodMismatch { method, url },
            other => Self::Transport(other),
        }
    }
}
