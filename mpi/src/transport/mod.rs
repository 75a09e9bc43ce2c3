//! Transport abstraction.
//!
//! A [`Transport`] executes one HTTP-like call and returns the decoded JSON
//! body. The facade never retries; whatever the transport returns or fails
//! with is surfaced to the caller.
//!
//! Two implementations ship with this crate:
//!
//! - [`HttpTransport`]: `reqwest`-backed network transport (feature: `http`)
//! - [`MockTransport`]: deterministic fixture tables for contract tests

pub mod mock;
#[cfg(feature = "http")]
mod network;

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{HeaderMap, Method};
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

pub use mock::MockTransport;
#[cfg(feature = "http")]
pub use network::HttpTransport;

/// A boxed, `Send` future, used to keep [`Transport`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single call to execute.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Absolute endpoint URL.
    pub url: Url,
    /// HTTP method.
    pub method: Method,
    /// JSON body, if the method carries one.
    pub body: Option<Value>,
    /// Headers snapshot taken when the call was issued.
    pub headers: HeaderMap,
}

impl TransportRequest {
    /// Returns a header value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Executes calls against the remote service.
pub trait Transport: Send + Sync + Debug {
    /// Executes `request` and returns the response body.
    ///
    /// Bodies that declare a service error are returned as `Ok`; they are
    /// classified by the dialect, not by the transport.
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<Value, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<Value, TransportError>> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<Value, TransportError>> {
        (**self).execute(request)
    }
}
