//! `reqwest`-backed network transport.
//!
//! JSON bodies are returned whatever the status code, so that a service
//! error declared on a 4xx response reaches the dialect. Only bodies that
//! are not JSON turn into transport errors.

use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use serde_json::Value;

use super::{BoxFuture, Transport, TransportRequest};
use crate::error::TransportError;

/// Network transport built on a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport with a fresh client and no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a pre-configured client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Applies a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let url = request.url.to_string();
        let method = request.method.clone();

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| request_error(e, &url))?;

        let status = response.status();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            return Err(TransportError::MethodMismatch { method, url });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(e, &url))?;

        decode_body(&url, status, &bytes)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: TransportRequest) -> BoxFuture<'_, Result<Value, TransportError>> {
        Box::pin(async move {
            #[cfg(feature = "telemetry")]
            let (method, url) = (request.method.clone(), request.url.to_string());

            let result = self.send(request).await;

            #[cfg(feature = "telemetry")]
            match &result {
                Ok(_) => tracing::debug!(%method, %url, "MPI request completed"),
                Err(err) => tracing::warn!(%method, %url, error = %err, "MPI request failed"),
            }

            result
        })
    }
}

fn request_error(error: reqwest::Error, url: &str) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
        }
    } else {
        TransportError::Network {
            url: url.to_owned(),
            source: Box::new(error),
        }
    }
}

fn decode_body(url: &str, status: StatusCode, bytes: &[u8]) -> Result<Value, TransportError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(body) => Ok(body),
        Err(e) if status.is_success() => Err(TransportError::Decode {
            url: url.to_owned(),
            reason: e.to_string(),
        }),
        Err(_) => Err(TransportError::Status {
            url: url.to_owned(),
            status,
            body: String::from_utf8_lossy(bytes).into_owned(),
        }),
    }
}
