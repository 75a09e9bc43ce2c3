//! The version-agnostic facade.
//!
//! [`MpiService`] owns the base URL, the credentials, the default headers,
//! a [`Transport`] and the [`Dialect`] picked at construction. Every
//! operation performs exactly one transport call; nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use mpi_proto::{ACCEPT_MEDIA_TYPE, CONTENT_MEDIA_TYPE};
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::dialect::{self, Dialect, DialectRegistry};
use crate::endpoint::Operation;
use crate::error::{ConfigurationError, MpiError};
use crate::model::{LookupRequest, QueryOptions, TransactionId, UpdateTransactionRequest};
use crate::outcome::{LookupResult, Outcome, QueryResult, UpdateResult};
use crate::transport::{Transport, TransportRequest};
use crate::version::ProtocolVersion;

/// Client for an MPI service speaking one protocol version.
///
/// Built with [`MpiService::builder`]. Header mutation takes `&mut self`;
/// in-flight calls keep the header snapshot taken when they were issued.
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use mpi::{Card, LookupRequest, MpiService};
/// use rust_decimal::Decimal;
///
/// let service = MpiService::builder()
///     .url("https://mpi.example.com")
///     .api_key("secret")
///     .version("v2")
///     .build()?;
///
/// let request = LookupRequest::new(
///     Card::new("4532840681197602", 12, 2030),
///     Decimal::new(12500, 2),
///     "USD",
///     "https://shop.example.com/return",
/// );
/// let outcome = service.lookup(&request).await?;
/// # let _ = outcome;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MpiService {
    base_url: Url,
    api_key: Option<String>,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    dialect: Arc<dyn Dialect>,
}

impl fmt::Debug for MpiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpiService")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .field("transport", &self.transport)
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl MpiService {
    /// Starts building a service.
    #[must_use]
    pub fn builder() -> MpiServiceBuilder {
        MpiServiceBuilder::default()
    }

    /// Protocol version of the selected dialect.
    #[must_use]
    pub fn version(&self) -> ProtocolVersion {
        self.dialect.version()
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers sent with every call, without credentials.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The selected dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Replaces the API key used for the `Authorization` header.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Adds (or replaces) a header sent with every subsequent call.
    ///
    /// # Errors
    ///
    /// Returns [`MpiError::InvalidHeader`] if the name or value is not a
    /// valid HTTP header.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<&mut Self, MpiError> {
        let (name, value) = parse_header(name, value).map_err(|reason| MpiError::InvalidHeader {
            name: name.to_owned(),
            reason,
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Starts an authentication session.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, method mismatches and responses that are
    /// neither a session nor a declared service error.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "mpi.lookup", skip_all, fields(version = %self.version()))
    )]
    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, MpiError> {
        let result = async {
            let body = self.dialect.serialize_lookup(request)?;
            let response = self
                .call(
                    Operation::Lookup,
                    self.dialect.lookup_endpoint(),
                    Some(body),
                    request.user_agent.as_deref(),
                )
                .await?;
            self.dialect.parse_lookup_response(response)
        }
        .await;

        record_outcome(&result);
        result
    }

    /// Reads the authentication status of a transaction.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, method mismatches and responses that are
    /// neither a status nor a declared service error.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "mpi.query", skip_all, fields(version = %self.version(), transaction_id))
    )]
    pub async fn query(
        &self,
        id: impl Into<TransactionId>,
        options: &QueryOptions,
    ) -> Result<QueryResult, MpiError> {
        let id = id.into();
        #[cfg(feature = "telemetry")]
        tracing::Span::current().record("transaction_id", id.as_str());

        let result = async {
            let path = self.dialect.query_endpoint(&id);
            let response = self
                .call(Operation::Query, &path, None, options.user_agent.as_deref())
                .await?;
            self.dialect.parse_query_response(response, &id)
        }
        .await;

        record_outcome(&result);
        result
    }

    /// Attaches settlement metadata to a transaction.
    ///
    /// The update endpoint is the same for every protocol version.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, method mismatches and responses that are
    /// not an object.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "mpi.update", skip_all, fields(transaction_id))
    )]
    pub async fn update(
        &self,
        id: impl Into<TransactionId>,
        request: &UpdateTransactionRequest,
    ) -> Result<UpdateResult, MpiError> {
        let id = id.into();
        #[cfg(feature = "telemetry")]
        tracing::Span::current().record("transaction_id", id.as_str());

        let result = async {
            let body = dialect::encode(Operation::Update, &request.payload())?;
            let path = self.dialect.update_endpoint(&id);
            let response = self.call(Operation::Update, &path, Some(body), None).await?;
            dialect::parse_update_response(response, &id)
        }
        .await;

        record_outcome(&result);
        result
    }

    async fn call(
        &self,
        operation: Operation,
        path: &str,
        body: Option<Value>,
        user_agent: Option<&str>,
    ) -> Result<Value, MpiError> {
        let request = TransportRequest {
            url: self.endpoint(path)?,
            method: operation.method(),
            body,
            headers: self.request_headers(user_agent)?,
        };
        Ok(self.transport.execute(request).await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, MpiError> {
        let url = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&url).map_err(|source| MpiError::InvalidEndpoint { url, source })
    }

    /// Snapshot of the headers for one call.
    fn request_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, MpiError> {
        let mut headers = self.headers.clone();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                MpiError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(agent) = user_agent {
            let value = HeaderValue::from_str(agent).map_err(|e| MpiError::InvalidHeader {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(USER_AGENT, value);
        }
        Ok(headers)
    }
}

/// Builder for [`MpiService`].
#[derive(Debug, Default)]
pub struct MpiServiceBuilder {
    url: Option<String>,
    api_key: Option<String>,
    version: Option<String>,
    registry: Option<DialectRegistry>,
    dialect: Option<Arc<dyn Dialect>>,
    transport: Option<Arc<dyn Transport>>,
    headers: Vec<(String, String)>,
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    timeout: Option<Duration>,
}

impl MpiServiceBuilder {
    /// Base URL of the service. Required.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// API key sent as a bearer token.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Protocol version tag (`"v1"` or `"v2"`). Defaults to `"v1"`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Registry the version tag is resolved against.
    #[must_use]
    pub fn registry(mut self, registry: DialectRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses `dialect` directly, ignoring the version tag.
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Some(Arc::new(dialect));
        self
    }

    /// Transport to execute calls with.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Extra header sent with every call.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Timeout for the default network transport.
    ///
    /// Ignored when a transport is injected.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the configuration and builds the service.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for a missing or invalid URL, an
    /// unsupported version, an invalid header, or a missing transport.
    pub fn build(self) -> Result<MpiService, ConfigurationError> {
        let base_url = parse_base_url(self.url.as_deref())?;

        let dialect = match self.dialect {
            Some(dialect) => dialect,
            None => {
                let tag = self
                    .version
                    .as_deref()
                    .unwrap_or_else(|| ProtocolVersion::default().as_str());
                self.registry.unwrap_or_default().select(tag)?
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_MEDIA_TYPE));
        for (name, value) in &self.headers {
            let (key, value) =
                parse_header(name, value).map_err(|reason| ConfigurationError::InvalidHeader {
                    name: name.clone(),
                    reason,
                })?;
            headers.insert(key, value);
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            #[cfg(feature = "http")]
            None => {
                let mut transport = crate::transport::HttpTransport::new();
                if let Some(timeout) = self.timeout {
                    transport = transport.with_timeout(timeout);
                }
                Arc::new(transport)
            }
            #[cfg(not(feature = "http"))]
            None => return Err(ConfigurationError::MissingTransport),
        };

        Ok(MpiService {
            base_url,
            api_key: self.api_key,
            headers,
            transport,
            dialect,
        })
    }
}

fn parse_base_url(url: Option<&str>) -> Result<Url, ConfigurationError> {
    let raw = url.map(str::trim).filter(|u| !u.is_empty());
    let Some(raw) = raw else {
        return Err(ConfigurationError::MissingUrl);
    };
    let invalid = |reason: String| ConfigurationError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };
    let parsed = Url::parse(raw.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host".to_owned()));
    }
    Ok(parsed)
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let key = HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
    let value = HeaderValue::from_str(value).map_err(|e| e.to_string())?;
    Ok((key, value))
}

#[cfg(feature = "telemetry")]
fn record_outcome<T>(result: &Result<Outcome<T>, MpiError>) {
    match result {
        Ok(Outcome::Success(_)) => tracing::debug!("MPI call succeeded"),
        Ok(Outcome::ServiceError(error)) => tracing::info!(
            error_number = error.error_number,
            description = %error.description,
            "MPI service declared an error"
        ),
        Err(err) => tracing::error!(error = %err, "MPI call failed"),
    }
}

#[cfg(not(feature = "telemetry"))]
const fn record_outcome<T>(_result: &Result<Outcome<T>, MpiError>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Card;
    use crate::transport::MockTransport;
    use crate::transport::mock::ENROLLED_ACCOUNT;
    use rust_decimal::Decimal;

    fn service(version: ProtocolVersion, mock: &Arc<MockTransport>) -> MpiService {
        MpiService::builder()
            .url("https://mpi.test/")
            .api_key("secret")
            .version(version.as_str())
            .transport(Arc::clone(mock))
            .build()
            .unwrap()
    }

    fn lookup_request() -> LookupRequest {
        LookupRequest::new(
            Card::new(ENROLLED_ACCOUNT, 12, 2030),
            Decimal::new(12500, 2),
            "USD",
            "https://shop.test/return",
        )
    }

    #[test]
    fn test_missing_url() {
        let err = MpiService::builder()
            .transport(MockTransport::new(ProtocolVersion::V1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingUrl));
        assert_eq!(err.to_string(), "URL is required in order to instantiate the service");

        let blank = MpiService::builder()
            .url("  ")
            .transport(MockTransport::new(ProtocolVersion::V1))
            .build()
            .unwrap_err();
        assert!(matches!(blank, ConfigurationError::MissingUrl));
    }

    #[test]
    fn test_invalid_url() {
        for url in ["not a url", "mailto:ops@mpi.test", "/api"] {
            let err = MpiService::builder()
                .url(url)
                .transport(MockTransport::new(ProtocolVersion::V1))
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidUrl { .. }), "{url}");
        }
    }

    #[test]
    fn test_unsupported_version() {
        let err = MpiService::builder()
            .url("https://mpi.test")
            .version("v9")
            .transport(MockTransport::new(ProtocolVersion::V1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedVersion(ref tag) if tag == "v9"));
    }

    #[test]
    fn test_defaults_to_v1() {
        let service = MpiService::builder()
            .url("https://mpi.test")
            .transport(MockTransport::new(ProtocolVersion::V1))
            .build()
            .unwrap();
        assert_eq!(service.version(), ProtocolVersion::V1);
        assert_eq!(
            service.headers().get(ACCEPT).unwrap(),
            "application/vnd.api.v1+json"
        );
        assert_eq!(service.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(service.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_build_header() {
        let err = MpiService::builder()
            .url("https://mpi.test")
            .header("bad header", "x")
            .transport(MockTransport::new(ProtocolVersion::V1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn test_call_headers_snapshot() {
        let mock = Arc::new(MockTransport::new(ProtocolVersion::V2));
        let mut service = service(ProtocolVersion::V2, &mock);
        service.add_header("X-Merchant", "42").unwrap();

        service
            .query("1", &QueryOptions::with_user_agent("Mozilla/5.0"))
            .await
            .unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer secret"));
        assert_eq!(sent.header("x-merchant"), Some("42"));
        assert_eq!(sent.header("user-agent"), Some("Mozilla/5.0"));
        assert_eq!(sent.header("accept"), Some("application/vnd.api.v1+json"));
        assert!(sent.body.is_none());

        service.set_api_key("rotated");
        service.query("1", &QueryOptions::default()).await.unwrap();
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer rotated"));
        assert_eq!(sent.header("user-agent"), None);
        assert!(service.headers().get(USER_AGENT).is_none());
    }

    #[test]
    fn test_add_header_rejects_invalid_value() {
        let mock = Arc::new(MockTransport::new(ProtocolVersion::V1));
        let mut service = service(ProtocolVersion::V1, &mock);
        let err = service.add_header("X-Trace", "line\nbreak").unwrap_err();
        assert!(matches!(err, MpiError::InvalidHeader { ref name, .. } if name == "X-Trace"));
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let mock = Arc::new(MockTransport::new(ProtocolVersion::V1));
        let service = MpiService::builder()
            .url("https://gateway.test/mpi/")
            .transport(Arc::clone(&mock))
            .build()
            .unwrap();
        service.lookup(&lookup_request()).await.unwrap();
        assert_eq!(
            mock.last_request().unwrap().url.as_str(),
            "https://gateway.test/mpi/api/lookup"
        );
    }

    #[tokio::test]
    async fn test_lookup_uses_selected_dialect() {
        let mock = Arc::new(MockTransport::new(ProtocolVersion::V2));
        let service = service(ProtocolVersion::V2, &mock);
        let outcome = service.lookup(&lookup_request()).await.unwrap();

        let session = outcome.success().unwrap();
        assert_eq!(session.session_token, "60");
        assert_eq!(session.redirect_url, "https://shop.test/return");
        assert_eq!(session.transaction_id, "12");

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, http::Method::POST);
        assert_eq!(sent.url.path(), "/api/threeds/v2/sessions");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mock = Arc::new(MockTransport::new(ProtocolVersion::V1));
        let rendered = format!("{:?}", service(ProtocolVersion::V1, &mock));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
