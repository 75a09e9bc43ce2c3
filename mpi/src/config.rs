//! Declarative service configuration.
//!
//! [`MpiConfig`] is the serde shape loaded from configuration files. The
//! version tag and headers are validated when the service is built.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::service::{MpiService, MpiServiceBuilder};

/// Configuration of an [`MpiService`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpiConfig {
    /// Base URL of the service.
    pub url: Option<String>,
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Protocol version tag. Defaults to `v1`.
    pub version: Option<String>,
    /// Timeout, in seconds, for the network transport.
    pub timeout_secs: Option<u64>,
    /// Extra headers sent with every call.
    pub headers: BTreeMap<String, String>,
}

impl fmt::Debug for MpiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpiConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("version", &self.version)
            .field("timeout_secs", &self.timeout_secs)
            .field("headers", &self.headers)
            .finish()
    }
}

impl MpiConfig {
    /// Turns the configuration into a builder, so a transport or dialect
    /// can still be injected before building.
    #[must_use]
    pub fn into_builder(self) -> MpiServiceBuilder {
        let mut builder = MpiService::builder();
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        if let Some(api_key) = self.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(version) = self.version {
            builder = builder.version(version);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder
    }
}

impl MpiService {
    /// Builds a service from configuration with the default transport.
    ///
    /// # Errors
    ///
    /// See [`MpiServiceBuilder::build`].
    pub fn from_config(config: MpiConfig) -> Result<Self, ConfigurationError> {
        config.into_builder().build()
    }
}
