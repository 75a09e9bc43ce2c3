//! Dialect selector.
//!
//! [`DialectRegistry`] maps version tags to dialect factories. It is the
//! only place that knows which versions exist; the facade asks it for a
//! dialect once, at construction time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Dialect, V1Dialect, V2Dialect};
use crate::error::ConfigurationError;
use crate::version::ProtocolVersion;

/// Creates a dialect instance.
pub type DialectFactory = fn() -> Arc<dyn Dialect>;

fn v1_factory() -> Arc<dyn Dialect> {
    Arc::new(V1Dialect)
}

fn v2_factory() -> Arc<dyn Dialect> {
    Arc::new(V2Dialect)
}

/// Registry of dialect factories keyed by version tag.
#[derive(Clone)]
pub struct DialectRegistry(BTreeMap<String, DialectFactory>);

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DialectRegistry")
            .field(&self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for DialectRegistry {
    /// A registry with the built-in `v1` and `v2` dialects.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(ProtocolVersion::V1.as_str(), v1_factory)
            .register(ProtocolVersion::V2.as_str(), v2_factory);
        registry
    }
}

impl DialectRegistry {
    /// Creates a registry with no dialects.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Registers (or replaces) the factory for a version tag.
    pub fn register(&mut self, tag: impl Into<String>, factory: DialectFactory) -> &mut Self {
        self.0.insert(tag.into(), factory);
        self
    }

    /// Returns the dialect registered for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedVersion`] naming the tag
    /// when nothing is registered for it.
    pub fn select(&self, tag: &str) -> Result<Arc<dyn Dialect>, ConfigurationError> {
        self.0
            .get(tag)
            .map(|factory| factory())
            .ok_or_else(|| ConfigurationError::UnsupportedVersion(tag.to_owned()))
    }

    /// Registered tags, in order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Selects a built-in dialect by tag.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnsupportedVersion`] for any tag other than
/// `"v1"` or `"v2"`.
pub fn select(tag: &str) -> Result<Arc<dyn Dialect>, ConfigurationError> {
    DialectRegistry::default().select(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointSet;
    use crate::model::TransactionId;

    #[test]
    fn test_select_builtin_versions() {
        for version in ProtocolVersion::ALL {
            let dialect = select(version.as_str()).unwrap();
            let expected = EndpointSet::for_version(version);
            let id = TransactionId::from("7");
            assert_eq!(dialect.version(), version);
            assert_eq!(dialect.lookup_endpoint(), expected.lookup());
            assert_eq!(dialect.query_endpoint(&id), expected.query(&id));
        }
    }

    #[test]
    fn test_select_unknown_names_tag() {
        let err = select("v3").unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedVersion(ref tag) if tag == "v3"));
        assert!(err.to_string().contains("v3"));
    }

    #[test]
    fn test_register_additional_tag() {
        let mut registry = DialectRegistry::default();
        registry.register("threeds", v2_factory);
        assert_eq!(registry.versions().collect::<Vec<_>>(), ["threeds", "v1", "v2"]);
        let dialect = registry.select("threeds").unwrap();
        assert_eq!(dialect.version(), ProtocolVersion::V2);
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        assert!(DialectRegistry::empty().select("v1").is_err());
    }
}
