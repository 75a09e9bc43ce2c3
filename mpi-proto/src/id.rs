//! Opaque identifier type.
//!
//! Transaction identifiers and session tokens are never interpreted by the
//! client. The service sends them either as JSON strings or as integers, so
//! [`OpaqueId`] accepts both and canonicalizes the value to a string.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An identifier that is carried verbatim and compared as a string.
///
/// Serializes as a JSON string. Deserializes from a JSON string or integer;
/// `7` and `"7"` produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpaqueId(String);

impl OpaqueId {
    /// Creates an identifier from anything string-like.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns the canonical string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OpaqueId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OpaqueId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for OpaqueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for OpaqueId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<u64> for OpaqueId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for OpaqueId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for OpaqueId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for OpaqueId {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for OpaqueId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OpaqueId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for OpaqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct OpaqueIdVisitor;

impl Visitor<'_> for OpaqueIdVisitor {
    type Value = OpaqueId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(OpaqueId::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(OpaqueId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(OpaqueId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(OpaqueId::from(v))
    }
}

impl<'de> Deserialize<'de> for OpaqueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OpaqueIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_integer_and_string_are_equal() {
        let from_int: OpaqueId = serde_json::from_str("7").unwrap();
        let from_str: OpaqueId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(from_int, "7");
    }

    #[test]
    fn test_serialize_as_string() {
        let id = OpaqueId::from(60_u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"60\"");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<OpaqueId>("[1]").is_err());
        assert!(serde_json::from_str::<OpaqueId>("null").is_err());
        assert!(serde_json::from_str::<OpaqueId>("1.5").is_err());
    }
}
