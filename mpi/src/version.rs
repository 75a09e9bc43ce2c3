//! Protocol version tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigurationError;

/// An MPI protocol dialect version.
///
/// Serializes as its textual tag (`"v1"` or `"v2"`). Parsing any other tag
/// fails with [`ConfigurationError::UnsupportedVersion`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolVersion {
    /// Legacy 3-D Secure 1 dialect.
    #[default]
    V1,
    /// EMV 3-D Secure 2 dialect.
    V2,
}

impl ProtocolVersion {
    /// All versions this crate ships a dialect for.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Returns the textual tag (`"v1"` or `"v2"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(ConfigurationError::UnsupportedVersion(other.to_owned())),
        }
    }
}

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("v1".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V1);
        assert_eq!("v2".parse::<ProtocolVersion>().unwrap(), ProtocolVersion::V2);
    }

    #[test]
    fn test_parse_is_exact() {
        for tag in ["V1", "v3", "", " v2", "2"] {
            let err = tag.parse::<ProtocolVersion>().unwrap_err();
            assert!(matches!(err, ConfigurationError::UnsupportedVersion(ref t) if t == tag));
        }
    }

    #[test]
    fn test_default_is_v1() {
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::V1);
    }

    #[test]
    fn test_serde_uses_tag() {
        let json = serde_json::to_string(&ProtocolVersion::V2).unwrap();
        assert_eq!(json, "\"v2\"");
        let back: ProtocolVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProtocolVersion::V2);
        assert!(serde_json::from_str::<ProtocolVersion>("\"v9\"").is_err());
    }
}
