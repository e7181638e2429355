//! Identity of a source file in the upstream file-storage service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Reasons a value cannot become a [`FileId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFileId {
    #[error("file id must not be the empty (nil) identifier")]
    Nil,
    #[error("file id is not a valid identifier: {0}")]
    Malformed(String),
}

/// 128-bit file identity. Never the nil UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Uuid);

impl FileId {
    /// Wrap a UUID, rejecting the nil value.
    pub fn new(value: Uuid) -> Result<Self, InvalidFileId> {
        if value.is_nil() {
            return Err(InvalidFileId::Nil);
        }
        Ok(Self(value))
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for FileId {
    type Err = InvalidFileId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidFileId::Nil);
        }
        let uuid =
            Uuid::parse_str(trimmed).map_err(|e| InvalidFileId::Malformed(format!("{s}: {e}")))?;
        Self::new(uuid)
    }
}

impl TryFrom<Uuid> for FileId {
    type Error = InvalidFileId;

    fn try_from(value: Uuid) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lowercase hyphenated form; also the storage and key format.
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for FileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_rejected() {
        assert_eq!(FileId::new(Uuid::nil()), Err(InvalidFileId::Nil));
        assert_eq!(
            "00000000-0000-0000-0000-000000000000".parse::<FileId>(),
            Err(InvalidFileId::Nil)
        );
        assert_eq!("".parse::<FileId>(), Err(InvalidFileId::Nil));
        assert_eq!("   ".parse::<FileId>(), Err(InvalidFileId::Nil));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(matches!(
            "not-a-uuid".parse::<FileId>(),
            Err(InvalidFileId::Malformed(_))
        ));
    }

    #[test]
    fn test_display_is_lowercase_hyphenated() {
        let id: FileId = "6F9619FF-8B86-D011-B42D-00C04FC964FF".parse().unwrap();
        assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    }

    #[test]
    fn test_equality_by_value() {
        let a: FileId = "6f9619ff-8b86-d011-b42d-00c04fc964ff".parse().unwrap();
        let b: FileId = "6F9619FF-8B86-D011-B42D-00C04FC964FF".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_as_string() {
        let id = FileId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<FileId>("\"00000000-0000-0000-0000-000000000000\"").is_err());
    }
}
