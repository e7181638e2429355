//! Object-storage key of a rendered artifact.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image location must not be empty or whitespace")]
pub struct InvalidImageLocation;

/// Opaque, non-blank storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageLocation(String);

impl ImageLocation {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidImageLocation> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(InvalidImageLocation);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ImageLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ImageLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
