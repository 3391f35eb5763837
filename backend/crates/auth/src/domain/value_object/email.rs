//! Email Value Object
//!
//! Syntax validation belongs to the request layer; this type only fixes the
//! canonical form used for storage and uniqueness.

use serde::Serialize;
use std::fmt;

/// Email address in canonical (trimmed, lowercase) form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Trust a value read back from storage
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
