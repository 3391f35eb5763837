//! One-shot Token
//!
//! Random UUID-v4 string used for email verification and password reset.
//! Only the textual shape is checked here; validity is decided by lookup.

use std::fmt;
use uuid::Uuid;

#[derive(Clone, PartialEq, Eq)]
pub struct OneShotToken(String);

impl OneShotToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept only UUID-shaped input, so garbage never reaches the store
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw.trim())
            .ok()
            .map(|uuid| Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OneShotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneShotToken").field(&"[REDACTED]").finish()
    }
}
