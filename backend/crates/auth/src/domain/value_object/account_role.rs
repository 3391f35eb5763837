use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role attached to an account and embedded in token claims.
///
/// Roles are compared for membership only; there is no hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    #[default]
    Player,
    Manager,
    Admin,
}

impl AccountRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use AccountRole::*;
        match self {
            Player => "player",
            Manager => "manager",
            Admin => "admin",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use AccountRole::*;
        match code {
            "player" => Some(Player),
            "manager" => Some(Manager),
            "admin" => Some(Admin),
            _ => None,
        }
    }

    /// Empty allow-list admits every role
    pub fn is_allowed(&self, allowed: &[AccountRole]) -> bool {
        allowed.is_empty() || allowed.contains(self)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for unknown role codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown account role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for AccountRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}
