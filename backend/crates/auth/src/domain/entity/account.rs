//! Account Entity
//!
//! A platform account together with its credential and the state of its
//! one-shot verification / reset tokens.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use serde::Serialize;

use crate::domain::value_object::{account_id::AccountId, account_role::AccountRole, email::Email};

/// Account entity
///
/// Holds the password hash; never hand this type to callers outside the
/// crate boundary, use [`AccountView`] instead.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    /// Unique, canonical form
    pub email: Email,
    /// Unique
    pub username: String,
    pub password_hash: HashedPassword,
    pub role: AccountRole,
    /// Flipped to true exactly once, by consuming the verification token
    pub is_verified: bool,
    /// Profile completeness; has no effect on authentication
    pub is_active: bool,
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Materialize a new account from creation data
    pub fn from_new(data: NewAccount, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            email: data.email,
            username: data.username,
            password_hash: data.password_hash,
            role: data.role,
            is_verified: false,
            is_active: false,
            verification_token: data.verification_token,
            verification_expires_at: data.verification_expires_at,
            reset_token: None,
            reset_expires_at: None,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A token whose expiry is missing or strictly before `now` is expired.
    pub fn verification_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.verification_expires_at, now)
    }

    pub fn reset_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.reset_expires_at, now)
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, changes: AccountChanges, now: DateTime<Utc>) {
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if changes.clear_reset_token {
            self.reset_token = None;
            self.reset_expires_at = None;
        }
        self.updated_at = now;
    }

    /// Minimal projection used on the request path
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            is_verified: self.is_verified,
        }
    }

    /// Outward-facing view without any secret
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            is_verified: self.is_verified,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(expires_at) => expires_at < now,
        None => true,
    }
}

/// Data needed to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub username: String,
    pub password_hash: HashedPassword,
    pub role: AccountRole,
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
}

/// Partial account update.
///
/// `clear_reset_token` is applied in the same write as `password_hash`, so
/// a reset token can never outlive the password change it authorized.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub password_hash: Option<HashedPassword>,
    pub role: Option<AccountRole>,
    pub is_active: Option<bool>,
    pub clear_reset_token: bool,
}

/// Projection loaded by the request gate (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: Email,
    pub username: String,
    pub role: AccountRole,
    pub is_verified: bool,
}

/// Account as returned by register/login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub email: Email,
    pub username: String,
    pub role: AccountRole,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
