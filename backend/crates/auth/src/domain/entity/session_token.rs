//! Session Token Entity
//!
//! One persisted row per logical session, holding the single refresh token
//! currently valid for it. Rotation replaces the token in place.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_object::{account_id::AccountId, session_token_id::SessionTokenId};

#[derive(Clone)]
pub struct SessionToken {
    pub id: SessionTokenId,
    pub account_id: AccountId,
    /// Current refresh token; unique across all rows
    pub token: String,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn from_new(data: NewSessionToken, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionTokenId::new(),
            account_id: data.account_id,
            token: data.token,
            last_activity_at: data.last_activity_at,
            expires_at: data.expires_at,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn apply(&mut self, changes: SessionTokenChanges) {
        if let Some(token) = changes.token {
            self.token = token;
        }
        if let Some(last_activity_at) = changes.last_activity_at {
            self.last_activity_at = last_activity_at;
        }
        if let Some(expires_at) = changes.expires_at {
            self.expires_at = expires_at;
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("id", &self.id)
            .field("account_id", &self.account_id)
            .field("token", &"[REDACTED]")
            .field("last_activity_at", &self.last_activity_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub struct NewSessionToken {
    pub account_id: AccountId,
    pub token: String,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTokenChanges {
    pub token: Option<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}
