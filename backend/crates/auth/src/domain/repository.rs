//! Repository Traits
//!
//! Interfaces for data persistence and mail delivery. Implementations live
//! in the infrastructure layer.
//!
//! Every operation is atomic on its own; none of the use cases rely on a
//! transaction spanning several calls.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::entity::{
    account::{Account, AccountChanges, AccountProfile, NewAccount},
    session_token::{NewSessionToken, SessionToken, SessionTokenChanges},
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, session_token_id::SessionTokenId,
};
use crate::error::{AuthResult, MailError};

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>>;

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>>;

    /// Load only what the request gate needs
    async fn find_profile_by_id(&self, id: &AccountId) -> AuthResult<Option<AccountProfile>>;

    /// Create an account.
    ///
    /// Fails with `AccountAlreadyExists` when the email or username is taken,
    /// including when a concurrent insert wins the race.
    async fn create(&self, data: NewAccount) -> AuthResult<Account>;

    /// Apply a partial update; `AccountNotFound` if the row is gone
    async fn update(&self, id: &AccountId, changes: AccountChanges) -> AuthResult<Account>;

    async fn set_verified(&self, id: &AccountId, verified: bool) -> AuthResult<()>;

    async fn set_verification_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()>;

    async fn set_reset_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()>;

    async fn find_by_verification_token(&self, token: &str) -> AuthResult<Option<Account>>;

    async fn find_by_reset_token(&self, token: &str) -> AuthResult<Option<Account>>;

    /// Mark the account verified only if it is still unverified and holds
    /// `token`. The token stays on the row with no expiry.
    ///
    /// Returns `false` when another caller consumed it first.
    async fn consume_verification_token(&self, id: &AccountId, token: &str) -> AuthResult<bool>;

    /// Store `password_hash` and clear the reset fields only if the account
    /// still holds `token`.
    ///
    /// Returns `false` when another caller consumed it first.
    async fn consume_reset_token(
        &self,
        id: &AccountId,
        token: &str,
        password_hash: &HashedPassword,
    ) -> AuthResult<bool>;

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AuthResult<()>;
}

/// Housekeeping over accounts, kept apart from the request path
#[trait_variant::make(AccountMaintenance: Send)]
pub trait LocalAccountMaintenance {
    /// Clear verification tokens whose window has passed on accounts that
    /// never verified; returns the number of accounts touched
    async fn clean_expired_verification_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Session token repository trait
#[trait_variant::make(SessionTokenRepository: Send)]
pub trait LocalSessionTokenRepository {
    /// Persist a session; fails if the token string is already in use
    async fn create(&self, data: NewSessionToken) -> AuthResult<SessionToken>;

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<SessionToken>>;

    async fn update(
        &self,
        id: &SessionTokenId,
        changes: SessionTokenChanges,
    ) -> AuthResult<SessionToken>;

    /// Swap the stored token only if it still equals `current`.
    ///
    /// Returns `false` when another caller rotated or deleted the row first.
    async fn replace_token(
        &self,
        id: &SessionTokenId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
        last_activity_at: DateTime<Utc>,
    ) -> AuthResult<bool>;

    async fn delete_by_id(&self, id: &SessionTokenId) -> AuthResult<()>;

    /// Returns the number of rows removed (0 or 1)
    async fn delete_by_token(&self, token: &str) -> AuthResult<u64>;

    async fn delete_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64>;
}

/// Housekeeping over sessions
#[trait_variant::make(SessionMaintenance: Send)]
pub trait LocalSessionMaintenance {
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Outbound mail
#[trait_variant::make(MailSender: Send)]
pub trait LocalMailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}
