//! In-memory Repository Implementations
//!
//! Backs every repository trait with `HashMap`s behind tokio `RwLock`s.
//! Each trait method takes the lock once, so single-row operations are
//! atomic. Used by tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use tokio::sync::RwLock;

use crate::domain::entity::{
    account::{Account, AccountChanges, AccountProfile, NewAccount},
    session_token::{NewSessionToken, SessionToken, SessionTokenChanges},
};
use crate::domain::repository::{
    AccountMaintenance, AccountRepository, SessionMaintenance, SessionTokenRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, session_token_id::SessionTokenId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Inner {
    accounts: RwLock<HashMap<AccountId, Account>>,
    sessions: RwLock<HashMap<SessionTokenId, SessionToken>>,
}

/// In-memory auth store
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    inner: Arc<Inner>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live session rows, for assertions
    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Apply `f` to one account and return the result
    async fn modify_account<T>(
        &self,
        id: &AccountId,
        f: impl FnOnce(&mut Account) -> T,
    ) -> AuthResult<T> {
        let mut accounts = self.inner.accounts.write().await;
        let account = accounts.get_mut(id).ok_or(AuthError::AccountNotFound)?;
        Ok(f(account))
    }

    async fn find_account(&self, pred: impl Fn(&Account) -> bool) -> Option<Account> {
        self.inner
            .accounts
            .read()
            .await
            .values()
            .find(|&a| pred(a))
            .cloned()
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for InMemoryAuthStore {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self.find_account(|a| &a.email == email).await)
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        Ok(self.find_account(|a| a.username == username).await)
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.inner.accounts.read().await.get(id).cloned())
    }

    async fn find_profile_by_id(&self, id: &AccountId) -> AuthResult<Option<AccountProfile>> {
        Ok(self.inner.accounts.read().await.get(id).map(Account::profile))
    }

    async fn create(&self, data: NewAccount) -> AuthResult<Account> {
        let mut accounts = self.inner.accounts.write().await;
        let taken = accounts
            .values()
            .any(|a| a.email == data.email || a.username == data.username);
        if taken {
            return Err(AuthError::AccountAlreadyExists);
        }

        let account = Account::from_new(data, Utc::now());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, id: &AccountId, changes: AccountChanges) -> AuthResult<Account> {
        self.modify_account(id, |account| {
            account.apply(changes, Utc::now());
            account.clone()
        })
        .await
    }

    async fn set_verified(&self, id: &AccountId, verified: bool) -> AuthResult<()> {
        self.modify_account(id, |account| {
            account.is_verified = verified;
            account.updated_at = Utc::now();
        })
        .await
    }

    async fn set_verification_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.modify_account(id, |account| {
            account.verification_token = token.map(str::to_string);
            account.verification_expires_at = expires_at;
            account.updated_at = Utc::now();
        })
        .await
    }

    async fn set_reset_token(
        &self,
        id: &AccountId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.modify_account(id, |account| {
            account.reset_token = token.map(str::to_string);
            account.reset_expires_at = expires_at;
            account.updated_at = Utc::now();
        })
        .await
    }

    async fn find_by_verification_token(&self, token: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .find_account(|a| a.verification_token.as_deref() == Some(token))
            .await)
    }

    async fn find_by_reset_token(&self, token: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .find_account(|a| a.reset_token.as_deref() == Some(token))
            .await)
    }

    async fn consume_verification_token(&self, id: &AccountId, token: &str) -> AuthResult<bool> {
        self.modify_account(id, |account| {
            if account.is_verified || account.verification_token.as_deref() != Some(token) {
                return false;
            }
            account.is_verified = true;
            account.verification_expires_at = None;
            account.updated_at = Utc::now();
            true
        })
        .await
    }

    async fn consume_reset_token(
        &self,
        id: &AccountId,
        token: &str,
        password_hash: &HashedPassword,
    ) -> AuthResult<bool> {
        self.modify_account(id, |account| {
            if account.reset_token.as_deref() != Some(token) {
                return false;
            }
            account.apply(
                AccountChanges {
                    password_hash: Some(password_hash.clone()),
                    clear_reset_token: true,
                    ..Default::default()
                },
                Utc::now(),
            );
            true
        })
        .await
    }

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> AuthResult<()> {
        self.modify_account(id, |account| {
            account.last_login_at = Some(at);
            account.last_login_ip = ip.map(str::to_string);
        })
        .await
    }
}

impl AccountMaintenance for InMemoryAuthStore {
    async fn clean_expired_verification_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut accounts = self.inner.accounts.write().await;
        let mut cleaned = 0;
        for account in accounts.values_mut() {
            if !account.is_verified
                && account.verification_token.is_some()
                && account.verification_expired_at(now)
            {
                account.verification_token = None;
                account.verification_expires_at = None;
                account.updated_at = now;
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }
}

// ============================================================================
// Session Token Repository Implementation
// ============================================================================

impl SessionTokenRepository for InMemoryAuthStore {
    async fn create(&self, data: NewSessionToken) -> AuthResult<SessionToken> {
        let mut sessions = self.inner.sessions.write().await;
        if sessions.values().any(|s| s.token == data.token) {
            return Err(AuthError::Store("duplicate session token".to_string()));
        }

        let session = SessionToken::from_new(data, Utc::now());
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<SessionToken>> {
        Ok(self
            .inner
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn update(
        &self,
        id: &SessionTokenId,
        changes: SessionTokenChanges,
    ) -> AuthResult<SessionToken> {
        let mut sessions = self.inner.sessions.write().await;
        if let Some(token) = &changes.token {
            if sessions.values().any(|s| &s.id != id && &s.token == token) {
                return Err(AuthError::Store("duplicate session token".to_string()));
            }
        }

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AuthError::Store("session not found".to_string()))?;
        session.apply(changes);
        Ok(session.clone())
    }

    async fn replace_token(
        &self,
        id: &SessionTokenId,
        current: &str,
        next: &str,
        expires_at: DateTime<Utc>,
        last_activity_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut sessions = self.inner.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.token == current => {
                session.token = next.to_string();
                session.expires_at = expires_at;
                session.last_activity_at = last_activity_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &SessionTokenId) -> AuthResult<()> {
        self.inner.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> AuthResult<u64> {
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.token != token);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| &s.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }
}

impl SessionMaintenance for InMemoryAuthStore {
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
