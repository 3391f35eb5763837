//! Login Use Case
//!
//! Verifies credentials, issues a token pair and records a session.

use std::sync::Arc;

use chrono::Utc;
use platform::password::{ClearTextPassword, HashedPassword, PasswordHasher};

use crate::application::config::AuthConfig;
use crate::application::token_codec::{TokenClaims, TokenCodec, TokenPair};
use crate::domain::entity::{account::AccountView, session_token::NewSessionToken};
use crate::domain::repository::{AccountRepository, SessionTokenRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Client address, recorded best-effort
    pub ip: Option<String>,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub account: AccountView,
    pub tokens: TokenPair,
}

/// Login use case
pub struct LoginUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
    /// Verified against when the email is unknown
    decoy_hash: Option<HashedPassword>,
}

impl<A, S> LoginUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let hasher = config.password_hasher();
        let decoy_hash = hasher
            .decoy_hash()
            .inspect_err(|e| tracing::warn!(error = %e, "Decoy password hash unavailable"))
            .ok();

        Self {
            account_repo,
            session_repo,
            codec,
            hasher,
            decoy_hash,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let email = Email::new(&input.email);

        let account = self.account_repo.find_by_email(&email).await?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        // Unknown email and wrong password are indistinguishable, in timing too
        let Some(mut account) = account else {
            if let Some(decoy) = &self.decoy_hash {
                self.hasher.verify_blocking(decoy.clone(), password).await;
            }
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_blocking(account.password_hash.clone(), password)
            .await
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let tokens = self.codec.issue_token_pair(&TokenClaims::from(&account))?;
        let now = Utc::now();

        // A failed session write leaves a refresh token that cannot be
        // rotated or revoked; the access token still works.
        let session = NewSessionToken {
            account_id: account.id,
            token: tokens.refresh_token.clone(),
            last_activity_at: now,
            expires_at: now + self.codec.refresh_ttl(),
        };
        if let Err(e) = self.session_repo.create(session).await {
            tracing::warn!(account_id = %account.id, error = %e, "Session not persisted");
        }

        if let Err(e) = self
            .account_repo
            .update_login_tracking(&account.id, now, input.ip.as_deref())
            .await
        {
            tracing::warn!(account_id = %account.id, error = %e, "Login tracking not updated");
        }
        account.last_login_at = Some(now);
        account.last_login_ip = input.ip;

        tracing::info!(account_id = %account.id, "Account logged in");

        Ok(LoginOutput {
            account: account.view(),
            tokens,
        })
    }
}
