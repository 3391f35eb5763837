//! Refresh Use Case
//!
//! Rotates a refresh token: the presented string is replaced in its session
//! row by a freshly issued one, so each refresh token works exactly once.

use std::sync::Arc;

use chrono::Utc;

use crate::application::token_codec::{TokenClaims, TokenCodec, TokenPair};
use crate::domain::entity::session_token::SessionTokenChanges;
use crate::domain::repository::{AccountRepository, SessionTokenRepository};
use crate::error::{AuthError, AuthResult};

/// Refresh use case
pub struct RefreshUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<A, S> RefreshUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    pub fn new(account_repo: Arc<A>, session_repo: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self {
            account_repo,
            session_repo,
            codec,
        }
    }

    /// Every failure surfaces as `InvalidRefreshToken`.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        match self.rotate(refresh_token).await {
            Ok(tokens) => Ok(tokens),
            Err(AuthError::InvalidRefreshToken) => Err(AuthError::InvalidRefreshToken),
            Err(e) => {
                tracing::warn!(error = %e, "Refresh aborted");
                Err(AuthError::InvalidRefreshToken)
            }
        }
    }

    async fn rotate(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let session = self
            .session_repo
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let now = Utc::now();
        if session.is_expired_at(now) {
            self.session_repo.delete_by_id(&session.id).await?;
            tracing::debug!(session_id = %session.id, "Expired session pruned");
            return Err(AuthError::InvalidRefreshToken);
        }

        self.session_repo
            .update(
                &session.id,
                SessionTokenChanges {
                    last_activity_at: Some(now),
                    ..Default::default()
                },
            )
            .await?;

        let claims = self
            .codec
            .verify_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        if claims.account_id != session.account_id {
            return Err(AuthError::InvalidRefreshToken);
        }

        // Reload so role changes since issuance reach the new tokens
        let profile = self
            .account_repo
            .find_profile_by_id(&claims.account_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let tokens = self.codec.issue_token_pair(&TokenClaims::from(&profile))?;
        let expires_at = now
            .checked_add_signed(self.codec.refresh_ttl())
            .ok_or_else(|| AuthError::Internal("refresh TTL overflow".to_string()))?;

        // Loses to a concurrent rotation of the same string
        let rotated = self
            .session_repo
            .replace_token(
                &session.id,
                refresh_token,
                &tokens.refresh_token,
                expires_at,
                now,
            )
            .await?;
        if !rotated {
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!(
            account_id = %profile.id,
            session_id = %session.id,
            "Refresh token rotated"
        );

        Ok(tokens)
    }
}
