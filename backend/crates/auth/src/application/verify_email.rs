//! Verify Email Use Case
//!
//! Consumes a verification token. The spent token stays on the account with
//! no expiry, so replaying it reports `AlreadyVerified` rather than
//! `InvalidToken`.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::repository::AccountRepository;
use crate::domain::value_object::one_shot_token::OneShotToken;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
}

/// Verify email output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailOutput {
    pub status: VerificationStatus,
    pub message: &'static str,
    pub resend_required: bool,
}

/// Verify email use case
pub struct VerifyEmailUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> VerifyEmailUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<VerifyEmailOutput> {
        let token = OneShotToken::parse(token).ok_or(AuthError::InvalidToken)?;

        let account = self
            .account_repo
            .find_by_verification_token(token.as_str())
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if account.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        if account.verification_expired_at(Utc::now()) {
            tracing::debug!(account_id = %account.id, "Verification token expired");
            return Err(AuthError::TokenExpired);
        }

        let consumed = self
            .account_repo
            .consume_verification_token(&account.id, token.as_str())
            .await?;
        if !consumed {
            return Err(AuthError::AlreadyVerified);
        }

        tracing::info!(account_id = %account.id, "Email verified");

        Ok(VerifyEmailOutput {
            status: VerificationStatus::Success,
            message: "Email verified successfully",
            resend_required: false,
        })
    }
}
