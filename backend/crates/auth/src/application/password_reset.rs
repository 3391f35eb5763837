//! Password Reset Use Cases
//!
//! `ForgotPasswordUseCase` issues a one-shot reset token and mails it;
//! `ResetPasswordUseCase` consumes it, replaces the password hash and
//! revokes every session of the account.

use std::sync::Arc;

use chrono::Utc;
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::config::AuthConfig;
use crate::application::mail::password_reset_mail;
use crate::domain::repository::{AccountRepository, MailSender, SessionTokenRepository};
use crate::domain::value_object::{email::Email, one_shot_token::OneShotToken};
use crate::error::{AuthError, AuthResult};

/// Forgot password use case
pub struct ForgotPasswordUseCase<A, M>
where
    A: AccountRepository,
    M: MailSender,
{
    account_repo: Arc<A>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<A, M> ForgotPasswordUseCase<A, M>
where
    A: AccountRepository,
    M: MailSender,
{
    pub fn new(account_repo: Arc<A>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            mailer,
            config,
        }
    }

    /// Unknown email is reported as `AccountNotFound`.
    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email);
        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let token = OneShotToken::generate();
        let expires_at = Utc::now() + self.config.reset_token_ttl;
        self.account_repo
            .set_reset_token(&account.id, Some(token.as_str()), Some(expires_at))
            .await?;

        tracing::info!(account_id = %account.id, "Password reset requested");

        let mail = password_reset_mail(&self.config, &account.username, token.as_str());
        if let Err(e) = self
            .mailer
            .send(account.email.as_str(), mail.subject, &mail.html_body)
            .await
        {
            tracing::warn!(account_id = %account.id, error = %e, "Reset email not delivered");
        }

        Ok(())
    }
}

/// Reset password input
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

/// Reset password use case
pub struct ResetPasswordUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    hasher: PasswordHasher,
}

impl<A, S> ResetPasswordUseCase<A, S>
where
    A: AccountRepository,
    S: SessionTokenRepository,
{
    pub fn new(account_repo: Arc<A>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            session_repo,
            hasher: config.password_hasher(),
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let token = OneShotToken::parse(&input.token).ok_or(AuthError::InvalidResetToken)?;

        let account = self
            .account_repo
            .find_by_reset_token(token.as_str())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if account.reset_expired_at(Utc::now()) {
            return Err(AuthError::InvalidResetToken);
        }

        let password = ClearTextPassword::new(input.new_password)?;
        let password_hash = self.hasher.hash_blocking(password).await?;

        // Hash and reset fields change in one write, and only once per token
        let consumed = self
            .account_repo
            .consume_reset_token(&account.id, token.as_str(), &password_hash)
            .await?;
        if !consumed {
            return Err(AuthError::InvalidResetToken);
        }

        let revoked = self
            .session_repo
            .delete_all_for_account(&account.id)
            .await?;

        tracing::info!(
            account_id = %account.id,
            sessions_revoked = revoked,
            "Password reset"
        );

        Ok(())
    }
}
