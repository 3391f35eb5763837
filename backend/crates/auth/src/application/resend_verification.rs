//! Resend Verification Use Case
//!
//! Replaces the verification token of an unverified account with a fresh
//! one and mails it. The previous token stops working immediately.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::mail::verification_mail;
use crate::domain::repository::{AccountRepository, MailSender};
use crate::domain::value_object::{email::Email, one_shot_token::OneShotToken};
use crate::error::{AuthError, AuthResult};

/// Resend verification output
#[derive(Debug)]
pub struct ResendVerificationOutput {
    pub email_sent: bool,
    pub email_error: Option<String>,
}

/// Resend verification use case
pub struct ResendVerificationUseCase<A, M>
where
    A: AccountRepository,
    M: MailSender,
{
    account_repo: Arc<A>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<A, M> ResendVerificationUseCase<A, M>
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

    pub async fn execute(&self, email: &str) -> AuthResult<ResendVerificationOutput> {
        let email = Email::new(email);
        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let token = OneShotToken::generate();
        let expires_at = Utc::now() + self.config.verification_token_ttl;
        self.account_repo
            .set_verification_token(&account.id, Some(token.as_str()), Some(expires_at))
            .await?;

        let mail = verification_mail(&self.config, &account.username, token.as_str());
        let (email_sent, email_error) = match self
            .mailer
            .send(account.email.as_str(), mail.subject, &mail.html_body)
            .await
        {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(
                    account_id = %account.id,
                    error = %e,
                    "Verification email not delivered"
                );
                (false, Some(e.to_string()))
            }
        };

        tracing::info!(account_id = %account.id, email_sent, "Verification token reissued");

        Ok(ResendVerificationOutput {
            email_sent,
            email_error,
        })
    }
}
