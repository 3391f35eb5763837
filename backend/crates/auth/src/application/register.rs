//! Register Use Case
//!
//! Creates an unverified account and mails its verification token.

use std::sync::Arc;

use chrono::Utc;
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::config::AuthConfig;
use crate::application::mail::verification_mail;
use crate::domain::entity::account::{AccountView, NewAccount};
use crate::domain::repository::{AccountRepository, MailSender};
use crate::domain::value_object::{
    account_role::AccountRole, email::Email, one_shot_token::OneShotToken,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account: AccountView,
    /// False when the verification mail could not be delivered
    pub email_sent: bool,
    pub email_error: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<A, M>
where
    A: AccountRepository,
    M: MailSender,
{
    account_repo: Arc<A>,
    mailer: Arc<M>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<A, M> RegisterUseCase<A, M>
where
    A: AccountRepository,
    M: MailSender,
{
    pub fn new(account_repo: Arc<A>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            mailer,
            hasher: config.password_hasher(),
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email = Email::new(&input.email);
        let username = input.username.trim().to_string();

        if self.account_repo.find_by_email(&email).await?.is_some()
            || self.account_repo.find_by_username(&username).await?.is_some()
        {
            return Err(AuthError::AccountAlreadyExists);
        }

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = self.hasher.hash_blocking(password).await?;

        let token = OneShotToken::generate();
        let expires_at = Utc::now() + self.config.verification_token_ttl;

        // The store re-checks uniqueness; a concurrent registration that got
        // past the lookups above still ends in AccountAlreadyExists.
        let account = self
            .account_repo
            .create(NewAccount {
                email,
                username,
                password_hash,
                role: AccountRole::default(),
                verification_token: Some(token.as_str().to_string()),
                verification_expires_at: Some(expires_at),
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

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

        Ok(RegisterOutput {
            account: account.view(),
            email_sent,
            email_error,
        })
    }
}
