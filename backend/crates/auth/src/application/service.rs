//! Authentication Service
//!
//! Single entry point composing every use case over one set of stores.

use std::sync::Arc;

use crate::application::authenticate::AuthenticateUseCase;
use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginOutput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::password_reset::{
    ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase,
};
use crate::application::refresh::RefreshUseCase;
use crate::application::register::{RegisterInput, RegisterOutput, RegisterUseCase};
use crate::application::resend_verification::{
    ResendVerificationOutput, ResendVerificationUseCase,
};
use crate::application::token_codec::{TokenCodec, TokenPair};
use crate::application::verify_email::{VerifyEmailOutput, VerifyEmailUseCase};
use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::{AccountRepository, MailSender, SessionTokenRepository};
use crate::error::AuthResult;

pub struct AuthService<A, S, M>
where
    A: AccountRepository,
    S: SessionTokenRepository,
    M: MailSender,
{
    codec: Arc<TokenCodec>,
    register: RegisterUseCase<A, M>,
    verify_email: VerifyEmailUseCase<A>,
    resend_verification: ResendVerificationUseCase<A, M>,
    login: LoginUseCase<A, S>,
    refresh: RefreshUseCase<A, S>,
    logout: LogoutUseCase<S>,
    forgot_password: ForgotPasswordUseCase<A, M>,
    reset_password: ResetPasswordUseCase<A, S>,
    authenticate: AuthenticateUseCase<A>,
}

impl<A, S, M> AuthService<A, S, M>
where
    A: AccountRepository,
    S: SessionTokenRepository,
    M: MailSender,
{
    pub fn new(
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&config));

        Self {
            register: RegisterUseCase::new(
                Arc::clone(&account_repo),
                Arc::clone(&mailer),
                Arc::clone(&config),
            ),
            verify_email: VerifyEmailUseCase::new(Arc::clone(&account_repo)),
            resend_verification: ResendVerificationUseCase::new(
                Arc::clone(&account_repo),
                Arc::clone(&mailer),
                Arc::clone(&config),
            ),
            login: LoginUseCase::new(
                Arc::clone(&account_repo),
                Arc::clone(&session_repo),
                Arc::clone(&codec),
                Arc::clone(&config),
            ),
            refresh: RefreshUseCase::new(
                Arc::clone(&account_repo),
                Arc::clone(&session_repo),
                Arc::clone(&codec),
            ),
            logout: LogoutUseCase::new(Arc::clone(&session_repo)),
            forgot_password: ForgotPasswordUseCase::new(
                Arc::clone(&account_repo),
                mailer,
                Arc::clone(&config),
            ),
            reset_password: ResetPasswordUseCase::new(
                Arc::clone(&account_repo),
                session_repo,
                config,
            ),
            authenticate: AuthenticateUseCase::new(account_repo, Arc::clone(&codec)),
            codec,
        }
    }

    /// Codec shared with the request gate
    pub fn codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<RegisterOutput> {
        self.register
            .execute(RegisterInput {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
    }

    pub async fn verify_email(&self, token: &str) -> AuthResult<VerifyEmailOutput> {
        self.verify_email.execute(token).await
    }

    pub async fn resend_verification(&self, email: &str) -> AuthResult<ResendVerificationOutput> {
        self.resend_verification.execute(email).await
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip: Option<&str>,
    ) -> AuthResult<LoginOutput> {
        self.login
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
                ip: ip.map(str::to_string),
            })
            .await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        self.refresh.execute(refresh_token).await
    }

    pub async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        self.logout.execute(refresh_token).await
    }

    pub async fn forgot_password(&self, email: &str) -> AuthResult<()> {
        self.forgot_password.execute(email).await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<()> {
        self.reset_password
            .execute(ResetPasswordInput {
                token: token.to_string(),
                new_password: new_password.to_string(),
            })
            .await
    }

    /// Resolve an `Authorization` header value to a verified account
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthResult<AccountProfile> {
        self.authenticate.execute(authorization).await
    }
}
