//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every variant carries a stable
//! machine-readable code; HTTP status mapping happens only when the error
//! is rendered as a response.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordInputError};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    /// Duplicate email or username
    #[error("An account with this email or username already exists")]
    AccountAlreadyExists,

    #[error("Email address is already verified")]
    AlreadyVerified,

    /// One-shot token exists but its window has passed
    #[error("Token has expired")]
    TokenExpired,

    /// Malformed, tampered or unknown access/verification token
    #[error("Invalid token")]
    InvalidToken,

    /// Any failure on the refresh path
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired password reset token")]
    InvalidResetToken,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient role for this operation")]
    Forbidden,

    /// Server misconfiguration (missing or short signing secret)
    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    /// Clear text that cannot be hashed as a password
    #[error("Password rejected: {0}")]
    PasswordRejected(String),

    /// Storage adapter failure outside of SQL
    #[error("Store error: {0}")]
    Store(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            AuthError::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            AuthError::AlreadyVerified => "ALREADY_VERIFIED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::InvalidResetToken => "INVALID_RESET_TOKEN",
            AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::TokenSigning(_) => "TOKEN_SIGNING_ERROR",
            AuthError::PasswordRejected(_) => "PASSWORD_REJECTED",
            AuthError::Store(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::EmailNotVerified | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::AccountAlreadyExists | AuthError::AlreadyVerified => ErrorKind::Conflict,
            AuthError::TokenExpired => ErrorKind::Gone,
            AuthError::InvalidResetToken | AuthError::PasswordRejected(_) => ErrorKind::BadRequest,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::TokenSigning(_)
            | AuthError::Store(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the caller should offer "send me a new verification email"
    pub fn resend_required(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Convert to AppError.
    ///
    /// Server-side variants are rendered with a generic message so that no
    /// internal detail reaches the caller.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        let message = if kind.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let err = AppError::new(kind, message).with_code(self.code());
        match self {
            AuthError::EmailNotVerified | AuthError::TokenExpired => {
                err.with_action("Request a new verification email")
            }
            AuthError::InvalidRefreshToken => err.with_action("Sign in again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Store(msg) => {
                tracing::error!(message = %msg, "Auth store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TokenSigning(msg) => {
                tracing::error!(message = %msg, "Token signing misconfigured");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidRefreshToken => {
                tracing::warn!("Rejected refresh token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

/// Database failures keep the kernel's classification (e.g. an exhausted
/// pool renders as 503); everything else goes through `to_app_error`.
impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        match err {
            AuthError::Database(e) => AppError::from(e).with_code(code),
            other => other.to_app_error(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<PasswordInputError> for AuthError {
    fn from(err: PasswordInputError) -> Self {
        AuthError::PasswordRejected(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Delivery failure reported by a [`MailSender`](crate::domain::repository::MailSender)
#[derive(Debug, Clone, Error)]
#[error("Mail delivery failed: {0}")]
pub struct MailError(pub String);
