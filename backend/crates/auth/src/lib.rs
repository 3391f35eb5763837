//! Account Authentication Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, token codec, configuration
//! - `infra/` - Postgres and in-memory stores, mailer
//! - `presentation/` - Request authentication middleware
//!
//! ## Features
//! - Registration with email verification (one-shot, time-bounded token)
//! - Login issuing a short-lived access token and a rotating refresh token
//! - Refresh-token rotation backed by a persisted session row
//! - Forgot / reset password (one-shot token, revokes every session)
//! - Role tagging (Player, Manager, Admin) and a role allow-list gate
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async executor
//! - Access tokens are stateless; refresh tokens only work while their
//!   session row holds them, and each works exactly once
//! - Unknown email and wrong password yield the same error
//! - Every refresh-path failure is reported as `InvalidRefreshToken`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{AuthConfig, AuthService, TokenClaims, TokenCodec, TokenPair};
pub use error::{AuthError, AuthResult, MailError};
pub use infra::{InMemoryAuthStore, LogMailer, PgAuthRepository};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
