//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod login;
pub mod logout;
pub mod mail;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod resend_verification;
pub mod service;
pub mod token_codec;
pub mod verify_email;

// Re-exports
pub use authenticate::{AuthenticateUseCase, authorize};
pub use config::{AuthConfig, ConfigError};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use password_reset::{ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase};
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use resend_verification::{ResendVerificationOutput, ResendVerificationUseCase};
pub use service::AuthService;
pub use token_codec::{TokenClaims, TokenCodec, TokenPair};
pub use verify_email::{VerificationStatus, VerifyEmailOutput, VerifyEmailUseCase};
