//! Logout Use Case

use std::sync::Arc;

use crate::domain::repository::SessionTokenRepository;
use crate::error::{AuthError, AuthResult};

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionTokenRepository,
{
    session_repo: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionTokenRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Revoke the session holding `refresh_token`.
    ///
    /// An unknown or already revoked token is `InvalidRefreshToken`.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let deleted = self.session_repo.delete_by_token(refresh_token).await?;
        if deleted == 0 {
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!("Session revoked");
        Ok(())
    }
}
