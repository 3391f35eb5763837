//! Request Authentication
//!
//! Resolves the `Authorization` header of a request to the account it
//! belongs to, and checks that account's role against an allow-list.

use std::sync::Arc;

use platform::bearer::bearer_token;

use crate::application::token_codec::TokenCodec;
use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_role::AccountRole;
use crate::error::{AuthError, AuthResult};

/// Authenticate use case
pub struct AuthenticateUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    codec: Arc<TokenCodec>,
}

impl<A> AuthenticateUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, codec: Arc<TokenCodec>) -> Self {
        Self {
            account_repo,
            codec,
        }
    }

    /// `authorization` is the raw header value, if any.
    ///
    /// - no header: `Unauthorized`
    /// - not `Bearer <token>`, bad signature or expired: `InvalidToken`
    /// - account gone: `AccountNotFound`
    /// - account not verified: `Unauthorized`
    pub async fn execute(&self, authorization: Option<&str>) -> AuthResult<AccountProfile> {
        let header = authorization.ok_or(AuthError::Unauthorized)?;
        let token = bearer_token(header).map_err(|_| AuthError::InvalidToken)?;

        let claims = self.codec.verify_access_token(token)?;

        let profile = self
            .account_repo
            .find_profile_by_id(&claims.account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !profile.is_verified {
            return Err(AuthError::Unauthorized);
        }

        Ok(profile)
    }
}

/// Fails closed: a non-empty list that lacks the role is `Forbidden`.
pub fn authorize(profile: &AccountProfile, allowed_roles: &[AccountRole]) -> AuthResult<()> {
    if profile.role.is_allowed(allowed_roles) {
        Ok(())
    } else {
        tracing::debug!(
            account_id = %profile.id,
            role = %profile.role,
            "Role not allowed"
        );
        Err(AuthError::Forbidden)
    }
}
