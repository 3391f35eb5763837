//! Auth Middleware
//!
//! Request gate for protected routes: `require_auth` resolves the bearer
//! access token to a verified account and attaches it to the request;
//! `require_roles` then checks that account against a role allow-list.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{Request, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::authorization_header;
use std::sync::Arc;

use crate::application::authenticate::{AuthenticateUseCase, authorize};
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_role::AccountRole;
use crate::error::AuthError;

/// Middleware state
pub struct AuthGateState<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    authenticate: Arc<AuthenticateUseCase<A>>,
}

impl<A> AuthGateState<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>, codec: Arc<TokenCodec>) -> Self {
        Self {
            authenticate: Arc::new(AuthenticateUseCase::new(account_repo, codec)),
        }
    }
}

impl<A> Clone for AuthGateState<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            authenticate: Arc::clone(&self.authenticate),
        }
    }
}

/// Account attached to the request by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub AccountProfile);

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

/// Middleware that requires a valid access token for a verified account
pub async fn require_auth<A>(
    State(state): State<AuthGateState<A>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    A: AccountRepository + Send + Sync + 'static,
{
    // Non-UTF-8 header is a malformed scheme, not a missing one
    let header = authorization_header(req.headers())
        .map_err(|_| AuthError::InvalidToken)?
        .map(str::to_string);

    let profile = state.authenticate.execute(header.as_deref()).await?;

    req.extensions_mut().insert(AuthenticatedAccount(profile));

    Ok(next.run(req).await)
}

/// Role allow-list for [`require_roles`]; empty allows every role
#[derive(Debug, Clone)]
pub struct AllowedRoles(Arc<[AccountRole]>);

impl AllowedRoles {
    pub fn new(roles: impl IntoIterator<Item = AccountRole>) -> Self {
        Self(roles.into_iter().collect())
    }
}

/// Middleware that checks the authenticated account's role.
///
/// Must run after [`require_auth`].
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let account = req
        .extensions()
        .get::<AuthenticatedAccount>()
        .ok_or(AuthError::Unauthorized)?;

    authorize(&account.0, &allowed.0)?;

    Ok(next.run(req).await)
}
