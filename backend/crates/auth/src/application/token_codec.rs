//! Token Codec
//!
//! Stateless signing and verification of the two token families. Access and
//! refresh tokens use independent secrets and lifetimes; neither touches
//! storage. Refresh-specific revocation is the caller's job.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::application::config::{AuthConfig, MIN_SECRET_LEN};
use crate::domain::entity::account::{Account, AccountProfile};
use crate::domain::value_object::{account_id::AccountId, account_role::AccountRole};
use crate::error::{AuthError, AuthResult};

/// Identity carried by both token families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub account_id: AccountId,
    pub email: String,
    pub role: AccountRole,
}

impl From<&Account> for TokenClaims {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            email: account.email.as_str().to_string(),
            role: account.role,
        }
    }
}

impl From<&AccountProfile> for TokenClaims {
    fn from(profile: &AccountProfile) -> Self {
        Self {
            account_id: profile.id,
            email: profile.email.as_str().to_string(),
            role: profile.role,
        }
    }
}

/// Wire payload: identity plus registered claims
#[derive(Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    claims: TokenClaims,
    iat: i64,
    exp: i64,
    /// Unique per issuance so two tokens minted in the same second differ
    jti: String,
}

/// Access + refresh token pair
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
struct TokenFamily {
    name: &'static str,
    /// `None` when the configured secret is too short to sign with
    keys: Option<(EncodingKey, DecodingKey)>,
    ttl: Duration,
}

impl TokenFamily {
    fn new(name: &'static str, secret: &[u8], ttl: Duration) -> Self {
        let keys = (secret.len() >= MIN_SECRET_LEN)
            .then(|| (EncodingKey::from_secret(secret), DecodingKey::from_secret(secret)));
        Self { name, keys, ttl }
    }

    fn issue(&self, claims: &TokenClaims) -> AuthResult<String> {
        let Some((encoding, _)) = &self.keys else {
            return Err(AuthError::TokenSigning(format!(
                "{} token secret must be at least {} bytes",
                self.name, MIN_SECRET_LEN
            )));
        };

        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenSigning(format!("{} token TTL overflow", self.name)))?;

        let payload = SignedClaims {
            claims: claims.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, encoding)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        let Some((_, decoding)) = &self.keys else {
            tracing::error!(family = self.name, "Token secret missing or too short");
            return Err(AuthError::InvalidToken);
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SignedClaims>(token, decoding, &validation)
            .map(|data| data.claims.claims)
            .map_err(|e| {
                tracing::debug!(family = self.name, error = %e, "Token rejected");
                AuthError::InvalidToken
            })
    }
}

/// Signs and verifies access / refresh tokens (HS256)
#[derive(Clone)]
pub struct TokenCodec {
    access: TokenFamily,
    refresh: TokenFamily,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: TokenFamily::new(
                "access",
                &config.access_token_secret,
                config.access_token_ttl,
            ),
            refresh: TokenFamily::new(
                "refresh",
                &config.refresh_token_secret,
                config.refresh_token_ttl,
            ),
        }
    }

    /// Fails with `TokenSigning` if the access secret is unusable
    pub fn issue_access_token(&self, claims: &TokenClaims) -> AuthResult<String> {
        self.access.issue(claims)
    }

    pub fn issue_refresh_token(&self, claims: &TokenClaims) -> AuthResult<String> {
        self.refresh.issue(claims)
    }

    /// Both tokens or neither
    pub fn issue_token_pair(&self, claims: &TokenClaims) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(claims)?,
            refresh_token: self.issue_refresh_token(claims)?,
        })
    }

    /// Bad signature, malformed input and expiry all map to `InvalidToken`.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        self.access.verify(token)
    }

    /// Signature and embedded expiry only; session-store checks are up to
    /// the caller.
    pub fn verify_refresh_token(&self, token: &str) -> AuthResult<TokenClaims> {
        self.refresh.verify(token)
    }

    /// Lifetime of a session row created or rotated alongside a refresh token
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh.ttl
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}
