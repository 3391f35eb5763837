//! Application Configuration
//!
//! Configuration for the Auth application layer. Read once at startup and
//! shared as `Arc<AuthConfig>`.

use chrono::Duration;
use platform::password::{PasswordHashCost, PasswordHasher};
use thiserror::Error;

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest TTL accepted from the environment (10 years)
const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 3600;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} is out of range: {value}")]
    OutOfRange { name: &'static str, value: i64 },
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_token_secret: Vec<u8>,
    /// HMAC secret for refresh tokens, independent of the access secret
    pub refresh_token_secret: Vec<u8>,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token / session lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Email verification window (10 minutes)
    pub verification_token_ttl: Duration,
    /// Password reset window (1 hour)
    pub reset_token_ttl: Duration,
    /// Argon2id cost
    pub password_hash_cost: PasswordHashCost,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Base URL used to build links in outgoing mail
    pub app_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: Vec::new(),
            refresh_token_secret: Vec::new(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            verification_token_ttl: Duration::minutes(10),
            reset_token_ttl: Duration::hours(1),
            password_hash_cost: PasswordHashCost::default(),
            password_pepper: None,
            app_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets
    pub fn with_random_secrets() -> Self {
        Self {
            access_token_secret: random_secret(),
            refresh_token_secret: random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (random secrets, cheap hashing)
    pub fn development() -> Self {
        Self {
            password_hash_cost: PasswordHashCost::minimal(),
            ..Self::with_random_secrets()
        }
    }

    /// Build from environment variables; unset variables keep their default.
    ///
    /// Missing secrets are not an error here: the token codec refuses to sign
    /// with them, which surfaces the misconfiguration on first use.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cost = defaults.password_hash_cost;

        Ok(Self {
            access_token_secret: env_bytes("ACCESS_TOKEN_SECRET").unwrap_or_default(),
            refresh_token_secret: env_bytes("REFRESH_TOKEN_SECRET").unwrap_or_default(),
            access_token_ttl: env_ttl("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: env_ttl("REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?,
            verification_token_ttl: env_ttl(
                "VERIFICATION_TOKEN_TTL_SECS",
                defaults.verification_token_ttl,
            )?,
            reset_token_ttl: env_ttl("RESET_TOKEN_TTL_SECS", defaults.reset_token_ttl)?,
            password_hash_cost: PasswordHashCost {
                memory_kib: env_u32("PASSWORD_HASH_MEMORY_KIB", cost.memory_kib)?,
                iterations: env_u32("PASSWORD_HASH_ITERATIONS", cost.iterations)?,
                parallelism: env_u32("PASSWORD_HASH_PARALLELISM", cost.parallelism)?,
            },
            password_pepper: env_bytes("PASSWORD_PEPPER"),
            app_base_url: std::env::var("APP_BASE_URL").unwrap_or(defaults.app_base_url),
        })
    }

    /// Hasher bound to this config's cost and pepper
    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.password_hash_cost, self.password_pepper.clone())
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}/verify-email?token={}",
            self.app_base_url.trim_end_matches('/'),
            token
        )
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.app_base_url.trim_end_matches('/'),
            token
        )
    }
}

fn random_secret() -> Vec<u8> {
    use rand::RngCore;
    let mut secret = vec![0u8; MIN_SECRET_LEN];
    rand::rng().fill_bytes(&mut secret);
    secret
}

fn env_bytes(name: &str) -> Option<Vec<u8>> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(String::into_bytes)
}

fn env_ttl(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => parse_ttl(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_ttl(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })?;
    if secs <= 0 || secs > MAX_TTL_SECS {
        return Err(ConfigError::OutOfRange { name, value: secs });
    }
    Ok(Duration::seconds(secs))
}

fn env_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().parse() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}
