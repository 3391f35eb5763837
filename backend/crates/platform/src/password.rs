//! Password Hashing and Verification
//!
//! - Argon2id hashing with configurable cost
//! - Zeroization of clear text on drop
//! - Optional application-wide pepper
//! - Async wrappers that keep hashing off the async executor
//!
//! No strength policy is enforced here; only input that cannot be hashed
//! meaningfully (empty, oversized, control characters) is rejected.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Upper bound on accepted password length (code points)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Clear text that cannot be accepted as a password
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordInputError {
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// Hash cost
// ============================================================================

/// Argon2id cost parameters
///
/// Read once at startup; existing hashes keep the parameters they were
/// created with (they are encoded in the PHC string).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashCost {
    /// Memory size in KiB (m)
    pub memory_kib: u32,
    /// Number of passes (t)
    pub iterations: u32,
    /// Degree of parallelism (p)
    pub parallelism: u32,
}

impl Default for PasswordHashCost {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashCost {
    /// Smallest cost Argon2 accepts. Tests and local development only.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn params(&self) -> Result<Params, PasswordHashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Accept a clear text password.
    ///
    /// Unicode is normalized using NFKC so visually identical input
    /// hashes identically.
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordInputError> {
        let mut raw = raw.into();
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();

        let candidate = Self(normalized);

        if candidate.0.trim().is_empty() {
            return Err(PasswordInputError::EmptyOrWhitespace);
        }

        let char_count = candidate.0.chars().count();
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordInputError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if candidate
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordInputError::InvalidCharacter);
        }

        Ok(candidate)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// True when the stored hash is not Argon2id
    pub fn needs_rehash(&self) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed.algorithm != Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id hasher bound to a cost and an optional pepper
#[derive(Clone)]
pub struct PasswordHasher {
    cost: PasswordHashCost,
    pepper: Option<Vec<u8>>,
}

impl PasswordHasher {
    pub fn new(cost: PasswordHashCost, pepper: Option<Vec<u8>>) -> Self {
        Self { cost, pepper }
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        Ok(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            self.cost.params()?,
        ))
    }

    fn peppered(&self, password: &ClearTextPassword) -> Vec<u8> {
        let mut bytes = password.as_bytes().to_vec();
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    /// Hash with a fresh random salt (128 bits)
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let mut bytes = self.peppered(password);
        let salt = SaltString::generate(OsRng);

        let result = self
            .argon2()?
            .hash_password(&bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        bytes.zeroize();
        result
    }

    /// Verify against a stored hash (constant-time inside Argon2).
    ///
    /// The stored PHC string carries its own parameters, so hashes created
    /// under an older cost still verify.
    pub fn verify(&self, hashed: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&hashed.hash) else {
            return false;
        };
        let Ok(argon2) = self.argon2() else {
            return false;
        };

        let mut bytes = self.peppered(password);
        let valid = argon2.verify_password(&bytes, &parsed).is_ok();
        bytes.zeroize();
        valid
    }

    /// Hash of a random secret under this hasher's cost.
    ///
    /// Verifying against it costs the same as a real mismatch and never
    /// succeeds, which keeps unknown-account lookups from answering faster.
    pub fn decoy_hash(&self) -> Result<HashedPassword, PasswordHashError> {
        let secret = SaltString::generate(OsRng);
        let password = ClearTextPassword::new(secret.as_str())
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        self.hash(&password)
    }

    /// [`Self::hash`] on the blocking thread pool
    pub async fn hash_blocking(
        &self,
        password: ClearTextPassword,
    ) -> Result<HashedPassword, PasswordHashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
    }

    /// [`Self::verify`] on the blocking thread pool. A panicked or cancelled
    /// task counts as a mismatch.
    pub async fn verify_blocking(
        &self,
        hashed: HashedPassword,
        password: ClearTextPassword,
    ) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hashed, &password))
            .await
            .unwrap_or(false)
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher(pepper: Option<&[u8]>) -> PasswordHasher {
        PasswordHasher::new(PasswordHashCost::minimal(), pepper.map(<[u8]>::to_vec))
    }

    #[test]
    fn test_decoy_hash_matches_cost_and_rejects() {
        let hasher = hasher(None);
        let decoy = hasher.decoy_hash().unwrap();
        let minimal = PasswordHashCost::minimal();

        let phc = decoy.as_phc_string();
        assert!(phc.starts_with("$argon2id$"));
        assert!(phc.contains(&format!(
            "m={},t={},p={}",
            minimal.memory_kib, minimal.iterations, minimal.parallelism
        )));
        assert!(!hasher.verify(&decoy, &ClearTextPassword::new("Secret123!").unwrap()));
        assert_ne!(phc, hasher.decoy_hash().unwrap().as_phc_string());
    }

    #[test]
    fn test_password_empty() {
        assert_eq!(
            ClearTextPassword::new("").unwrap_err(),
            PasswordInputError::EmptyOrWhitespace
        );
        assert_eq!(
            ClearTextPassword::new("    ").unwrap_err(),
            PasswordInputError::EmptyOrWhitespace
        );
    }

    #[test]
    fn test_password_too_long() {
        let result = ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1));
        assert!(matches!(result, Err(PasswordInputError::TooLong { .. })));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}def");
        assert_eq!(result.unwrap_err(), PasswordInputError::InvalidCharacter);
    }

    #[test]
    fn test_short_password_is_accepted() {
        // Strength is the caller's concern
        assert!(ClearTextPassword::new("x").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher(None);
        let password = ClearTextPassword::new("Secret123!").unwrap();
        let hashed = hasher.hash(&password).unwrap();

        assert!(hasher.verify(&hashed, &password));

        let wrong = ClearTextPassword::new("Secret124!").unwrap();
        assert!(!hasher.verify(&hashed, &wrong));
    }

    #[test]
    fn test_nfkc_normalization() {
        let hasher = hasher(None);
        // U+FB01 LATIN SMALL LIGATURE FI normalizes to "fi"
        let ligature = ClearTextPassword::new("\u{FB01}sh-and-chips").unwrap();
        let plain = ClearTextPassword::new("fish-and-chips").unwrap();

        let hashed = hasher.hash(&ligature).unwrap();
        assert!(hasher.verify(&hashed, &plain));
    }

    #[test]
    fn test_hash_with_pepper() {
        let peppered = hasher(Some(b"pepper"));
        let password = ClearTextPassword::new("Secret123!").unwrap();
        let hashed = peppered.hash(&password).unwrap();

        assert!(peppered.verify(&hashed, &password));
        assert!(!hasher(None).verify(&hashed, &password));
        assert!(!hasher(Some(b"other")).verify(&hashed, &password));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher(None);
        let password = ClearTextPassword::new("Secret123!").unwrap();
        let a = hasher.hash(&password).unwrap();
        let b = hasher.hash(&password).unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let hasher = hasher(None);
        let password = ClearTextPassword::new("Secret123!").unwrap();
        let hashed = hasher.hash(&password).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(hasher.verify(&restored, &password));
        assert!(!restored.needs_rehash());
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_invalid_cost() {
        let hasher = PasswordHasher::new(
            PasswordHashCost {
                memory_kib: 1,
                iterations: 0,
                parallelism: 1,
            },
            None,
        );
        let password = ClearTextPassword::new("Secret123!").unwrap();
        assert!(matches!(
            hasher.hash(&password),
            Err(PasswordHashError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("hunter2").unwrap();
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("hunter2"));

        let hasher = hasher(Some(b"pepper"));
        assert!(!format!("{:?}", hasher).contains("pepper\""));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hasher = hasher(None);
        let hashed = hasher
            .hash_blocking(ClearTextPassword::new("Secret123!").unwrap())
            .await
            .unwrap();

        assert!(
            hasher
                .verify_blocking(hashed.clone(), ClearTextPassword::new("Secret123!").unwrap())
                .await
        );
        assert!(
            !hasher
                .verify_blocking(hashed, ClearTextPassword::new("nope").unwrap())
                .await
        );
    }
}
